//! Inline placeholder substitution.
//!
//! The analysis service replaces formulas, barcodes and checkboxes in running
//! text with `:formula:`, `:barcode:`, `:selected:` and `:unselected:`. The
//! formula and barcode placeholders are matched left to right against the
//! formulas and barcodes whose own span lies inside the element's spans.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::{Barcode, Formula, Span};

const FORMULA_PLACEHOLDER: &str = ":formula:";
const BARCODE_PLACEHOLDER: &str = ":barcode:";

/// Replace `:formula:` and `:barcode:` placeholders in `content`.
///
/// Fails with [`Error::Consistency`] when the number of placeholders differs
/// from the number of formulas (or barcodes) inside `spans`.
pub fn substitute_formulas_and_barcodes(
    content: &str,
    spans: &[Span],
    formulas: &[&Formula],
    barcodes: &[&Barcode],
) -> Result<String> {
    let mut content = content.to_string();
    if content.contains(FORMULA_PLACEHOLDER) {
        let matching: Vec<String> = spans
            .iter()
            .flat_map(|span| {
                formulas
                    .iter()
                    .filter(move |formula| formula.span.is_within(span))
            })
            .map(|formula| latex_to_text(&formula.value))
            .collect();
        content = replace_in_order(&content, FORMULA_PLACEHOLDER, &matching, "formula")?;
    }
    if content.contains(BARCODE_PLACEHOLDER) {
        let matching: Vec<String> = spans
            .iter()
            .flat_map(|span| {
                barcodes
                    .iter()
                    .filter(move |barcode| barcode.span.is_within(span))
            })
            .map(|barcode| {
                format!(
                    "*Barcode value:* {} (*Barcode kind:* {})",
                    barcode.value, barcode.kind
                )
            })
            .collect();
        content = replace_in_order(&content, BARCODE_PLACEHOLDER, &matching, "barcode")?;
    }
    Ok(content)
}

fn replace_in_order(
    content: &str,
    placeholder: &str,
    replacements: &[String],
    what: &str,
) -> Result<String> {
    let found = content.matches(placeholder).count();
    if found != replacements.len() {
        return Err(Error::Consistency(format!(
            "{} {} placeholders but {} {}s inside the element spans",
            found,
            placeholder,
            replacements.len(),
            what
        )));
    }
    let mut out = String::with_capacity(content.len());
    let mut rest = content;
    for replacement in replacements {
        if let Some(pos) = rest.find(placeholder) {
            out.push_str(&rest[..pos]);
            out.push_str(replacement);
            rest = &rest[pos + placeholder.len()..];
        }
    }
    out.push_str(rest);
    Ok(out)
}

/// Replacement text for checkbox placeholders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionMarkFormatter {
    pub selected: String,
    pub unselected: String,
}

impl Default for SelectionMarkFormatter {
    fn default() -> Self {
        Self {
            selected: "[X]".to_string(),
            unselected: "[ ]".to_string(),
        }
    }
}

impl SelectionMarkFormatter {
    pub fn new(selected: impl Into<String>, unselected: impl Into<String>) -> Self {
        Self {
            selected: selected.into(),
            unselected: unselected.into(),
        }
    }

    /// Replace `:selected:` and `:unselected:` placeholders.
    pub fn format(&self, content: &str) -> String {
        content
            .replace(":selected:", &self.selected)
            .replace(":unselected:", &self.unselected)
    }
}

fn regex(cell: &'static OnceLock<Regex>, pattern: &str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(pattern).expect("valid regex"))
}

/// Render LaTeX as readable plain text.
///
/// Covers what formula recognition emits in practice: fractions, roots,
/// Greek letters, operators and text-style wrappers. Unknown commands keep
/// their name without the backslash.
pub fn latex_to_text(latex: &str) -> String {
    static FRAC: OnceLock<Regex> = OnceLock::new();
    static SQRT: OnceLock<Regex> = OnceLock::new();
    static WRAPPER: OnceLock<Regex> = OnceLock::new();
    static COMMAND: OnceLock<Regex> = OnceLock::new();
    static SPACES: OnceLock<Regex> = OnceLock::new();

    let frac = regex(&FRAC, r"\\[dt]?frac\s*\{([^{}]*)\}\s*\{([^{}]*)\}");
    let sqrt = regex(&SQRT, r"\\sqrt\s*\{([^{}]*)\}");
    let wrapper = regex(
        &WRAPPER,
        r"\\(?:text|mathrm|mathbf|mathit|mathsf|mathtt|mathcal|operatorname|textbf|textit|boldsymbol)\s*\{([^{}]*)\}",
    );
    let command = regex(&COMMAND, r"\\([A-Za-z]+|[,;:! ])");
    let spaces = regex(&SPACES, r"\s+");

    let mut text = latex.to_string();
    // Innermost groups first so nested fractions resolve.
    loop {
        let next = frac.replace_all(&text, "$1/$2").into_owned();
        let next = sqrt.replace_all(&next, "√($1)").into_owned();
        let next = wrapper.replace_all(&next, "$1").into_owned();
        if next == text {
            break;
        }
        text = next;
    }

    let text = command.replace_all(&text, |caps: &regex::Captures| {
        let name = &caps[1];
        symbol(name).map(str::to_string).unwrap_or_else(|| {
            if name.chars().all(|c| c.is_ascii_alphabetic()) {
                name.to_string()
            } else {
                " ".to_string()
            }
        })
    });
    let text: String = text.chars().filter(|c| *c != '{' && *c != '}').collect();
    spaces.replace_all(&text, " ").trim().to_string()
}

fn symbol(name: &str) -> Option<&'static str> {
    let s = match name {
        "alpha" => "α",
        "beta" => "β",
        "gamma" => "γ",
        "delta" => "δ",
        "epsilon" | "varepsilon" => "ε",
        "zeta" => "ζ",
        "eta" => "η",
        "theta" => "θ",
        "kappa" => "κ",
        "lambda" => "λ",
        "mu" => "μ",
        "nu" => "ν",
        "xi" => "ξ",
        "pi" => "π",
        "rho" => "ρ",
        "sigma" => "σ",
        "tau" => "τ",
        "phi" | "varphi" => "φ",
        "chi" => "χ",
        "psi" => "ψ",
        "omega" => "ω",
        "Gamma" => "Γ",
        "Delta" => "Δ",
        "Theta" => "Θ",
        "Lambda" => "Λ",
        "Pi" => "Π",
        "Sigma" => "Σ",
        "Phi" => "Φ",
        "Psi" => "Ψ",
        "Omega" => "Ω",
        "times" => "×",
        "cdot" => "·",
        "div" => "÷",
        "pm" => "±",
        "mp" => "∓",
        "le" | "leq" => "≤",
        "ge" | "geq" => "≥",
        "neq" | "ne" => "≠",
        "approx" => "≈",
        "equiv" => "≡",
        "sim" => "∼",
        "infty" => "∞",
        "sum" => "∑",
        "prod" => "∏",
        "int" => "∫",
        "partial" => "∂",
        "nabla" => "∇",
        "in" => "∈",
        "notin" => "∉",
        "subset" => "⊂",
        "cup" => "∪",
        "cap" => "∩",
        "forall" => "∀",
        "exists" => "∃",
        "to" | "rightarrow" => "→",
        "leftarrow" => "←",
        "Rightarrow" => "⇒",
        "leftrightarrow" => "↔",
        "ldots" | "dots" => "…",
        "cdots" => "⋯",
        "degree" | "circ" => "°",
        "left" | "right" | "displaystyle" | "limits" => "",
        "quad" | "qquad" => " ",
        _ => return None,
    };
    Some(s)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn formula(value: &str, offset: usize) -> Formula {
        Formula {
            kind: "inline".into(),
            value: value.into(),
            span: Span::new(offset, 9),
            ..Default::default()
        }
    }

    #[test]
    fn test_formulas_replaced_in_order() {
        let f1 = formula("x^2", 4);
        let f2 = formula(r"\alpha", 20);
        let outside = formula("y", 200);
        let text = substitute_formulas_and_barcodes(
            "Let :formula: and :formula: hold.",
            &[Span::new(0, 40)],
            &[&f1, &f2, &outside],
            &[],
        )
        .unwrap();
        assert_eq!(text, "Let x^2 and α hold.");
    }

    #[test]
    fn test_count_mismatch_is_consistency_error() {
        let f1 = formula("x", 4);
        let err = substitute_formulas_and_barcodes(
            ":formula: :formula:",
            &[Span::new(0, 40)],
            &[&f1],
            &[],
        )
        .unwrap_err();
        assert!(matches!(err, Error::Consistency(_)));
    }

    #[test]
    fn test_barcode() {
        let barcode = Barcode {
            kind: "QRCode".into(),
            value: "https://example.com".into(),
            span: Span::new(5, 9),
            ..Default::default()
        };
        let text = substitute_formulas_and_barcodes(
            "Scan :barcode:",
            &[Span::new(0, 14)],
            &[],
            &[&barcode],
        )
        .unwrap();
        assert_eq!(
            text,
            "Scan *Barcode value:* https://example.com (*Barcode kind:* QRCode)"
        );
    }

    #[test]
    fn test_no_placeholders_untouched() {
        let text = substitute_formulas_and_barcodes("plain", &[], &[], &[]).unwrap();
        assert_eq!(text, "plain");
    }

    #[test]
    fn test_selection_marks() {
        let formatter = SelectionMarkFormatter::default();
        assert_eq!(
            formatter.format(":selected: Yes :unselected: No"),
            "[X] Yes [ ] No"
        );
        let custom = SelectionMarkFormatter::new("☑", "☐");
        assert_eq!(custom.format(":selected:"), "☑");
    }

    #[test]
    fn test_latex_to_text() {
        assert_eq!(latex_to_text(r"\frac{a}{b}"), "a/b");
        assert_eq!(latex_to_text(r"\frac{\frac{1}{2}}{c}"), "1/2/c");
        assert_eq!(latex_to_text(r"\sqrt{x} \leq \pi"), "√(x) ≤ π");
        assert_eq!(latex_to_text(r"\text{area} = r^{2}"), "area = r^2");
        assert_eq!(latex_to_text(r"\left( a \right)"), "( a )");
    }
}
