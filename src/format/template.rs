//! `{name}` text templates.
//!
//! A template is parsed once against the placeholder names its element type
//! supports, so a typo in a format string fails at construction instead of
//! producing half-rendered output. `{{` and `}}` are literal braces.

use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Piece {
    Literal(String),
    Placeholder(String),
}

/// A parsed format string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    source: String,
    pieces: Vec<Piece>,
}

impl Template {
    /// Parse `source`, accepting only placeholders listed in `allowed`.
    pub fn parse(source: &str, allowed: &[&str]) -> Result<Self> {
        let mut pieces = Vec::new();
        let mut literal = String::new();
        let mut chars = source.chars().peekable();

        while let Some(c) = chars.next() {
            match c {
                '{' if chars.peek() == Some(&'{') => {
                    chars.next();
                    literal.push('{');
                }
                '}' if chars.peek() == Some(&'}') => {
                    chars.next();
                    literal.push('}');
                }
                '{' => {
                    let mut name = String::new();
                    let mut closed = false;
                    for c in chars.by_ref() {
                        if c == '}' {
                            closed = true;
                            break;
                        }
                        if c == '{' {
                            break;
                        }
                        name.push(c);
                    }
                    if !closed {
                        return Err(Error::Configuration(format!(
                            "unbalanced '{{' in format string {:?}",
                            source
                        )));
                    }
                    if !allowed.contains(&name.as_str()) {
                        return Err(Error::Configuration(format!(
                            "unknown placeholder {{{}}} in format string {:?} (expected one of: {})",
                            name,
                            source,
                            allowed.join(", ")
                        )));
                    }
                    if !literal.is_empty() {
                        pieces.push(Piece::Literal(std::mem::take(&mut literal)));
                    }
                    pieces.push(Piece::Placeholder(name));
                }
                '}' => {
                    return Err(Error::Configuration(format!(
                        "unbalanced '}}' in format string {:?}",
                        source
                    )));
                }
                _ => literal.push(c),
            }
        }
        if !literal.is_empty() {
            pieces.push(Piece::Literal(literal));
        }

        Ok(Self {
            source: source.to_string(),
            pieces,
        })
    }

    /// Template for a built-in format. Falls back to literal text if the
    /// source does not parse.
    pub(crate) fn builtin(source: &str, allowed: &[&str]) -> Self {
        Self::parse(source, allowed).unwrap_or_else(|_| Self {
            source: source.to_string(),
            pieces: vec![Piece::Literal(source.to_string())],
        })
    }

    /// The format string as written.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn has_placeholders(&self) -> bool {
        self.pieces
            .iter()
            .any(|piece| matches!(piece, Piece::Placeholder(_)))
    }

    /// Whether the template references `name`.
    pub fn uses(&self, name: &str) -> bool {
        self.pieces
            .iter()
            .any(|piece| matches!(piece, Piece::Placeholder(p) if p == name))
    }

    /// Render with the given values. Placeholders without a value render empty.
    pub fn render(&self, values: &[(&str, &str)]) -> String {
        let mut out = String::new();
        for piece in &self.pieces {
            match piece {
                Piece::Literal(text) => out.push_str(text),
                Piece::Placeholder(name) => {
                    if let Some((_, value)) = values.iter().find(|(key, _)| key == name) {
                        out.push_str(value);
                    }
                }
            }
        }
        out
    }

    /// Render with every placeholder empty.
    pub fn render_empty(&self) -> String {
        self.render(&[])
    }

    /// Render, returning `None` when the output is the same as the all-empty
    /// rendering.
    pub fn render_if_content(&self, values: &[(&str, &str)]) -> Option<String> {
        let text = self.render(values);
        (text != self.render_empty()).then_some(text)
    }
}

/// An ordered list of templates rendered into a single block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateList {
    templates: Vec<Template>,
}

impl TemplateList {
    /// Parse every format string in `sources`.
    pub fn parse<S: AsRef<str>>(sources: &[S], allowed: &[&str]) -> Result<Self> {
        let templates = sources
            .iter()
            .map(|source| Template::parse(source.as_ref(), allowed))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { templates })
    }

    pub(crate) fn builtin(sources: &[&str], allowed: &[&str]) -> Self {
        Self {
            templates: sources
                .iter()
                .map(|source| Template::builtin(source, allowed))
                .collect(),
        }
    }

    /// Format strings as written.
    pub fn sources(&self) -> Vec<&str> {
        self.templates.iter().map(Template::source).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Whether any template references `name`.
    pub fn uses(&self, name: &str) -> bool {
        self.templates.iter().any(|t| t.uses(name))
    }

    /// Render every template that produced content, or that is pure literal
    /// text, joined with newlines. `None` when nothing was kept.
    pub fn render(&self, values: &[(&str, &str)]) -> Option<String> {
        let kept: Vec<String> = self
            .templates
            .iter()
            .filter_map(|template| {
                if template.has_placeholders() {
                    template.render_if_content(values)
                } else {
                    Some(template.render_empty())
                }
            })
            .collect();
        (!kept.is_empty()).then(|| kept.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NAMES: &[&str] = &["caption", "table_number"];

    #[test]
    fn test_render() {
        let template = Template::parse("*Table {table_number}:* {caption}", NAMES).unwrap();
        assert_eq!(
            template.render(&[("table_number", "2"), ("caption", "Totals")]),
            "*Table 2:* Totals"
        );
        assert_eq!(template.render_empty(), "*Table :* ");
        assert!(template.uses("caption"));
    }

    #[test]
    fn test_escaped_braces() {
        let template = Template::parse("{{literal}} {caption}", NAMES).unwrap();
        assert_eq!(template.render(&[("caption", "x")]), "{literal} x");
    }

    #[test]
    fn test_unknown_placeholder() {
        let err = Template::parse("{captoin}", NAMES).unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }

    #[test]
    fn test_unbalanced_braces() {
        assert!(Template::parse("{caption", NAMES).is_err());
        assert!(Template::parse("caption}", NAMES).is_err());
    }

    #[test]
    fn test_render_if_content() {
        let template = Template::parse("*Caption:* {caption}", NAMES).unwrap();
        assert_eq!(template.render_if_content(&[("caption", "")]), None);
        assert_eq!(
            template.render_if_content(&[("caption", "A")]),
            Some("*Caption:* A".to_string())
        );
    }

    #[test]
    fn test_list_keeps_literals_and_content() {
        let list = TemplateList::parse(
            &[
                "**Table {table_number} Info**\n",
                "*Table Caption:* {caption}",
                "*Table Content:*",
            ],
            NAMES,
        )
        .unwrap();
        assert_eq!(
            list.render(&[("table_number", "1"), ("caption", "")]).unwrap(),
            "**Table 1 Info**\n\n*Table Content:*"
        );
        let empty = TemplateList::parse(&["{caption}"], NAMES).unwrap();
        assert_eq!(empty.render(&[]), None);
    }
}
