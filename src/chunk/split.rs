//! Header-bounded splitting of rendered Markdown.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::TokenCounter;

/// A header-bounded Markdown fragment with its token count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Split {
    pub tokens: usize,
    pub content: String,
}

impl Split {
    pub fn new(content: impl Into<String>, tokens: usize) -> Self {
        Self {
            tokens,
            content: content.into(),
        }
    }
}

fn header_regex() -> &'static Regex {
    static HEADER: OnceLock<Regex> = OnceLock::new();
    HEADER.get_or_init(|| Regex::new(r"^#{1,3}(?:\s|$)").expect("valid regex"))
}

fn is_fence(line: &str) -> bool {
    line.starts_with("```") || line.starts_with("~~~")
}

/// Split Markdown before every level 1-3 header. Headers stay with the text
/// that follows them, fenced code blocks are never split, and blank
/// fragments are dropped.
pub fn split_by_headers(markdown: &str) -> Vec<String> {
    let mut splits = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    let mut in_fence = false;

    for line in markdown.lines() {
        let trimmed = line.trim_start();
        if is_fence(trimmed) {
            in_fence = !in_fence;
        } else if !in_fence && header_regex().is_match(trimmed) {
            push_split(&mut splits, &current);
            current.clear();
        }
        current.push(line);
    }
    push_split(&mut splits, &current);
    splits
}

fn push_split(splits: &mut Vec<String>, lines: &[&str]) {
    let text = lines.join("\n");
    let text = text.trim();
    if !text.is_empty() {
        splits.push(text.to_string());
    }
}

/// Split Markdown by headers and count the tokens of every fragment.
pub fn split_markdown(markdown: &str, counter: &dyn TokenCounter) -> Vec<Split> {
    let splits: Vec<Split> = split_by_headers(markdown)
        .into_iter()
        .map(|content| {
            let tokens = counter.count(&content);
            Split { tokens, content }
        })
        .collect();
    log::debug!("split markdown into {} header blocks", splits.len());
    splits
}
