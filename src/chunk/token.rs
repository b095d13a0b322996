//! Token counting for splits and chunks.

/// Counts the tokens of a text fragment.
pub trait TokenCounter: Send + Sync {
    fn count(&self, text: &str) -> usize;
}

impl<F> TokenCounter for F
where
    F: Fn(&str) -> usize + Send + Sync,
{
    fn count(&self, text: &str) -> usize {
        self(text)
    }
}

/// Tokenizer-free estimate: roughly four bytes per token for alphabetic
/// scripts and one token per ideograph or syllable block for CJK text.
#[derive(Debug, Clone, Copy, Default)]
pub struct EstimatingCounter;

impl TokenCounter for EstimatingCounter {
    fn count(&self, text: &str) -> usize {
        let mut wide = 0usize;
        let mut narrow_bytes = 0usize;
        for c in text.chars() {
            if is_cjk(c) {
                wide += 1;
            } else {
                narrow_bytes += c.len_utf8();
            }
        }
        wide + (narrow_bytes + 3) / 4
    }
}

fn is_cjk(c: char) -> bool {
    matches!(c as u32,
        0x1100..=0x11FF      // Hangul Jamo
        | 0x3040..=0x30FF    // Hiragana, Katakana
        | 0x3400..=0x4DBF    // CJK Extension A
        | 0x4E00..=0x9FFF    // CJK Unified Ideographs
        | 0xAC00..=0xD7AF    // Hangul Syllables
        | 0xF900..=0xFAFF    // CJK Compatibility Ideographs
        | 0x20000..=0x2FA1F)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_estimate() {
        let counter = EstimatingCounter;
        assert_eq!(counter.count(""), 0);
        assert_eq!(counter.count("abcd"), 1);
        assert_eq!(counter.count("abcde"), 2);
        assert_eq!(counter.count(&"x".repeat(400)), 100);
    }

    #[test]
    fn test_cjk_estimate() {
        let counter = EstimatingCounter;
        assert_eq!(counter.count("안녕하세요"), 5);
        assert_eq!(counter.count("文書 test"), 2 + 2);
    }

    #[test]
    fn test_closure_counter() {
        let words = |text: &str| text.split_whitespace().count();
        assert_eq!(words.count("three little words"), 3);
    }
}
