//! Greedy packing of splits into token-bounded chunks.

use serde::{Deserialize, Serialize};

use super::Split;
use crate::error::{Error, Result};

/// Token thresholds for chunk merging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChunkLimits {
    /// Splits below this size may always join a chunk
    pub snippet: usize,
    /// Splits at or above this size stand alone
    pub min: usize,
    /// Accumulation stops once a chunk reaches this size
    pub max: usize,
    /// Chunks at or above this size are handed to the splitter
    pub absolute_max: usize,
}

impl Default for ChunkLimits {
    fn default() -> Self {
        Self {
            snippet: 600,
            min: 1000,
            max: 1400,
            absolute_max: 2400,
        }
    }
}

impl ChunkLimits {
    /// Create limits, checking `snippet > 0` and `min <= max <= absolute_max`.
    pub fn new(snippet: usize, min: usize, max: usize, absolute_max: usize) -> Result<Self> {
        let limits = Self {
            snippet,
            min,
            max,
            absolute_max,
        };
        limits.validate()?;
        Ok(limits)
    }

    pub fn validate(&self) -> Result<()> {
        if self.snippet == 0 {
            return Err(Error::Configuration(
                "snippet size must be greater than zero".to_string(),
            ));
        }
        if !(self.min <= self.max && self.max <= self.absolute_max) {
            return Err(Error::Configuration(format!(
                "chunk limits must satisfy min <= max <= absolute max (got {} / {} / {})",
                self.min, self.max, self.absolute_max
            )));
        }
        Ok(())
    }
}

/// Consecutive splits joined into one chunk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergedChunk {
    pub content: String,
    pub total_tokens: usize,
    /// Index of the first split in the chunk
    pub first_split: usize,
    pub split_count: usize,
}

impl MergedChunk {
    fn start(split: &Split, index: usize) -> Self {
        Self {
            content: split.content.clone(),
            total_tokens: split.tokens,
            first_split: index,
            split_count: 1,
        }
    }

    fn append(&mut self, content: &str, tokens: usize, splits: usize) {
        self.content.push('\n');
        self.content.push_str(content);
        self.total_tokens += tokens;
        self.split_count += splits;
    }
}

/// Packs ordered splits into chunks within [`ChunkLimits`].
///
/// A split of at least `min` tokens becomes its own chunk. Smaller splits
/// open a chunk that keeps absorbing the following splits while it is below
/// `max`. A split that would cross `max` is still absorbed when it is itself
/// a snippet, or when the chunk so far is a snippet. Finally an undersized
/// last chunk is folded into the one before it, which may then exceed `max`.
#[derive(Debug, Clone, Default)]
pub struct ChunkMerger {
    limits: ChunkLimits,
}

impl ChunkMerger {
    pub fn new(limits: ChunkLimits) -> Result<Self> {
        limits.validate()?;
        Ok(Self { limits })
    }

    pub fn limits(&self) -> &ChunkLimits {
        &self.limits
    }

    pub fn merge(&self, splits: &[Split]) -> Vec<MergedChunk> {
        let limits = &self.limits;
        let mut chunks: Vec<MergedChunk> = Vec::new();
        let mut index = 0;

        while index < splits.len() {
            let split = &splits[index];
            let mut chunk = MergedChunk::start(split, index);
            index += 1;

            if split.tokens >= limits.min {
                log::debug!("split {} ({} tokens) kept as is", index - 1, split.tokens);
                chunks.push(chunk);
                continue;
            }

            while chunk.total_tokens < limits.max && index < splits.len() {
                let next = &splits[index];
                let combined = chunk.total_tokens + next.tokens;
                if combined < limits.max
                    || next.tokens < limits.snippet
                    || chunk.total_tokens < limits.snippet
                {
                    chunk.append(&next.content, next.tokens, 1);
                    index += 1;
                } else {
                    break;
                }
            }
            log::debug!(
                "merged splits {}..{} into {} tokens",
                chunk.first_split,
                chunk.first_split + chunk.split_count,
                chunk.total_tokens
            );
            chunks.push(chunk);
        }

        if chunks.len() > 1 && chunks.last().is_some_and(|c| c.total_tokens < limits.min) {
            if let (Some(last), Some(previous)) = (chunks.pop(), chunks.last_mut()) {
                log::debug!(
                    "folding trailing chunk of {} tokens into the previous chunk",
                    last.total_tokens
                );
                previous.append(&last.content, last.total_tokens, last.split_count);
            }
        }
        chunks
    }
}
