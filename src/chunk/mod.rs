//! Token-aware chunking of rendered markdown.
//!
//! Markdown is split at level 1-3 headers, the splits are merged into chunks
//! bounded by [`ChunkLimits`], and the chunks are written to disk. With the
//! `async` feature, [`ChunkDispatcher`] hands oversized chunks to a
//! [`ContentSplitter`](crate::llm::ContentSplitter).

mod merge;
mod persist;
mod split;
mod token;

#[cfg(feature = "async")]
mod dispatch;

pub use merge::{ChunkLimits, ChunkMerger, MergedChunk};
pub use persist::{write_chunks, write_splits, ChunkFile};
pub use split::{split_by_headers, split_markdown, Split};
pub use token::{EstimatingCounter, TokenCounter};

#[cfg(feature = "async")]
pub use dispatch::{ChunkDispatcher, DispatchFailure, DispatchOptions, DispatchOutcome};
