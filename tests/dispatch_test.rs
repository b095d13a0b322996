//! Integration tests for concurrent chunk dispatch.

#![cfg(feature = "async")]

use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use unlayout::chunk::{
    write_chunks, ChunkDispatcher, ChunkFile, DispatchOptions, MergedChunk,
};
use unlayout::llm::{ContentSplitter, PooledSplitter};
use unlayout::{Error, Result};

/// Splits on blank lines and tracks how many calls run at once.
#[derive(Default)]
struct ParagraphSplitter {
    active: AtomicUsize,
    peak: AtomicUsize,
    calls: AtomicUsize,
}

#[async_trait]
impl ContentSplitter for ParagraphSplitter {
    async fn split(&self, content: &str) -> Result<Vec<String>> {
        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        self.calls.fetch_add(1, Ordering::SeqCst);
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
        self.active.fetch_sub(1, Ordering::SeqCst);
        Ok(content.split("\n\n").map(str::to_string).collect())
    }
}

struct FailingSplitter;

#[async_trait]
impl ContentSplitter for FailingSplitter {
    async fn split(&self, _content: &str) -> Result<Vec<String>> {
        Err(Error::Llm("rate limited".to_string()))
    }
}

fn chunk(content: &str, tokens: usize) -> MergedChunk {
    MergedChunk {
        content: content.to_string(),
        total_tokens: tokens,
        first_split: 0,
        split_count: 1,
    }
}

fn persist(dir: &Path, chunks: &[MergedChunk]) -> Vec<ChunkFile> {
    write_chunks(chunks, dir.join("merged"), "doc").unwrap()
}

fn names(paths: &[std::path::PathBuf]) -> Vec<String> {
    paths
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_large_chunks_split_small_copied() {
    let dir = tempfile::tempdir().unwrap();
    let files = persist(
        dir.path(),
        &[chunk("# A\nsmall", 1200), chunk("# B\none\n\n# C\ntwo", 2500)],
    );

    let splitter = Arc::new(ParagraphSplitter::default());
    let options = DispatchOptions::new(dir.path().join("final"));
    let dispatcher = ChunkDispatcher::new(splitter.clone(), options).unwrap();
    let outcome = dispatcher.dispatch(&files).await.unwrap();

    assert!(outcome.is_success());
    assert_eq!(outcome.total, 2);
    assert_eq!(splitter.calls.load(Ordering::SeqCst), 1);
    assert_eq!(
        names(&outcome.written),
        vec![
            "doc_0_chunk_tokens_1200.md",
            "doc_1_chunk_tokens_2500_part_0.md",
            "doc_1_chunk_tokens_2500_part_1.md",
        ]
    );
    let part = fs::read_to_string(&outcome.written[2]).unwrap();
    assert_eq!(part, "# C\ntwo");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrency_bounded() {
    let dir = tempfile::tempdir().unwrap();
    let chunks: Vec<MergedChunk> = (0..12)
        .map(|i| chunk(&format!("# {}\na\n\nb", i), 3000))
        .collect();
    let files = persist(dir.path(), &chunks);

    let splitter = Arc::new(ParagraphSplitter::default());
    let options = DispatchOptions::new(dir.path().join("final")).with_concurrency(3);
    let dispatcher = ChunkDispatcher::new(splitter.clone(), options).unwrap();
    let written = dispatcher.dispatch(&files).await.unwrap().into_result().unwrap();

    assert_eq!(written.len(), 24);
    assert_eq!(splitter.calls.load(Ordering::SeqCst), 12);
    assert!(splitter.peak.load(Ordering::SeqCst) <= 3);
}

#[tokio::test]
async fn test_failures_collected() {
    let dir = tempfile::tempdir().unwrap();
    let files = persist(
        dir.path(),
        &[chunk("small", 10), chunk("big", 5000), chunk("also big", 2400)],
    );

    let options = DispatchOptions::new(dir.path().join("final"));
    let dispatcher = ChunkDispatcher::new(Arc::new(FailingSplitter), options).unwrap();
    let outcome = dispatcher.dispatch(&files).await.unwrap();

    assert_eq!(outcome.failures.len(), 2);
    assert!(outcome.failures.iter().all(|f| f.error.contains("rate limited")));
    assert_eq!(names(&outcome.written), vec!["doc_0_chunk_tokens_10.md"]);
    assert!(dir.path().join("final/doc_0_chunk_tokens_10.md").exists());
    assert!(matches!(
        outcome.into_result(),
        Err(Error::Dispatch { failed: 2, total: 3 })
    ));
}

#[tokio::test]
async fn test_missing_source_reported() {
    let dir = tempfile::tempdir().unwrap();
    let files = vec![ChunkFile {
        path: dir.path().join("gone.md"),
        total_tokens: 5,
    }];

    let options = DispatchOptions::new(dir.path().join("final"));
    let dispatcher = ChunkDispatcher::new(Arc::new(FailingSplitter), options).unwrap();
    let outcome = dispatcher.dispatch(&files).await.unwrap();
    assert_eq!(outcome.failures.len(), 1);
    assert!(outcome.written.is_empty());
}

#[tokio::test]
async fn test_pooled_splitter_dispatch() {
    let dir = tempfile::tempdir().unwrap();
    let files = persist(dir.path(), &[chunk("x\n\ny", 2400)]);

    let pool = PooledSplitter::new(vec![
        ParagraphSplitter::default(),
        ParagraphSplitter::default(),
    ])
    .unwrap();
    let options = DispatchOptions::new(dir.path().join("final")).with_absolute_max(2400);
    let dispatcher = ChunkDispatcher::new(Arc::new(pool), options).unwrap();
    let written = dispatcher.dispatch(&files).await.unwrap().into_result().unwrap();
    assert_eq!(written.len(), 2);
}
