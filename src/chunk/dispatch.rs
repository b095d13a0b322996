//! Concurrent hand-off of persisted chunks to a content splitter.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use super::ChunkFile;
use crate::error::{Error, Result};
use crate::llm::ContentSplitter;

/// Options for [`ChunkDispatcher`].
#[derive(Debug, Clone)]
pub struct DispatchOptions {
    /// Maximum number of splitter calls in flight
    pub concurrency: usize,

    /// Chunks at or above this many tokens go to the splitter
    pub absolute_max: usize,

    /// Directory receiving the final chunk files
    pub output_dir: PathBuf,
}

impl DispatchOptions {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            concurrency: 10,
            absolute_max: 2400,
            output_dir: output_dir.into(),
        }
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    pub fn with_absolute_max(mut self, absolute_max: usize) -> Self {
        self.absolute_max = absolute_max;
        self
    }
}

/// A chunk task that failed terminally.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchFailure {
    pub source: PathBuf,
    pub error: String,
}

/// Result of a dispatch run. Written files are kept even when some tasks
/// failed.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchOutcome {
    pub written: Vec<PathBuf>,
    pub failures: Vec<DispatchFailure>,
    pub total: usize,
}

impl DispatchOutcome {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// The written files, or [`Error::Dispatch`] if any task failed.
    pub fn into_result(self) -> Result<Vec<PathBuf>> {
        if self.failures.is_empty() {
            Ok(self.written)
        } else {
            Err(Error::Dispatch {
                failed: self.failures.len(),
                total: self.total,
            })
        }
    }
}

/// Sends oversized chunks to a [`ContentSplitter`] and copies the rest.
///
/// Splitter calls share one semaphore, so at most `concurrency` of them run
/// at a time. Pieces of a split chunk are written as `<stem>_part_<i>.md`.
pub struct ChunkDispatcher {
    splitter: Arc<dyn ContentSplitter>,
    options: DispatchOptions,
    semaphore: Arc<Semaphore>,
}

impl ChunkDispatcher {
    pub fn new(splitter: Arc<dyn ContentSplitter>, options: DispatchOptions) -> Result<Self> {
        if options.concurrency == 0 {
            return Err(Error::Configuration(
                "dispatch concurrency must be greater than zero".to_string(),
            ));
        }
        let semaphore = Arc::new(Semaphore::new(options.concurrency));
        Ok(Self {
            splitter,
            options,
            semaphore,
        })
    }

    /// Run every chunk task and wait for all of them.
    pub async fn dispatch(&self, files: &[ChunkFile]) -> Result<DispatchOutcome> {
        tokio::fs::create_dir_all(&self.options.output_dir).await?;

        log::info!(
            "dispatching {} chunks (max concurrent: {})",
            files.len(),
            self.options.concurrency
        );

        let mut tasks = JoinSet::new();
        for file in files {
            let source = file.path.clone();
            let output_dir = self.options.output_dir.clone();
            if file.total_tokens >= self.options.absolute_max {
                let splitter = Arc::clone(&self.splitter);
                let semaphore = Arc::clone(&self.semaphore);
                tasks.spawn(async move {
                    let result = async {
                        let _permit = semaphore
                            .acquire()
                            .await
                            .map_err(|e| Error::Other(e.to_string()))?;
                        split_file(splitter.as_ref(), &source, &output_dir).await
                    }
                    .await;
                    (source, result)
                });
            } else {
                tasks.spawn(async move {
                    let result = copy_file(&source, &output_dir).await.map(|p| vec![p]);
                    (source, result)
                });
            }
        }

        let mut outcome = DispatchOutcome {
            total: files.len(),
            ..Default::default()
        };
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((_, Ok(paths))) => outcome.written.extend(paths),
                Ok((source, Err(err))) => {
                    log::error!("chunk task for {} failed: {}", source.display(), err);
                    outcome.failures.push(DispatchFailure {
                        source,
                        error: err.to_string(),
                    });
                }
                Err(err) => {
                    log::error!("chunk task aborted: {}", err);
                    outcome.failures.push(DispatchFailure {
                        source: PathBuf::new(),
                        error: err.to_string(),
                    });
                }
            }
        }
        outcome.written.sort();
        Ok(outcome)
    }
}

async fn split_file(
    splitter: &dyn ContentSplitter,
    source: &Path,
    output_dir: &Path,
) -> Result<Vec<PathBuf>> {
    let content = tokio::fs::read_to_string(source).await?;
    let pieces = splitter.split(&content).await?;
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ext = source
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();

    let mut written = Vec::with_capacity(pieces.len());
    for (index, piece) in pieces.iter().enumerate() {
        let path = output_dir.join(format!("{}_part_{}{}", stem, index, ext));
        tokio::fs::write(&path, piece).await?;
        log::info!("saved {}", path.display());
        written.push(path);
    }
    Ok(written)
}

async fn copy_file(source: &Path, output_dir: &Path) -> Result<PathBuf> {
    let name = source.file_name().ok_or_else(|| {
        Error::InvalidInput(format!("{} has no file name", source.display()))
    })?;
    let target = output_dir.join(name);
    tokio::fs::copy(source, &target).await?;
    log::info!("copied {}", target.display());
    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::IdentitySplitter;

    #[tokio::test]
    async fn test_zero_concurrency_rejected() {
        let options = DispatchOptions::new("out").with_concurrency(0);
        assert!(matches!(
            ChunkDispatcher::new(Arc::new(IdentitySplitter), options),
            Err(Error::Configuration(_))
        ));
    }

    #[test]
    fn test_outcome_into_result() {
        let outcome = DispatchOutcome {
            written: vec![PathBuf::from("a.md")],
            failures: vec![DispatchFailure {
                source: PathBuf::from("b.md"),
                error: "boom".to_string(),
            }],
            total: 2,
        };
        assert!(!outcome.is_success());
        assert!(matches!(
            outcome.into_result(),
            Err(Error::Dispatch { failed: 1, total: 2 })
        ));
    }
}
