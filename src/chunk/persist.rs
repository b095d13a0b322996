//! Writing splits and chunks to disk.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::{MergedChunk, Split};
use crate::error::Result;

/// A chunk written to disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChunkFile {
    pub path: PathBuf,
    pub total_tokens: usize,
}

/// Write splits as `<name>_split_<idx>.md` under `dir`.
pub fn write_splits(splits: &[Split], dir: impl AsRef<Path>, name: &str) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir)?;
    let mut paths = Vec::with_capacity(splits.len());
    for (idx, split) in splits.iter().enumerate() {
        let path = dir.join(format!("{}_split_{}.md", name, idx));
        fs::write(&path, &split.content)?;
        paths.push(path);
    }
    Ok(paths)
}

/// Write chunks as `<name>_<idx>_chunk_tokens_<tokens>.md` under `dir`.
pub fn write_chunks(
    chunks: &[MergedChunk],
    dir: impl AsRef<Path>,
    name: &str,
) -> Result<Vec<ChunkFile>> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir)?;
    let mut files = Vec::with_capacity(chunks.len());
    for (idx, chunk) in chunks.iter().enumerate() {
        let path = dir.join(format!(
            "{}_{}_chunk_tokens_{}.md",
            name, idx, chunk.total_tokens
        ));
        fs::write(&path, &chunk.content)?;
        log::debug!("saved {}", path.display());
        files.push(ChunkFile {
            path,
            total_tokens: chunk.total_tokens,
        });
    }
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_names() {
        let dir = tempfile::tempdir().unwrap();
        let splits = vec![Split::new("# A", 1), Split::new("# B", 1)];
        let paths = write_splits(&splits, dir.path(), "report").unwrap();
        assert_eq!(paths[1], dir.path().join("report_split_1.md"));
        assert_eq!(fs::read_to_string(&paths[0]).unwrap(), "# A");

        let chunks = vec![MergedChunk {
            content: "# A\n# B".to_string(),
            total_tokens: 2,
            first_split: 0,
            split_count: 2,
        }];
        let files = write_chunks(&chunks, dir.path().join("merged"), "report").unwrap();
        assert_eq!(
            files[0].path,
            dir.path().join("merged").join("report_0_chunk_tokens_2.md")
        );
        assert_eq!(files[0].total_tokens, 2);
    }
}
