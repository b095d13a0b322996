//! Language model collaborators.
//!
//! The crate never talks to a model service itself. Callers plug in a
//! [`ContentSplitter`] for chunks that exceed the absolute token limit and an
//! [`ImageCaptioner`] for describing page and figure images.

mod caption;
mod pool;

pub use caption::caption_images;
pub use pool::{ClientPool, PooledSplitter};

use async_trait::async_trait;

use crate::error::Result;
use crate::model::PageImage;

/// Splits an oversized chunk into smaller self-contained pieces.
#[async_trait]
pub trait ContentSplitter: Send + Sync {
    async fn split(&self, content: &str) -> Result<Vec<String>>;
}

/// Describes an image given the text of its page and its caption.
#[async_trait]
pub trait ImageCaptioner: Send + Sync {
    async fn describe(
        &self,
        image: &PageImage,
        page_text: &str,
        caption: Option<&str>,
    ) -> Result<String>;
}

/// Returns the content unchanged as a single piece.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentitySplitter;

#[async_trait]
impl ContentSplitter for IdentitySplitter {
    async fn split(&self, content: &str) -> Result<Vec<String>> {
        Ok(vec![content.to_string()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_identity_splitter() {
        let pieces = IdentitySplitter.split("# Title\nbody").await.unwrap();
        assert_eq!(pieces, vec!["# Title\nbody".to_string()]);
    }
}
