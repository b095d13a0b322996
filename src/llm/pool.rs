//! Round-robin pool of model clients.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::ContentSplitter;
use crate::error::{Error, Result};

/// A fixed set of client handles handed out in rotation.
///
/// Concurrent callers are serialized on the rotation index, so each call
/// receives the next handle in turn.
pub struct ClientPool<T> {
    clients: Vec<Arc<T>>,
    next: Mutex<usize>,
}

impl<T> ClientPool<T> {
    /// Create a pool. An empty pool is a configuration error.
    pub fn new(clients: Vec<T>) -> Result<Self> {
        if clients.is_empty() {
            return Err(Error::Configuration(
                "client pool needs at least one client".to_string(),
            ));
        }
        Ok(Self {
            clients: clients.into_iter().map(Arc::new).collect(),
            next: Mutex::new(0),
        })
    }

    /// The next client in rotation.
    pub async fn next_client(&self) -> Arc<T> {
        let mut index = self.next.lock().await;
        let client = Arc::clone(&self.clients[*index]);
        *index = (*index + 1) % self.clients.len();
        client
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}

/// A splitter that spreads calls over a pool of splitters.
pub struct PooledSplitter<S> {
    pool: ClientPool<S>,
}

impl<S: ContentSplitter> PooledSplitter<S> {
    pub fn new(splitters: Vec<S>) -> Result<Self> {
        Ok(Self {
            pool: ClientPool::new(splitters)?,
        })
    }
}

#[async_trait]
impl<S: ContentSplitter> ContentSplitter for PooledSplitter<S> {
    async fn split(&self, content: &str) -> Result<Vec<String>> {
        let splitter = self.pool.next_client().await;
        splitter.split(content).await
    }
}
