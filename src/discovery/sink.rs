use std::sync::Arc;

use tokio::sync::Mutex;

/// Append-only collection shared by concurrent probes.
#[derive(Debug)]
pub struct ResultSink<T> {
    inner: Arc<Mutex<Vec<T>>>,
}

impl<T> Clone for ResultSink<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> Default for ResultSink<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ResultSink<T> {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub async fn push(&self, item: T) {
        self.inner.lock().await.push(item);
    }

    /// Take everything collected so far, leaving the sink empty.
    pub async fn drain(&self) -> Vec<T> {
        std::mem::take(&mut *self.inner.lock().await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_pushes_neither_lost_nor_duplicated() {
        let sink = ResultSink::new();
        let mut handles = Vec::new();
        for task in 0..16u32 {
            let sink = sink.clone();
            handles.push(tokio::spawn(async move {
                for i in 0..100u32 {
                    sink.push(task * 1000 + i).await;
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let mut items = sink.drain().await;
        assert_eq!(items.len(), 1600);
        items.sort_unstable();
        items.dedup();
        assert_eq!(items.len(), 1600);
        assert!(sink.drain().await.is_empty());
    }
}
