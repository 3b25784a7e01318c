//! Bounded inter-stage queues.
//!
//! A thin wrapper over `tokio::sync::mpsc` that also reports the current
//! depth (`max_capacity - capacity`) for `/health`, matching the original's
//! `asyncio.Queue.qsize()`.

use tokio::sync::mpsc;

#[derive(Debug, Clone)]
pub struct QueueHandle<T> {
    tx: mpsc::Sender<T>,
}

impl<T> QueueHandle<T> {
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<T>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self { tx }, rx)
    }

    pub async fn send(&self, item: T) -> Result<(), mpsc::error::SendError<T>> {
        self.tx.send(item).await
    }

    /// Current number of items sitting in the channel, derived from the
    /// permit count since `mpsc::Receiver` exposes no direct length.
    pub fn len(&self) -> usize {
        self.tx.max_capacity() - self.tx.capacity()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn len_tracks_unconsumed_items() {
        let (handle, mut rx) = QueueHandle::channel(4);
        assert_eq!(handle.len(), 0);
        handle.send(1).await.unwrap();
        handle.send(2).await.unwrap();
        assert_eq!(handle.len(), 2);
        rx.recv().await;
        assert_eq!(handle.len(), 1);
    }
}
