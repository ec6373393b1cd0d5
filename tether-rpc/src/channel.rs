use std::sync::Mutex;

use crate::error::ChannelError;

/// A reliable, ordered, bidirectional message transport between two
/// execution contexts. One endpoint is read and written by exactly one
/// client or one dispatcher; frames are opaque bytes.
///
/// Any transport with these properties slots in: an in-process queue, a
/// pipe, a socket. The protocol layer places no further constraint on it.
#[async_trait::async_trait]
pub trait Channel: Send + Sync + 'static {
    async fn send(&self, frame: Vec<u8>) -> Result<(), ChannelError>;

    /// Waits for the next inbound frame. Returns `ChannelError::Closed` once
    /// the channel is closed from either end and drained.
    async fn recv(&self) -> Result<Vec<u8>, ChannelError>;

    /// Severs the endpoint. Subsequent sends and receives fail; frames
    /// already queued are discarded.
    fn close(&self);
}

#[async_trait::async_trait]
impl Channel for Box<dyn Channel> {
    async fn send(&self, frame: Vec<u8>) -> Result<(), ChannelError> {
        (**self).send(frame).await
    }

    async fn recv(&self) -> Result<Vec<u8>, ChannelError> {
        (**self).recv().await
    }

    fn close(&self) {
        (**self).close()
    }
}

/// Factory producing a connected channel to a freshly started remote
/// execution context. The locator format is opaque to the protocol layer.
#[async_trait::async_trait]
pub trait ChannelFactory: Send + Sync {
    async fn open(&self, locator: &str) -> Result<Box<dyn Channel>, ChannelError>;
}

/// In-process channel endpoint, one half of a [`local_pair`].
pub struct LocalChannel {
    tx: Mutex<Option<flume::Sender<Vec<u8>>>>,
    rx: Mutex<Option<flume::Receiver<Vec<u8>>>>,
}

impl LocalChannel {
    fn new(tx: flume::Sender<Vec<u8>>, rx: flume::Receiver<Vec<u8>>) -> Self {
        LocalChannel {
            tx: Mutex::new(Some(tx)),
            rx: Mutex::new(Some(rx)),
        }
    }
}

/// Creates a connected pair of in-process endpoints backed by unbounded
/// queues. Delivery is in order; closing either endpoint eventually fails
/// sends and receives on both.
pub fn local_pair() -> (LocalChannel, LocalChannel) {
    let (a_tx, a_rx) = flume::unbounded();
    let (b_tx, b_rx) = flume::unbounded();
    (LocalChannel::new(a_tx, b_rx), LocalChannel::new(b_tx, a_rx))
}

#[async_trait::async_trait]
impl Channel for LocalChannel {
    async fn send(&self, frame: Vec<u8>) -> Result<(), ChannelError> {
        let tx = self
            .tx
            .lock()
            .expect("channel sender lock poisoned")
            .clone();
        match tx {
            Some(tx) => tx.send_async(frame).await.map_err(|_| ChannelError::Closed),
            None => Err(ChannelError::Closed),
        }
    }

    async fn recv(&self) -> Result<Vec<u8>, ChannelError> {
        let rx = self
            .rx
            .lock()
            .expect("channel receiver lock poisoned")
            .clone();
        match rx {
            Some(rx) => rx.recv_async().await.map_err(|_| ChannelError::Closed),
            None => Err(ChannelError::Closed),
        }
    }

    fn close(&self) {
        self.tx.lock().expect("channel sender lock poisoned").take();
        self.rx
            .lock()
            .expect("channel receiver lock poisoned")
            .take();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn frames_arrive_in_order() {
        let (host, worker) = local_pair();
        host.send(b"one".to_vec()).await.unwrap();
        host.send(b"two".to_vec()).await.unwrap();
        assert_eq!(worker.recv().await.unwrap(), b"one");
        assert_eq!(worker.recv().await.unwrap(), b"two");
    }

    #[tokio::test]
    async fn close_fails_both_directions() {
        let (host, worker) = local_pair();
        host.close();
        assert!(host.send(b"x".to_vec()).await.is_err());
        assert!(host.recv().await.is_err());
        assert!(worker.send(b"x".to_vec()).await.is_err());
        assert!(worker.recv().await.is_err());
    }
}
