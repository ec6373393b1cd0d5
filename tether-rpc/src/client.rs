use std::marker::PhantomData;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use serde_json::Value;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use tether_proto::{Call, CallId, CallReturn, FrameCodec, JsonCodec};

use crate::channel::Channel;
use crate::error::{ChannelError, RpcError};

type PendingCalls = scc::HashMap<CallId, oneshot::Sender<CallReturn>>;

#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// Maximum number of unanswered calls; further calls are refused
    /// locally until replies drain the registry.
    pub max_pending: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig { max_pending: 8192 }
    }
}

/// Caller side of the protocol: turns a method name plus arguments into a
/// future settled by the matching `CallReturn`.
///
/// Owns one channel endpoint and one registry of pending calls. Call ids
/// are allocated from a counter owned by this client; they are only
/// meaningful within this client/dispatcher pair.
///
/// [`dispose`](RpcClient::dispose) terminates the channel without settling
/// pending calls: a caller still awaiting one of them waits forever. Apply
/// a timeout at the call site if that matters.
pub struct RpcClient<C = JsonCodec>
where
    C: FrameCodec,
{
    channel: Arc<dyn Channel>,
    pending: Arc<PendingCalls>,
    next_id: AtomicU64,
    config: ClientConfig,
    inbound: JoinHandle<()>,
    _codec: PhantomData<C>,
}

impl RpcClient<JsonCodec> {
    pub fn new(channel: impl Channel) -> Self {
        Self::with_codec(channel, ClientConfig::default())
    }

    pub fn with_config(channel: impl Channel, config: ClientConfig) -> Self {
        Self::with_codec(channel, config)
    }
}

impl<C> RpcClient<C>
where
    C: FrameCodec,
{
    /// Builds a client with an explicit codec and spawns its inbound loop.
    pub fn with_codec(channel: impl Channel, config: ClientConfig) -> Self {
        let channel: Arc<dyn Channel> = Arc::new(channel);
        let pending = Arc::new(PendingCalls::new());
        let inbound = Self::spawn_inbound(channel.clone(), pending.clone());
        RpcClient {
            channel,
            pending,
            next_id: AtomicU64::new(0),
            config,
            inbound,
            _codec: PhantomData,
        }
    }

    /// Invokes `method` on the remote target. The future settles at most
    /// once, when the matching `CallReturn` arrives; settling consumes the
    /// registry entry for this call's id.
    pub async fn call(
        &self,
        method: impl Into<String>,
        arguments: Vec<Value>,
    ) -> Result<Value, RpcError> {
        if self.pending.len() >= self.config.max_pending {
            return Err(RpcError::Backlogged(self.config.max_pending));
        }
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let call = Call::new(id, method, arguments);
        let frame = C::encode(&call)?;
        let (tx, rx) = oneshot::channel();
        self.pending
            .insert_async(id, tx)
            .await
            .expect("fresh call id already pending");
        if let Err(err) = self.channel.send(frame).await {
            let _ = self.pending.remove_async(&id).await;
            return Err(err.into());
        }
        let ret = rx.await.map_err(|_| ChannelError::Closed)?;
        ret.into_outcome().map_err(RpcError::Remote)
    }

    /// Number of calls awaiting a reply.
    pub fn pending_calls(&self) -> usize {
        self.pending.len()
    }

    /// Terminates the channel. Pending calls are left unsettled.
    pub fn dispose(&self) {
        debug!("disposing rpc client");
        self.inbound.abort();
        self.channel.close();
    }

    fn spawn_inbound(channel: Arc<dyn Channel>, pending: Arc<PendingCalls>) -> JoinHandle<()> {
        tokio::spawn(async move {
            loop {
                let frame = match channel.recv().await {
                    Ok(frame) => frame,
                    Err(ChannelError::Closed) => {
                        debug!("reply channel closed");
                        break;
                    }
                };
                let ret: CallReturn = match C::decode(&frame) {
                    Ok(ret) => ret,
                    Err(err) => {
                        warn!("dropping undecodable reply frame: {}", err);
                        continue;
                    }
                };
                // Stale, duplicate, and unmatched ids are a no-op by design.
                match pending.remove_async(&ret.id).await {
                    Some((_, tx)) => {
                        let _ = tx.send(ret);
                    }
                    None => debug!("dropping reply for unknown call {}", ret.id),
                }
            }
        })
    }
}

impl<C> Drop for RpcClient<C>
where
    C: FrameCodec,
{
    fn drop(&mut self) {
        self.inbound.abort();
    }
}
