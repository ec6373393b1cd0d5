use std::any::Any;
use std::marker::PhantomData;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use tether_proto::{Call, CallReturn, FrameCodec, JsonCodec, RemoteError, names};

use crate::channel::Channel;
use crate::server::{DispatchConfig, MethodTable};

/// Callee side of the protocol: executes incoming `Call`s against a target
/// instance and reports each outcome as exactly one `CallReturn`.
///
/// Frames are taken from the channel one at a time in arrival order, but
/// every call executes on its own task, so a slow method never holds up the
/// calls behind it and replies may overtake each other. Dispatch failures of
/// any kind (unknown method, method error, panic) are converted into error
/// returns; the dispatch loop itself only ends when the channel closes.
pub struct Dispatcher<T, C = JsonCodec>
where
    T: Send + Sync + 'static,
    C: FrameCodec,
{
    target: Arc<T>,
    table: Arc<MethodTable<T>>,
    channel: Arc<dyn Channel>,
    config: DispatchConfig,
    _codec: PhantomData<C>,
}

impl<T> Dispatcher<T, JsonCodec>
where
    T: Send + Sync + 'static,
{
    pub fn new(target: T, table: MethodTable<T>, channel: impl Channel) -> Self {
        Self::with_codec(target, table, channel, DispatchConfig::default())
    }

    pub fn with_config(
        target: T,
        table: MethodTable<T>,
        channel: impl Channel,
        config: DispatchConfig,
    ) -> Self {
        Self::with_codec(target, table, channel, config)
    }
}

impl<T, C> Dispatcher<T, C>
where
    T: Send + Sync + 'static,
    C: FrameCodec,
{
    pub fn with_codec(
        target: T,
        table: MethodTable<T>,
        channel: impl Channel,
        config: DispatchConfig,
    ) -> Self {
        Dispatcher {
            target: Arc::new(target),
            table: Arc::new(table),
            channel: Arc::new(channel),
            config,
            _codec: PhantomData,
        }
    }

    /// Runs the dispatch loop until the channel closes.
    pub fn start(self) -> JoinHandle<()> {
        info!("dispatcher serving {} methods", self.table.len());
        tokio::spawn(self.run())
    }

    async fn run(self) {
        let permits = Arc::new(Semaphore::new(self.config.concurrency));
        loop {
            let frame = match self.channel.recv().await {
                Ok(frame) => frame,
                Err(_) => {
                    info!("call channel closed");
                    break;
                }
            };
            let call: Call = match C::decode(&frame) {
                Ok(call) => call,
                Err(err) => {
                    warn!("dropping undecodable call frame: {}", err);
                    continue;
                }
            };
            let permit = permits
                .clone()
                .acquire_owned()
                .await
                .expect("dispatch semaphore closed");
            let target = self.target.clone();
            let table = self.table.clone();
            let channel = self.channel.clone();
            tokio::spawn(async move {
                let ret = Self::execute(target, &table, call).await;
                Self::reply(channel.as_ref(), ret).await;
                drop(permit);
            });
        }
    }

    async fn execute(target: Arc<T>, table: &MethodTable<T>, call: Call) -> CallReturn {
        let Call {
            id,
            method,
            arguments,
        } = call;
        let Some(body) = table.resolve(&method) else {
            debug!("call {} to unknown method '{}'", id, method);
            return CallReturn::from_outcome(id, Err(RemoteError::method_not_found(&method)));
        };
        match AssertUnwindSafe(body(target, arguments)).catch_unwind().await {
            Ok(outcome) => CallReturn::from_outcome(id, outcome),
            Err(panic) => CallReturn::error(id, names::PANIC, panic_message(panic.as_ref())),
        }
    }

    async fn reply(channel: &dyn Channel, ret: CallReturn) {
        let id = ret.id;
        let frame = match C::encode(&ret) {
            Ok(frame) => frame,
            Err(err) => {
                warn!("failed to encode return for call {}: {}", id, err);
                let fallback = CallReturn::error(id, names::INTERNAL_ERROR, err.to_string());
                match C::encode(&fallback) {
                    Ok(frame) => frame,
                    Err(err) => {
                        warn!("failed to encode error return for call {}: {}", id, err);
                        return;
                    }
                }
            }
        };
        if let Err(err) = channel.send(frame).await {
            warn!("failed to reply to call {}: {}", id, err);
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(msg) = panic.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = panic.downcast_ref::<String>() {
        msg.clone()
    } else {
        "method panicked".to_string()
    }
}
