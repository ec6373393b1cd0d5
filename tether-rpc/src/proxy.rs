use std::collections::BTreeSet;
use std::sync::Arc;

use serde_json::Value;

use tether_proto::{FrameCodec, JsonCodec};

use crate::channel::ChannelFactory;
use crate::client::RpcClient;
use crate::error::RpcError;

/// Statically declared method names for a [`RemoteProxy`]. The declaration
/// replaces runtime reflection over the remote target: only declared names
/// get a forwarder.
#[derive(Debug, Default, Clone)]
pub struct ProxyBuilder {
    methods: BTreeSet<String>,
}

impl ProxyBuilder {
    pub fn new() -> Self {
        ProxyBuilder {
            methods: BTreeSet::new(),
        }
    }

    pub fn method(mut self, name: impl Into<String>) -> Self {
        self.methods.insert(name.into());
        self
    }

    pub fn methods<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.methods.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn build<C>(self, client: RpcClient<C>) -> RemoteProxy<C>
    where
        C: FrameCodec,
    {
        RemoteProxy {
            client: Arc::new(client),
            methods: Arc::new(self.methods),
        }
    }

    /// Opens a channel to a fresh remote context via `factory` and builds
    /// the proxy over it.
    pub async fn connect<F>(self, factory: &F, locator: &str) -> Result<RemoteProxy, RpcError>
    where
        F: ChannelFactory + ?Sized,
    {
        let channel = factory.open(locator).await?;
        Ok(self.build(RpcClient::new(channel)))
    }
}

/// Caller-side stand-in for a remote target: one forwarding entry per
/// declared method name, plus [`dispose`](RemoteProxy::dispose).
pub struct RemoteProxy<C = JsonCodec>
where
    C: FrameCodec,
{
    client: Arc<RpcClient<C>>,
    methods: Arc<BTreeSet<String>>,
}

impl<C> RemoteProxy<C>
where
    C: FrameCodec,
{
    /// The forwarder for `name`, or `None` if the name was not declared.
    pub fn method(&self, name: &str) -> Option<RemoteMethod<C>> {
        self.methods.contains(name).then(|| RemoteMethod {
            name: name.to_string(),
            client: self.client.clone(),
        })
    }

    pub fn method_names(&self) -> impl Iterator<Item = &str> {
        self.methods.iter().map(String::as_str)
    }

    /// Tears down the underlying client and channel. Calls still in flight
    /// are never settled.
    pub fn dispose(&self) {
        self.client.dispose();
    }
}

impl<C> Clone for RemoteProxy<C>
where
    C: FrameCodec,
{
    fn clone(&self) -> Self {
        RemoteProxy {
            client: self.client.clone(),
            methods: self.methods.clone(),
        }
    }
}

/// A single forwarding entry of a [`RemoteProxy`].
pub struct RemoteMethod<C = JsonCodec>
where
    C: FrameCodec,
{
    name: String,
    client: Arc<RpcClient<C>>,
}

impl<C> RemoteMethod<C>
where
    C: FrameCodec,
{
    pub fn name(&self) -> &str {
        &self.name
    }

    pub async fn invoke(&self, arguments: Vec<Value>) -> Result<Value, RpcError> {
        self.client.call(self.name.as_str(), arguments).await
    }
}
