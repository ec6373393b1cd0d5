pub use client::RpcClient;

pub mod channel;
pub mod client;
pub mod error;
pub mod proxy;
pub mod server;

pub use channel::{Channel, ChannelFactory, LocalChannel, local_pair};
pub use client::ClientConfig;
pub use error::{ChannelError, RpcError};
pub use proxy::{ProxyBuilder, RemoteMethod, RemoteProxy};
pub use server::{DispatchConfig, Dispatcher, MethodTable, arg, spawn_local};

pub use tether_proto as proto;
