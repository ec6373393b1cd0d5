use tether_proto::{CodecError, RemoteError};

#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelError {
    #[error("channel closed")]
    Closed,
}

/// Failure of a single call, as seen by the caller.
///
/// `Remote` is the only path by which a failure on the callee side becomes
/// visible here; the other variants are local to the caller.
#[derive(thiserror::Error, Debug)]
pub enum RpcError {
    #[error("channel error: {0}")]
    Channel(#[from] ChannelError),
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),
    #[error("remote error: {0}")]
    Remote(#[from] RemoteError),
    #[error("too many in-flight calls (limit {0})")]
    Backlogged(usize),
}

impl RpcError {
    /// The remote failure carried by this error, if it is one.
    pub fn as_remote(&self) -> Option<&RemoteError> {
        match self {
            RpcError::Remote(err) => Some(err),
            _ => None,
        }
    }
}
