mod codec;
mod error;
mod wire;

pub use codec::CodecError;
pub use codec::FrameCodec;
pub use codec::JsonCodec;
pub use error::RemoteError;
pub use error::names;
pub use wire::Call;
pub use wire::CallId;
pub use wire::CallReturn;
