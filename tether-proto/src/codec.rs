use serde::Serialize;
use serde::de::DeserializeOwned;

#[derive(thiserror::Error, Debug)]
pub enum CodecError {
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Encoding of protocol messages to the byte frames a channel carries.
///
/// The frame format must be self-describing: argument lists are dynamic
/// values with no schema known ahead of decoding.
pub trait FrameCodec: Send + Sync + 'static {
    fn encode<T: Serialize>(payload: &T) -> Result<Vec<u8>, CodecError>;

    fn decode<T: DeserializeOwned>(frame: &[u8]) -> Result<T, CodecError>;
}

pub struct JsonCodec;

impl FrameCodec for JsonCodec {
    fn encode<T: Serialize>(payload: &T) -> Result<Vec<u8>, CodecError> {
        Ok(serde_json::to_vec(payload)?)
    }

    fn decode<T: DeserializeOwned>(frame: &[u8]) -> Result<T, CodecError> {
        Ok(serde_json::from_slice(frame)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wire::Call;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn frames_round_trip() {
        let call = Call::new(1, "echo", vec![json!({"nested": [1, 2, 3]})]);
        let frame = JsonCodec::encode(&call).unwrap();
        let decoded: Call = JsonCodec::decode(&frame).unwrap();
        assert_eq!(decoded, call);
    }

    #[test]
    fn garbage_frame_is_rejected() {
        let res: Result<Call, _> = JsonCodec::decode(b"\xff\xfe not json");
        assert!(res.is_err());
    }
}
