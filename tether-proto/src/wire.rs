use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::RemoteError;

/// Identifier of an in-flight call. Unique among calls not yet answered on
/// the channel that carried them; meaningless outside that channel.
pub type CallId = u64;

/// Request message: invoke `method` on the remote target with the given
/// ordered arguments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Call {
    pub id: CallId,
    pub method: String,
    pub arguments: Vec<Value>,
}

impl Call {
    pub fn new(id: CallId, method: impl Into<String>, arguments: Vec<Value>) -> Self {
        Call {
            id,
            method: method.into(),
            arguments,
        }
    }
}

/// Response message, keyed by the originating call's id. Carries either a
/// success value (`hasResult == true`) or an error name/message pair, never
/// both and never neither.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallReturn {
    pub id: CallId,
    pub has_result: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl CallReturn {
    pub fn success(id: CallId, result: impl Into<Value>) -> Self {
        CallReturn {
            id,
            has_result: true,
            result: Some(result.into()),
            error_name: None,
            error_message: None,
        }
    }

    pub fn error(id: CallId, name: impl Into<String>, message: impl Into<String>) -> Self {
        CallReturn {
            id,
            has_result: false,
            result: None,
            error_name: Some(name.into()),
            error_message: Some(message.into()),
        }
    }

    pub fn from_outcome(id: CallId, outcome: Result<Value, RemoteError>) -> Self {
        match outcome {
            Ok(value) => Self::success(id, value),
            Err(err) => Self::error(id, err.name, err.message),
        }
    }

    /// Collapses the wire encoding back into a result. Messages that violate
    /// the exactly-one-of invariant are read as errors with empty fields
    /// rather than rejected.
    pub fn into_outcome(self) -> Result<Value, RemoteError> {
        if self.has_result {
            Ok(self.result.unwrap_or(Value::Null))
        } else {
            Err(RemoteError::new(
                self.error_name.unwrap_or_default(),
                self.error_message.unwrap_or_default(),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn call_wire_shape() {
        let call = Call::new(7, "add", vec![json!(2), json!(3)]);
        let encoded = serde_json::to_value(&call).unwrap();
        assert_eq!(
            encoded,
            json!({"id": 7, "method": "add", "arguments": [2, 3]})
        );
    }

    #[test]
    fn success_return_wire_shape() {
        let ret = CallReturn::success(7, json!(5));
        let encoded = serde_json::to_value(&ret).unwrap();
        assert_eq!(encoded, json!({"id": 7, "hasResult": true, "result": 5}));
    }

    #[test]
    fn error_return_wire_shape() {
        let ret = CallReturn::error(7, "RangeError", "out of bounds");
        let encoded = serde_json::to_value(&ret).unwrap();
        assert_eq!(
            encoded,
            json!({
                "id": 7,
                "hasResult": false,
                "errorName": "RangeError",
                "errorMessage": "out of bounds"
            })
        );
    }

    #[test]
    fn outcome_round_trip() {
        assert_eq!(
            CallReturn::success(1, json!("ok")).into_outcome(),
            Ok(json!("ok"))
        );
        assert_eq!(
            CallReturn::error(1, "RangeError", "out of bounds").into_outcome(),
            Err(RemoteError::new("RangeError", "out of bounds"))
        );
    }

    #[test]
    fn success_without_value_reads_as_null() {
        let ret: CallReturn = serde_json::from_value(json!({"id": 3, "hasResult": true})).unwrap();
        assert_eq!(ret.into_outcome(), Ok(Value::Null));
    }
}
