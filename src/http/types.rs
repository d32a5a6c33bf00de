use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

pub const JSONRPC_VERSION: &str = "2.0";

/// Requests are never pipelined, so every envelope uses the same id.
pub const REQUEST_ID: u64 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    pub id: u64,
    pub method: String,
    pub params: Value,
}

impl JsonRpcRequest {
    /// Builds a fresh envelope. A missing or `null` params value becomes `[]`.
    pub fn new(method: impl Into<String>, params: Option<Value>) -> Self {
        let params = match params {
            None | Some(Value::Null) => Value::Array(Vec::new()),
            Some(params) => params,
        };
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id: REQUEST_ID,
            method: method.into(),
            params,
        }
    }
}

/// `result` is `Some` whenever the member is present, even when it is `null`.
#[derive(Debug, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct JsonRpcResponse<T> {
    pub jsonrpc: Option<String>,
    pub id: Option<Value>,
    #[serde(default, deserialize_with = "deserialize_present")]
    pub result: Option<T>,
    pub error: Option<RpcErrorObject>,
}

fn deserialize_present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcErrorObject {
    pub code: i64,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}
