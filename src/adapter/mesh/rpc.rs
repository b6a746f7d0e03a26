//! JSON-RPC 2.0 envelope types.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

#[derive(Debug, Serialize)]
pub struct RpcRequest<'a, P> {
    pub jsonrpc: &'static str,
    pub id: u64,
    pub method: &'a str,
    pub params: P,
}

impl<'a, P: Serialize> RpcRequest<'a, P> {
    pub fn new(id: u64, method: &'a str, params: P) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            method,
            params,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RpcResponse<T> {
    #[serde(default)]
    pub id: Option<u64>,
    pub result: Option<T>,
    #[serde(default)]
    pub error: Option<RpcErrorObject>,
}

#[derive(Debug, Deserialize)]
pub struct RpcErrorObject {
    pub code: i64,
    #[serde(default)]
    pub message: String,
}

impl<T: DeserializeOwned> RpcResponse<T> {
    /// Collapse the envelope into the call result.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Rpc`] for an `error` member, or [`Error::Parse`] when
    /// neither `result` nor `error` is present.
    pub fn into_result(self) -> Result<T> {
        if let Some(err) = self.error {
            return Err(Error::Rpc {
                code: err.code,
                message: err.message,
            });
        }
        self.result
            .ok_or_else(|| Error::Parse("JSON-RPC response has neither result nor error".into()))
    }
}

/// Peek at the `id` of a raw frame without committing to a result type.
#[derive(Debug, Deserialize)]
pub struct RpcEnvelopeId {
    #[serde(default)]
    pub id: Option<u64>,
}
