use std::time::Duration;

use alloy::transports::{RpcError, TransportError, TransportErrorKind};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChainError {
    #[error("RPC request {method} failed: {message}")]
    Request { method: &'static str, message: String },

    #[error("RPC node answered {method} with HTTP status {status}")]
    HttpStatus { method: &'static str, status: u16 },

    #[error("RPC error {code} for {method}: {message}")]
    Rpc { method: &'static str, code: i64, message: String },

    #[error("Invalid response to {method}: {message}")]
    InvalidResponse { method: &'static str, message: String },

    #[error("RPC request {method} timed out after {timeout:?}")]
    Timeout { method: &'static str, timeout: Duration },

    #[error("Failed to decode result of {function}: {message}")]
    Decode { function: &'static str, message: String },
}

impl ChainError {
    pub fn from_transport(method: &'static str, err: TransportError) -> Self {
        match err {
            RpcError::ErrorResp(payload) => {
                ChainError::Rpc { method, code: payload.code, message: payload.message.to_string() }
            }
            RpcError::Transport(TransportErrorKind::HttpError(http)) => {
                ChainError::HttpStatus { method, status: http.status }
            }
            RpcError::NullResp => ChainError::InvalidResponse { method, message: "null result".to_string() },
            RpcError::DeserError { err, .. } => ChainError::InvalidResponse { method, message: err.to_string() },
            other => ChainError::Request { method, message: other.to_string() },
        }
    }

    pub fn from_contract(function: &'static str, err: alloy::contract::Error) -> Self {
        match err {
            alloy::contract::Error::TransportError(err) => Self::from_transport("eth_call", err),
            other => ChainError::Decode { function, message: other.to_string() },
        }
    }

    /// Transport level failures, as opposed to answers the node actually gave
    pub fn is_transient(&self) -> bool {
        match self {
            ChainError::Request { .. } | ChainError::Timeout { .. } => true,
            ChainError::HttpStatus { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }
}
