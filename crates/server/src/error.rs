//! Errors raised by the tool layer itself, before the worker is reached.

use rmcp::model::{ErrorCode, ErrorData as McpError};

#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    /// Tool arguments that fail validation (e.g., an empty sync tag).
    #[error("INVALID_INPUT: {0}")]
    InvalidInput(String),

    /// Tool output could not be encoded.
    #[error("OUTPUT_FAILED: {0}")]
    Output(String),
}

impl From<HandlerError> for McpError {
    fn from(err: HandlerError) -> Self {
        let code = match &err {
            HandlerError::InvalidInput(_) => -32602,
            HandlerError::Output(_) => -32603,
        };

        McpError { code: ErrorCode(code), message: err.to_string().into(), data: None }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes() {
        let err: McpError = HandlerError::InvalidInput("tag is empty".into()).into();
        assert_eq!(err.code, ErrorCode(-32602));
        assert!(err.message.contains("tag is empty"));

        let err: McpError = HandlerError::Output("bad".into()).into();
        assert_eq!(err.code, ErrorCode(-32603));
    }
}
