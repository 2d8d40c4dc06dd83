use rmcp::ErrorData as RpcError;
use serde_json::json;
use thiserror::Error;
use tokio::io;

use crate::store::StoreError;

pub type ServiceResult<T> = core::result::Result<T, ServiceError>;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    Store(#[from] StoreError),
    #[error("validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),
    #[error("network error: {0}")]
    NetworkError(String),
    #[error("API error ({status}): {message}")]
    ApiError { status: u16, message: String },
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    #[error("configuration error: {0}")]
    Config(String),
    #[error("{0}")]
    RpcError(#[from] RpcError),
    #[error("{0}")]
    IoError(#[from] io::Error),
    #[error("{0}")]
    SerdeJsonError(#[from] serde_json::Error),
    #[error("{0}")]
    FromString(String),
}

impl From<ServiceError> for RpcError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Store(StoreError::NotFound { kind, id }) => RpcError::resource_not_found(
                format!("{kind} not found"),
                Some(json!({ "kind": kind, "id": id })),
            ),
            ServiceError::Validation(errors) => RpcError::invalid_params(
                "Please fill in all required fields",
                Some(json!({ "errors": errors })),
            ),
            ServiceError::Config(message) => RpcError::invalid_params(message, None),
            ServiceError::RpcError(inner) => inner,
            ServiceError::ApiError { status, message } => {
                RpcError::internal_error(message, Some(json!({ "status": status })))
            }
            other => RpcError::internal_error(other.to_string(), None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_not_found_becomes_resource_not_found() {
        let err: RpcError = ServiceError::from(StoreError::not_found("Member", "999")).into();
        assert_eq!(err.code, rmcp::model::ErrorCode::RESOURCE_NOT_FOUND);
        assert_eq!(err.message, "Member not found");
    }

    #[test]
    fn validation_lists_errors() {
        let err = ServiceError::Validation(vec!["Name is required".into(), "Email is required".into()]);
        assert_eq!(
            err.to_string(),
            "validation failed: Name is required; Email is required"
        );
        let rpc: RpcError = err.into();
        assert_eq!(rpc.code, rmcp::model::ErrorCode::INVALID_PARAMS);
    }
}
