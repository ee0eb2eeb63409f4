//! Mapping of Secrets Manager SDK failures onto [`StoreError`]

use aws_sdk_secretsmanager::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};

use crate::error::StoreError;

/// Classify any SDK call failure.
///
/// Transport-level failures (timeouts, dispatch, unparseable responses) are transient;
/// service errors are classified by their error code.
pub(crate) fn classify_sdk_error<E, R>(operation: &str, err: SdkError<E, R>) -> StoreError
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
    R: std::fmt::Debug,
{
    let detail = format!("{operation}: {}", DisplayErrorContext(&err));
    match &err {
        SdkError::TimeoutError(_) | SdkError::DispatchFailure(_) | SdkError::ResponseError(_) => {
            StoreError::Transient(detail)
        }
        SdkError::ServiceError(_) => classify_error_code(err.code(), detail),
        _ => StoreError::Unexpected(detail),
    }
}

/// Classify a Secrets Manager service error code
pub fn classify_error_code(code: Option<&str>, detail: String) -> StoreError {
    match code {
        Some("ResourceNotFoundException") => StoreError::NotFound(detail),
        Some(
            "AccessDeniedException"
            | "AccessDenied"
            | "UnrecognizedClientException"
            | "InvalidSignatureException"
            | "ExpiredTokenException"
            | "IncompleteSignature"
            | "DecryptionFailure"
            | "EncryptionFailure",
        ) => StoreError::Access(detail),
        // Secrets Manager reports a label-move source mismatch as an invalid parameter
        Some(
            "InvalidParameterException"
            | "ResourceExistsException"
            | "PreconditionNotMetException",
        ) => StoreError::Conflict(detail),
        Some(
            "ThrottlingException"
            | "InternalServiceError"
            | "InternalFailure"
            | "ServiceUnavailable"
            | "RequestTimeout",
        ) => StoreError::Transient(detail),
        // Quota exhaustion and state problems such as a secret scheduled for deletion need
        // an operator, not a later retry
        Some("LimitExceededException" | "InvalidRequestException") => {
            StoreError::Unexpected(detail)
        }
        _ => StoreError::Unexpected(detail),
    }
}
