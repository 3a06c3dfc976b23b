//! Service Error Classification
//!
//! HTTP / gRPC のステータスコードと通信エラーメッセージを `GcpError` に分類

use google_cloud_gax::error::rpc::Code;
use google_cloud_gax::error::Error as GaxError;

use super::retry::{is_auth_error, is_rate_limit_error, is_retryable_error};
use crate::domain::error::GcpError;

/// REST API の HTTP エラーステータスを分類
pub fn classify_status(code: u16, message: &str, resource: &str) -> GcpError {
    match code {
        404 => GcpError::NotFound {
            resource: resource.to_string(),
        },
        409 => GcpError::AlreadyExists {
            resource: resource.to_string(),
        },
        401 => GcpError::Auth(format!("{} (HTTP 401)", message)),
        // Google API はクォータ超過も 403 で返す
        403 if is_rate_limit_error(message) => {
            GcpError::Transport(format!("{} (HTTP 403)", message))
        }
        403 => GcpError::Auth(format!("{} (HTTP 403)", message)),
        408 | 429 | 500..=599 => GcpError::Transport(format!("{} (HTTP {})", message, code)),
        400..=499 => GcpError::InvalidInput(format!("{} (HTTP {})", message, code)),
        _ => GcpError::Service(format!("{} (HTTP {})", message, code)),
    }
}

/// ステータスコードを持たないエラーを分類
pub fn classify_message(message: &str) -> GcpError {
    if is_auth_error(message) {
        GcpError::Auth(message.to_string())
    } else if is_retryable_error(message) {
        GcpError::Transport(message.to_string())
    } else {
        GcpError::Service(message.to_string())
    }
}

/// gRPC ステータスコードを分類
pub fn classify_code(code: Code, message: &str, resource: &str) -> GcpError {
    match code {
        Code::NotFound => GcpError::NotFound {
            resource: resource.to_string(),
        },
        Code::AlreadyExists => GcpError::AlreadyExists {
            resource: resource.to_string(),
        },
        Code::Unauthenticated | Code::PermissionDenied => GcpError::Auth(message.to_string()),
        Code::Unavailable
        | Code::DeadlineExceeded
        | Code::ResourceExhausted
        | Code::Aborted
        | Code::Internal => GcpError::Transport(message.to_string()),
        Code::InvalidArgument | Code::FailedPrecondition | Code::OutOfRange => {
            GcpError::InvalidInput(message.to_string())
        }
        _ => GcpError::Service(message.to_string()),
    }
}

/// gax ベースの生成クライアントのエラーを変換
pub fn map_gax_error(err: GaxError, resource: &str) -> GcpError {
    if let Some(status) = err.status() {
        return classify_code(status.code, &status.message, resource);
    }
    if err.is_authentication() {
        return GcpError::Auth(err.to_string());
    }
    if let Some(code) = err.http_status_code() {
        return classify_status(code, &err.to_string(), resource);
    }
    classify_message(&err.to_string())
}
