//! # Relay Service エラー定義
//!
//! Relay Service 固有のエラーと、HTTP レスポンスへの変換を定義する。
//!
//! | バリアント | ステータス | JSON |
//! |-----------|-----------|------|
//! | `BadRequest` | 400 | `{"error": "..."}` |
//! | `Setup` / `Template` / `Internal` | 500 | `{"error": "Failed to send emails", "details": "..."}` |

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use mailrelay_domain::DomainError;
use mailrelay_infra::{InfraError, InfraErrorKind};
use mailrelay_shared::{ErrorResponse, event_log::error as log_error};
use thiserror::Error;

/// 必須項目が欠けている場合のメッセージ
pub const MISSING_FIELDS_MESSAGE: &str = "Missing required fields";

/// 添付ファイルが無い場合のメッセージ
pub const MISSING_RESUME_MESSAGE: &str = "Resume PDF is required";

/// バッチサイズが不正な場合のメッセージ
pub const INVALID_BATCH_SIZE_MESSAGE: &str = "batchSize must be a positive integer";

/// Relay Service で発生するエラー
#[derive(Debug, Error)]
pub enum RelayError {
    /// 不正なリクエスト（送信は開始しない）
    #[error("不正なリクエスト: {0}")]
    BadRequest(String),

    /// 送信準備の失敗（添付の保存、クライアント構築）
    #[error("送信準備に失敗: {0}")]
    Setup(InfraError),

    /// 本文テンプレートの登録・評価の失敗（送信は開始しない）
    #[error("本文の生成に失敗: {0}")]
    Template(String),

    /// 内部エラー
    #[error("内部エラー: {0}")]
    Internal(String),
}

impl From<DomainError> for RelayError {
    fn from(error: DomainError) -> Self {
        match error {
            DomainError::MissingField(_) => Self::BadRequest(MISSING_FIELDS_MESSAGE.to_string()),
            DomainError::Validation(msg) => Self::BadRequest(msg),
        }
    }
}

impl From<InfraError> for RelayError {
    fn from(error: InfraError) -> Self {
        match error.kind() {
            InfraErrorKind::InvalidInput(msg) => Self::BadRequest(msg.clone()),
            _ => Self::Setup(error),
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            RelayError::BadRequest(msg) => {
                tracing::debug!(error = %msg, "リクエストを拒否");
                (StatusCode::BAD_REQUEST, ErrorResponse::bad_request(msg))
            }
            RelayError::Setup(e) => {
                let (category, kind) = match e.kind() {
                    InfraErrorKind::Io(_) => {
                        (log_error::category::FILESYSTEM, log_error::kind::STAGING)
                    }
                    _ => (log_error::category::EXTERNAL_SERVICE, log_error::kind::SMTP),
                };
                tracing::error!(
                    error.category = category,
                    error.kind = kind,
                    span_trace = %e.span_trace(),
                    "送信準備に失敗: {}",
                    e
                );
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::send_failed(e.to_string()),
                )
            }
            RelayError::Template(msg) => {
                tracing::error!(
                    error.kind = log_error::kind::TEMPLATE,
                    "本文の生成に失敗: {}",
                    msg
                );
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::send_failed(msg),
                )
            }
            RelayError::Internal(msg) => {
                tracing::error!(error.kind = log_error::kind::INTERNAL, "内部エラー: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::send_failed(msg),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}
