//! # エラーレスポンス
//!
//! 送信 API で共通のエラーレスポンス構造体を提供する。
//!
//! ## 設計
//!
//! - `ErrorResponse` は純粋なデータ構造（`Serialize` / `Deserialize` のみ）
//! - axum の `IntoResponse` 変換はサービス側の責務（shared に axum 依存を入れない）
//! - クライアントとの互換性のため、JSON 形状は `{error}` / `{error, details}` に固定
//!
//! | ステータス | JSON | 用途 |
//! |-----------|------|------|
//! | 400 | `{"error": "..."}` | 入力不足・PDF 以外の添付 |
//! | 500 | `{"error": "...", "details": "..."}` | 送信準備中の予期しない失敗 |

use serde::{Deserialize, Serialize};

/// 500 応答の `error` フィールドに入る固定メッセージ
pub const SEND_FAILED_MESSAGE: &str = "Failed to send emails";

/// エラーレスポンス
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error:   String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorResponse {
    /// 汎用コンストラクタ
    pub fn new(error: impl Into<String>, details: Option<String>) -> Self {
        Self {
            error: error.into(),
            details,
        }
    }

    /// 400 Bad Request（`details` なし）
    pub fn bad_request(error: impl Into<String>) -> Self {
        Self::new(error, None)
    }

    /// 500 Internal Server Error
    ///
    /// `error` は固定文言、原因は `details` に入れる。
    pub fn send_failed(details: impl Into<String>) -> Self {
        Self::new(SEND_FAILED_MESSAGE, Some(details.into()))
    }
}
