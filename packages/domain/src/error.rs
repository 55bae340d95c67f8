//! # ドメイン層エラー定義
//!
//! 一斉送信リクエストのルール違反を表現するエラー型。
//!
//! ## エラーの種類と HTTP ステータスの対応
//!
//! | エラー種別 | HTTP ステータス | 用途 |
//! |-----------|----------------|------|
//! | `MissingField` | 400 Bad Request | 必須フィールドが未入力 |
//! | `Validation` | 400 Bad Request | 入力値の形式不正 |
//!
//! ## 使用例
//!
//! ```rust
//! use mailrelay_domain::DomainError;
//!
//! fn validate_sender(sender: &str) -> Result<(), DomainError> {
//!     if sender.trim().is_empty() {
//!         return Err(DomainError::MissingField("senderEmail"));
//!     }
//!     Ok(())
//! }
//!
//! assert!(validate_sender("").is_err());
//! ```

use thiserror::Error;

/// ドメイン層で発生するエラー
///
/// API 層でこのエラーを受け取り、400 Bad Request に変換する。
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    /// 必須フィールドが未入力
    ///
    /// フィールド名はフォームのキー（`senderEmail` など）をそのまま保持する。
    #[error("必須フィールドが未入力です: {0}")]
    MissingField(&'static str),

    /// バリデーションエラー
    ///
    /// - バッチサイズが 0 以下、または数値でない
    /// - 添付ファイルが PDF でない
    #[error("バリデーションエラー: {0}")]
    Validation(String),
}
