//! # インフラ層エラー定義
//!
//! ファイルシステムや SMTP プロバイダとのやり取りで発生するエラーを表現する。
//!
//! ## 2 種類のエラー
//!
//! | 型 | 発生タイミング | 扱い |
//! |----|--------------|------|
//! | [`InfraError`] | 送信開始前（添付のステージング、クライアント構築） | リクエスト全体を中断し 500 |
//! | [`TransportError`] | 宛先ごとの送信時（認証・ネットワーク・拒否） | その宛先を失敗として数え、送信は続行 |
//!
//! ## 構造
//!
//! `std::io::Error` と同じ struct + enum パターンを採用:
//! - [`InfraError`]: エラー種別（[`InfraErrorKind`]）と [`SpanTrace`] を保持するラッパー
//! - [`InfraErrorKind`]: エラーの具体的な種別

use std::fmt;

use derive_more::Display;
use thiserror::Error;
use tracing_error::SpanTrace;

/// インフラ層で発生するエラー
///
/// `From<std::io::Error>` 変換や convenience constructor でエラーを生成すると、
/// その時点のスパン情報が自動的にキャプチャされる。
#[derive(Display)]
#[display("{kind}")]
pub struct InfraError {
    kind:       InfraErrorKind,
    span_trace: SpanTrace,
}

/// インフラ層エラーの種別
#[derive(Debug, Error)]
pub enum InfraErrorKind {
    /// ファイルシステムエラー
    ///
    /// uploads ディレクトリの作成失敗、添付ファイルの書き込み失敗など。
    #[error("ファイルシステムエラー: {0}")]
    Io(#[source] std::io::Error),

    /// メールクライアントの構築に失敗
    ///
    /// 送信元アドレスが解釈できない、リレーホストが不正など。
    #[error("メールクライアントの構築に失敗: {0}")]
    ClientSetup(String),

    /// クライアント入力エラー
    ///
    /// インフラ層で検出されるが、原因はクライアント入力にある（PDF 以外の添付など）。
    #[error("入力エラー: {0}")]
    InvalidInput(String),
}

impl InfraError {
    /// エラー種別を取得する
    pub fn kind(&self) -> &InfraErrorKind {
        &self.kind
    }

    /// SpanTrace を取得する
    pub fn span_trace(&self) -> &SpanTrace {
        &self.span_trace
    }

    /// クライアント入力起因のエラーか
    pub fn is_invalid_input(&self) -> bool {
        matches!(self.kind, InfraErrorKind::InvalidInput(_))
    }

    // ===== Convenience constructors =====

    /// クライアント構築エラーを生成する
    pub fn client_setup(msg: impl Into<String>) -> Self {
        Self {
            kind:       InfraErrorKind::ClientSetup(msg.into()),
            span_trace: SpanTrace::capture(),
        }
    }

    /// クライアント入力エラーを生成する
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self {
            kind:       InfraErrorKind::InvalidInput(msg.into()),
            span_trace: SpanTrace::capture(),
        }
    }
}

impl fmt::Debug for InfraError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InfraError")
            .field("kind", &self.kind)
            .field("span_trace", &self.span_trace)
            .finish()
    }
}

impl std::error::Error for InfraError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.kind.source()
    }
}

impl From<std::io::Error> for InfraError {
    fn from(source: std::io::Error) -> Self {
        Self {
            kind:       InfraErrorKind::Io(source),
            span_trace: SpanTrace::capture(),
        }
    }
}

/// 宛先ごとの送信エラー
///
/// ディスパッチャで回復され、`failed` に数えられる。
#[derive(Debug, Error)]
pub enum TransportError {
    /// 宛先アドレスが解釈できない
    #[error("宛先アドレス不正: {0}")]
    InvalidRecipient(String),

    /// 添付ファイルを読み込めない
    #[error("添付ファイルの読み込みに失敗: {0}")]
    Attachment(String),

    /// メッセージの組み立てに失敗
    #[error("メッセージ構築失敗: {0}")]
    Message(String),

    /// SMTP 送信に失敗（認証・ネットワーク・拒否）
    #[error("SMTP 送信失敗: {0}")]
    Smtp(String),
}
