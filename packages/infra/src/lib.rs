//! # MailRelay Infra
//!
//! 外部システムとの接続を担当するインフラストラクチャ層。
//!
//! ## 設計方針
//!
//! - **ドメイン層への依存**: ドメイン層の型（`OutgoingMessage` など）を受け取り、外部 I/O に変換する
//! - **trait による差し替え**: 送信手段は [`mailer::MailSender`] で抽象化し、テストではモックを使う
//! - **エラーの分離**: リクエスト全体を止めるエラー（[`InfraError`]）と
//!   宛先単位で回復するエラー（[`TransportError`]）を区別する
//!
//! ## モジュール構成
//!
//! - [`attachment`]: 添付 PDF の一時保存と削除
//! - [`mailer`]: SMTP / Noop のメール送信
//! - [`error`]: インフラ層エラー

pub mod attachment;
pub mod error;
pub mod mailer;
#[cfg(any(test, feature = "test-utils"))]
pub mod mock;

pub use error::{InfraError, InfraErrorKind, TransportError};
