//! # MailRelay ドメイン層
//!
//! 一斉送信の中核となるドメインモデルを定義する。
//!
//! ## 設計方針
//!
//! - **値オブジェクト**: 宛先リスト、バッチサイズ、送信者情報は検証済みの型で表現
//! - **純粋性**: SMTP やファイルシステムには依存しない（インフラ層の責務）
//! - **テスト容易性**: 待機時間は [`delay::DelayStrategy`] で差し替え可能
//!
//! ## 依存関係の方向
//!
//! ```text
//! relay-service → infra → domain → shared
//! ```
//!
//! ## モジュール構成
//!
//! - [`error`] - ドメイン層で発生するエラーの定義
//! - [`recipient`] - 宛先リストとバッチ分割
//! - [`message`] - 件名・本文テンプレートと添付ファイル参照
//! - [`send_request`] - 一斉送信リクエスト（集約）
//! - [`delivery`] - 宛先ごとの送信結果と集計
//! - [`delay`] - バッチ間の待機戦略
//!
//! ## 使用例
//!
//! ```rust
//! use mailrelay_domain::recipient::{BatchSize, RecipientList};
//!
//! let recipients = RecipientList::parse("a@example.com, ,b@example.com");
//! let batch_size = BatchSize::new(70)?;
//!
//! assert_eq!(recipients.len(), 2);
//! assert_eq!(recipients.batches(batch_size).count(), 1);
//! # Ok::<(), mailrelay_domain::DomainError>(())
//! ```

pub mod delay;
pub mod delivery;
pub mod error;
pub mod message;
pub mod recipient;
pub mod send_request;

pub use error::DomainError;
