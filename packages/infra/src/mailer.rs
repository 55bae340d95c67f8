//! # メール送信
//!
//! 1 宛先分のメール送信を担当するインフラストラクチャモジュール。
//!
//! ## 設計方針
//!
//! - **trait による抽象化**: [`MailSender`] で 1 通の送信を抽象化
//! - **リクエスト単位のクライアント**: 送信元の認証情報はリクエストごとに異なるため、
//!   [`MailClientFactory`] がリクエストごとに [`MailSender`] を作る
//! - **環境変数切替**: `MAIL_BACKEND`（`smtp` / `noop`）でランタイム選択

mod noop;
mod smtp;

use std::sync::Arc;

use async_trait::async_trait;
use mailrelay_domain::{message::OutgoingMessage, send_request::SenderCredentials};
pub use noop::{NoopMailClientFactory, NoopMailSender};
pub use smtp::{SmtpMailClientFactory, SmtpMailSender};
use strum::{EnumString, IntoStaticStr};

use crate::error::{InfraError, TransportError};

/// メール送信トレイト
///
/// 宛先 1 件にメッセージを 1 通送る。
/// 同じインスタンスがバッチ内で並行に呼ばれるため `Send + Sync` を要求する。
#[async_trait]
pub trait MailSender: Send + Sync {
    /// メールを送信する
    async fn send_one(&self, recipient: &str, message: &OutgoingMessage)
    -> Result<(), TransportError>;
}

/// 送信元の認証情報から [`MailSender`] を作るトレイト
pub trait MailClientFactory: Send + Sync {
    /// # エラー
    ///
    /// 送信元アドレスが解釈できないなど、1 通も送れない状態なら `InfraError` を返す。
    fn create_client(
        &self,
        credentials: &SenderCredentials,
    ) -> Result<Arc<dyn MailSender>, InfraError>;
}

/// メール送信バックエンド
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, EnumString, IntoStaticStr)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum MailBackend {
    /// SMTP リレー経由で送信する
    #[default]
    Smtp,
    /// 送信せずログ出力のみ
    Noop,
}

impl MailBackend {
    /// バックエンドに応じたファクトリを作る
    pub fn factory(self, relay_host: &str) -> Arc<dyn MailClientFactory> {
        match self {
            Self::Smtp => Arc::new(SmtpMailClientFactory::new(relay_host)),
            Self::Noop => Arc::new(NoopMailClientFactory),
        }
    }
}
