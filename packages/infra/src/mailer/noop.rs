//! Noop メール送信実装
//!
//! メールを実際に送信せず、ログ出力のみ行う。
//! ローカル検証や送信無効化時に使用する。

use std::sync::Arc;

use async_trait::async_trait;
use mailrelay_domain::{message::OutgoingMessage, send_request::SenderCredentials};

use super::{MailClientFactory, MailSender};
use crate::error::{InfraError, TransportError};

/// Noop メール送信（ログ出力のみ）
#[derive(Debug, Clone)]
pub struct NoopMailSender {
    from_address: String,
}

#[async_trait]
impl MailSender for NoopMailSender {
    async fn send_one(
        &self,
        recipient: &str,
        message: &OutgoingMessage,
    ) -> Result<(), TransportError> {
        tracing::info!(
            from = %self.from_address,
            to = %recipient,
            subject = %message.subject,
            attachment = %message.attachment.original_name(),
            "Noop: メール送信をスキップ"
        );
        Ok(())
    }
}

/// [`NoopMailSender`] のファクトリ
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopMailClientFactory;

impl MailClientFactory for NoopMailClientFactory {
    fn create_client(
        &self,
        credentials: &SenderCredentials,
    ) -> Result<Arc<dyn MailSender>, InfraError> {
        Ok(Arc::new(NoopMailSender {
            from_address: credentials.address().to_string(),
        }))
    }
}
