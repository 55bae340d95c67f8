//! SMTP メール送信実装
//!
//! lettre の `AsyncSmtpTransport` を使用してメールを送信する。
//! リレーホスト（既定 `smtp.gmail.com`）に送信元アドレスとアプリパスワードで認証する。

use std::sync::Arc;

use async_trait::async_trait;
use lettre::{
    AsyncSmtpTransport,
    AsyncTransport,
    Tokio1Executor,
    message::{Attachment, Mailbox, Message, MultiPart, SinglePart, header::ContentType},
    transport::smtp::authentication::Credentials,
};
use mailrelay_domain::{message::OutgoingMessage, send_request::SenderCredentials};

use super::{MailClientFactory, MailSender};
use crate::{
    attachment::PDF_CONTENT_TYPE,
    error::{InfraError, TransportError},
};

/// SMTP メール送信
///
/// `lettre::AsyncSmtpTransport<Tokio1Executor>` をラップする。
/// 1 リクエスト分の送信元に紐づき、バッチ内の並行送信で共有される。
pub struct SmtpMailSender {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from:      Mailbox,
}

impl SmtpMailSender {
    /// 新しい SMTP 送信インスタンスを作成
    ///
    /// # 引数
    ///
    /// - `relay_host`: SMTP リレーのホスト名（例: "smtp.gmail.com"）
    /// - `credentials`: 送信元アドレスとアプリパスワード
    pub fn new(relay_host: &str, credentials: &SenderCredentials) -> Result<Self, InfraError> {
        let from: Mailbox = credentials
            .address()
            .parse()
            .map_err(|e| InfraError::client_setup(format!("送信元アドレス不正: {e}")))?;

        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(relay_host)
            .map_err(|e| InfraError::client_setup(format!("リレーホスト不正: {e}")))?
            .credentials(Credentials::new(
                credentials.address().to_string(),
                credentials.app_password().to_string(),
            ))
            .build();

        Ok(Self { transport, from })
    }

    async fn build_message(
        &self,
        recipient: &str,
        message: &OutgoingMessage,
    ) -> Result<Message, TransportError> {
        let to: Mailbox = recipient
            .parse()
            .map_err(|e| TransportError::InvalidRecipient(format!("{recipient}: {e}")))?;

        let bytes = tokio::fs::read(message.attachment.path())
            .await
            .map_err(|e| {
                TransportError::Attachment(format!("{}: {e}", message.attachment.path().display()))
            })?;
        let content_type = ContentType::parse(PDF_CONTENT_TYPE)
            .map_err(|e| TransportError::Message(format!("Content-Type 不正: {e}")))?;
        let attachment = Attachment::new(message.attachment.original_name().to_string())
            .body(bytes, content_type);

        Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(&message.subject)
            .multipart(
                MultiPart::mixed()
                    .singlepart(SinglePart::html(message.html_body.clone()))
                    .singlepart(attachment),
            )
            .map_err(|e| TransportError::Message(e.to_string()))
    }
}

#[async_trait]
impl MailSender for SmtpMailSender {
    async fn send_one(
        &self,
        recipient: &str,
        message: &OutgoingMessage,
    ) -> Result<(), TransportError> {
        let email = self.build_message(recipient, message).await?;

        self.transport
            .send(email)
            .await
            .map_err(|e| TransportError::Smtp(e.to_string()))?;

        Ok(())
    }
}

/// [`SmtpMailSender`] のファクトリ
#[derive(Debug, Clone)]
pub struct SmtpMailClientFactory {
    relay_host: String,
}

impl SmtpMailClientFactory {
    pub fn new(relay_host: impl Into<String>) -> Self {
        Self {
            relay_host: relay_host.into(),
        }
    }
}

impl MailClientFactory for SmtpMailClientFactory {
    fn create_client(
        &self,
        credentials: &SenderCredentials,
    ) -> Result<Arc<dyn MailSender>, InfraError> {
        Ok(Arc::new(SmtpMailSender::new(&self.relay_host, credentials)?))
    }
}
