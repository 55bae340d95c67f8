//! # テスト用モックメール送信
//!
//! ユースケース・ハンドラテストで使用するインメモリモック。
//! `test-utils` feature を有効にすることで、他クレートからも利用可能。
//!
//! ```toml
//! [dev-dependencies]
//! mailrelay-infra = { workspace = true, features = ["test-utils"] }
//! ```

use std::{
    collections::HashSet,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use mailrelay_domain::{message::OutgoingMessage, send_request::SenderCredentials};

use crate::{
    error::{InfraError, TransportError},
    mailer::{MailClientFactory, MailSender},
};

/// 送信記録
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMail {
    pub from:      String,
    pub recipient: String,
    pub message:   OutgoingMessage,
}

// ===== MockMailSender =====

/// 送信内容を記録するモック
///
/// `fail_for` に登録した宛先は `TransportError::Smtp` で失敗する。
#[derive(Clone, Default)]
pub struct MockMailSender {
    from:     String,
    sent:     Arc<Mutex<Vec<SentMail>>>,
    attempts: Arc<Mutex<Vec<String>>>,
    fail_for: Arc<Mutex<HashSet<String>>>,
    fail_all: Arc<Mutex<bool>>,
}

impl MockMailSender {
    pub fn new() -> Self {
        Self::default()
    }

    /// 指定した宛先への送信を失敗させる
    pub fn fail_for(&self, recipient: impl Into<String>) {
        self.fail_for.lock().unwrap().insert(recipient.into());
    }

    /// すべての送信を失敗させる
    pub fn fail_all(&self) {
        *self.fail_all.lock().unwrap() = true;
    }

    /// 成功した送信
    pub fn sent(&self) -> Vec<SentMail> {
        self.sent.lock().unwrap().clone()
    }

    /// 送信を試みた宛先（成否を問わない）
    pub fn attempts(&self) -> Vec<String> {
        self.attempts.lock().unwrap().clone()
    }
}

#[async_trait]
impl MailSender for MockMailSender {
    async fn send_one(
        &self,
        recipient: &str,
        message: &OutgoingMessage,
    ) -> Result<(), TransportError> {
        self.attempts.lock().unwrap().push(recipient.to_string());

        if *self.fail_all.lock().unwrap() || self.fail_for.lock().unwrap().contains(recipient) {
            return Err(TransportError::Smtp(format!("550 rejected: {recipient}")));
        }

        self.sent.lock().unwrap().push(SentMail {
            from:      self.from.clone(),
            recipient: recipient.to_string(),
            message:   message.clone(),
        });
        Ok(())
    }
}

// ===== MockMailClientFactory =====

/// 常に同じ [`MockMailSender`] を返すファクトリ
///
/// 送信記録はファクトリ経由で参照できる。
#[derive(Clone, Default)]
pub struct MockMailClientFactory {
    sender:      MockMailSender,
    credentials: Arc<Mutex<Vec<SenderCredentials>>>,
    setup_error: Arc<Mutex<Option<String>>>,
}

impl MockMailClientFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sender(&self) -> &MockMailSender {
        &self.sender
    }

    /// `create_client` を失敗させる
    pub fn fail_setup(&self, message: impl Into<String>) {
        *self.setup_error.lock().unwrap() = Some(message.into());
    }

    /// `create_client` に渡された認証情報
    pub fn requested_credentials(&self) -> Vec<SenderCredentials> {
        self.credentials.lock().unwrap().clone()
    }
}

impl MailClientFactory for MockMailClientFactory {
    fn create_client(
        &self,
        credentials: &SenderCredentials,
    ) -> Result<Arc<dyn MailSender>, InfraError> {
        self.credentials.lock().unwrap().push(credentials.clone());

        if let Some(message) = self.setup_error.lock().unwrap().clone() {
            return Err(InfraError::client_setup(message));
        }

        let mut sender = self.sender.clone();
        sender.from = credentials.address().to_string();
        Ok(Arc::new(sender))
    }
}
