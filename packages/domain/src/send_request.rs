//! # 一斉送信リクエスト
//!
//! フォーム入力を検証済みの [`SendRequest`] に組み立てる。
//!
//! ## 不変条件
//!
//! - 送信元アドレス・認証情報・宛先（文字列）が空でない
//! - 添付ファイルが存在し、PDF 判定を通過している（判定はインフラ層の添付ストア）
//!
//! 宛先文字列が空白とカンマだけの場合は「宛先 0 件」として受け付ける。
//! その場合の送信結果は `total = 0` になる。

use std::fmt;

use crate::{
    DomainError,
    message::{AttachmentRef, MessageTemplate, OutgoingMessage, SenderProfile},
    recipient::{BatchSize, RecipientList},
};

/// 送信元の認証情報
///
/// パスワードはログに出さないよう `Debug` でマスクする。
#[derive(Clone, PartialEq, Eq)]
pub struct SenderCredentials {
    address:      String,
    app_password: String,
}

impl SenderCredentials {
    /// 認証情報を作成する
    ///
    /// # エラー
    ///
    /// どちらかが空（空白のみを含む）なら `DomainError::MissingField` を返す。
    pub fn new(
        address: impl Into<String>,
        app_password: impl Into<String>,
    ) -> Result<Self, DomainError> {
        let address = address.into().trim().to_string();
        let app_password = app_password.into();

        if address.is_empty() {
            return Err(DomainError::MissingField("senderEmail"));
        }
        if app_password.trim().is_empty() {
            return Err(DomainError::MissingField("appPassword"));
        }

        Ok(Self {
            address,
            app_password,
        })
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn app_password(&self) -> &str {
        &self.app_password
    }
}

impl fmt::Debug for SenderCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SenderCredentials")
            .field("address", &self.address)
            .field("app_password", &"********")
            .finish()
    }
}

/// 一斉送信リクエスト（集約）
#[derive(Debug, Clone)]
pub struct SendRequest {
    credentials: SenderCredentials,
    recipients:  RecipientList,
    batch_size:  BatchSize,
    template:    MessageTemplate,
    profile:     SenderProfile,
    attachment:  AttachmentRef,
}

impl SendRequest {
    /// リクエストを組み立てる
    ///
    /// `raw_recipients` はフォームの `emails`（カンマ区切り）。
    ///
    /// # エラー
    ///
    /// `raw_recipients` が空文字列なら `DomainError::MissingField("emails")` を返す。
    pub fn new(
        credentials: SenderCredentials,
        raw_recipients: &str,
        batch_size: BatchSize,
        template: MessageTemplate,
        profile: SenderProfile,
        attachment: AttachmentRef,
    ) -> Result<Self, DomainError> {
        if raw_recipients.is_empty() {
            return Err(DomainError::MissingField("emails"));
        }

        Ok(Self {
            credentials,
            recipients: RecipientList::parse(raw_recipients),
            batch_size,
            template,
            profile,
            attachment,
        })
    }

    pub fn credentials(&self) -> &SenderCredentials {
        &self.credentials
    }

    pub fn recipients(&self) -> &RecipientList {
        &self.recipients
    }

    pub fn batch_size(&self) -> BatchSize {
        self.batch_size
    }

    pub fn template(&self) -> &MessageTemplate {
        &self.template
    }

    pub fn profile(&self) -> &SenderProfile {
        &self.profile
    }

    pub fn attachment(&self) -> &AttachmentRef {
        &self.attachment
    }

    /// 描画済みの HTML 本文から、全宛先に共通のメッセージを作る
    pub fn outgoing_message(&self, html_body: String) -> OutgoingMessage {
        OutgoingMessage {
            subject: self.template.subject.clone(),
            html_body,
            attachment: self.attachment.clone(),
        }
    }
}
