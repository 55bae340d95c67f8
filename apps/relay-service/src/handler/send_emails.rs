//! # 一斉送信ハンドラ
//!
//! ```text
//! POST /send-emails   (multipart/form-data)
//! ```
//!
//! | フィールド | 必須 | 説明 |
//! |-----------|------|------|
//! | `senderEmail` | Yes | 送信元アドレス |
//! | `appPassword` | Yes | プロバイダのアプリパスワード |
//! | `emails` | Yes | 宛先（カンマ区切り） |
//! | `batchSize` | No | バッチサイズ（既定 70） |
//! | `name` / `phoneNumber` / `website` | No | 署名ブロックの表示値 |
//! | `degree` | No | 件名 |
//! | `customMessage` | No | HTML 本文の断片 |
//! | `resume` | Yes | 添付 PDF（`application/pdf`） |
//!
//! ## 処理の順序
//!
//! 1. テキスト項目の必須チェック、次に添付の有無、最後に `batchSize`
//! 2. 添付を保存（PDF 以外はここで 400）
//! 3. HTML 本文を生成（テンプレートの失敗は 500）
//! 4. 送信クライアントを作成（失敗は 500）
//! 5. 送信タスクを起動し、完了を待つ。タスクが添付を所有し、送信後に 1 回だけ削除する
//!
//! 3 と 4 で失敗した場合は送信を開始せず、保存済みの添付はその場で削除される。
//!
//! 呼び出し元が切断するとハンドラの Future が破棄され、[`DropGuard`] が
//! 送信タスクに中断を伝える。送信タスクは次のバッチ境界で停止し、添付を削除する。
//!
//! [`DropGuard`]: crate::cancellation::DropGuard

use std::sync::Arc;

use axum::{
    Json,
    body::Bytes,
    extract::{
        Multipart,
        State,
        multipart::{MultipartError, MultipartRejection},
    },
};
use mailrelay_domain::{
    delivery::BatchResult,
    message::{MessageTemplate, SenderProfile},
    recipient::BatchSize,
    send_request::{SendRequest, SenderCredentials},
};
use mailrelay_infra::{attachment::AttachmentStore, mailer::MailClientFactory};
use tracing::Instrument as _;

use crate::{
    cancellation::CancellationToken,
    error::{INVALID_BATCH_SIZE_MESSAGE, MISSING_FIELDS_MESSAGE, MISSING_RESUME_MESSAGE, RelayError},
    usecase::{BatchDispatcher, TemplateRenderer},
};

/// 添付ファイルのフィールド名
const RESUME_FIELD: &str = "resume";

/// 一斉送信ハンドラの State
pub struct SendEmailsState {
    pub attachments:        AttachmentStore,
    pub mail_clients:       Arc<dyn MailClientFactory>,
    pub dispatcher:         BatchDispatcher,
    pub renderer:           TemplateRenderer,
    pub default_batch_size: BatchSize,
}

/// アップロードされたファイル
#[derive(Debug)]
struct UploadedFile {
    file_name:    String,
    content_type: Option<String>,
    bytes:        Bytes,
}

/// multipart フォームの内容
#[derive(Debug, Default)]
struct SendEmailsForm {
    sender_email:   Option<String>,
    app_password:   Option<String>,
    emails:         Option<String>,
    batch_size:     Option<String>,
    name:           Option<String>,
    phone_number:   Option<String>,
    website:        Option<String>,
    degree:         Option<String>,
    custom_message: Option<String>,
    resume:         Option<UploadedFile>,
}

/// POST /send-emails
///
/// 全宛先に送信し、集計結果を返す。
#[tracing::instrument(skip_all)]
pub async fn send_emails(
    State(state): State<Arc<SendEmailsState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<BatchResult>, RelayError> {
    let multipart = multipart.map_err(|e| RelayError::BadRequest(e.body_text()))?;
    let form = read_form(multipart).await?;

    let credentials = SenderCredentials::new(
        form.sender_email.unwrap_or_default(),
        form.app_password.unwrap_or_default(),
    )?;
    let raw_recipients = form
        .emails
        .filter(|emails| !emails.is_empty())
        .ok_or_else(|| RelayError::BadRequest(MISSING_FIELDS_MESSAGE.to_string()))?;
    let resume = form
        .resume
        .ok_or_else(|| RelayError::BadRequest(MISSING_RESUME_MESSAGE.to_string()))?;
    let batch_size = BatchSize::parse(form.batch_size.as_deref(), state.default_batch_size)
        .map_err(|_| RelayError::BadRequest(INVALID_BATCH_SIZE_MESSAGE.to_string()))?;

    let staged = state
        .attachments
        .stage(
            &resume.file_name,
            resume.content_type.as_deref(),
            &resume.bytes,
        )
        .await?;

    let request = SendRequest::new(
        credentials,
        &raw_recipients,
        batch_size,
        MessageTemplate::new(
            form.degree.unwrap_or_default(),
            form.custom_message.unwrap_or_default(),
        ),
        SenderProfile {
            name:         form.name.unwrap_or_default(),
            phone_number: form.phone_number.unwrap_or_default(),
            website:      form.website.unwrap_or_default(),
        },
        staged.attachment_ref().clone(),
    )?;
    let html_body = state.renderer.render(request.template(), request.profile())?;
    let client = state.mail_clients.create_client(request.credentials())?;

    let token = CancellationToken::new();
    let guard = token.clone().drop_guard();
    let dispatcher = state.dispatcher.clone();
    let task = tokio::spawn(
        async move {
            let message = request.outgoing_message(html_body);
            let result = dispatcher
                .dispatch(
                    request.recipients(),
                    request.batch_size(),
                    client.as_ref(),
                    &message,
                    &token,
                )
                .await;
            staged.release().await;
            result
        }
        .in_current_span(),
    );

    let result = task
        .await
        .map_err(|e| RelayError::Internal(format!("送信タスクが異常終了: {e}")))?;
    guard.disarm();

    Ok(Json(result))
}

/// multipart ボディを読み取る
///
/// 未知のフィールドは無視する。同名のフィールドが複数ある場合は後勝ち。
async fn read_form(mut multipart: Multipart) -> Result<SendEmailsForm, RelayError> {
    let mut form = SendEmailsForm::default();

    while let Some(field) = multipart.next_field().await.map_err(malformed)? {
        let Some(name) = field.name().map(ToString::to_string) else {
            continue;
        };

        if name == RESUME_FIELD {
            let file_name = field.file_name().unwrap_or_default().to_string();
            let content_type = field.content_type().map(ToString::to_string);
            let bytes = field.bytes().await.map_err(malformed)?;
            // ファイル未選択のフォームは空のパートを送ってくる
            form.resume = (!bytes.is_empty() || !file_name.is_empty()).then_some(UploadedFile {
                file_name,
                content_type,
                bytes,
            });
            continue;
        }

        let value = field.text().await.map_err(malformed)?;
        let slot = match name.as_str() {
            "senderEmail" => &mut form.sender_email,
            "appPassword" => &mut form.app_password,
            "emails" => &mut form.emails,
            "batchSize" => &mut form.batch_size,
            "name" => &mut form.name,
            "phoneNumber" => &mut form.phone_number,
            "website" => &mut form.website,
            "degree" => &mut form.degree,
            "customMessage" => &mut form.custom_message,
            other => {
                tracing::debug!(field = %other, "未知のフィールドを無視");
                continue;
            }
        };
        *slot = Some(value);
    }

    Ok(form)
}

fn malformed(error: MultipartError) -> RelayError {
    RelayError::BadRequest(format!("Invalid multipart body: {}", error.body_text()))
}
