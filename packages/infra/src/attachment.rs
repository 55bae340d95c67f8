//! # 添付ファイルのステージング
//!
//! アップロードされた PDF を uploads ディレクトリに一時保存し、
//! 送信が終わったら必ず 1 回だけ削除する。
//!
//! ## ライフサイクル
//!
//! ```text
//! AttachmentStore::stage() ──▶ StagedAttachment ──▶ release().await  … 明示的な削除（tokio::fs）
//!                                               └─▶ Drop             … release されずに破棄された場合（同期）
//! ```
//!
//! 削除に失敗してもエラーは呼び出し側に返さず、ログに残すだけにする。
//! 送信結果の応答を削除失敗で上書きしないため。

use std::path::{Path, PathBuf};

use mailrelay_domain::message::AttachmentRef;
use mailrelay_shared::{
    event_log::{error as log_error, event},
    log_business_event,
};
use tokio::io::AsyncWriteExt as _;

use crate::error::InfraError;

/// 受け付ける Content-Type
pub const PDF_CONTENT_TYPE: &str = "application/pdf";

/// PDF 以外を受け取った場合のメッセージ
pub const ONLY_PDF_MESSAGE: &str = "Only PDF files are allowed";

/// 同一ミリ秒内の衝突時に試すサフィックスの上限
const MAX_NAME_ATTEMPTS: u32 = 100;

/// 添付ファイルの一時保存先
#[derive(Debug, Clone)]
pub struct AttachmentStore {
    upload_dir: PathBuf,
}

impl AttachmentStore {
    pub fn new(upload_dir: impl Into<PathBuf>) -> Self {
        Self {
            upload_dir: upload_dir.into(),
        }
    }

    pub fn upload_dir(&self) -> &Path {
        &self.upload_dir
    }

    /// アップロードされたファイルを保存する
    ///
    /// ファイル名は受信時刻のミリ秒タイムスタンプに元の拡張子を付けたもの。
    /// ディレクトリが無ければ作成する。
    ///
    /// # エラー
    ///
    /// - Content-Type が `application/pdf` でない: `InvalidInput`
    /// - ディレクトリ作成・書き込みの失敗: `Io`
    #[tracing::instrument(skip(self, bytes), fields(upload_dir = %self.upload_dir.display(), size = bytes.len()))]
    pub async fn stage(
        &self,
        original_name: &str,
        content_type: Option<&str>,
        bytes: &[u8],
    ) -> Result<StagedAttachment, InfraError> {
        if !is_pdf(content_type) {
            return Err(InfraError::invalid_input(ONLY_PDF_MESSAGE));
        }

        tokio::fs::create_dir_all(&self.upload_dir).await?;

        let (path, mut file) = self.create_unique(original_name).await?;
        let written = async {
            file.write_all(bytes).await?;
            file.flush().await
        }
        .await;
        if let Err(e) = written {
            // 書きかけのファイルを残さない
            let _ = tokio::fs::remove_file(&path).await;
            return Err(e.into());
        }

        log_business_event!(
            event.category = event::category::ATTACHMENT,
            event.action = event::action::ATTACHMENT_STAGED,
            event.result = event::result::SUCCESS,
            attachment.path = %path.display(),
            attachment.original_name = original_name,
            "添付ファイルを保存"
        );

        Ok(StagedAttachment {
            reference: AttachmentRef::new(path, original_name),
            released:  false,
        })
    }

    async fn create_unique(
        &self,
        original_name: &str,
    ) -> Result<(PathBuf, tokio::fs::File), InfraError> {
        let stem = chrono::Utc::now().timestamp_millis().to_string();
        let extension = Path::new(original_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| format!(".{ext}"))
            .unwrap_or_default();

        let mut last_error = None;
        for attempt in 0..MAX_NAME_ATTEMPTS {
            let file_name = if attempt == 0 {
                format!("{stem}{extension}")
            } else {
                format!("{stem}-{attempt}{extension}")
            };
            let path = self.upload_dir.join(file_name);

            match tokio::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await
            {
                Ok(file) => return Ok((path, file)),
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => last_error = Some(e),
                Err(e) => return Err(e.into()),
            }
        }

        Err(last_error
            .unwrap_or_else(|| std::io::Error::from(std::io::ErrorKind::AlreadyExists))
            .into())
    }
}

fn is_pdf(content_type: Option<&str>) -> bool {
    content_type
        .and_then(|ct| ct.split(';').next())
        .is_some_and(|essence| essence.trim().eq_ignore_ascii_case(PDF_CONTENT_TYPE))
}

/// 保存済みの添付ファイル
///
/// 所有者が 1 つだけになるよう `Clone` を実装しない。
/// `release()` を呼ばずに破棄された場合も `Drop` で削除する。
#[derive(Debug)]
pub struct StagedAttachment {
    reference: AttachmentRef,
    released:  bool,
}

impl StagedAttachment {
    /// 送信に使う添付ファイル参照
    pub fn attachment_ref(&self) -> &AttachmentRef {
        &self.reference
    }

    pub fn path(&self) -> &Path {
        self.reference.path()
    }

    /// ファイルを削除する
    ///
    /// 失敗はログに記録するのみ。完了前に Future が破棄された場合は `Drop` が削除する。
    pub async fn release(mut self) {
        let result = tokio::fs::remove_file(self.reference.path()).await;
        self.released = true;
        log_removal(self.reference.path(), result);
    }
}

impl Drop for StagedAttachment {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        self.released = true;

        let path = self.reference.path();
        log_removal(path, std::fs::remove_file(path));
    }
}

fn log_removal(path: &Path, result: std::io::Result<()>) {
    match result {
        Ok(()) => {
            log_business_event!(
                event.category = event::category::ATTACHMENT,
                event.action = event::action::ATTACHMENT_RELEASED,
                event.result = event::result::SUCCESS,
                attachment.path = %path.display(),
                "添付ファイルを削除"
            );
        }
        Err(e) => {
            tracing::error!(
                event.kind = "error",
                error.category = log_error::category::FILESYSTEM,
                error.kind = log_error::kind::CLEANUP,
                attachment.path = %path.display(),
                error = %e,
                "添付ファイルの削除に失敗"
            );
        }
    }
}
