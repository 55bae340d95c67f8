//! # メッセージ
//!
//! 全宛先に共通の件名・本文テンプレート・署名の表示値・添付ファイル参照を定義する。
//!
//! HTML 文書への組み立てはアプリケーション層のテンプレートレンダラーが行う。
//! ここではフォーム入力をそのまま保持し、`customMessage` 内のプレースホルダ
//! （`{name}` / `{phoneNumber}` / `{website}`）と置換値の対応だけを定める。

use std::path::{Path, PathBuf};

/// 送信者の表示情報（署名ブロックに入る）
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SenderProfile {
    pub name:         String,
    pub phone_number: String,
    pub website:      String,
}

impl SenderProfile {
    /// `customMessage` 内のプレースホルダ名と置換値の組
    pub fn placeholders(&self) -> [(&'static str, &str); 3] {
        [
            ("{name}", self.name.as_str()),
            ("{phoneNumber}", self.phone_number.as_str()),
            ("{website}", self.website.as_str()),
        ]
    }
}

/// 件名と本文テンプレート
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageTemplate {
    /// 件名（フォームの `degree`）
    pub subject: String,
    /// HTML 本文の断片（フォームの `customMessage`）
    pub body:    String,
}

impl MessageTemplate {
    pub fn new(subject: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            body:    body.into(),
        }
    }
}

/// 添付ファイル参照
///
/// ステージング済みファイルのパスと、アップロード時の元ファイル名。
/// 送信時は元ファイル名で添付する。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentRef {
    path:          PathBuf,
    original_name: String,
}

impl AttachmentRef {
    pub fn new(path: impl Into<PathBuf>, original_name: impl Into<String>) -> Self {
        Self {
            path:          path.into(),
            original_name: original_name.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn original_name(&self) -> &str {
        &self.original_name
    }
}

/// 1 宛先に送るメッセージ（宛先以外は全宛先で共通）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMessage {
    pub subject:    String,
    pub html_body:  String,
    pub attachment: AttachmentRef,
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn profile() -> SenderProfile {
        SenderProfile {
            name:         "Jeanne Martin".to_string(),
            phone_number: "+33 6 12 34 56 78".to_string(),
            website:      "https://jeanne.example.com".to_string(),
        }
    }

    #[test]
    fn test_placeholders_は3つのプレースホルダを表示値に対応付ける() {
        let profile = profile();

        assert_eq!(
            profile.placeholders(),
            [
                ("{name}", "Jeanne Martin"),
                ("{phoneNumber}", "+33 6 12 34 56 78"),
                ("{website}", "https://jeanne.example.com"),
            ]
        );
    }

    #[test]
    fn test_attachment_ref_はパスと元ファイル名を保持する() {
        let attachment = AttachmentRef::new("/tmp/uploads/1700000000000.pdf", "cv.pdf");

        assert_eq!(attachment.path(), Path::new("/tmp/uploads/1700000000000.pdf"));
        assert_eq!(attachment.original_name(), "cv.pdf");
    }
}
