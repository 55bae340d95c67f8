//! # テンプレートレンダラー
//!
//! tera テンプレートエンジンで、全宛先に共通の HTML 本文を生成する。
//!
//! ## 設計方針
//!
//! - **`include_str!` によるコンパイル時埋め込み**: テンプレートはバイナリに埋め込まれる
//! - **自動エスケープ**: 署名の表示値は tera の autoescape（`.html` テンプレート）でエスケープする
//! - **`customMessage` は生のマークアップ**: `| safe` で挿入する。
//!   ただし中のプレースホルダに入れる表示値は、署名と同じくエスケープしてから置換する

use mailrelay_domain::message::{MessageTemplate, SenderProfile};
use tera::{Context, Tera};

use crate::error::RelayError;

/// 本文テンプレートの登録名（拡張子 `.html` で autoescape が有効になる）
const MESSAGE_TEMPLATE: &str = "message.html";

/// テンプレートレンダラー
///
/// tera テンプレートエンジンをラップし、`MessageTemplate` と `SenderProfile` から
/// HTML 本文を生成する。
pub struct TemplateRenderer {
    engine: Tera,
}

impl TemplateRenderer {
    /// 新しいレンダラーインスタンスを作成
    ///
    /// `include_str!` で埋め込んだテンプレートを tera に登録する。
    pub fn new() -> Result<Self, RelayError> {
        Self::from_source(include_str!("../../templates/message.html"))
    }

    /// 任意のテンプレート文字列からレンダラーを作成する
    ///
    /// # エラー
    ///
    /// テンプレートの構文が不正なら `RelayError::Template` を返す。
    pub fn from_source(source: &str) -> Result<Self, RelayError> {
        let mut engine = Tera::default();

        engine
            .add_raw_templates(vec![(MESSAGE_TEMPLATE, source)])
            .map_err(|e| RelayError::Template(e.to_string()))?;

        Ok(Self { engine })
    }

    /// 署名付きの HTML 本文を生成する
    ///
    /// # エラー
    ///
    /// テンプレートの評価に失敗すると `RelayError::Template` を返す。
    pub fn render(
        &self,
        template: &MessageTemplate,
        profile: &SenderProfile,
    ) -> Result<String, RelayError> {
        let custom_message = profile.placeholders().into_iter().fold(
            template.body.clone(),
            |body, (placeholder, value)| body.replace(placeholder, &tera::escape_html(value)),
        );

        let mut context = Context::new();
        context.insert("custom_message", &custom_message);
        context.insert("name", &profile.name);
        context.insert("phone_number", &profile.phone_number);
        context.insert("website", &profile.website);

        self.engine
            .render(MESSAGE_TEMPLATE, &context)
            .map_err(|e| RelayError::Template(e.to_string()))
    }
}
