//! # ユースケース層
//!
//! Relay Service のビジネスロジックを実装する。
//!
//! ## 設計方針
//!
//! - **依存性注入**: 送信手段と待機戦略を `Arc<dyn Trait>` / `&dyn Trait` で外部から注入
//! - **薄いハンドラ**: ハンドラは入力の検証と後始末に専念し、送信ロジックはユースケースに集約
//!
//! ## モジュール構成
//!
//! - `dispatch`: バッチ単位の一斉送信
//! - `template_renderer`: 署名付き HTML 本文の生成

pub mod dispatch;
pub mod template_renderer;

pub use dispatch::BatchDispatcher;
pub use template_renderer::TemplateRenderer;
