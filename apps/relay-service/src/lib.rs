//! # Relay Service ライブラリ
//!
//! Relay Service のハンドラ・ユースケース・ルーター構築を公開する。
//! 統合テストから同じルーターを組み立てられるようにする。

pub mod app_builder;
pub mod cancellation;
pub mod config;
pub mod error;
pub mod handler;
pub mod usecase;
