//! # ルーター構築
//!
//! ルート定義とミドルウェアの構成。`main.rs` と統合テストの両方から使う。
//!
//! ## レイヤー順序（外側から）
//!
//! 1. `SetRequestIdLayer`: UUID v7 の Request ID を付与（クライアント提供値があればそれを使う）
//! 2. `TraceLayer`: Request ID を含むスパンでリクエストをトレース
//! 3. `PropagateRequestIdLayer`: レスポンスヘッダーに `X-Request-Id` をコピー
//! 4. `CorsLayer`: 任意のオリジンを許可
//! 5. `RequestBodyLimitLayer`: ボディサイズの上限

use std::sync::Arc;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use mailrelay_shared::observability::{MakeRequestUuidV7, make_request_span};
use tower_http::{
    cors::CorsLayer,
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::handler::{SendEmailsState, health_check, send_emails};

/// ルーターを構築する
pub fn build_app(state: Arc<SendEmailsState>, upload_max_bytes: usize) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/send-emails", post(send_emails))
        .with_state(state)
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(upload_max_bytes))
        .layer(CorsLayer::permissive())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http().make_span_with(make_request_span))
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7))
}
