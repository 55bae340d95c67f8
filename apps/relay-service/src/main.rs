//! # Relay Service サーバー
//!
//! 1 通のメッセージ（PDF 添付付き）を宛先リストにバッチ単位で送る HTTP サービス。
//!
//! ## 役割
//!
//! - **入力の検証**: 必須項目と添付 PDF の確認
//! - **一斉送信**: バッチ内は並行、バッチ間はランダムな待機を挟んで逐次
//! - **後始末**: 保存した添付ファイルを送信後に削除
//!
//! ## 環境変数
//!
//! [`config`](mailrelay_relay_service::config) を参照。`.env` があれば読み込む。
//!
//! ## 起動方法
//!
//! ```bash
//! # 開発環境（実際には送信しない）
//! MAIL_BACKEND=noop cargo run -p mailrelay-relay-service
//!
//! # 本番環境
//! PORT=5000 LOG_FORMAT=json cargo run -p mailrelay-relay-service --release
//! ```

use std::{net::SocketAddr, sync::Arc};

use mailrelay_infra::attachment::AttachmentStore;
use mailrelay_relay_service::{
    app_builder::build_app,
    config::RelayConfig,
    handler::SendEmailsState,
    usecase::{BatchDispatcher, TemplateRenderer},
};
use mailrelay_shared::observability::{TracingConfig, init_tracing};
use tokio::net::TcpListener;

/// Relay Service サーバーのエントリーポイント
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env ファイルを読み込む（存在する場合）
    dotenvy::dotenv().ok();

    // トレーシング初期化
    let tracing_config = TracingConfig::from_env("relay-service");
    init_tracing(tracing_config);
    let _tracing_guard = tracing::info_span!("app", service = "relay-service").entered();

    // 設定読み込み
    let config = RelayConfig::from_env()?;
    let backend: &str = config.mail_backend.into();

    tracing::info!(
        mail_backend = backend,
        smtp_relay_host = %config.smtp_relay_host,
        upload_dir = %config.upload_dir.display(),
        "Relay Service サーバーを起動します: {}:{}",
        config.host,
        config.port
    );

    let state = Arc::new(SendEmailsState {
        attachments:        AttachmentStore::new(&config.upload_dir),
        mail_clients:       config.mail_backend.factory(&config.smtp_relay_host),
        dispatcher:         BatchDispatcher::new(Arc::new(config.batch_delay)),
        renderer:           TemplateRenderer::new()?,
        default_batch_size: config.default_batch_size,
    });

    let app = build_app(state, config.upload_max_bytes);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!("Relay Service サーバーが起動しました: {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
