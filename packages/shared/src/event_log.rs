//! # ビジネスイベントログの構造化ヘルパー
//!
//! `jq` で送信状況を追えるよう、ログフィールドの命名規約とヘルパーマクロを提供する。
//!
//! ## ビジネスイベント
//!
//! [`log_business_event!`] マクロで出力する。`event.kind = "business_event"` マーカーが
//! 自動付与され、`jq 'select(.["event.kind"] == "business_event")'` でフィルタできる。
//!
//! ## フィールド命名規約
//!
//! ドット記法（`event.category`、`error.kind`）を使用。tracing の
//! `$($field:ident).+` パターンでサポートされ、JSON 出力でフラットなキーになる。

/// ビジネスイベントを構造化ログとして出力する。
///
/// `event.kind = "business_event"` マーカーを自動付与し、
/// `tracing::info!` レベルで出力する。呼び出し側クレートが `tracing` に依存していること。
///
/// ## 必須フィールド（慣例）
///
/// - `event.category`: イベントカテゴリ（[`event::category`] の定数を使用）
/// - `event.action`: アクション名（[`event::action`] の定数を使用）
/// - `event.result`: 結果（[`event::result`] の定数を使用）
#[macro_export]
macro_rules! log_business_event {
    ($($args:tt)*) => {
        ::tracing::info!(
            event.kind = "business_event",
            $($args)*
        )
    };
}

/// イベントフィールドの定数
pub mod event {
    /// イベントカテゴリ
    pub mod category {
        pub const DISPATCH: &str = "dispatch";
        pub const ATTACHMENT: &str = "attachment";
    }

    /// イベントアクション
    pub mod action {
        // 一斉送信
        pub const DISPATCH_STARTED: &str = "dispatch.started";
        pub const BATCH_SETTLED: &str = "dispatch.batch_settled";
        pub const DISPATCH_COMPLETED: &str = "dispatch.completed";
        pub const DISPATCH_CANCELLED: &str = "dispatch.cancelled";

        // 宛先単位
        pub const RECIPIENT_SENT: &str = "recipient.sent";
        pub const RECIPIENT_FAILED: &str = "recipient.failed";

        // 添付ファイル
        pub const ATTACHMENT_STAGED: &str = "attachment.staged";
        pub const ATTACHMENT_RELEASED: &str = "attachment.released";
    }

    /// イベント結果
    pub mod result {
        pub const SUCCESS: &str = "success";
        pub const FAILURE: &str = "failure";
    }
}

/// エラーコンテキストフィールドの定数
pub mod error {
    /// エラーカテゴリ
    pub mod category {
        /// ファイルシステム（uploads ディレクトリ、添付ファイル）
        pub const FILESYSTEM: &str = "filesystem";
        /// 外部サービス呼び出し（SMTP プロバイダ）
        pub const EXTERNAL_SERVICE: &str = "external_service";
    }

    /// エラー種別
    pub mod kind {
        pub const SMTP: &str = "smtp";
        pub const STAGING: &str = "staging";
        pub const CLEANUP: &str = "cleanup";
        pub const TEMPLATE: &str = "template";
        pub const INTERNAL: &str = "internal";
    }
}
