//! # 一斉送信ユースケース
//!
//! 宛先リストをバッチに分け、バッチ内は並行、バッチ間は逐次で送信する。
//!
//! ## 処理フロー
//!
//! ```text
//! for batch in recipients.batches(batch_size):
//!     (2 バッチ目以降) DelayStrategy の時間だけ待つ … 中断されたらここで終了
//!     batch 内の全宛先に並行送信し、全件の確定を待つ
//!     確定した結果を集計に畳み込む
//! ```
//!
//! ## 失敗の扱い
//!
//! 宛先ごとの送信失敗はログに記録して `failed` に数えるだけで、
//! 他の宛先やリクエスト全体を止めない。

use std::sync::Arc;

use futures::{StreamExt as _, stream::FuturesUnordered};
use mailrelay_domain::{
    delay::DelayStrategy,
    delivery::{BatchResult, DeliveryOutcome},
    message::OutgoingMessage,
    recipient::{BatchSize, RecipientList},
};
use mailrelay_infra::mailer::MailSender;
use mailrelay_shared::{
    event_log::{error as log_error, event},
    log_business_event,
};

use crate::cancellation::CancellationToken;

/// バッチ送信ユースケース
#[derive(Clone)]
pub struct BatchDispatcher {
    delay: Arc<dyn DelayStrategy>,
}

impl BatchDispatcher {
    pub fn new(delay: Arc<dyn DelayStrategy>) -> Self {
        Self { delay }
    }

    /// 全宛先に送信し、集計結果を返す
    ///
    /// `cancel` はバッチ境界（バッチ開始前とバッチ間の待機中）でのみ確認する。
    /// 開始したバッチは必ず全件確定まで実行する。中断した場合、未着手の宛先は
    /// 集計に含まれず `sent + failed < total` になる。
    #[tracing::instrument(
        skip_all,
        fields(total = recipients.len(), batch_size = %batch_size)
    )]
    pub async fn dispatch(
        &self,
        recipients: &RecipientList,
        batch_size: BatchSize,
        sender: &dyn MailSender,
        message: &OutgoingMessage,
        cancel: &CancellationToken,
    ) -> BatchResult {
        let total = recipients.len();
        let batch_count = batch_size.batch_count(total);
        let mut result = BatchResult::new(total);

        log_business_event!(
            event.category = event::category::DISPATCH,
            event.action = event::action::DISPATCH_STARTED,
            event.result = event::result::SUCCESS,
            dispatch.total = total,
            dispatch.batch_count = batch_count,
            "一斉送信を開始"
        );

        for (index, batch) in recipients.batches(batch_size).enumerate() {
            if index > 0 {
                let delay = self.delay.next_delay(batch_count - index);
                tracing::info!(
                    delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                    next_batch = index + 1,
                    "次のバッチまで待機"
                );
                if cancel
                    .run_until_cancelled(tokio::time::sleep(delay))
                    .await
                    .is_none()
                {
                    log_cancelled(&result, index);
                    return result;
                }
            }
            if cancel.is_cancelled() {
                log_cancelled(&result, index);
                return result;
            }

            result.extend(send_batch(sender, batch, message).await);

            log_business_event!(
                event.category = event::category::DISPATCH,
                event.action = event::action::BATCH_SETTLED,
                event.result = event::result::SUCCESS,
                dispatch.batch = index + 1,
                dispatch.batch_count = batch_count,
                dispatch.sent = result.sent(),
                dispatch.failed = result.failed(),
                "バッチ送信が完了"
            );
        }

        let outcome = if result.failed() == 0 {
            event::result::SUCCESS
        } else {
            event::result::FAILURE
        };
        log_business_event!(
            event.category = event::category::DISPATCH,
            event.action = event::action::DISPATCH_COMPLETED,
            event.result = outcome,
            dispatch.total = total,
            dispatch.sent = result.sent(),
            dispatch.failed = result.failed(),
            "一斉送信が完了"
        );

        result
    }
}

/// 1 バッチ分を並行送信し、確定した順に結果を返す
async fn send_batch(
    sender: &dyn MailSender,
    batch: &[String],
    message: &OutgoingMessage,
) -> Vec<DeliveryOutcome> {
    batch
        .iter()
        .map(|recipient| async move {
            match sender.send_one(recipient, message).await {
                Ok(()) => {
                    log_business_event!(
                        event.category = event::category::DISPATCH,
                        event.action = event::action::RECIPIENT_SENT,
                        event.result = event::result::SUCCESS,
                        recipient = %recipient,
                        "メール送信に成功"
                    );
                    DeliveryOutcome::sent(recipient.as_str())
                }
                Err(e) => {
                    tracing::warn!(
                        event.kind = "business_event",
                        event.category = event::category::DISPATCH,
                        event.action = event::action::RECIPIENT_FAILED,
                        event.result = event::result::FAILURE,
                        error.category = log_error::category::EXTERNAL_SERVICE,
                        error.kind = log_error::kind::SMTP,
                        recipient = %recipient,
                        error = %e,
                        "メール送信に失敗"
                    );
                    DeliveryOutcome::failed(recipient.as_str())
                }
            }
        })
        .collect::<FuturesUnordered<_>>()
        .collect()
        .await
}

fn log_cancelled(result: &BatchResult, next_batch_index: usize) {
    tracing::warn!(
        event.kind = "business_event",
        event.category = event::category::DISPATCH,
        event.action = event::action::DISPATCH_CANCELLED,
        event.result = event::result::FAILURE,
        dispatch.total = result.total(),
        dispatch.sent = result.sent(),
        dispatch.failed = result.failed(),
        dispatch.next_batch = next_batch_index + 1,
        "一斉送信を中断"
    );
}
