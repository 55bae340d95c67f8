//! # 送信結果
//!
//! 宛先ごとの送信結果 [`DeliveryOutcome`] と、リクエスト全体の集計 [`BatchResult`]。
//!
//! ## 不変条件
//!
//! - 集計は `record()` でのみ更新され、`sent` / `failed` は単調増加する
//! - 全宛先の結果を記録し終えたら `sent + failed == total`
//! - `sent_emails` は記録順（バッチ内では完了順）
//!
//! `BatchResult` はそのまま 200 応答の JSON になる:
//!
//! ```json
//! { "total": 3, "sent": 2, "failed": 1, "sentEmails": ["a@example.com", "c@example.com"] }
//! ```

use serde::Serialize;
use strum::IntoStaticStr;

/// 送信ステータス
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoStaticStr, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum DeliveryStatus {
    /// プロバイダが受理した
    Sent,
    /// 送信に失敗した（認証・ネットワーク・拒否など）
    Failed,
}

/// 1 宛先分の送信結果
///
/// 送信試行が確定（settle）した時点で作成され、以後変更されない。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryOutcome {
    recipient: String,
    status:    DeliveryStatus,
}

impl DeliveryOutcome {
    pub fn sent(recipient: impl Into<String>) -> Self {
        Self {
            recipient: recipient.into(),
            status:    DeliveryStatus::Sent,
        }
    }

    pub fn failed(recipient: impl Into<String>) -> Self {
        Self {
            recipient: recipient.into(),
            status:    DeliveryStatus::Failed,
        }
    }

    pub fn recipient(&self) -> &str {
        &self.recipient
    }

    pub fn status(&self) -> DeliveryStatus {
        self.status
    }

    pub fn is_sent(&self) -> bool {
        self.status == DeliveryStatus::Sent
    }
}

/// 一斉送信の集計結果
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchResult {
    total:       usize,
    sent:        usize,
    failed:      usize,
    sent_emails: Vec<String>,
}

impl BatchResult {
    /// 送信開始時の集計（すべて 0）を作る
    pub fn new(total: usize) -> Self {
        Self {
            total,
            ..Self::default()
        }
    }

    /// 1 宛先分の結果を集計に反映する
    pub fn record(&mut self, outcome: DeliveryOutcome) {
        match outcome.status {
            DeliveryStatus::Sent => {
                self.sent += 1;
                self.sent_emails.push(outcome.recipient);
            }
            DeliveryStatus::Failed => self.failed += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn sent(&self) -> usize {
        self.sent
    }

    pub fn failed(&self) -> usize {
        self.failed
    }

    pub fn sent_emails(&self) -> &[String] {
        &self.sent_emails
    }

    /// 記録済みの件数
    pub fn settled(&self) -> usize {
        self.sent + self.failed
    }

    /// 全宛先の結果が記録済みか
    pub fn is_complete(&self) -> bool {
        self.settled() == self.total
    }
}

impl Extend<DeliveryOutcome> for BatchResult {
    fn extend<I: IntoIterator<Item = DeliveryOutcome>>(&mut self, outcomes: I) {
        for outcome in outcomes {
            self.record(outcome);
        }
    }
}
