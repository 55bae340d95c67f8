//! # バッチ間の待機戦略
//!
//! プロバイダのレート制限を避けるため、バッチとバッチの間で一定時間待つ。
//! 待機時間の決め方を [`DelayStrategy`] で抽象化し、テストでは待たない実装に差し替える。
//!
//! | 実装 | 用途 |
//! |------|------|
//! | [`RandomDelay`] | 本番。区間内の一様乱数（既定 180 000〜300 000 ms） |
//! | [`FixedDelay`] | 固定時間 |
//! | [`NoDelay`] | テスト・ローカル検証 |

use std::time::Duration;

use rand::Rng;

use crate::DomainError;

/// バッチ間の待機時間を決めるトレイト
pub trait DelayStrategy: Send + Sync {
    /// 次のバッチを始める前の待機時間
    ///
    /// `remaining_batches` はこれから実行するバッチ数（1 以上）。
    fn next_delay(&self, remaining_batches: usize) -> Duration;
}

/// 区間 `[min, max]` から一様に選ぶ待機戦略
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RandomDelay {
    min: Duration,
    max: Duration,
}

impl RandomDelay {
    /// 既定の下限（3 分）
    pub const DEFAULT_MIN: Duration = Duration::from_millis(180_000);
    /// 既定の上限（5 分）
    pub const DEFAULT_MAX: Duration = Duration::from_millis(300_000);

    /// # エラー
    ///
    /// `min > max` の場合は `DomainError::Validation` を返す。
    pub fn new(min: Duration, max: Duration) -> Result<Self, DomainError> {
        if min > max {
            return Err(DomainError::Validation(format!(
                "待機時間の下限 {min:?} が上限 {max:?} を超えています"
            )));
        }
        Ok(Self { min, max })
    }

    pub fn min(&self) -> Duration {
        self.min
    }

    pub fn max(&self) -> Duration {
        self.max
    }
}

impl Default for RandomDelay {
    fn default() -> Self {
        Self {
            min: Self::DEFAULT_MIN,
            max: Self::DEFAULT_MAX,
        }
    }
}

impl DelayStrategy for RandomDelay {
    fn next_delay(&self, _remaining_batches: usize) -> Duration {
        let min_ms = self.min.as_millis() as u64;
        let max_ms = self.max.as_millis() as u64;
        Duration::from_millis(rand::rng().random_range(min_ms..=max_ms))
    }
}

/// 常に同じ時間だけ待つ戦略
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedDelay(pub Duration);

impl DelayStrategy for FixedDelay {
    fn next_delay(&self, _remaining_batches: usize) -> Duration {
        self.0
    }
}

/// 待たない戦略
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoDelay;

impl DelayStrategy for NoDelay {
    fn next_delay(&self, _remaining_batches: usize) -> Duration {
        Duration::ZERO
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_random_delay_の既定区間は180000から300000ミリ秒() {
        let delay = RandomDelay::default();

        assert_eq!(delay.min(), Duration::from_millis(180_000));
        assert_eq!(delay.max(), Duration::from_millis(300_000));
    }

    #[test]
    fn test_random_delay_は常に区間内の値を返す() {
        let delay = RandomDelay::default();

        for remaining in 1..=500 {
            let d = delay.next_delay(remaining);
            assert!(d >= RandomDelay::DEFAULT_MIN, "{d:?} は下限未満");
            assert!(d <= RandomDelay::DEFAULT_MAX, "{d:?} は上限超過");
        }
    }

    #[test]
    fn test_random_delay_下限と上限が同じなら固定値になる() {
        let d = Duration::from_millis(42);
        let delay = RandomDelay::new(d, d).unwrap();

        assert_eq!(delay.next_delay(3), d);
    }

    #[test]
    fn test_random_delay_下限が上限を超えるとエラー() {
        let result = RandomDelay::new(Duration::from_secs(10), Duration::from_secs(1));

        assert!(matches!(result, Err(DomainError::Validation(_))));
    }

    #[test]
    fn test_fixed_delay_とno_delay() {
        assert_eq!(
            FixedDelay(Duration::from_secs(2)).next_delay(1),
            Duration::from_secs(2)
        );
        assert_eq!(NoDelay.next_delay(1), Duration::ZERO);
    }
}
