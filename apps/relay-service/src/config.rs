//! # Relay Service 設定
//!
//! 環境変数から Relay Service サーバーの設定を読み込む。
//!
//! | 変数名 | デフォルト | 説明 |
//! |--------|-----------|------|
//! | `PORT` | `5000` | ポート番号 |
//! | `RELAY_HOST` | `0.0.0.0` | バインドアドレス |
//! | `UPLOAD_DIR` | `uploads` | 添付ファイルの一時保存先 |
//! | `UPLOAD_MAX_BYTES` | `26214400` | リクエストボディの上限 |
//! | `MAIL_BACKEND` | `smtp` | `smtp` / `noop` |
//! | `SMTP_RELAY_HOST` | `smtp.gmail.com` | SMTP リレーホスト |
//! | `BATCH_DELAY_MIN_MS` | `180000` | バッチ間待機の下限 |
//! | `BATCH_DELAY_MAX_MS` | `300000` | バッチ間待機の上限 |
//! | `DEFAULT_BATCH_SIZE` | `70` | フォームで省略されたときのバッチサイズ |

use std::{env, path::PathBuf, str::FromStr, time::Duration};

use mailrelay_domain::{delay::RandomDelay, recipient::BatchSize};
use mailrelay_infra::mailer::MailBackend;
use thiserror::Error;

/// 設定読み込みエラー
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} の値が不正です: {value:?} ({reason})")]
    Invalid {
        name:   &'static str,
        value:  String,
        reason: String,
    },
}

/// Relay Service サーバーの設定
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// バインドアドレス
    pub host:               String,
    /// ポート番号
    pub port:               u16,
    /// 添付ファイルの一時保存先
    pub upload_dir:         PathBuf,
    /// リクエストボディの上限（バイト）
    pub upload_max_bytes:   usize,
    /// メール送信バックエンド
    pub mail_backend:       MailBackend,
    /// SMTP リレーホスト
    pub smtp_relay_host:    String,
    /// バッチ間の待機時間
    pub batch_delay:        RandomDelay,
    /// 既定のバッチサイズ
    pub default_batch_size: BatchSize,
}

impl RelayConfig {
    /// 環境変数から設定を読み込む
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// 任意の読み出し関数から設定を読み込む
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let delay_min = parse_or(&lookup, "BATCH_DELAY_MIN_MS", millis(RandomDelay::DEFAULT_MIN))?;
        let delay_max = parse_or(&lookup, "BATCH_DELAY_MAX_MS", millis(RandomDelay::DEFAULT_MAX))?;
        let batch_delay = RandomDelay::new(
            Duration::from_millis(delay_min),
            Duration::from_millis(delay_max),
        )
        .map_err(|e| ConfigError::Invalid {
            name:   "BATCH_DELAY_MIN_MS",
            value:  delay_min.to_string(),
            reason: e.to_string(),
        })?;

        let batch_size = parse_or(&lookup, "DEFAULT_BATCH_SIZE", BatchSize::DEFAULT)?;
        let default_batch_size = BatchSize::new(batch_size).map_err(|e| ConfigError::Invalid {
            name:   "DEFAULT_BATCH_SIZE",
            value:  batch_size.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            host: lookup("RELAY_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse_or(&lookup, "PORT", 5000)?,
            upload_dir: lookup("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("uploads")),
            upload_max_bytes: parse_or(&lookup, "UPLOAD_MAX_BYTES", 25 * 1024 * 1024)?,
            mail_backend: parse_or(&lookup, "MAIL_BACKEND", MailBackend::Smtp)?,
            smtp_relay_host: lookup("SMTP_RELAY_HOST")
                .unwrap_or_else(|| "smtp.gmail.com".to_string()),
            batch_delay,
            default_batch_size,
        })
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// 未設定・空文字列なら `default`、それ以外はパースする
fn parse_or<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: T,
) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(name).filter(|value| !value.trim().is_empty()) {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            name,
            reason: e.to_string(),
            value,
        }),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<RelayConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        RelayConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_未設定ならデフォルト値を使う() {
        let config = load(&[]).unwrap();

        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 5000);
        assert_eq!(config.upload_dir, PathBuf::from("uploads"));
        assert_eq!(config.upload_max_bytes, 26_214_400);
        assert_eq!(config.mail_backend, MailBackend::Smtp);
        assert_eq!(config.smtp_relay_host, "smtp.gmail.com");
        assert_eq!(config.batch_delay, RandomDelay::default());
        assert_eq!(config.default_batch_size, BatchSize::default());
    }

    #[test]
    fn test_環境変数の値で上書きできる() {
        let config = load(&[
            ("PORT", "8080"),
            ("RELAY_HOST", "127.0.0.1"),
            ("UPLOAD_DIR", "/tmp/mailrelay"),
            ("MAIL_BACKEND", "noop"),
            ("BATCH_DELAY_MIN_MS", "10"),
            ("BATCH_DELAY_MAX_MS", "20"),
            ("DEFAULT_BATCH_SIZE", "5"),
        ])
        .unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.upload_dir, PathBuf::from("/tmp/mailrelay"));
        assert_eq!(config.mail_backend, MailBackend::Noop);
        assert_eq!(config.batch_delay.min(), Duration::from_millis(10));
        assert_eq!(config.batch_delay.max(), Duration::from_millis(20));
        assert_eq!(config.default_batch_size.get(), 5);
    }

    #[test]
    fn test_空文字列は未設定として扱う() {
        let config = load(&[("PORT", "")]).unwrap();

        assert_eq!(config.port, 5000);
    }

    #[rstest]
    #[case("PORT", "not-a-port")]
    #[case("PORT", "70000")]
    #[case("MAIL_BACKEND", "ses")]
    #[case("DEFAULT_BATCH_SIZE", "0")]
    #[case("UPLOAD_MAX_BYTES", "-1")]
    fn test_不正な値はエラー(#[case] name: &str, #[case] value: &str) {
        assert!(load(&[(name, value)]).is_err());
    }

    #[test]
    fn test_待機時間の下限が上限を超えるとエラー() {
        let result = load(&[("BATCH_DELAY_MIN_MS", "500"), ("BATCH_DELAY_MAX_MS", "100")]);

        assert!(matches!(
            result,
            Err(ConfigError::Invalid {
                name: "BATCH_DELAY_MIN_MS",
                ..
            })
        ));
    }
}
