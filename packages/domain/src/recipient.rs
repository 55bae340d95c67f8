//! # 宛先リストとバッチ分割
//!
//! カンマ区切りの宛先文字列を [`RecipientList`] に変換し、
//! [`BatchSize`] ごとの連続したスライス（バッチ）に分割する。
//!
//! ## ルール
//!
//! - 各要素は前後の空白を除去し、空になった要素は捨てる
//! - 重複は除去しない（入力順をそのまま保持する）
//! - 最後のバッチだけがバッチサイズより短くなりうる

use std::num::NonZeroUsize;

use derive_more::Display;

use crate::DomainError;

/// 宛先リスト
///
/// 入力順を保持した宛先メールアドレスの列。空リストも有効な値として扱う
/// （送信 0 件の結果を返す）。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipientList(Vec<String>);

impl RecipientList {
    /// カンマ区切りの文字列からリストを作る
    pub fn parse(raw: &str) -> Self {
        Self(
            raw.split(',')
                .map(str::trim)
                .filter(|email| !email.is_empty())
                .map(ToString::to_string)
                .collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    /// バッチサイズごとに分割したスライスを入力順に返す
    pub fn batches(&self, batch_size: BatchSize) -> std::slice::Chunks<'_, String> {
        self.0.chunks(batch_size.get())
    }
}

impl From<Vec<String>> for RecipientList {
    fn from(recipients: Vec<String>) -> Self {
        Self(recipients)
    }
}

/// バッチサイズ（1 以上）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[display("{_0}")]
pub struct BatchSize(NonZeroUsize);

impl BatchSize {
    /// フォームで省略されたときのバッチサイズ
    pub const DEFAULT: usize = 70;

    const DEFAULT_NON_ZERO: NonZeroUsize = NonZeroUsize::new(Self::DEFAULT).unwrap();

    /// バッチサイズを作成する
    ///
    /// # エラー
    ///
    /// 0 の場合は `DomainError::Validation` を返す。
    pub fn new(value: usize) -> Result<Self, DomainError> {
        NonZeroUsize::new(value)
            .map(Self)
            .ok_or_else(|| {
                DomainError::Validation("batchSize は 1 以上である必要があります".to_string())
            })
    }

    /// フォーム値からバッチサイズを作成する
    ///
    /// 未指定または空文字列なら `default` を使う。負数・0・数値以外は拒否する。
    pub fn parse(raw: Option<&str>, default: BatchSize) -> Result<Self, DomainError> {
        let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
            return Ok(default);
        };

        let value: i64 = raw.parse().map_err(|_| {
            DomainError::Validation(format!("batchSize は整数である必要があります: {raw}"))
        })?;

        let value = usize::try_from(value).map_err(|_| {
            DomainError::Validation("batchSize は 1 以上である必要があります".to_string())
        })?;

        Self::new(value)
    }

    pub fn get(self) -> usize {
        self.0.get()
    }

    /// `recipient_count` 件を送るのに必要なバッチ数（切り上げ）
    pub fn batch_count(self, recipient_count: usize) -> usize {
        recipient_count.div_ceil(self.get())
    }
}

impl Default for BatchSize {
    fn default() -> Self {
        Self(Self::DEFAULT_NON_ZERO)
    }
}
