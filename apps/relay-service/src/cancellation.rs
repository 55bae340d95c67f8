//! # 送信の中断
//!
//! 呼び出し元が切断したとき、実行中の一斉送信を次のバッチ境界で止めるためのトークン。
//!
//! ```text
//! handler ── DropGuard ──┐ drop（切断でハンドラの Future が破棄される）
//!                        ▼
//! dispatch task ── CancellationToken::is_cancelled() / cancelled()
//! ```

use std::sync::Arc;

use tokio::sync::watch;

/// 中断トークン
///
/// クローンはすべて同じ状態を共有する。
#[derive(Debug, Clone)]
pub struct CancellationToken {
    state: Arc<CancellationState>,
}

#[derive(Debug)]
struct CancellationState {
    tx: watch::Sender<bool>,
    rx: watch::Receiver<bool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        let (tx, rx) = watch::channel(false);
        Self {
            state: Arc::new(CancellationState { tx, rx }),
        }
    }

    /// 中断が要求されているか
    pub fn is_cancelled(&self) -> bool {
        *self.state.rx.borrow()
    }

    /// 中断を要求する
    pub fn cancel(&self) {
        let _ = self.state.tx.send(true);
        tracing::debug!("送信の中断が要求されました");
    }

    /// 中断されるまで待つ（既に中断済みなら即座に返る）
    pub async fn cancelled(&self) {
        let mut rx = self.state.rx.clone();
        while !*rx.borrow() {
            if rx.changed().await.is_err() {
                break;
            }
        }
    }

    /// `future` を実行し、先に中断された場合は `None` を返す
    pub async fn run_until_cancelled<F, T>(&self, future: F) -> Option<T>
    where
        F: Future<Output = T>,
    {
        tokio::select! {
            result = future => Some(result),
            () = self.cancelled() => None,
        }
    }

    /// 破棄時に中断を要求するガードを作る
    pub fn drop_guard(self) -> DropGuard {
        DropGuard { token: Some(self) }
    }
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}

/// 破棄時にトークンを中断するガード
#[derive(Debug)]
pub struct DropGuard {
    token: Option<CancellationToken>,
}

impl DropGuard {
    /// 中断せずにガードを解除する
    pub fn disarm(mut self) -> CancellationToken {
        self.token.take().unwrap_or_default()
    }
}

impl Drop for DropGuard {
    fn drop(&mut self) {
        if let Some(token) = self.token.take() {
            token.cancel();
        }
    }
}
