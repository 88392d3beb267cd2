//! 自动推进定时任务
//!
//! 播放器打开期间由一个后台任务按固定节拍驱动播放时钟，
//! 条目播满时长后自动推进。任务通过 CancellationToken 取消：
//! 关闭播放器（或重新打开）时立即取消，取消后不会再有节拍
//! 落到会话上。上报中的观看请求不随任务取消，它们只引用发起
//! 时捕获的瞬间 ID。

use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use super::engine::StoryPlaybackEngine;
use crate::api::RemoteDataService;

/// 自动推进节拍间隔（毫秒）
pub const AUTOPLAY_TICK_MS: u64 = 100;

impl<S: RemoteDataService> StoryPlaybackEngine<S> {
    /// 停止自动推进（未启动时为空操作）
    pub fn stop_autoplay(&self) {
        if let Some(token) = self.autoplay.lock().take() {
            token.cancel();
        }
    }
}

/// 启动自动推进任务
///
/// 重复调用会先取消上一个任务，引擎上同时至多一个节拍来源。
/// 循环内先查取消再等节拍，保证取消之后不会再执行任何节拍。
pub fn start_autoplay<S: RemoteDataService + 'static>(engine: &Arc<StoryPlaybackEngine<S>>) {
    engine.stop_autoplay();

    let token = CancellationToken::new();
    *engine.autoplay.lock() = Some(token.clone());

    let engine = Arc::clone(engine);
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_millis(AUTOPLAY_TICK_MS));
        let delta_secs = AUTOPLAY_TICK_MS as f64 / 1000.0;
        loop {
            tokio::select! {
                biased;
                _ = token.cancelled() => break,
                _ = ticker.tick() => {
                    match engine.tick(delta_secs).await {
                        Ok(Some(_)) => {}
                        // 播放器已关闭，任务结束
                        Ok(None) => break,
                        // 观看上报失败不中断播放
                        Err(e) => eprintln!("[Story] 自动推进出错: {}", e),
                    }
                }
            }
        }
    });
}
