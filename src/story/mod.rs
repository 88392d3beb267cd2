/*!
 * 瞬间（Story）播放模块
 *
 * 实现限时瞬间的分组浏览与定时自动推进
 *
 * 功能：
 * - 信息流缓存：拉取失败时保留旧缓存
 * - 播放引擎：组内逐条推进、跨组衔接、回退、到头关闭
 * - 每条瞬间默认播放 10 秒，视频在播放器报告实际时长后覆盖
 * - 观看上报：同一会话内每条瞬间至多上报一次
 * - 主人操作：编辑、删除自己的瞬间
 * - 自动推进：定时任务驱动，关闭播放器时立即取消
 *
 * 模块结构：
 * - feed: 信息流缓存
 * - engine: 播放状态机（光标、观看登记、主人操作）
 * - autoplay: 自动推进定时任务
 */

pub mod autoplay;
pub mod engine;
pub mod feed;

use serde::Serialize;

pub use autoplay::start_autoplay;
pub use engine::{PlaybackCursor, StoryError, StoryPlaybackEngine};
pub use feed::StoryFeedStore;

/// 播放事件（用于前端刷新）
///
/// 进度条的连续变化不走事件，前端按帧读取光标即可；
/// 事件只覆盖离散的状态跳变
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StoryPlaybackEvent {
    /// 播放会话已打开
    Opened {
        session_id: String,
        cursor: PlaybackCursor,
    },
    /// 光标移动（推进、回退或删除后重定位）
    CursorMoved {
        cursor: PlaybackCursor,
        item_id: String,
    },
    /// 播放会话已关闭
    Closed,
}
