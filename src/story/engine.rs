//! 瞬间播放引擎
//!
//! 播放器只有两个状态：关闭、打开（带光标）。打开时光标始终落在
//! 一条真实存在的瞬间上；组内逐条推进，组尾衔接下一组，信息流
//! 末尾推进则关闭播放器。所有进度、观看登记都属于单次会话，
//! 关闭即丢弃，重新打开从零开始。
//!
//! 观看上报约定：光标每次落到新瞬间（含打开时的首条）都会上报
//! 一次观看，同一会话内同一条瞬间不重复上报；登记在发请求之前
//! 完成，上报失败也不会重试。

use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use super::StoryPlaybackEvent;
use crate::api::types::{MediaKind, StoryFeed, StoryGroup, StoryItem, StoryMediaUpdate, StoryViewer};
use crate::api::{ApiError, RemoteDataService};

/// 单条瞬间的默认播放时长（秒）
pub const DEFAULT_ITEM_DURATION_SECS: f64 = 10.0;

/// 播放错误类型
#[derive(Error, Debug)]
pub enum StoryError {
    #[error("瞬间信息流为空，无法打开播放器")]
    EmptyFeed,

    #[error("起始分组下标越界: {index}（共 {len} 组）")]
    StartIndexOutOfRange { index: usize, len: usize },

    #[error("分组 {index} 没有可播放的瞬间")]
    EmptyGroup { index: usize },

    #[error("播放器未打开")]
    NotOpen,

    #[error("仅瞬间主人可以执行该操作")]
    NotOwner,

    #[error("非法的媒体时长: {0}")]
    InvalidDuration(f64),

    #[error(transparent)]
    Api(#[from] ApiError),
}

/// 播放光标
///
/// 打开期间恒有 `group_index < 组数` 且 `item_index < 组内条数`
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackCursor {
    /// 当前分组下标
    pub group_index: usize,
    /// 组内条目下标
    pub item_index: usize,
    /// 当前条目已播放比例，范围 [0, 1]
    pub elapsed_fraction: f64,
}

/// 单次播放会话的全部状态，关闭时整体丢弃
struct OpenSession {
    session_id: String,
    opened_at: DateTime<Utc>,
    feed: StoryFeed,
    cursor: PlaybackCursor,
    /// 当前条目已播放秒数（进度比例由它换算，避免累加误差）
    elapsed_secs: f64,
    /// 当前条目播放时长，切换条目时重置为默认值
    item_duration_secs: f64,
    /// 本次会话已登记观看的瞬间 ID
    viewed: HashSet<String>,
}

impl OpenSession {
    fn current_item(&self) -> &StoryItem {
        &self.feed[self.cursor.group_index].items[self.cursor.item_index]
    }

    fn current_group(&self) -> &StoryGroup {
        &self.feed[self.cursor.group_index]
    }

    /// 光标落到新条目后重置播放进度与时长
    fn reset_progress(&mut self) {
        self.elapsed_secs = 0.0;
        self.cursor.elapsed_fraction = 0.0;
        self.item_duration_secs = DEFAULT_ITEM_DURATION_SECS;
    }
}

/// 光标移动的结果
enum Step {
    /// 移动到了新条目
    Moved {
        cursor: PlaybackCursor,
        item_id: String,
    },
    /// 越过了信息流边界，播放结束
    End,
}

/// 瞬间播放引擎
pub struct StoryPlaybackEngine<S: RemoteDataService> {
    service: Arc<S>,
    /// 当前登录成员 ID，用于主人操作的权限判断
    member_id: String,
    session: RwLock<Option<OpenSession>>,
    /// 自动推进任务的取消令牌
    pub(super) autoplay: Mutex<Option<CancellationToken>>,
    events: broadcast::Sender<StoryPlaybackEvent>,
}

impl<S: RemoteDataService> StoryPlaybackEngine<S> {
    pub fn new(service: Arc<S>, member_id: impl Into<String>) -> Self {
        let (events, _) = broadcast::channel(100);
        Self {
            service,
            member_id: member_id.into(),
            session: RwLock::new(None),
            autoplay: Mutex::new(None),
            events,
        }
    }

    /// 订阅播放事件
    pub fn subscribe(&self) -> broadcast::Receiver<StoryPlaybackEvent> {
        self.events.subscribe()
    }

    // ------------------------------------------------------------------
    // 打开 / 关闭
    // ------------------------------------------------------------------

    /// 打开播放器，从指定分组的第一条开始
    ///
    /// 参数非法时不改动任何状态：信息流为空、下标越界、起始分组
    /// 为空组都在写入会话之前拒绝。打开时立即上报首条观看。
    pub async fn open(
        &self,
        feed: StoryFeed,
        start_group_index: usize,
    ) -> Result<PlaybackCursor, StoryError> {
        if feed.is_empty() {
            return Err(StoryError::EmptyFeed);
        }
        if start_group_index >= feed.len() {
            return Err(StoryError::StartIndexOutOfRange {
                index: start_group_index,
                len: feed.len(),
            });
        }
        if feed[start_group_index].items.is_empty() {
            return Err(StoryError::EmptyGroup {
                index: start_group_index,
            });
        }

        // 打开即重置：先按关闭处理掉上一次会话及其定时任务
        self.close();

        let session_id = Uuid::new_v4().to_string();
        let cursor = PlaybackCursor {
            group_index: start_group_index,
            item_index: 0,
            elapsed_fraction: 0.0,
        };
        {
            let mut guard = self.session.write();
            *guard = Some(OpenSession {
                session_id: session_id.clone(),
                opened_at: Utc::now(),
                feed,
                cursor,
                elapsed_secs: 0.0,
                item_duration_secs: DEFAULT_ITEM_DURATION_SECS,
                viewed: HashSet::new(),
            });
        }

        println!(
            "[Story] 打开播放会话 {} (起始分组 {})",
            session_id, start_group_index
        );
        let _ = self.events.send(StoryPlaybackEvent::Opened { session_id, cursor });

        self.mark_current_viewed().await?;
        Ok(cursor)
    }

    /// 关闭播放器，取消自动推进并丢弃会话状态
    ///
    /// 已发出的观看上报不撤销，它们只引用发起时捕获的瞬间 ID，
    /// 不依赖光标仍然有效
    pub fn close(&self) {
        self.stop_autoplay();
        let closed = self.session.write().take();
        if let Some(sess) = closed {
            let watched_ms = (Utc::now() - sess.opened_at).num_milliseconds();
            println!(
                "[Story] 播放会话 {} 已关闭，持续 {:.1} 秒",
                sess.session_id,
                watched_ms as f64 / 1000.0
            );
            let _ = self.events.send(StoryPlaybackEvent::Closed);
        }
    }

    // ------------------------------------------------------------------
    // 推进 / 回退
    // ------------------------------------------------------------------

    /// 播放时钟节拍
    ///
    /// 当前条目累计播放满时长后等同调用一次 [`advance`](Self::advance)。
    /// 播放器关闭时节拍是无害的空操作（定时任务取消存在竞争窗口）。
    pub async fn tick(&self, delta_secs: f64) -> Result<Option<PlaybackCursor>, StoryError> {
        let pending = {
            let mut guard = self.session.write();
            match guard.as_mut() {
                None => return Ok(None),
                Some(sess) => {
                    sess.elapsed_secs += delta_secs;
                    if sess.elapsed_secs + 1e-9 >= sess.item_duration_secs {
                        None
                    } else {
                        sess.cursor.elapsed_fraction =
                            sess.elapsed_secs / sess.item_duration_secs;
                        Some(sess.cursor)
                    }
                }
            }
        };

        match pending {
            Some(cursor) => Ok(Some(cursor)),
            None => self.advance().await,
        }
    }

    /// 推进到下一条
    ///
    /// 组内后移一条，组尾衔接下一组的第一条，信息流末尾则关闭
    /// 播放器并返回 None
    pub async fn advance(&self) -> Result<Option<PlaybackCursor>, StoryError> {
        let step = {
            let mut guard = self.session.write();
            let Some(sess) = guard.as_mut() else {
                return Ok(None);
            };

            let group_len = sess.current_group().items.len();
            let at_group_end = sess.cursor.item_index + 1 >= group_len;
            let at_feed_end = sess.cursor.group_index + 1 >= sess.feed.len();
            if at_group_end && at_feed_end {
                Step::End
            } else {
                if !at_group_end {
                    sess.cursor.item_index += 1;
                } else {
                    sess.cursor.group_index += 1;
                    sess.cursor.item_index = 0;
                }
                sess.reset_progress();
                Step::Moved {
                    cursor: sess.cursor,
                    item_id: sess.current_item().id.clone(),
                }
            }
        };
        self.finish(step).await
    }

    /// 回退到上一条
    ///
    /// 组内前移一条，组首回退落到上一组的最后一条；在信息流最
    /// 前面继续回退则关闭播放器（对应"划回到头"的交互）
    pub async fn retreat(&self) -> Result<Option<PlaybackCursor>, StoryError> {
        let step = {
            let mut guard = self.session.write();
            let Some(sess) = guard.as_mut() else {
                return Ok(None);
            };

            if sess.cursor.item_index == 0 && sess.cursor.group_index == 0 {
                Step::End
            } else {
                if sess.cursor.item_index > 0 {
                    sess.cursor.item_index -= 1;
                } else {
                    sess.cursor.group_index -= 1;
                    sess.cursor.item_index = sess.current_group().items.len() - 1;
                }
                sess.reset_progress();
                Step::Moved {
                    cursor: sess.cursor,
                    item_id: sess.current_item().id.clone(),
                }
            }
        };
        self.finish(step).await
    }

    /// 统一处理光标移动的收尾：发事件、上报观看或关闭播放器
    async fn finish(&self, step: Step) -> Result<Option<PlaybackCursor>, StoryError> {
        match step {
            Step::Moved { cursor, item_id } => {
                let _ = self
                    .events
                    .send(StoryPlaybackEvent::CursorMoved { cursor, item_id });
                self.mark_current_viewed().await?;
                Ok(Some(cursor))
            }
            Step::End => {
                self.close();
                Ok(None)
            }
        }
    }

    /// 上报当前条目的观看记录（同一会话内每条至多一次）
    ///
    /// 先登记后发请求：上报失败也不会对同一条重试，光标保持原位
    async fn mark_current_viewed(&self) -> Result<(), StoryError> {
        let to_mark = {
            let mut guard = self.session.write();
            let Some(sess) = guard.as_mut() else {
                return Ok(());
            };
            let cursor = sess.cursor;
            let item = &mut sess.feed[cursor.group_index].items[cursor.item_index];
            item.viewed_by_current_user = true;
            let id = item.id.clone();
            if sess.viewed.insert(id.clone()) {
                Some(id)
            } else {
                None
            }
        };

        if let Some(item_id) = to_mark {
            self.service.mark_story_viewed(&item_id).await?;
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // 媒体时长
    // ------------------------------------------------------------------

    /// 覆盖当前条目的播放时长
    ///
    /// 由媒体播放器在拿到视频实际时长后异步调用；当前条目不是
    /// 视频、或播放器已关闭时直接忽略（报告来得太晚）。在报告
    /// 到达之前自动推进按默认时长执行。
    pub fn set_current_item_duration(&self, duration_secs: f64) -> Result<(), StoryError> {
        if duration_secs <= 0.0 {
            return Err(StoryError::InvalidDuration(duration_secs));
        }

        let mut guard = self.session.write();
        let Some(sess) = guard.as_mut() else {
            return Ok(());
        };
        if sess.current_item().media_kind == MediaKind::Video {
            sess.item_duration_secs = duration_secs;
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // 主人操作
    // ------------------------------------------------------------------

    /// 校验当前条目归当前用户所有，返回其 ID
    fn current_owned_item_id(&self) -> Result<String, StoryError> {
        let guard = self.session.read();
        let sess = guard.as_ref().ok_or(StoryError::NotOpen)?;
        if sess.current_group().owner_id != self.member_id {
            return Err(StoryError::NotOwner);
        }
        Ok(sess.current_item().id.clone())
    }

    /// 编辑当前条目（仅主人），光标停留在原条目上
    pub async fn edit_current_item(&self, update: StoryMediaUpdate) -> Result<(), StoryError> {
        let item_id = self.current_owned_item_id()?;
        self.service.edit_story_item(&item_id, &update).await?;

        let mut guard = self.session.write();
        if let Some(sess) = guard.as_mut() {
            let group_index = sess.cursor.group_index;
            if let Some(item) = sess.feed[group_index]
                .items
                .iter_mut()
                .find(|it| it.id == item_id)
            {
                item.media_url = update.media_url;
                item.media_kind = update.media_kind;
                item.caption = update.caption;
            }
        }
        println!("[Story] 已编辑瞬间 {}", item_id);
        Ok(())
    }

    /// 删除当前条目（仅主人），随后等同从删除前的位置推进一次
    ///
    /// 删除后组空则整组从会话中移除；没有可去的下一条时关闭播放器
    pub async fn delete_current_item(&self) -> Result<Option<PlaybackCursor>, StoryError> {
        let item_id = self.current_owned_item_id()?;
        self.service.delete_story_item(&item_id).await?;
        println!("[Story] 已删除瞬间 {}", item_id);

        let step = {
            let mut guard = self.session.write();
            let Some(sess) = guard.as_mut() else {
                return Ok(None);
            };

            let group_index = sess.cursor.group_index;
            let item_index = sess.cursor.item_index;
            sess.feed[group_index].items.remove(item_index);
            let group_removed = if sess.feed[group_index].items.is_empty() {
                sess.feed.remove(group_index);
                true
            } else {
                false
            };

            // 从删除前的位置推进：后一条补位，组尾去下一组，没有则结束
            let next = if group_removed {
                if group_index < sess.feed.len() {
                    Some((group_index, 0))
                } else {
                    None
                }
            } else if item_index < sess.feed[group_index].items.len() {
                Some((group_index, item_index))
            } else if group_index + 1 < sess.feed.len() {
                Some((group_index + 1, 0))
            } else {
                None
            };

            match next {
                Some((next_group, next_item)) => {
                    sess.cursor.group_index = next_group;
                    sess.cursor.item_index = next_item;
                    sess.reset_progress();
                    Step::Moved {
                        cursor: sess.cursor,
                        item_id: sess.current_item().id.clone(),
                    }
                }
                None => Step::End,
            }
        };
        self.finish(step).await
    }

    // ------------------------------------------------------------------
    // 观看者查询
    // ------------------------------------------------------------------

    /// 拉取某条瞬间的观看者列表
    ///
    /// 每次都向服务器查询，引擎不缓存
    pub async fn viewers(&self, item_id: &str) -> Result<Vec<StoryViewer>, StoryError> {
        Ok(self.service.fetch_story_viewers(item_id).await?)
    }

    // ------------------------------------------------------------------
    // 读取访问器
    // ------------------------------------------------------------------

    pub fn is_open(&self) -> bool {
        self.session.read().is_some()
    }

    /// 当前播放光标
    pub fn cursor(&self) -> Option<PlaybackCursor> {
        self.session.read().as_ref().map(|s| s.cursor)
    }

    /// 当前光标指向的瞬间
    pub fn current_item(&self) -> Option<StoryItem> {
        self.session.read().as_ref().map(|s| s.current_item().clone())
    }

    /// 当前光标所在的分组
    pub fn current_group(&self) -> Option<StoryGroup> {
        self.session.read().as_ref().map(|s| s.current_group().clone())
    }

    /// 本次播放会话 ID
    pub fn session_id(&self) -> Option<String> {
        self.session.read().as_ref().map(|s| s.session_id.clone())
    }
}
