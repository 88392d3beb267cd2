//! 测试专用的脚本化假服务
//!
//! 记录每次调用并返回预先设定的响应，用于验证各状态容器的
//! 调用次数、调用顺序和失败路径，测试不触碰真实网络。

use parking_lot::Mutex;

use super::types::{
    EntityKind, LikeDetails, LikeToggleOutcome, Member, ReplyDto, StoryFeed, StoryMediaUpdate,
    StoryViewer,
};
use super::{ApiError, RemoteDataService};

/// 构造测试成员
pub(crate) fn member(id: &str) -> Member {
    Member {
        member_id: id.to_string(),
        nickname: format!("昵称-{}", id),
        avatar_url: format!("https://cdn.zhuayin.cn/avatar/{}.jpg", id),
    }
}

/// 脚本化假服务
pub(crate) struct MockDataService {
    /// 调用记录（格式如 "toggle:post:42"）
    calls: Mutex<Vec<String>>,
    /// 为 true 时所有调用返回网络错误
    fail: Mutex<bool>,
    toggle_outcome: Mutex<LikeToggleOutcome>,
    like_details: Mutex<LikeDetails>,
    feed: Mutex<StoryFeed>,
    viewers: Mutex<Vec<StoryViewer>>,
    replies: Mutex<Vec<ReplyDto>>,
    reply_seq: Mutex<u64>,
}

impl MockDataService {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            fail: Mutex::new(false),
            toggle_outcome: Mutex::new(LikeToggleOutcome {
                liked: true,
                like_count: 1,
            }),
            like_details: Mutex::new(LikeDetails {
                like_count: 0,
                liked_members: Vec::new(),
            }),
            feed: Mutex::new(Vec::new()),
            viewers: Mutex::new(Vec::new()),
            replies: Mutex::new(Vec::new()),
            reply_seq: Mutex::new(0),
        }
    }

    pub fn set_fail(&self, fail: bool) {
        *self.fail.lock() = fail;
    }

    pub fn set_toggle_outcome(&self, outcome: LikeToggleOutcome) {
        *self.toggle_outcome.lock() = outcome;
    }

    pub fn set_like_details(&self, details: LikeDetails) {
        *self.like_details.lock() = details;
    }

    pub fn set_feed(&self, feed: StoryFeed) {
        *self.feed.lock() = feed;
    }

    pub fn set_replies(&self, replies: Vec<ReplyDto>) {
        *self.replies.lock() = replies;
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    /// 统计某一调用出现的次数
    pub fn call_count(&self, call: &str) -> usize {
        self.calls.lock().iter().filter(|c| c.as_str() == call).count()
    }

    fn record(&self, call: String) {
        self.calls.lock().push(call);
    }

    fn check_fail(&self) -> Result<(), ApiError> {
        if *self.fail.lock() {
            Err(ApiError::Request("模拟网络故障".to_string()))
        } else {
            Ok(())
        }
    }
}

impl RemoteDataService for MockDataService {
    async fn toggle_entity_like(
        &self,
        kind: EntityKind,
        entity_id: &str,
    ) -> Result<LikeToggleOutcome, ApiError> {
        self.record(format!("toggle:{}:{}", kind, entity_id));
        self.check_fail()?;
        Ok(*self.toggle_outcome.lock())
    }

    async fn fetch_entity_like_details(
        &self,
        kind: EntityKind,
        entity_id: &str,
    ) -> Result<LikeDetails, ApiError> {
        self.record(format!("details:{}:{}", kind, entity_id));
        self.check_fail()?;
        Ok(self.like_details.lock().clone())
    }

    async fn fetch_story_feed(&self) -> Result<StoryFeed, ApiError> {
        self.record("feed".to_string());
        self.check_fail()?;
        Ok(self.feed.lock().clone())
    }

    async fn mark_story_viewed(&self, item_id: &str) -> Result<(), ApiError> {
        self.record(format!("viewed:{}", item_id));
        self.check_fail()
    }

    async fn fetch_story_viewers(&self, item_id: &str) -> Result<Vec<StoryViewer>, ApiError> {
        self.record(format!("viewers:{}", item_id));
        self.check_fail()?;
        Ok(self.viewers.lock().clone())
    }

    async fn edit_story_item(
        &self,
        item_id: &str,
        _update: &StoryMediaUpdate,
    ) -> Result<(), ApiError> {
        self.record(format!("edit_story:{}", item_id));
        self.check_fail()
    }

    async fn delete_story_item(&self, item_id: &str) -> Result<(), ApiError> {
        self.record(format!("delete_story:{}", item_id));
        self.check_fail()
    }

    async fn list_replies(&self, parent_comment_id: &str) -> Result<Vec<ReplyDto>, ApiError> {
        self.record(format!("list_replies:{}", parent_comment_id));
        self.check_fail()?;
        Ok(self.replies.lock().clone())
    }

    async fn create_reply(
        &self,
        parent_comment_id: &str,
        content: &str,
    ) -> Result<ReplyDto, ApiError> {
        self.record(format!("create_reply:{}", parent_comment_id));
        self.check_fail()?;

        let mut seq = self.reply_seq.lock();
        *seq += 1;
        let now = chrono::Utc::now().to_rfc3339();
        Ok(ReplyDto {
            id: format!("r{}", *seq),
            parent_comment_id: parent_comment_id.to_string(),
            content: content.to_string(),
            created_at: now.clone(),
            updated_at: now,
            author: member("me"),
            // 模拟旧版服务器：创建响应不带点赞统计
            like_count: None,
            liked_by_current_user: None,
        })
    }

    async fn update_reply(&self, reply_id: &str, content: &str) -> Result<ReplyDto, ApiError> {
        self.record(format!("update_reply:{}", reply_id));
        self.check_fail()?;

        Ok(ReplyDto {
            id: reply_id.to_string(),
            parent_comment_id: String::new(),
            content: content.to_string(),
            created_at: String::new(),
            updated_at: chrono::Utc::now().to_rfc3339(),
            author: member("me"),
            like_count: None,
            liked_by_current_user: None,
        })
    }

    async fn delete_reply(&self, reply_id: &str) -> Result<(), ApiError> {
        self.record(format!("delete_reply:{}", reply_id));
        self.check_fail()
    }
}
