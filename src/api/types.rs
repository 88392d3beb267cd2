/*!
 * 服务器数据结构定义
 *
 * 定义瞬间、点赞、回复相关接口的请求与响应数据结构
 *
 * 约定：
 * 1. 服务器字段统一使用 camelCase，本地结构体通过 serde 重命名
 * 2. 时间字段为 RFC 3339 字符串（服务器时区为 UTC）
 * 3. 旧版服务器部分统计字段可能缺失，解析时给默认值，禁止把缺失值继续往上传
 */

use serde::{Deserialize, Serialize};

// ============================================================================
// 成员信息
// ============================================================================

/// 社区成员摘要（点赞列表、回复作者等处通用）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    /// 成员 ID
    pub member_id: String,
    /// 昵称
    pub nickname: String,
    /// 头像 URL
    pub avatar_url: String,
}

// ============================================================================
// 实体类别
// ============================================================================

/// 点赞操作针对的实体类别
///
/// 类别只决定走哪组服务器接口，状态变更逻辑对三类实体完全一致
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    /// 动态（帖子）
    Post,
    /// 评论
    Comment,
    /// 回复（楼中楼）
    Reply,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Post => "post",
            EntityKind::Comment => "comment",
            EntityKind::Reply => "reply",
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(fmt, "{}", self.as_str())
    }
}

// ============================================================================
// 点赞
// ============================================================================

/// 切换点赞接口的响应（服务器权威结果）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeToggleOutcome {
    /// 当前用户是否已点赞
    pub liked: bool,
    /// 最新点赞总数
    pub like_count: i64,
}

/// 点赞明细接口的响应
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeDetails {
    /// 点赞总数
    pub like_count: i64,
    /// 点赞成员列表
    pub liked_members: Vec<Member>,
}

/// 本地缓存的单个实体点赞状态
///
/// `liked_members` 在首次拉取明细前为 None。
/// 总数和成员列表允许短暂不一致（只刷新了其中一个时），
/// 下一次拉取明细时整体覆盖，不做互相推导。
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeState {
    /// 当前用户是否已点赞
    pub liked_by_current_user: bool,
    /// 点赞总数
    pub like_count: i64,
    /// 点赞成员列表（未拉取时为 None）
    pub liked_members: Option<Vec<Member>>,
}

impl Default for LikeState {
    fn default() -> Self {
        Self {
            liked_by_current_user: false,
            like_count: 0,
            liked_members: None,
        }
    }
}

// ============================================================================
// 瞬间（Story）
// ============================================================================

/// 瞬间媒体类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    /// 图片
    Image,
    /// 视频
    Video,
}

/// 单条瞬间
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryItem {
    /// 瞬间 ID
    pub id: String,
    /// 媒体 URL
    pub media_url: String,
    /// 媒体类型
    pub media_kind: MediaKind,
    /// 配文
    pub caption: String,
    /// 发布时间
    pub created_at: String,
    /// 是否已过期
    pub expired: bool,
    /// 当前用户是否已观看
    pub viewed_by_current_user: bool,
}

/// 同一位主人的瞬间分组（组内按发布顺序排列，最早的在前）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryGroup {
    /// 主人成员 ID
    pub owner_id: String,
    /// 主人昵称
    pub owner_display_name: String,
    /// 主人头像 URL
    pub owner_avatar_url: String,
    /// 瞬间列表
    pub items: Vec<StoryItem>,
}

/// 瞬间信息流（分组顺序由服务器决定）
pub type StoryFeed = Vec<StoryGroup>;

/// 瞬间观看者
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryViewer {
    /// 观看者成员 ID
    pub viewer_id: String,
    /// 昵称
    pub nickname: String,
    /// 头像 URL
    pub avatar_url: String,
}

/// 编辑瞬间时提交的媒体与配文
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryMediaUpdate {
    /// 新媒体 URL
    pub media_url: String,
    /// 新媒体类型
    pub media_kind: MediaKind,
    /// 新配文
    pub caption: String,
}

// ============================================================================
// 回复（楼中楼）
// ============================================================================

/// 服务器返回的回复数据
///
/// 旧版服务器不带 likeCount / likedByCurrentUser 字段，解析为 None
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplyDto {
    /// 回复 ID（全局唯一）
    pub id: String,
    /// 所属父评论 ID
    pub parent_comment_id: String,
    /// 回复内容
    pub content: String,
    /// 创建时间
    pub created_at: String,
    /// 最后编辑时间
    pub updated_at: String,
    /// 作者
    pub author: Member,
    /// 点赞总数（旧版服务器可能缺失）
    #[serde(default)]
    pub like_count: Option<i64>,
    /// 当前用户是否已点赞（旧版服务器可能缺失）
    #[serde(default)]
    pub liked_by_current_user: Option<bool>,
}

/// 本地持有的回复对象
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Reply {
    /// 回复 ID（全局唯一）
    pub id: String,
    /// 所属父评论 ID
    pub parent_comment_id: String,
    /// 回复内容
    pub content: String,
    /// 创建时间
    pub created_at: String,
    /// 最后编辑时间
    pub updated_at: String,
    /// 作者
    pub author: Member,
    /// 点赞状态
    pub like: LikeState,
}

impl Reply {
    /// 由服务器数据构造本地回复对象
    ///
    /// 缺失的点赞计数一律归零，不允许把缺失值带进本地状态
    pub fn from_dto(dto: ReplyDto) -> Self {
        Self {
            id: dto.id,
            parent_comment_id: dto.parent_comment_id,
            content: dto.content,
            created_at: dto.created_at,
            updated_at: dto.updated_at,
            author: dto.author,
            like: LikeState {
                liked_by_current_user: dto.liked_by_current_user.unwrap_or(false),
                like_count: dto.like_count.unwrap_or(0),
                liked_members: None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_kind_as_str() {
        assert_eq!(EntityKind::Post.as_str(), "post");
        assert_eq!(EntityKind::Comment.as_str(), "comment");
        assert_eq!(EntityKind::Reply.as_str(), "reply");
    }

    #[test]
    fn test_like_toggle_outcome_decodes_camel_case() {
        let outcome: LikeToggleOutcome =
            serde_json::from_str(r#"{"liked":true,"likeCount":5}"#).unwrap();
        assert!(outcome.liked);
        assert_eq!(outcome.like_count, 5);
    }

    #[test]
    fn test_reply_from_dto_defaults_missing_like_count() {
        let dto: ReplyDto = serde_json::from_str(
            r#"{
                "id": "r1",
                "parentCommentId": "c7",
                "content": "好可爱",
                "createdAt": "2026-07-01T08:00:00Z",
                "updatedAt": "2026-07-01T08:00:00Z",
                "author": {"memberId": "m1", "nickname": "毛毛", "avatarUrl": "http://a/1.jpg"}
            }"#,
        )
        .unwrap();
        assert_eq!(dto.like_count, None);

        let reply = Reply::from_dto(dto);
        assert_eq!(reply.like.like_count, 0);
        assert!(!reply.like.liked_by_current_user);
        assert_eq!(reply.like.liked_members, None);
    }
}
