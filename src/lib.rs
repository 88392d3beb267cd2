//! 爪印宠物社区 - 客户端核心状态层
//!
//! 界面层（页面、组件、导航）不在本 crate 内，这里只承载界面与
//! 服务器之间的状态容器：拉取、归一化、缓存，并暴露读取访问器
//! 供界面渲染。所有容器都是显式构造的实例，远程服务通过构造
//! 参数注入，测试用假服务替换，不存在模块级全局状态。
//!
//! ## 功能模块
//! - 远程数据服务：REST 接口抽象与 reqwest 实现（Bearer Token 鉴权）
//! - 瞬间播放：分组浏览、定时自动推进、观看上报、主人编辑删除
//! - 点赞状态：动态/评论/回复三类实体统一的切换与明细拉取
//! - 楼中楼回复：按父评论分组的回复增删改查，点赞结果扇出写回
//!
//! ## 一致性约定
//! - 点赞一律以服务器响应为权威结果，成功后才写本地状态
//! - 拉取失败保留旧缓存，过期数据好过空白页面
//! - 点赞总数与成员列表允许短暂不一致，不做互相推导
//!
//! ## 更新日志
//! - 2026-07-30: 回复点赞并入统一点赞容器，移除三份重复实现
//! - 2026-07-18: 瞬间观看上报改为会话内去重，修复重复计数

// ============================================
// 功能模块
// ============================================
pub mod api;
pub mod engagement;
pub mod reply;
pub mod story;

pub use api::rest::RestDataService;
pub use api::types::{
    EntityKind, LikeDetails, LikeState, LikeToggleOutcome, MediaKind, Member, Reply, ReplyDto,
    StoryFeed, StoryGroup, StoryItem, StoryMediaUpdate, StoryViewer,
};
pub use api::{ApiError, RemoteDataService};
pub use engagement::SocialEngagementStore;
pub use reply::{ReplyError, ThreadedReplyStore};
pub use story::{
    start_autoplay, PlaybackCursor, StoryError, StoryFeedStore, StoryPlaybackEngine,
    StoryPlaybackEvent,
};
