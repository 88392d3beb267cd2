//! 远程数据服务模块
//!
//! 核心状态层与服务器之间的唯一边界：所有网络交互都通过
//! [`RemoteDataService`] 抽象进行，各状态容器通过注入的服务实例
//! 发起请求，测试时用脚本化的假服务替换，不触碰真实网络。
//!
//! ## 模块结构
//! - types: 接口数据结构定义
//! - rest: 基于 reqwest 的 REST 实现（Bearer Token 鉴权）
//! - mock: 测试专用的脚本化假服务

pub mod rest;
pub mod types;

#[cfg(test)]
pub(crate) mod mock;

use std::future::Future;
use thiserror::Error;

use types::{
    EntityKind, LikeDetails, LikeToggleOutcome, ReplyDto, StoryFeed, StoryMediaUpdate,
    StoryViewer,
};

/// 远程调用错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    /// 无会话令牌或令牌已失效，原样上抛，不改动任何本地状态
    #[error("未登录或登录已过期")]
    AuthRequired,

    /// 传输层失败（连接超时、DNS 失败等）
    #[error("请求失败: {0}")]
    Request(String),

    /// 服务器返回非 2xx 状态码
    #[error("服务器返回错误: HTTP {0}")]
    Status(u16),

    /// 响应体解析失败
    #[error("响应解析失败: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::Request(err.to_string())
    }
}

/// 远程数据服务接口
///
/// 调用失败不在本层重试，由调用方决定如何向用户反馈
pub trait RemoteDataService: Send + Sync {
    // ------------------------------------------------------------------
    // 点赞
    // ------------------------------------------------------------------

    /// 切换点赞状态，返回服务器权威的最新结果
    fn toggle_entity_like(
        &self,
        kind: EntityKind,
        entity_id: &str,
    ) -> impl Future<Output = Result<LikeToggleOutcome, ApiError>> + Send;

    /// 拉取点赞总数与点赞成员列表
    fn fetch_entity_like_details(
        &self,
        kind: EntityKind,
        entity_id: &str,
    ) -> impl Future<Output = Result<LikeDetails, ApiError>> + Send;

    // ------------------------------------------------------------------
    // 瞬间
    // ------------------------------------------------------------------

    /// 拉取瞬间信息流（分组顺序由服务器决定）
    fn fetch_story_feed(&self) -> impl Future<Output = Result<StoryFeed, ApiError>> + Send;

    /// 上报瞬间观看记录
    fn mark_story_viewed(
        &self,
        item_id: &str,
    ) -> impl Future<Output = Result<(), ApiError>> + Send;

    /// 拉取瞬间观看者列表（不在本地缓存）
    fn fetch_story_viewers(
        &self,
        item_id: &str,
    ) -> impl Future<Output = Result<Vec<StoryViewer>, ApiError>> + Send;

    /// 编辑自己的瞬间（替换媒体与配文）
    fn edit_story_item(
        &self,
        item_id: &str,
        update: &StoryMediaUpdate,
    ) -> impl Future<Output = Result<(), ApiError>> + Send;

    /// 删除自己的瞬间
    fn delete_story_item(
        &self,
        item_id: &str,
    ) -> impl Future<Output = Result<(), ApiError>> + Send;

    // ------------------------------------------------------------------
    // 回复（楼中楼）
    // ------------------------------------------------------------------

    /// 拉取某条父评论下的全部回复（按创建顺序）
    fn list_replies(
        &self,
        parent_comment_id: &str,
    ) -> impl Future<Output = Result<Vec<ReplyDto>, ApiError>> + Send;

    /// 发表回复
    fn create_reply(
        &self,
        parent_comment_id: &str,
        content: &str,
    ) -> impl Future<Output = Result<ReplyDto, ApiError>> + Send;

    /// 编辑回复
    fn update_reply(
        &self,
        reply_id: &str,
        content: &str,
    ) -> impl Future<Output = Result<ReplyDto, ApiError>> + Send;

    /// 删除回复
    fn delete_reply(
        &self,
        reply_id: &str,
    ) -> impl Future<Output = Result<(), ApiError>> + Send;
}
