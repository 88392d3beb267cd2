//! REST 数据服务实现
//!
//! 基于 reqwest 调用服务器 JSON 接口，Bearer Token 鉴权。
//! 令牌由登录流程写入，本层只负责携带；没有令牌时直接拒绝请求，
//! 不发起网络调用。
//!
//! ## 接口映射
//! - 点赞:   POST /api/likes/{kind}/{id}/toggle, GET /api/likes/{kind}/{id}
//! - 瞬间:   GET /api/stories/feed, POST /api/stories/{id}/viewed,
//!           GET /api/stories/{id}/viewers, PUT/DELETE /api/stories/{id}
//! - 回复:   GET/POST /api/comments/{parent}/replies, PUT/DELETE /api/replies/{id}

use once_cell::sync::Lazy;
use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde_json::json;

use super::types::{
    EntityKind, LikeDetails, LikeToggleOutcome, ReplyDto, StoryFeed, StoryMediaUpdate,
    StoryViewer,
};
use super::{ApiError, RemoteDataService};

/// 进程级共享 HTTP 客户端（复用连接池）
static HTTP_CLIENT: Lazy<reqwest::Client> = Lazy::new(reqwest::Client::new);

/// REST 数据服务
pub struct RestDataService {
    /// 服务器地址（不含末尾斜杠）
    base_url: String,
    /// 会话令牌（登录后写入，登出时清除）
    token: RwLock<Option<String>>,
}

impl RestDataService {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            token: RwLock::new(None),
        }
    }

    /// 写入会话令牌（登录成功后调用）
    pub fn set_token(&self, token: impl Into<String>) {
        *self.token.write() = Some(token.into());
    }

    /// 清除会话令牌（登出时调用）
    pub fn clear_token(&self) {
        *self.token.write() = None;
        println!("[Api] 已清除会话令牌");
    }

    /// 取当前令牌，未登录直接报错，不发请求
    fn bearer_token(&self) -> Result<String, ApiError> {
        self.token.read().clone().ok_or(ApiError::AuthRequired)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// 点赞接口的类别路径段
    fn like_path(kind: EntityKind, entity_id: &str) -> String {
        let segment = match kind {
            EntityKind::Post => "posts",
            EntityKind::Comment => "comments",
            EntityKind::Reply => "replies",
        };
        format!("/api/likes/{}/{}", segment, entity_id)
    }

    /// 发送请求并校验状态码
    ///
    /// 401/403 统一映射为未登录错误，其余非 2xx 映射为状态码错误
    async fn execute(
        &self,
        builder: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, ApiError> {
        let token = self.bearer_token()?;
        let response = builder.bearer_auth(token).send().await?;

        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else if status == reqwest::StatusCode::UNAUTHORIZED
            || status == reqwest::StatusCode::FORBIDDEN
        {
            Err(ApiError::AuthRequired)
        } else {
            Err(ApiError::Status(status.as_u16()))
        }
    }

    /// 发送请求并解析 JSON 响应体
    async fn execute_json<T: DeserializeOwned>(
        &self,
        builder: reqwest::RequestBuilder,
    ) -> Result<T, ApiError> {
        let response = self.execute(builder).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }
}

impl RemoteDataService for RestDataService {
    async fn toggle_entity_like(
        &self,
        kind: EntityKind,
        entity_id: &str,
    ) -> Result<LikeToggleOutcome, ApiError> {
        let url = self.url(&format!("{}/toggle", Self::like_path(kind, entity_id)));
        self.execute_json(HTTP_CLIENT.post(url)).await
    }

    async fn fetch_entity_like_details(
        &self,
        kind: EntityKind,
        entity_id: &str,
    ) -> Result<LikeDetails, ApiError> {
        let url = self.url(&Self::like_path(kind, entity_id));
        self.execute_json(HTTP_CLIENT.get(url)).await
    }

    async fn fetch_story_feed(&self) -> Result<StoryFeed, ApiError> {
        let url = self.url("/api/stories/feed");
        self.execute_json(HTTP_CLIENT.get(url)).await
    }

    async fn mark_story_viewed(&self, item_id: &str) -> Result<(), ApiError> {
        let url = self.url(&format!("/api/stories/{}/viewed", item_id));
        self.execute(HTTP_CLIENT.post(url)).await?;
        Ok(())
    }

    async fn fetch_story_viewers(&self, item_id: &str) -> Result<Vec<StoryViewer>, ApiError> {
        let url = self.url(&format!("/api/stories/{}/viewers", item_id));
        self.execute_json(HTTP_CLIENT.get(url)).await
    }

    async fn edit_story_item(
        &self,
        item_id: &str,
        update: &StoryMediaUpdate,
    ) -> Result<(), ApiError> {
        let url = self.url(&format!("/api/stories/{}", item_id));
        self.execute(HTTP_CLIENT.put(url).json(update)).await?;
        Ok(())
    }

    async fn delete_story_item(&self, item_id: &str) -> Result<(), ApiError> {
        let url = self.url(&format!("/api/stories/{}", item_id));
        self.execute(HTTP_CLIENT.delete(url)).await?;
        Ok(())
    }

    async fn list_replies(&self, parent_comment_id: &str) -> Result<Vec<ReplyDto>, ApiError> {
        let url = self.url(&format!("/api/comments/{}/replies", parent_comment_id));
        self.execute_json(HTTP_CLIENT.get(url)).await
    }

    async fn create_reply(
        &self,
        parent_comment_id: &str,
        content: &str,
    ) -> Result<ReplyDto, ApiError> {
        let url = self.url(&format!("/api/comments/{}/replies", parent_comment_id));
        self.execute_json(HTTP_CLIENT.post(url).json(&json!({ "content": content })))
            .await
    }

    async fn update_reply(&self, reply_id: &str, content: &str) -> Result<ReplyDto, ApiError> {
        let url = self.url(&format!("/api/replies/{}", reply_id));
        self.execute_json(HTTP_CLIENT.put(url).json(&json!({ "content": content })))
            .await
    }

    async fn delete_reply(&self, reply_id: &str) -> Result<(), ApiError> {
        let url = self.url(&format!("/api/replies/{}", reply_id));
        self.execute(HTTP_CLIENT.delete(url)).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let service = RestDataService::new("https://api.zhuayin.cn/");
        assert_eq!(
            service.url("/api/stories/feed"),
            "https://api.zhuayin.cn/api/stories/feed"
        );
    }

    #[test]
    fn test_like_path_per_kind() {
        assert_eq!(
            RestDataService::like_path(EntityKind::Post, "42"),
            "/api/likes/posts/42"
        );
        assert_eq!(
            RestDataService::like_path(EntityKind::Comment, "7"),
            "/api/likes/comments/7"
        );
        assert_eq!(
            RestDataService::like_path(EntityKind::Reply, "r9"),
            "/api/likes/replies/r9"
        );
    }

    #[tokio::test]
    async fn test_missing_token_rejected_without_request() {
        let service = RestDataService::new("https://api.zhuayin.cn");
        let result = service.toggle_entity_like(EntityKind::Post, "42").await;
        assert!(matches!(result, Err(ApiError::AuthRequired)));
    }

    #[tokio::test]
    async fn test_cleared_token_rejected() {
        let service = RestDataService::new("https://api.zhuayin.cn");
        service.set_token("abc");
        service.clear_token();
        let result = service.mark_story_viewed("s1").await;
        assert!(matches!(result, Err(ApiError::AuthRequired)));
    }
}
