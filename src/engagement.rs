//! 点赞状态容器
//!
//! 动态、评论、回复三类实体共用同一套点赞逻辑，实体类别只决定
//! 服务器接口路径，状态变更规则完全一致：
//!
//! 1. 先发请求，成功后才写本地状态，失败时本地状态保持原值
//! 2. 服务器响应是权威结果，整体覆盖本地的 liked / likeCount，不做合并
//! 3. 点赞明细（成员列表）按需拉取，拉取前为 None
//!
//! 同一实体上并发发起的多次切换不做串行化，以最后返回的响应为准；
//! 需要更强保证的调用方应在 UI 层禁用按钮直至请求返回。

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

use crate::api::types::{EntityKind, LikeDetails, LikeState, LikeToggleOutcome};
use crate::api::{ApiError, RemoteDataService};

/// 通用点赞状态容器
///
/// 以 (实体类别, 实体 ID) 为键缓存点赞状态，条目只增不减，
/// 生命周期与所属页面一致
pub struct SocialEngagementStore<S: RemoteDataService> {
    service: Arc<S>,
    /// 当前登录成员 ID，用于从成员列表推导自己是否已点赞
    session_member_id: String,
    states: RwLock<HashMap<(EntityKind, String), LikeState>>,
}

impl<S: RemoteDataService> SocialEngagementStore<S> {
    pub fn new(service: Arc<S>, session_member_id: impl Into<String>) -> Self {
        Self {
            service,
            session_member_id: session_member_id.into(),
            states: RwLock::new(HashMap::new()),
        }
    }

    /// 切换点赞状态
    ///
    /// 成功时用服务器返回的权威结果覆盖本地的 liked / likeCount
    /// 并返回该结果；失败时本地状态不动，错误上抛给调用方。
    /// 成员列表不在此处失效，保持旧值直到下一次拉取明细。
    pub async fn toggle_like(
        &self,
        kind: EntityKind,
        entity_id: &str,
    ) -> Result<LikeToggleOutcome, ApiError> {
        let outcome = self.service.toggle_entity_like(kind, entity_id).await?;

        {
            let mut states = self.states.write();
            let state = states
                .entry((kind, entity_id.to_string()))
                .or_default();
            state.liked_by_current_user = outcome.liked;
            state.like_count = outcome.like_count;
        }

        println!(
            "[Like] 切换点赞 {}:{} -> liked={} count={}",
            kind, entity_id, outcome.liked, outcome.like_count
        );
        Ok(outcome)
    }

    /// 拉取点赞明细（总数 + 成员列表）
    ///
    /// 成功时整体覆盖本地的 likeCount 与成员列表，并根据成员列表
    /// 重新推导当前用户是否已点赞；失败时保留旧缓存。
    pub async fn fetch_like_details(
        &self,
        kind: EntityKind,
        entity_id: &str,
    ) -> Result<LikeDetails, ApiError> {
        let details = self
            .service
            .fetch_entity_like_details(kind, entity_id)
            .await?;

        {
            let mut states = self.states.write();
            let state = states
                .entry((kind, entity_id.to_string()))
                .or_default();
            state.like_count = details.like_count;
            state.liked_by_current_user = details
                .liked_members
                .iter()
                .any(|m| m.member_id == self.session_member_id);
            state.liked_members = Some(details.liked_members.clone());
        }

        Ok(details)
    }

    /// 读取某实体当前缓存的点赞状态
    pub fn like_state(&self, kind: EntityKind, entity_id: &str) -> Option<LikeState> {
        self.states
            .read()
            .get(&(kind, entity_id.to_string()))
            .cloned()
    }

    /// 当前登录成员 ID
    pub fn session_member_id(&self) -> &str {
        &self.session_member_id
    }
}
