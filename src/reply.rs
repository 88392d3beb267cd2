//! 楼中楼回复模块
//!
//! 以父评论 ID 为键维护回复列表（创建顺序），点赞行为复用
//! 点赞状态容器的 reply 类别，点赞结果再扇出写回到对应回复对象上。
//!
//! 约定：
//! 1. 回复 ID 全局唯一，按父评论分组只是二级索引，编辑/删除按 ID 全局定位
//! 2. 加载整体替换该父评论的列表，不做合并；缺失的点赞计数归零
//! 3. 内容校验在任何网络调用之前完成
//! 4. 删除某组最后一条回复后保留空列表，键不移除

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

use crate::api::types::{EntityKind, LikeDetails, LikeToggleOutcome, Reply};
use crate::api::{ApiError, RemoteDataService};
use crate::engagement::SocialEngagementStore;

/// 回复操作错误类型
#[derive(Error, Debug)]
pub enum ReplyError {
    /// 内容为空或仅含空白字符，在发起网络调用前拒绝
    #[error("回复内容不能为空")]
    EmptyContent,

    /// 本地未找到该回复
    #[error("未找到回复: {0}")]
    ReplyNotFound(String),

    #[error(transparent)]
    Api(#[from] ApiError),
}

/// 楼中楼回复容器
pub struct ThreadedReplyStore<S: RemoteDataService> {
    service: Arc<S>,
    engagement: Arc<SocialEngagementStore<S>>,
    /// 父评论 ID -> 回复列表（创建顺序）
    index: RwLock<HashMap<String, Vec<Reply>>>,
}

impl<S: RemoteDataService> ThreadedReplyStore<S> {
    pub fn new(service: Arc<S>, engagement: Arc<SocialEngagementStore<S>>) -> Self {
        Self {
            service,
            engagement,
            index: RwLock::new(HashMap::new()),
        }
    }

    /// 加载某条父评论下的全部回复
    ///
    /// 成功时整体替换该键下的列表；失败时保留旧缓存
    pub async fn load_replies(&self, parent_comment_id: &str) -> Result<Vec<Reply>, ReplyError> {
        let dtos = self.service.list_replies(parent_comment_id).await?;
        let replies: Vec<Reply> = dtos.into_iter().map(Reply::from_dto).collect();

        self.index
            .write()
            .insert(parent_comment_id.to_string(), replies.clone());

        println!(
            "[Reply] 已加载父评论 {} 的回复 {} 条",
            parent_comment_id,
            replies.len()
        );
        Ok(replies)
    }

    /// 发表回复，追加到该父评论列表末尾
    pub async fn add_reply(
        &self,
        parent_comment_id: &str,
        content: &str,
    ) -> Result<Reply, ReplyError> {
        if content.trim().is_empty() {
            return Err(ReplyError::EmptyContent);
        }

        let dto = self.service.create_reply(parent_comment_id, content).await?;
        let reply = Reply::from_dto(dto);

        self.index
            .write()
            .entry(parent_comment_id.to_string())
            .or_default()
            .push(reply.clone());

        Ok(reply)
    }

    /// 编辑回复内容（按 ID 全局定位，位置不变）
    pub async fn edit_reply(&self, reply_id: &str, new_content: &str) -> Result<(), ReplyError> {
        if new_content.trim().is_empty() {
            return Err(ReplyError::EmptyContent);
        }
        if !self.contains_reply(reply_id) {
            return Err(ReplyError::ReplyNotFound(reply_id.to_string()));
        }

        let dto = self.service.update_reply(reply_id, new_content).await?;

        let mut index = self.index.write();
        for replies in index.values_mut() {
            if let Some(reply) = replies.iter_mut().find(|r| r.id == reply_id) {
                reply.content = dto.content;
                reply.updated_at = dto.updated_at;
                return Ok(());
            }
        }
        Ok(())
    }

    /// 删除回复（按 ID 全局定位，其余回复顺序不变）
    pub async fn remove_reply(&self, reply_id: &str) -> Result<(), ReplyError> {
        if !self.contains_reply(reply_id) {
            return Err(ReplyError::ReplyNotFound(reply_id.to_string()));
        }

        self.service.delete_reply(reply_id).await?;

        let mut index = self.index.write();
        for replies in index.values_mut() {
            replies.retain(|r| r.id != reply_id);
        }
        println!("[Reply] 已删除回复 {}", reply_id);
        Ok(())
    }

    /// 切换回复点赞
    ///
    /// 委托点赞状态容器完成切换，再把权威结果写回对应回复对象。
    /// 父评论 ID 由调用方提供作为定位提示，提示未命中时退回全局查找。
    pub async fn toggle_like_on_reply(
        &self,
        reply_id: &str,
        parent_comment_id: &str,
    ) -> Result<LikeToggleOutcome, ReplyError> {
        let outcome = self
            .engagement
            .toggle_like(EntityKind::Reply, reply_id)
            .await?;

        let written = self.with_reply_mut(parent_comment_id, reply_id, |reply| {
            reply.like.liked_by_current_user = outcome.liked;
            reply.like.like_count = outcome.like_count;
        });
        if !written {
            eprintln!("[Reply] 点赞结果未写回，本地不存在回复 {}", reply_id);
        }

        Ok(outcome)
    }

    /// 拉取回复点赞明细并写回对应回复对象
    pub async fn fetch_reply_like_details(
        &self,
        reply_id: &str,
        parent_comment_id: &str,
    ) -> Result<LikeDetails, ReplyError> {
        let details = self
            .engagement
            .fetch_like_details(EntityKind::Reply, reply_id)
            .await?;

        // 自己是否已点赞由点赞状态容器根据成员列表推导
        let liked = self
            .engagement
            .like_state(EntityKind::Reply, reply_id)
            .map(|s| s.liked_by_current_user)
            .unwrap_or(false);

        let written = self.with_reply_mut(parent_comment_id, reply_id, |reply| {
            reply.like.like_count = details.like_count;
            reply.like.liked_members = Some(details.liked_members.clone());
            reply.like.liked_by_current_user = liked;
        });
        if !written {
            eprintln!("[Reply] 点赞明细未写回，本地不存在回复 {}", reply_id);
        }

        Ok(details)
    }

    /// 读取某条父评论下缓存的回复列表
    pub fn replies(&self, parent_comment_id: &str) -> Option<Vec<Reply>> {
        self.index.read().get(parent_comment_id).cloned()
    }

    /// 按 ID 全局查找回复
    pub fn find_reply(&self, reply_id: &str) -> Option<Reply> {
        self.index
            .read()
            .values()
            .flat_map(|replies| replies.iter())
            .find(|r| r.id == reply_id)
            .cloned()
    }

    fn contains_reply(&self, reply_id: &str) -> bool {
        self.index
            .read()
            .values()
            .any(|replies| replies.iter().any(|r| r.id == reply_id))
    }

    /// 对指定回复就地修改，提示分组未命中时退回全局查找
    fn with_reply_mut(
        &self,
        parent_hint: &str,
        reply_id: &str,
        apply: impl FnOnce(&mut Reply),
    ) -> bool {
        let mut index = self.index.write();

        if let Some(replies) = index.get_mut(parent_hint)
            && let Some(reply) = replies.iter_mut().find(|r| r.id == reply_id)
        {
            apply(reply);
            return true;
        }

        for (parent_id, replies) in index.iter_mut() {
            if parent_id == parent_hint {
                continue;
            }
            if let Some(reply) = replies.iter_mut().find(|r| r.id == reply_id) {
                apply(reply);
                return true;
            }
        }
        false
    }
}
