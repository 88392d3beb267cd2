//! 瞬间信息流缓存
//!
//! 缓存最近一次成功拉取的信息流，分组顺序由服务器决定。
//! 拉取失败时保留旧缓存（有过期数据好过没有数据），错误上抛由
//! 前端决定如何提示。

use parking_lot::RwLock;
use std::sync::Arc;

use crate::api::types::StoryFeed;
use crate::api::{ApiError, RemoteDataService};

/// 信息流缓存容器
pub struct StoryFeedStore<S: RemoteDataService> {
    service: Arc<S>,
    feed: RwLock<Option<StoryFeed>>,
}

impl<S: RemoteDataService> StoryFeedStore<S> {
    pub fn new(service: Arc<S>) -> Self {
        Self {
            service,
            feed: RwLock::new(None),
        }
    }

    /// 重新拉取信息流
    ///
    /// 成功时整体替换缓存并返回新数据；失败时缓存不动
    pub async fn refresh(&self) -> Result<StoryFeed, ApiError> {
        match self.service.fetch_story_feed().await {
            Ok(feed) => {
                println!("[Story] 信息流已刷新，共 {} 组", feed.len());
                *self.feed.write() = Some(feed.clone());
                Ok(feed)
            }
            Err(e) => {
                eprintln!("[Story] 信息流刷新失败，保留旧缓存: {}", e);
                Err(e)
            }
        }
    }

    /// 读取当前缓存的信息流
    pub fn cached(&self) -> Option<StoryFeed> {
        self.feed.read().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::MockDataService;
    use crate::api::types::{MediaKind, StoryGroup, StoryItem};

    fn group(owner: &str, item_count: usize) -> StoryGroup {
        StoryGroup {
            owner_id: owner.to_string(),
            owner_display_name: format!("主人-{}", owner),
            owner_avatar_url: format!("https://cdn.zhuayin.cn/avatar/{}.jpg", owner),
            items: (0..item_count)
                .map(|i| StoryItem {
                    id: format!("{}-s{}", owner, i),
                    media_url: format!("https://cdn.zhuayin.cn/story/{}-{}.jpg", owner, i),
                    media_kind: MediaKind::Image,
                    caption: String::new(),
                    created_at: "2026-07-01T08:00:00Z".to_string(),
                    expired: false,
                    viewed_by_current_user: false,
                })
                .collect(),
        }
    }

    #[tokio::test]
    async fn test_refresh_caches_feed() {
        let service = Arc::new(MockDataService::new());
        let store = StoryFeedStore::new(Arc::clone(&service));
        assert_eq!(store.cached(), None);

        service.set_feed(vec![group("m1", 2), group("m2", 1)]);
        let feed = store.refresh().await.unwrap();
        assert_eq!(feed.len(), 2);
        assert_eq!(store.cached().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_refresh_failure_keeps_stale_cache() {
        let service = Arc::new(MockDataService::new());
        let store = StoryFeedStore::new(Arc::clone(&service));

        service.set_feed(vec![group("m1", 2)]);
        store.refresh().await.unwrap();

        service.set_fail(true);
        assert!(store.refresh().await.is_err());
        // 旧缓存仍然可用
        let cached = store.cached().unwrap();
        assert_eq!(cached.len(), 1);
        assert_eq!(cached[0].owner_id, "m1");
    }
}
