//! Wall and subscription fetchers.
//!
//! Failures never propagate: each fetcher reports `ok = false` with a short
//! reason and whatever it managed to collect (nothing, in practice).
use super::document::{MAX_POSTS, Post};
use super::resolve::AccountId;
use crate::vk::{GroupInfo, VkSource};

/// Outcome of one fetcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fetched<T> {
    pub ok: bool,
    pub items: Vec<T>,
    pub failure: Option<String>,
}

impl<T> Fetched<T> {
    fn ok(items: Vec<T>) -> Self {
        Self {
            ok: true,
            items,
            failure: None,
        }
    }

    fn failed(reason: impl Into<String>) -> Self {
        Self {
            ok: false,
            items: Vec::new(),
            failure: Some(reason.into()),
        }
    }
}

/// Newest wall posts of `id`, at most `count` (never more than [`MAX_POSTS`]).
pub async fn fetch_posts(source: &dyn VkSource, id: &AccountId, count: u32) -> Fetched<Post> {
    let count = count.clamp(1, MAX_POSTS as u32);
    match source.wall_get(id.as_str(), count).await {
        Ok(items) if items.is_empty() => {
            tracing::info!(target: "profile", %id, "fetch_posts.empty");
            Fetched::failed("wall.get: no posts")
        }
        Ok(items) => {
            let posts: Vec<Post> = items
                .into_iter()
                .take(MAX_POSTS)
                .map(Post::from)
                .collect();
            tracing::debug!(target: "profile", %id, count = posts.len(), "fetch_posts.ok");
            Fetched::ok(posts)
        }
        Err(e) => {
            tracing::warn!(target: "profile", %id, error = %e, "fetch_posts.failed");
            Fetched::failed(format!("wall.get: {e}"))
        }
    }
}

/// Communities `id` is subscribed to, with names resolved in one batch call.
pub async fn fetch_subscriptions(source: &dyn VkSource, id: &AccountId) -> Fetched<GroupInfo> {
    let group_ids = match source.groups_get(id.as_str()).await {
        Ok(ids) if ids.is_empty() => {
            tracing::info!(target: "profile", %id, "fetch_subscriptions.empty");
            return Fetched::failed("groups.get: no subscriptions");
        }
        Ok(ids) => ids,
        Err(e) => {
            tracing::warn!(target: "profile", %id, error = %e, "fetch_subscriptions.list_failed");
            return Fetched::failed(format!("groups.get: {e}"));
        }
    };

    match source.groups_get_by_id(&group_ids).await {
        Ok(groups) => {
            tracing::debug!(target: "profile", %id, count = groups.len(), "fetch_subscriptions.ok");
            Fetched::ok(groups)
        }
        Err(e) => {
            tracing::warn!(target: "profile", %id, error = %e, "fetch_subscriptions.names_failed");
            Fetched::failed(format!("groups.getById: {e}"))
        }
    }
}
