//! Profile pipeline: link → account id → wall posts + subscriptions → document.
//!
//! Every stage runs sequentially against a [`VkSource`]. Resolution and fetch
//! failures do not escape [`ProfilePipeline::run`]; they come back as a
//! document with `success = false` and a `message`. The only error a caller
//! ever sees is `Config`, raised when the pipeline is built without a token.
pub mod document;
pub mod fetch;
pub mod resolve;

use crate::vk::{VkApi, VkSource};
use linklens_common::Result;
use linklens_config::LinklensConfig;
use std::sync::Arc;

pub use document::{MAX_POSTS, Post, ResultDocument, assemble};
pub use fetch::{Fetched, fetch_posts, fetch_subscriptions};
pub use resolve::{AccountId, LinkPolicy, ProfileRef, parse_profile_link, resolve_account};

/// Knobs the pipeline reads on every run.
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub wall_count: u32,
    pub include_subscriptions: bool,
    pub policy: LinkPolicy,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            wall_count: MAX_POSTS as u32,
            include_subscriptions: true,
            policy: LinkPolicy::default(),
        }
    }
}

impl PipelineSettings {
    pub fn from_config(cfg: &LinklensConfig) -> Self {
        Self {
            wall_count: cfg.vk.wall_count(),
            include_subscriptions: cfg.profile.include_subscriptions,
            policy: LinkPolicy::new(&cfg.profile.allowed_hosts),
        }
    }
}

#[derive(Clone)]
pub struct ProfilePipeline {
    source: Arc<dyn VkSource>,
    settings: PipelineSettings,
}

impl ProfilePipeline {
    pub fn new(source: Arc<dyn VkSource>, settings: PipelineSettings) -> Self {
        Self { source, settings }
    }

    /// Build against the real VK API; fails with `Config` when no token is set.
    pub fn from_config(cfg: &LinklensConfig) -> Result<Self> {
        let api = VkApi::from_config(&cfg.vk)?;
        Ok(Self::new(Arc::new(api), PipelineSettings::from_config(cfg)))
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    /// Produce the document for one profile link.
    pub async fn run(&self, link: &str) -> ResultDocument {
        let source = self.source.as_ref();

        let id = match resolve_account(link, &self.settings.policy, source).await {
            Ok(id) => id,
            Err(e) => {
                tracing::info!(target: "profile", link, kind = e.kind(), error = %e, "profile.resolve_failed");
                return ResultDocument::failed(e.to_string());
            }
        };

        let posts = fetch_posts(source, &id, self.settings.wall_count).await;
        let groups = if self.settings.include_subscriptions {
            Some(fetch_subscriptions(source, &id).await)
        } else {
            None
        };

        let success = posts.ok && groups.as_ref().is_none_or(|g| g.ok);
        let failures: Vec<String> = posts
            .failure
            .iter()
            .chain(groups.as_ref().and_then(|g| g.failure.as_ref()))
            .cloned()
            .collect();
        let message = (!failures.is_empty()).then(|| failures.join("; "));

        tracing::info!(
            target: "profile",
            %id,
            success,
            posts = posts.items.len(),
            subscriptions = groups.as_ref().map_or(0, |g| g.items.len()),
            "profile.assembled"
        );

        assemble(posts.items, groups.map(|g| g.items), success, message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vk::{GroupInfo, VkError, VkUser, WallPost};
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Scripted upstream that records every call it receives.
    #[derive(Default)]
    struct FakeVk {
        users: Vec<VkUser>,
        wall: Option<Vec<WallPost>>,
        group_ids: Option<Vec<i64>>,
        groups: Option<Vec<GroupInfo>>,
        calls: Mutex<Vec<String>>,
    }

    impl FakeVk {
        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        fn record(&self, call: String) {
            self.calls.lock().unwrap().push(call);
        }
    }

    fn api_err() -> VkError {
        VkError::Api {
            code: 30,
            message: "This profile is private".into(),
        }
    }

    #[async_trait]
    impl VkSource for FakeVk {
        async fn users_get(&self, handle: &str) -> std::result::Result<Vec<VkUser>, VkError> {
            self.record(format!("users.get {handle}"));
            Ok(self.users.clone())
        }

        async fn wall_get(
            &self,
            owner_id: &str,
            count: u32,
        ) -> std::result::Result<Vec<WallPost>, VkError> {
            self.record(format!("wall.get {owner_id} {count}"));
            self.wall.clone().ok_or_else(api_err)
        }

        async fn groups_get(&self, user_id: &str) -> std::result::Result<Vec<i64>, VkError> {
            self.record(format!("groups.get {user_id}"));
            self.group_ids.clone().ok_or_else(api_err)
        }

        async fn groups_get_by_id(
            &self,
            group_ids: &[i64],
        ) -> std::result::Result<Vec<GroupInfo>, VkError> {
            self.record(format!("groups.getById {group_ids:?}"));
            self.groups.clone().ok_or_else(api_err)
        }
    }

    fn wall(n: usize) -> Vec<WallPost> {
        (0..n)
            .map(|i| WallPost {
                text: format!("post #{i}"),
                date: 1_700_000_000 - i as i64,
            })
            .collect()
    }

    fn group(id: i64, name: &str) -> GroupInfo {
        GroupInfo {
            id,
            name: name.into(),
        }
    }

    fn pipeline(fake: Arc<FakeVk>, settings: PipelineSettings) -> ProfilePipeline {
        ProfilePipeline::new(fake, settings)
    }

    #[tokio::test]
    async fn numeric_link_skips_lookup_and_fills_document() {
        let fake = Arc::new(FakeVk {
            wall: Some(wall(3)),
            group_ids: Some(vec![10, 20]),
            groups: Some(vec![group(10, "Rustaceans"), group(20, "Go Gophers")]),
            ..Default::default()
        });
        let doc = pipeline(fake.clone(), PipelineSettings::default())
            .run("https://site.example/id123")
            .await;

        assert!(doc.success);
        assert_eq!(doc.message, None);
        let keys: Vec<&str> = doc.posts.keys().map(String::as_str).collect();
        assert_eq!(keys, ["post1", "post2", "post3"]);
        assert_eq!(doc.posts["post1"].text, "post #0");
        assert_eq!(doc.subscriptions, ["Rustaceans", "Go Gophers"]);
        assert_eq!(
            fake.calls(),
            ["wall.get 123 5", "groups.get 123", "groups.getById [10, 20]"]
        );
    }

    #[tokio::test]
    async fn handle_is_resolved_through_lookup() {
        let fake = Arc::new(FakeVk {
            users: vec![VkUser {
                id: 456,
                first_name: None,
                last_name: None,
            }],
            wall: Some(wall(1)),
            group_ids: Some(vec![1]),
            groups: Some(vec![group(1, "One")]),
            ..Default::default()
        });
        let doc = pipeline(fake.clone(), PipelineSettings::default())
            .run("https://site.example/somehandle")
            .await;

        assert!(doc.success);
        assert_eq!(fake.calls()[0], "users.get somehandle");
        assert_eq!(fake.calls()[1], "wall.get 456 5");
    }

    #[tokio::test]
    async fn unknown_handle_yields_failed_document() {
        let fake = Arc::new(FakeVk::default());
        let doc = pipeline(fake.clone(), PipelineSettings::default())
            .run("https://vk.com/nobody_here")
            .await;

        assert!(!doc.success);
        assert!(doc.message.unwrap().contains("account not found"));
        assert!(doc.posts.is_empty());
        assert_eq!(fake.calls(), ["users.get nobody_here"]);
    }

    #[tokio::test]
    async fn invalid_link_yields_failed_document_without_calls() {
        let fake = Arc::new(FakeVk::default());
        let doc = pipeline(fake.clone(), PipelineSettings::default())
            .run("ftp://vk.com/durov")
            .await;

        assert!(!doc.success);
        assert!(doc.message.unwrap().starts_with("invalid profile link"));
        assert!(fake.calls().is_empty());
    }

    #[tokio::test]
    async fn failing_subscriptions_mark_document_failed_but_keep_posts() {
        let fake = Arc::new(FakeVk {
            wall: Some(wall(2)),
            group_ids: None,
            ..Default::default()
        });
        let doc = pipeline(fake.clone(), PipelineSettings::default())
            .run("42")
            .await;

        assert!(!doc.success);
        assert_eq!(doc.posts.len(), 2);
        assert!(doc.subscriptions.is_empty());
        assert!(doc.message.unwrap().starts_with("groups.get:"));
        assert_eq!(fake.calls(), ["wall.get 42 5", "groups.get 42"]);
    }

    #[tokio::test]
    async fn empty_membership_skips_name_lookup() {
        let fake = Arc::new(FakeVk {
            wall: Some(wall(1)),
            group_ids: Some(Vec::new()),
            ..Default::default()
        });
        let doc = pipeline(fake.clone(), PipelineSettings::default())
            .run("42")
            .await;

        assert!(!doc.success);
        assert_eq!(fake.calls(), ["wall.get 42 5", "groups.get 42"]);
    }

    #[tokio::test]
    async fn empty_wall_is_a_failure() {
        let fake = Arc::new(FakeVk {
            wall: Some(Vec::new()),
            group_ids: Some(vec![1]),
            groups: Some(vec![group(1, "One")]),
            ..Default::default()
        });
        let doc = pipeline(fake, PipelineSettings::default()).run("42").await;

        assert!(!doc.success);
        assert!(doc.posts.is_empty());
        assert_eq!(doc.subscriptions, ["One"]);
    }

    #[tokio::test]
    async fn posts_only_variant_ignores_groups() {
        let fake = Arc::new(FakeVk {
            wall: Some(wall(9)),
            ..Default::default()
        });
        let settings = PipelineSettings {
            wall_count: 3,
            include_subscriptions: false,
            ..Default::default()
        };
        let doc = pipeline(fake.clone(), settings).run("42").await;

        assert!(doc.success);
        // Upstream ignored `count`; the document is still capped.
        assert_eq!(doc.posts.len(), MAX_POSTS);
        assert_eq!(fake.calls(), ["wall.get 42 3"]);
    }

    #[test]
    fn from_config_without_token_is_a_config_error() {
        let mut cfg = LinklensConfig::default();
        cfg.vk.access_token = None;
        assert!(matches!(
            ProfilePipeline::from_config(&cfg),
            Err(linklens_common::LinklensError::Config(_))
        ));
    }
}
