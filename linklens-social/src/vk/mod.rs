//! VK API integration surface used by the profile pipeline.
//!
//! Submodules provide the HTTP client wrapper and the typed response models.
//! [`VkSource`] is the seam the pipeline talks to, so tests can swap the
//! network for a scripted fake.
pub mod client;
pub mod types;

use async_trait::async_trait;
use linklens_common::LinklensError;
use linklens_http::HttpError;
use thiserror::Error;

pub use client::VkApi;
pub use types::{GroupInfo, VkUser, WallPost};

#[derive(Debug, Error)]
pub enum VkError {
    #[error(transparent)]
    Http(#[from] HttpError),
    #[error("VK API error {code}: {message}")]
    Api { code: i64, message: String },
    #[error("VK returned neither `response` nor `error` for {method}")]
    EmptyResponse { method: &'static str },
}

impl From<VkError> for LinklensError {
    fn from(err: VkError) -> Self {
        LinklensError::Upstream(err.to_string())
    }
}

/// Read operations the profile pipeline needs from VK.
#[async_trait]
pub trait VkSource: Send + Sync {
    /// `users.get` for a handle (screen name or id).
    async fn users_get(&self, handle: &str) -> Result<Vec<VkUser>, VkError>;

    /// `wall.get` for an owner, newest first, at most `count` items.
    async fn wall_get(&self, owner_id: &str, count: u32) -> Result<Vec<WallPost>, VkError>;

    /// `groups.get`: ids of the communities a user is subscribed to.
    async fn groups_get(&self, user_id: &str) -> Result<Vec<i64>, VkError>;

    /// `groups.getById`: names for a batch of community ids.
    async fn groups_get_by_id(&self, group_ids: &[i64]) -> Result<Vec<GroupInfo>, VkError>;
}
