//! Thin wrapper around the VK REST methods with LinkLens defaults.
//!
//! Every call is a single GET carrying `v=<api version>` and the access token
//! as a query parameter. VK reports most failures with HTTP 200 and an `error`
//! object, so the envelope is unwrapped here before results reach callers.
use super::types::{Envelope, GroupInfo, GroupsById, ItemsPage, VkUser, WallPost};
use super::{VkError, VkSource};
use async_trait::async_trait;
use linklens_common::LinklensError;
use linklens_config::VkConfig;
use linklens_http::{Auth, HttpClient, RequestOpts};
use serde::de::DeserializeOwned;
use std::borrow::Cow;
use std::fmt;
use std::time::Duration;

#[derive(Clone)]
pub struct VkApi {
    http: HttpClient,
    token: String,
    version: String,
}

impl fmt::Debug for VkApi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VkApi")
            .field("base", &self.http.base().as_str())
            .field("version", &self.version)
            .field("token", &"<redacted>")
            .finish()
    }
}

impl VkApi {
    pub fn new(http: HttpClient, token: String, version: String) -> Self {
        Self {
            http,
            token,
            version,
        }
    }

    /// Build a client from settings; fails with `Config` when the token is missing.
    pub fn from_config(cfg: &VkConfig) -> Result<Self, LinklensError> {
        let token = cfg.credential()?.to_string();
        let http = HttpClient::new(&cfg.api_base())
            .map_err(|e| LinklensError::Config(format!("vk.api_base: {e}")))?
            .with_timeout(Duration::from_secs(cfg.timeout_secs.max(1)));
        Ok(Self::new(http, token, cfg.api_version.clone()))
    }

    async fn call<'a, T>(
        &'a self,
        method: &'static str,
        mut params: Vec<(&'static str, Cow<'a, str>)>,
    ) -> Result<T, VkError>
    where
        T: DeserializeOwned,
    {
        params.push(("v", Cow::Borrowed(self.version.as_str())));
        let env: Envelope<T> = self
            .http
            .get_json(
                method,
                RequestOpts {
                    auth: Some(Auth::Query {
                        name: "access_token",
                        value: Cow::Borrowed(self.token.as_str()),
                    }),
                    query: Some(params),
                    ..Default::default()
                },
            )
            .await?;

        if let Some(err) = env.error {
            tracing::warn!(
                target: "vk",
                method,
                code = err.error_code,
                message = %err.error_msg,
                "vk.api_error"
            );
            return Err(VkError::Api {
                code: err.error_code,
                message: err.error_msg,
            });
        }
        env.response.ok_or(VkError::EmptyResponse { method })
    }
}

#[async_trait]
impl VkSource for VkApi {
    async fn users_get(&self, handle: &str) -> Result<Vec<VkUser>, VkError> {
        self.call("users.get", vec![("user_ids", Cow::Borrowed(handle))])
            .await
    }

    async fn wall_get(&self, owner_id: &str, count: u32) -> Result<Vec<WallPost>, VkError> {
        let page: ItemsPage<WallPost> = self
            .call(
                "wall.get",
                vec![
                    ("owner_id", Cow::Borrowed(owner_id)),
                    ("count", Cow::Owned(count.to_string())),
                ],
            )
            .await?;
        tracing::debug!(
            target: "vk",
            owner_id,
            total = page.count,
            returned = page.items.len(),
            "vk.wall_get"
        );
        Ok(page.items)
    }

    async fn groups_get(&self, user_id: &str) -> Result<Vec<i64>, VkError> {
        let page: ItemsPage<i64> = self
            .call("groups.get", vec![("user_id", Cow::Borrowed(user_id))])
            .await?;
        tracing::debug!(target: "vk", user_id, total = page.count, "vk.groups_get");
        Ok(page.items)
    }

    async fn groups_get_by_id(&self, group_ids: &[i64]) -> Result<Vec<GroupInfo>, VkError> {
        let ids = group_ids
            .iter()
            .map(i64::to_string)
            .collect::<Vec<_>>()
            .join(",");
        let resp: GroupsById = self
            .call("groups.getById", vec![("group_ids", Cow::Owned(ids))])
            .await?;
        Ok(resp.into_groups())
    }
}
