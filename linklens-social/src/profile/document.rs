use crate::vk::{GroupInfo, WallPost};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Most wall posts a document ever carries.
pub const MAX_POSTS: usize = 5;

/// One wall entry as published in the result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub text: String,
    /// Unix epoch seconds.
    pub date: i64,
}

impl From<WallPost> for Post {
    fn from(p: WallPost) -> Self {
        Self {
            text: p.text,
            date: p.date,
        }
    }
}

/// The assembled profile snapshot returned to callers.
///
/// `posts` is keyed `post1..postN` in upstream order; with N capped at
/// [`MAX_POSTS`] the map's lexical order is also the upstream order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultDocument {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default)]
    pub posts: BTreeMap<String, Post>,
    #[serde(default)]
    pub subscriptions: Vec<String>,
}

impl ResultDocument {
    /// Document for a request that never got as far as fetching content.
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            posts: BTreeMap::new(),
            subscriptions: Vec::new(),
        }
    }

    /// Encode to the string carried in the endpoint's `result` field.
    pub fn to_wire(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Decode a string produced by [`ResultDocument::to_wire`].
    pub fn from_wire(wire: &str) -> serde_json::Result<Self> {
        serde_json::from_str(wire)
    }
}

/// Merge fetched content into a [`ResultDocument`].
///
/// ```
/// use linklens_social::profile::{assemble, Post};
///
/// let posts = vec![
///     Post { text: "a".into(), date: 3 },
///     Post { text: "b".into(), date: 2 },
/// ];
/// let doc = assemble(posts, None, true, None);
/// assert_eq!(doc.posts.keys().collect::<Vec<_>>(), ["post1", "post2"]);
/// assert!(doc.subscriptions.is_empty());
/// ```
pub fn assemble(
    posts: Vec<Post>,
    groups: Option<Vec<GroupInfo>>,
    success: bool,
    message: Option<String>,
) -> ResultDocument {
    let posts = posts
        .into_iter()
        .take(MAX_POSTS)
        .enumerate()
        .map(|(i, post)| (format!("post{}", i + 1), post))
        .collect();
    let subscriptions = groups
        .unwrap_or_default()
        .into_iter()
        .map(|g| g.name)
        .collect();
    ResultDocument {
        success,
        message,
        posts,
        subscriptions,
    }
}
