use serde::{Deserialize, Serialize};

/// Every VK method answers with either `response` or `error`.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    pub response: Option<T>,
    #[serde(default)]
    pub error: Option<ApiErrorBody>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    pub error_code: i64,
    #[serde(default)]
    pub error_msg: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VkUser {
    pub id: i64,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ItemsPage<T> {
    #[serde(default)]
    pub count: u64,
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WallPost {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub date: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GroupInfo {
    pub id: i64,
    #[serde(default)]
    pub name: String,
}

/// `groups.getById` returns a bare array up to API 5.131 and a wrapped
/// `{ "groups": [...] }` object in later versions.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum GroupsById {
    List(Vec<GroupInfo>),
    Wrapped {
        #[serde(default)]
        groups: Vec<GroupInfo>,
    },
}

impl GroupsById {
    pub fn into_groups(self) -> Vec<GroupInfo> {
        match self {
            GroupsById::List(groups) | GroupsById::Wrapped { groups } => groups,
        }
    }
}
