//! Profile link → account id resolution.
//!
//! The last non-empty path segment of the link decides: digits (optionally in
//! VK's `id<digits>` alias form) are the id as-is, anything else is a handle
//! looked up through `users.get`.
use crate::vk::VkSource;
use linklens_common::{LinklensError, Result};
use regex::Regex;
use std::fmt;
use std::sync::LazyLock;
use url::Url;

const MAX_LINK_LEN: usize = 2048;

static NUMERIC_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:id)?(\d+)$").expect("static regex"));
static HANDLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_.]+$").expect("static regex"));

/// Canonical numeric account identifier, kept as the string VK returned.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AccountId(String);

impl AccountId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What a link points at before any network call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileRef {
    Id(AccountId),
    Handle(String),
}

/// Host restrictions applied to links that carry a scheme.
#[derive(Debug, Clone, Default)]
pub struct LinkPolicy {
    allowed_hosts: Vec<String>,
}

impl LinkPolicy {
    pub fn new<I, S>(allowed_hosts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            allowed_hosts: allowed_hosts
                .into_iter()
                .map(|h| normalize_host(h.as_ref()))
                .filter(|h| !h.is_empty())
                .collect(),
        }
    }

    fn allows(&self, host: &str) -> bool {
        self.allowed_hosts.is_empty() || self.allowed_hosts.iter().any(|h| *h == normalize_host(host))
    }
}

fn normalize_host(host: &str) -> String {
    let host = host.trim().trim_end_matches('.').to_ascii_lowercase();
    ["www.", "m."]
        .iter()
        .find_map(|p| host.strip_prefix(p))
        .map(str::to_string)
        .unwrap_or(host)
}

/// Parse a profile link (or bare id / handle) without touching the network.
///
/// ```
/// use linklens_social::profile::{parse_profile_link, LinkPolicy, ProfileRef};
///
/// let policy = LinkPolicy::default();
/// match parse_profile_link("https://vk.com/id123", &policy).unwrap() {
///     ProfileRef::Id(id) => assert_eq!(id.as_str(), "123"),
///     other => panic!("unexpected {other:?}"),
/// }
/// assert_eq!(
///     parse_profile_link("https://vk.com/durov", &policy).unwrap(),
///     ProfileRef::Handle("durov".into())
/// );
/// ```
pub fn parse_profile_link(link: &str, policy: &LinkPolicy) -> Result<ProfileRef> {
    let link = link.trim();
    if link.is_empty() {
        return Err(LinklensError::InvalidInput("link is empty".into()));
    }
    if link.len() > MAX_LINK_LEN {
        return Err(LinklensError::InvalidInput(format!(
            "link is longer than {MAX_LINK_LEN} characters"
        )));
    }
    if link.contains(['\t', '\r', '\n']) {
        return Err(LinklensError::InvalidInput(
            "link contains control whitespace".into(),
        ));
    }

    let bare = link.split(['?', '#']).next().unwrap_or("");
    let segment = if link.contains("://") {
        let url = allowed_url(link, link, policy)?;
        last_segment(url.path()).map(str::to_string)
    } else if bare.contains('/') && !bare.starts_with('/') {
        // Scheme-less "vk.com/durov": the first segment is a host.
        let url = allowed_url(&format!("https://{link}"), link, policy)?;
        last_segment(url.path()).map(str::to_string)
    } else {
        // Bare forms: "123", "durov".
        last_segment(bare).map(str::to_string)
    };

    let segment = segment
        .ok_or_else(|| LinklensError::InvalidInput(format!("{link}: no profile segment")))?;
    let segment = segment.as_str();

    if let Some(caps) = NUMERIC_ID.captures(segment) {
        return Ok(ProfileRef::Id(AccountId(caps[1].to_string())));
    }
    if HANDLE.is_match(segment) {
        return Ok(ProfileRef::Handle(segment.to_string()));
    }
    Err(LinklensError::InvalidInput(format!(
        "`{segment}` is neither an account id nor a handle"
    )))
}

fn allowed_url(raw: &str, link: &str, policy: &LinkPolicy) -> Result<Url> {
    let url =
        Url::parse(raw).map_err(|e| LinklensError::InvalidInput(format!("{link}: {e}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(LinklensError::InvalidInput(format!(
            "unsupported scheme `{}`",
            url.scheme()
        )));
    }
    let host = url
        .host_str()
        .ok_or_else(|| LinklensError::InvalidInput(format!("{link}: missing host")))?;
    if !policy.allows(host) {
        return Err(LinklensError::InvalidInput(format!(
            "host `{host}` is not an allowed profile host"
        )));
    }
    Ok(url)
}

fn last_segment(path: &str) -> Option<&str> {
    path.split('/').rev().find(|s| !s.is_empty())
}

/// Resolve a link to an account id, looking handles up upstream.
pub async fn resolve_account(
    link: &str,
    policy: &LinkPolicy,
    source: &dyn VkSource,
) -> Result<AccountId> {
    match parse_profile_link(link, policy)? {
        ProfileRef::Id(id) => {
            tracing::debug!(target: "profile", %id, "resolve.numeric");
            Ok(id)
        }
        ProfileRef::Handle(handle) => {
            let users = source.users_get(&handle).await?;
            let user = users
                .into_iter()
                .next()
                .ok_or_else(|| LinklensError::NotFound(handle.clone()))?;
            tracing::debug!(target: "profile", %handle, id = user.id, "resolve.lookup");
            Ok(AccountId(user.id.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(link: &str) -> Result<ProfileRef> {
        parse_profile_link(link, &LinkPolicy::default())
    }

    fn id(s: &str) -> ProfileRef {
        ProfileRef::Id(AccountId(s.to_string()))
    }

    #[test]
    fn numeric_segments_are_returned_unchanged() {
        assert_eq!(parse("https://vk.com/7064629").unwrap(), id("7064629"));
        assert_eq!(parse("https://site.example/id123").unwrap(), id("123"));
        assert_eq!(parse("007").unwrap(), id("007"));
        assert_eq!(parse("https://vk.com/id42/").unwrap(), id("42"));
    }

    #[test]
    fn handles_are_detected() {
        assert_eq!(
            parse("https://vk.com/somehandle?w=wall1_2").unwrap(),
            ProfileRef::Handle("somehandle".into())
        );
        assert_eq!(parse("vk.com/durov").unwrap(), ProfileRef::Handle("durov".into()));
        assert_eq!(parse("idea").unwrap(), ProfileRef::Handle("idea".into()));
    }

    #[test]
    fn signs_are_not_normalized() {
        assert!(matches!(parse("-123"), Err(LinklensError::InvalidInput(_))));
    }

    #[test]
    fn malformed_links_are_invalid_input() {
        for bad in [
            "",
            "   ",
            "https://",
            "ftp://vk.com/durov",
            "https://vk.com/",
            "https://vk.com/bad%20handle",
            "https://vk.com/du\nrov",
        ] {
            assert!(
                matches!(parse(bad), Err(LinklensError::InvalidInput(_))),
                "expected InvalidInput for {bad:?}"
            );
        }
        let long = format!("https://vk.com/{}", "a".repeat(MAX_LINK_LEN));
        assert!(matches!(parse(&long), Err(LinklensError::InvalidInput(_))));
    }

    #[test]
    fn host_policy_is_enforced() {
        let policy = LinkPolicy::new(["vk.com"]);
        assert!(parse_profile_link("https://m.vk.com/durov", &policy).is_ok());
        assert!(parse_profile_link("https://WWW.VK.COM/durov", &policy).is_ok());
        assert!(matches!(
            parse_profile_link("https://evil.example/durov", &policy),
            Err(LinklensError::InvalidInput(_))
        ));
        // Bare ids carry no host and are always accepted.
        assert!(parse_profile_link("123", &policy).is_ok());
        assert!(parse_profile_link("durov", &policy).is_ok());
    }

    #[test]
    fn scheme_less_hosts_are_checked_too() {
        let policy = LinkPolicy::new(["vk.com"]);
        assert_eq!(
            parse_profile_link("vk.com/durov", &policy).unwrap(),
            ProfileRef::Handle("durov".into())
        );
        assert_eq!(parse_profile_link("m.vk.com/id77", &policy).unwrap(), id("77"));
        assert!(matches!(
            parse_profile_link("evil.example/durov", &policy),
            Err(LinklensError::InvalidInput(_))
        ));
        assert_eq!(
            parse("evil.example/durov").unwrap(),
            ProfileRef::Handle("durov".into())
        );
    }
}
