//! Loader for LinkLens configuration with YAML + environment overlays.
//!
//! Sources are merged in this order (later wins):
//!
//! 1. built-in defaults (every field has one, so an empty source is valid)
//! 2. YAML/TOML/JSON files attached via [`LinklensConfigLoader::with_file`]
//!    or [`LinklensConfigLoader::with_optional_file`], plus inline snippets
//! 3. `LINKLENS__`-prefixed environment variables, `__` separating nested keys
//!    (`LINKLENS__VK__ACCESS_TOKEN`, `LINKLENS__SERVER__BIND`, ...)
//!
//! After merging, `${VAR}` placeholders in string values are expanded from the
//! process environment. A missing `vk.access_token` falls back to
//! `VK_ACCESS_TOKEN`. Nothing here fails on a missing token: that is checked
//! by [`VkConfig::credential`] when the pipeline is built.
use config::{Config, ConfigError, Environment, File};
use linklens_common::LinklensError;
use linklens_common::observability::{LogConfig, LogFormat};
use serde::Deserialize;
use serde_json::Value;
use std::path::{Path, PathBuf};

const MAXIMUM_ENV_EXPANSION_DEPTH: usize = 8;

/// Upper bound on wall posts requested per profile.
pub const MAX_WALL_COUNT: u32 = 5;

/// Environment variable consulted when no token is configured explicitly.
pub const TOKEN_ENV_FALLBACK: &str = "VK_ACCESS_TOKEN";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LinklensConfig {
    pub vk: VkConfig,
    pub profile: ProfileConfig,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
}

/// Upstream API settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct VkConfig {
    pub access_token: Option<String>,
    pub api_base: String,
    pub api_version: String,
    pub wall_count: u32,
    pub timeout_secs: u64,
}

impl Default for VkConfig {
    fn default() -> Self {
        Self {
            access_token: None,
            api_base: "https://api.vk.com/method/".into(),
            api_version: "5.131".into(),
            wall_count: MAX_WALL_COUNT,
            timeout_secs: 15,
        }
    }
}

impl VkConfig {
    /// The access token, or a `Config` error when it is absent, blank, or an
    /// unexpanded `${VAR}` placeholder.
    ///
    /// ```
    /// use linklens_config::VkConfig;
    ///
    /// let mut vk = VkConfig::default();
    /// assert!(vk.credential().is_err());
    ///
    /// vk.access_token = Some("${VK_TOKEN_THAT_IS_NOT_SET}".into());
    /// assert!(vk.credential().is_err());
    ///
    /// vk.access_token = Some("  vk1.a.token  ".into());
    /// assert_eq!(vk.credential().unwrap(), "vk1.a.token");
    /// ```
    pub fn credential(&self) -> Result<&str, LinklensError> {
        let token = self.access_token.as_deref().map(str::trim).unwrap_or("");
        if token.is_empty() {
            return Err(LinklensError::Config(format!(
                "VK access token is not set (vk.access_token or {TOKEN_ENV_FALLBACK})"
            )));
        }
        if token.contains("${") {
            return Err(LinklensError::Config(format!(
                "VK access token placeholder was not expanded: {token}"
            )));
        }
        Ok(token)
    }

    /// Wall post count clamped to `1..=MAX_WALL_COUNT`.
    pub fn wall_count(&self) -> u32 {
        self.wall_count.clamp(1, MAX_WALL_COUNT)
    }

    /// API base guaranteed to end in `/` so method names join beneath it.
    pub fn api_base(&self) -> String {
        if self.api_base.ends_with('/') {
            self.api_base.clone()
        } else {
            format!("{}/", self.api_base)
        }
    }
}

/// Pipeline behaviour knobs.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProfileConfig {
    /// When false only wall posts are fetched and `success` reflects them alone.
    pub include_subscriptions: bool,
    /// Hosts accepted in profile links; empty accepts any host.
    pub allowed_hosts: Vec<String>,
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            include_subscriptions: true,
            allowed_hosts: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8080".into(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub dir: Option<PathBuf>,
    pub format: LogFormat,
    pub emit_stderr: bool,
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            dir: None,
            format: LogFormat::Text,
            emit_stderr: true,
            filter: "info".into(),
        }
    }
}

impl LoggingConfig {
    /// Translate into the observability initialiser's settings.
    pub fn to_log_config(&self, app_name: &'static str) -> LogConfig {
        LogConfig {
            app_name,
            log_dir: self.dir.clone(),
            emit_stderr: self.emit_stderr,
            format: self.format,
            default_filter: self.filter.clone(),
        }
    }
}

fn expand_env_in_value(v: &mut Value) {
    match v {
        Value::String(s) => {
            if s.contains('$') {
                let mut cur = std::mem::take(s);
                for _ in 0..MAXIMUM_ENV_EXPANSION_DEPTH {
                    let expanded = match shellexpand::env(&cur) {
                        Ok(cow) => cow.into_owned(),
                        Err(_) => cur.clone(),
                    };
                    if expanded == cur {
                        break;
                    }
                    cur = expanded;
                }
                *s = cur;
            }
        }
        Value::Array(arr) => arr.iter_mut().for_each(expand_env_in_value),
        Value::Object(obj) => obj.values_mut().for_each(expand_env_in_value),
        _ => {}
    }
}

/// Builder hides the `config` crate wiring (files + env overrides).
pub struct LinklensConfigLoader {
    builder: config::ConfigBuilder<config::builder::DefaultState>,
}

impl Default for LinklensConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl LinklensConfigLoader {
    /// Start with defaults + `LINKLENS__` env overrides.
    ///
    /// ```
    /// use linklens_config::LinklensConfigLoader;
    ///
    /// let config = LinklensConfigLoader::new()
    ///     .with_yaml_str("server:\n  bind: '0.0.0.0:9000'")
    ///     .load()
    ///     .expect("valid config");
    ///
    /// assert_eq!(config.server.bind, "0.0.0.0:9000");
    /// assert_eq!(config.vk.api_version, "5.131");
    /// assert!(config.profile.include_subscriptions);
    /// ```
    pub fn new() -> Self {
        Self {
            builder: Config::builder(),
        }
    }

    /// Attach a required YAML/TOML/JSON file; the format is inferred by suffix.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(true));
        self
    }

    /// Attach a file that may be absent, for env-only deployments.
    pub fn with_optional_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(false));
        self
    }

    /// Merge an inline YAML snippet (tests, CLI overrides).
    pub fn with_yaml_str(mut self, yaml: &str) -> Self {
        self.builder = self
            .builder
            .add_source(File::from_str(yaml, config::FileFormat::Yaml));
        self
    }

    /// Consume the builder and deserialize the merged sources into [`LinklensConfig`].
    ///
    /// ```
    /// use linklens_config::LinklensConfigLoader;
    ///
    /// unsafe { std::env::set_var("LL_DOCTEST_TOKEN", "injected-from-env"); }
    ///
    /// let config = LinklensConfigLoader::new()
    ///     .with_yaml_str(r#"
    /// vk:
    ///   access_token: "${LL_DOCTEST_TOKEN}"
    ///   wall_count: 3
    /// "#)
    ///     .load()
    ///     .expect("valid configuration");
    ///
    /// assert_eq!(config.vk.credential().unwrap(), "injected-from-env");
    /// assert_eq!(config.vk.wall_count(), 3);
    ///
    /// unsafe { std::env::remove_var("LL_DOCTEST_TOKEN"); }
    /// ```
    pub fn load(self) -> Result<LinklensConfig, ConfigError> {
        let cfg = self
            .builder
            .add_source(
                Environment::with_prefix("LINKLENS")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut v: Value = cfg.try_deserialize()?;
        expand_env_in_value(&mut v);

        let mut typed: LinklensConfig =
            serde_json::from_value(v).map_err(|e| ConfigError::Message(e.to_string()))?;

        if typed.vk.access_token.is_none() {
            typed.vk.access_token = std::env::var(TOKEN_ENV_FALLBACK).ok();
        }

        Ok(typed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn expands_simple_string() {
        temp_env::with_var("LL_FOO", Some("bar"), || {
            let mut v = json!("prefix-${LL_FOO}-suffix");
            expand_env_in_value(&mut v);
            assert_eq!(v, json!("prefix-bar-suffix"));
        });
    }

    #[test]
    fn expands_inside_nested_objects() {
        temp_env::with_vars(
            [("LL_TOKEN", Some("t0k")), ("LL_HOST", Some("vk.com"))],
            || {
                let mut v = json!({
                    "vk": { "access_token": "${LL_TOKEN}" },
                    "profile": { "allowed_hosts": ["$LL_HOST", 42, null] }
                });
                expand_env_in_value(&mut v);
                assert_eq!(
                    v,
                    json!({
                        "vk": { "access_token": "t0k" },
                        "profile": { "allowed_hosts": ["vk.com", 42, null] }
                    })
                );
            },
        );
    }

    #[test]
    fn stops_on_cycles() {
        temp_env::with_vars([("LL_A", Some("${LL_B}")), ("LL_B", Some("${LL_A}"))], || {
            let mut v = json!("x=${LL_A}-y");
            expand_env_in_value(&mut v);
            let s = v.as_str().unwrap();
            assert!(s.starts_with("x=") && s.ends_with("-y"));
            assert!(s.contains("${"));
        });
    }

    #[test]
    fn unknown_vars_are_left_as_is() {
        let mut v = json!("hi-${LL_DOES_NOT_EXIST}");
        expand_env_in_value(&mut v);
        assert_eq!(v, json!("hi-${LL_DOES_NOT_EXIST}"));
    }

    #[test]
    fn wall_count_is_clamped() {
        let mut vk = VkConfig::default();
        vk.wall_count = 50;
        assert_eq!(vk.wall_count(), MAX_WALL_COUNT);
        vk.wall_count = 0;
        assert_eq!(vk.wall_count(), 1);
    }

    #[test]
    fn api_base_gets_trailing_slash() {
        let vk = VkConfig {
            api_base: "http://localhost:1234/method".into(),
            ..VkConfig::default()
        };
        assert_eq!(vk.api_base(), "http://localhost:1234/method/");
    }

    #[test]
    fn blank_token_is_a_config_error() {
        let vk = VkConfig {
            access_token: Some("   ".into()),
            ..VkConfig::default()
        };
        assert!(matches!(vk.credential(), Err(LinklensError::Config(_))));
    }
}
