use openapi_mcp_naming::NamingConfig;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// Default outbound call timeout when `timeoutSecs` is not set.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration for one `OpenAPI`-backed tool source.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiSourceConfig {
    /// `OpenAPI` spec location (http(s) URL or file path).
    pub spec: String,

    /// Override the base URL taken from the spec's `servers`.
    #[serde(default)]
    pub base_url: Option<String>,

    /// Authentication for upstream calls.
    #[serde(default)]
    pub auth: Option<AuthConfig>,

    /// Which operations become tools.
    #[serde(default)]
    pub auto_discover: AutoDiscoverConfig,

    /// Static headers sent with every upstream call.
    #[serde(default)]
    pub headers: BTreeMap<String, String>,

    /// Upstream call timeout in seconds. `0` disables the timeout.
    #[serde(default)]
    pub timeout_secs: Option<u64>,

    /// Local request budget for upstream calls.
    #[serde(default)]
    pub rate_limit: Option<RateLimitConfig>,

    /// Tool naming options.
    #[serde(default)]
    pub naming: NamingConfig,
}

impl ApiSourceConfig {
    /// Minimal config: discover everything from `spec`, no auth, default timeout.
    #[must_use]
    pub fn new(spec: impl Into<String>) -> Self {
        Self {
            spec: spec.into(),
            base_url: None,
            auth: None,
            auto_discover: AutoDiscoverConfig::default(),
            headers: BTreeMap::new(),
            timeout_secs: None,
            rate_limit: None,
            naming: NamingConfig::default(),
        }
    }

    /// Effective upstream timeout. `None` means no timeout.
    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        match self.timeout_secs {
            Some(0) => None,
            Some(secs) => Some(Duration::from_secs(secs)),
            None => Some(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
        }
    }

    /// True when the spec is fetched over HTTP rather than read from disk.
    #[must_use]
    pub fn spec_is_url(&self) -> bool {
        is_http_url(&self.spec)
    }
}

pub(crate) fn is_http_url(s: &str) -> bool {
    s.starts_with("http://") || s.starts_with("https://")
}

/// Upstream authentication.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum AuthConfig {
    /// `Authorization: Bearer <token>`.
    Bearer { token: String },
    /// Arbitrary header, e.g. `X-API-Key`.
    Header { name: String, value: String },
    /// API key passed as a query parameter.
    Query { name: String, value: String },
}

/// Sliding-window request budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RateLimitConfig {
    pub max_requests: u32,
    #[serde(default = "default_window_secs")]
    pub window_secs: u64,
}

fn default_window_secs() -> u64 {
    60
}

/// Auto-discovery configuration.
///
/// Patterns are globs (`*`, `?`) matched against `"METHOD /path"`, e.g. `"GET /users/*"`.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(untagged)]
pub enum AutoDiscoverConfig {
    /// `true` exposes every operation, `false` exposes none.
    Enabled(bool),
    /// Include/exclude filters. Exclusions win; an empty include list admits everything.
    Filtered {
        #[serde(default)]
        include: Vec<String>,
        #[serde(default)]
        exclude: Vec<String>,
    },
}

impl Default for AutoDiscoverConfig {
    fn default() -> Self {
        Self::Enabled(true)
    }
}

impl AutoDiscoverConfig {
    /// Whether the operation `method path` should become a tool.
    #[must_use]
    pub fn allows(&self, method: &str, path: &str) -> bool {
        let (include, exclude) = match self {
            Self::Enabled(enabled) => return *enabled,
            Self::Filtered { include, exclude } => (include, exclude),
        };

        let operation = format!("{} {path}", method.to_ascii_uppercase());
        if exclude.iter().any(|p| glob_match(p, &operation)) {
            return false;
        }
        include.is_empty() || include.iter().any(|p| glob_match(p, &operation))
    }
}

/// Glob match where `*` spans any run of characters and `?` exactly one.
/// Every other character, braces included, matches literally.
#[must_use]
pub fn glob_match(pattern: &str, text: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().collect();
    let text: Vec<char> = text.chars().collect();

    let (mut p, mut t) = (0, 0);
    let mut backtrack: Option<(usize, usize)> = None;

    while t < text.len() {
        match pattern.get(p) {
            Some('*') => {
                backtrack = Some((p, t));
                p += 1;
            }
            Some(&c) if c == '?' || c == text[t] => {
                p += 1;
                t += 1;
            }
            _ => match backtrack {
                Some((star, consumed)) => {
                    p = star + 1;
                    t = consumed + 1;
                    backtrack = Some((star, consumed + 1));
                }
                None => return false,
            },
        }
    }

    pattern[p..].iter().all(|&c| c == '*')
}
