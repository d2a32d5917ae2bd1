//! Command-line and environment configuration.
//!
//! Every flag can also be set through its environment variable. An optional `--config` YAML file
//! holds a full `ApiSourceConfig`; flags and env vars override what the file sets.

use anyhow::Context as _;
use clap::{Parser, ValueEnum};
use openapi_mcp_tools::config::{ApiSourceConfig, AuthConfig, RateLimitConfig};
use std::path::{Path, PathBuf};
use std::time::Duration;

const DEFAULT_RATE_LIMIT_WINDOW_SECS: u64 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Transport {
    /// Newline-delimited JSON-RPC over stdin/stdout.
    Stdio,
    /// MCP streamable HTTP at `/mcp`.
    Http,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

/// Serve an `OpenAPI`-described HTTP API as MCP tools.
#[derive(Debug, Parser)]
#[command(name = "openapi-mcp-bridge", version, about)]
pub struct Args {
    /// `OpenAPI` spec location (http(s) URL or file path).
    #[arg(long, env = "OPENAPI_SPEC", required_unless_present = "config")]
    pub spec: Option<String>,

    /// YAML file with the tool source configuration.
    #[arg(long, env = "BRIDGE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Base URL for upstream calls; defaults to the spec's first server.
    #[arg(long, env = "API_BASE_URL")]
    pub base_url: Option<String>,

    /// Sent as `Authorization: Bearer <token>`.
    #[arg(long, env = "API_BEARER_TOKEN", conflicts_with = "api_key")]
    pub bearer_token: Option<String>,

    /// Header carrying `--api-key`.
    #[arg(long, env = "API_KEY_HEADER", default_value = "X-API-Key")]
    pub api_key_header: String,

    #[arg(long, env = "API_KEY")]
    pub api_key: Option<String>,

    #[arg(long, env = "BRIDGE_TRANSPORT", value_enum, default_value = "stdio")]
    pub transport: Transport,

    /// Listen address for the HTTP transport.
    #[arg(long, env = "BRIDGE_BIND", default_value = "127.0.0.1:8080")]
    pub bind: String,

    /// Log filter used when `RUST_LOG` is unset.
    #[arg(long, env = "BRIDGE_LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    #[arg(long, env = "BRIDGE_LOG_FORMAT", value_enum, default_value = "text")]
    pub log_format: LogFormat,

    /// Upstream calls allowed per window. Unset disables local rate limiting.
    #[arg(long, env = "RATE_LIMIT_MAX_REQUESTS")]
    pub rate_limit_max_requests: Option<u32>,

    #[arg(long, env = "RATE_LIMIT_WINDOW_SECS")]
    pub rate_limit_window_secs: Option<u64>,

    /// Re-fetch the spec every N seconds. `0` or unset disables refreshing.
    #[arg(long, env = "SPEC_REFRESH_SECS")]
    pub spec_refresh_secs: Option<u64>,

    /// Upstream call timeout. `0` disables it.
    #[arg(long, env = "REQUEST_TIMEOUT_SECS")]
    pub request_timeout_secs: Option<u64>,

    /// Extra verbs recognized as actions in paths, comma separated.
    #[arg(long, env = "ACTION_WORDS", value_delimiter = ',')]
    pub action_words: Vec<String>,
}

impl Args {
    /// Build the tool source configuration from the config file (if any) and overrides.
    ///
    /// # Errors
    ///
    /// Fails if the config file cannot be read or parsed, or no spec location is given.
    pub fn source_config(&self) -> anyhow::Result<ApiSourceConfig> {
        let mut config = match (&self.config, &self.spec) {
            (Some(path), _) => load_config_file(path)?,
            (None, Some(spec)) => ApiSourceConfig::new(spec.clone()),
            (None, None) => anyhow::bail!("no OpenAPI spec given (set OPENAPI_SPEC or --spec)"),
        };

        if let Some(spec) = &self.spec {
            config.spec.clone_from(spec);
        }
        if config.spec.trim().is_empty() {
            anyhow::bail!("OpenAPI spec location is empty");
        }
        if let Some(base_url) = &self.base_url {
            config.base_url = Some(base_url.clone());
        }

        if let Some(token) = &self.bearer_token {
            config.auth = Some(AuthConfig::Bearer {
                token: token.clone(),
            });
        } else if let Some(key) = &self.api_key {
            config.auth = Some(AuthConfig::Header {
                name: self.api_key_header.clone(),
                value: key.clone(),
            });
        }

        if let Some(max_requests) = self.rate_limit_max_requests {
            let window_secs = self
                .rate_limit_window_secs
                .or(config.rate_limit.map(|rl| rl.window_secs))
                .unwrap_or(DEFAULT_RATE_LIMIT_WINDOW_SECS);
            config.rate_limit = Some(RateLimitConfig {
                max_requests,
                window_secs,
            });
        } else if let (Some(window_secs), Some(rl)) =
            (self.rate_limit_window_secs, config.rate_limit.as_mut())
        {
            rl.window_secs = window_secs;
        }

        if self.request_timeout_secs.is_some() {
            config.timeout_secs = self.request_timeout_secs;
        }

        for word in &self.action_words {
            let word = word.trim().to_ascii_lowercase();
            if !word.is_empty() && !config.naming.extra_action_words.contains(&word) {
                config.naming.extra_action_words.push(word);
            }
        }

        Ok(config)
    }

    /// Spec refresh period, if refreshing is enabled.
    #[must_use]
    pub fn refresh_interval(&self) -> Option<Duration> {
        self.spec_refresh_secs
            .filter(|&secs| secs > 0)
            .map(Duration::from_secs)
    }
}

fn load_config_file(path: &Path) -> anyhow::Result<ApiSourceConfig> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file '{}'", path.display()))?;
    serde_yaml::from_str(&raw)
        .with_context(|| format!("failed to parse config file '{}'", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    fn parse(args: &[&str]) -> Args {
        let mut argv = vec!["openapi-mcp-bridge"];
        argv.extend_from_slice(args);
        Args::try_parse_from(argv).expect("valid args")
    }

    #[test]
    fn minimal_flags() {
        let args = parse(&["--spec", "./petstore.yaml"]);
        assert_eq!(args.transport, Transport::Stdio);
        assert_eq!(args.log_format, LogFormat::Text);
        assert_eq!(args.refresh_interval(), None);

        let config = args.source_config().unwrap();
        assert_eq!(config.spec, "./petstore.yaml");
        assert!(config.auth.is_none());
        assert!(config.rate_limit.is_none());
    }

    #[test]
    fn auth_rate_limit_and_vocabulary() {
        let args = parse(&[
            "--spec",
            "https://api.example.com/openapi.json",
            "--api-key",
            "secret",
            "--api-key-header",
            "X-Token",
            "--rate-limit-max-requests",
            "10",
            "--action-words",
            "Reconcile, refund",
            "--spec-refresh-secs",
            "300",
            "--transport",
            "http",
        ]);
        assert_eq!(args.transport, Transport::Http);
        assert_eq!(args.refresh_interval(), Some(Duration::from_secs(300)));

        let config = args.source_config().unwrap();
        assert_eq!(
            config.auth,
            Some(AuthConfig::Header {
                name: "X-Token".into(),
                value: "secret".into()
            })
        );
        assert_eq!(
            config.rate_limit,
            Some(RateLimitConfig {
                max_requests: 10,
                window_secs: 60
            })
        );
        assert_eq!(config.naming.extra_action_words, vec!["reconcile", "refund"]);
    }

    #[test]
    fn bearer_and_api_key_conflict() {
        let err = Args::try_parse_from([
            "openapi-mcp-bridge",
            "--spec",
            "x.yaml",
            "--bearer-token",
            "t",
            "--api-key",
            "k",
        ])
        .unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }

    #[test]
    fn flags_override_config_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "spec: ./from-file.yaml\nbaseUrl: http://file.example\ntimeoutSecs: 5\n\
             rateLimit:\n  maxRequests: 3\n  windowSecs: 30\n\
             naming:\n  extraActionWords: [approve]"
        )
        .unwrap();
        let path = file.path().to_str().unwrap();

        let args = parse(&[
            "--config",
            path,
            "--base-url",
            "http://flag.example",
            "--rate-limit-max-requests",
            "7",
            "--action-words",
            "approve,archive",
        ]);
        let config = args.source_config().unwrap();

        assert_eq!(config.spec, "./from-file.yaml");
        assert_eq!(config.base_url.as_deref(), Some("http://flag.example"));
        assert_eq!(config.timeout_secs, Some(5));
        assert_eq!(
            config.rate_limit,
            Some(RateLimitConfig {
                max_requests: 7,
                window_secs: 30
            })
        );
        assert_eq!(config.naming.extra_action_words, vec!["approve", "archive"]);
    }

    #[test]
    fn unreadable_config_file_is_an_error() {
        let args = parse(&["--config", "/nonexistent/bridge.yaml"]);
        let err = args.source_config().unwrap_err();
        assert!(err.to_string().contains("failed to read config file"));
    }

    #[test]
    fn zero_refresh_disables_refresh() {
        let args = parse(&["--spec", "x.yaml", "--spec-refresh-secs", "0"]);
        assert_eq!(args.refresh_interval(), None);
    }
}
