use std::collections::HashMap;

use clap::Parser;

use crate::error::{ReportError, ReportResult};
use crate::parsing::DateRange;
use crate::types::ZendeskConfig;

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_MAX_RETRIES: u32 = 3;
const DEFAULT_PAGE_SIZE: u32 = 100;
const MAX_PAGE_SIZE: u32 = 100;

/// Count closed and solved tickets per organization, split by Kubernetes involvement.
#[derive(Debug, Clone, Parser)]
#[command(name = "k8s-ticket-report", version)]
pub struct Args {
    /// Start date (oldest) yyyy-MM-dd format. Dates are inclusive.
    // A missing date is left empty so it fails as a bad date
    #[arg(short, long, default_value = "", hide_default_value = true)]
    pub start: String,

    /// End date (most recent). yyyy-MM-dd format. Dates are inclusive.
    #[arg(short, long, default_value = "", hide_default_value = true)]
    pub end: String,
}

/// Trait for abstracting environment variable access
pub trait EnvironmentProvider {
    fn get_var(&self, key: &str) -> Option<String>;
}

/// Production implementation using std::env
pub struct SystemEnvironment;

impl EnvironmentProvider for SystemEnvironment {
    fn get_var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

/// Mock implementation for testing
#[derive(Debug, Default)]
pub struct MockEnvironment {
    vars: HashMap<String, String>,
}

impl MockEnvironment {
    pub fn new() -> Self {
        Self {
            vars: HashMap::new(),
        }
    }

    pub fn set_var<K, V>(&mut self, key: K, value: V) -> &mut Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.vars.insert(key.into(), value.into());
        self
    }

    pub fn with_var<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.set_var(key, value);
        self
    }
}

impl EnvironmentProvider for MockEnvironment {
    fn get_var(&self, key: &str) -> Option<String> {
        self.vars.get(key).cloned()
    }
}

pub fn parse_range(args: &Args) -> ReportResult<DateRange> {
    DateRange::parse(&args.start, &args.end)
}

pub fn load_zendesk_config_with_env<E: EnvironmentProvider>(env: &E) -> ReportResult<ZendeskConfig> {
    let required = |key: &str| {
        env.get_var(key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .ok_or_else(|| ReportError::ClientBuild(format!("{} env var must be set", key)))
    };

    let base_url = required("ZENDESK_URL")?;
    if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
        return Err(ReportError::ClientBuild(format!(
            "ZENDESK_URL must be an http(s) URL, got {:?}",
            base_url
        )));
    }
    let email = required("ZENDESK_EMAIL")?;
    let token = required("ZENDESK_TOKEN")?;

    let timeout_secs: u64 = env.get_var("ZENDESK_TIMEOUT_SECS")
        .and_then(|v| v.trim().parse().ok())
        .filter(|v| *v > 0)
        .unwrap_or(DEFAULT_TIMEOUT_SECS);

    let max_retries: u32 = env.get_var("ZENDESK_MAX_RETRIES")
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(DEFAULT_MAX_RETRIES);

    let page_size: u32 = env.get_var("ZENDESK_PAGE_SIZE")
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(DEFAULT_PAGE_SIZE)
        .clamp(1, MAX_PAGE_SIZE);

    Ok(ZendeskConfig {
        base_url: base_url.trim_end_matches('/').to_string(),
        email,
        token,
        timeout_secs,
        max_retries,
        page_size,
    })
}
