//! Runtime settings assembled from the environment and CLI flags.

use std::path::PathBuf;
use std::time::Duration;

use clap::ValueEnum;

/// Which REST contract the remote service speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ApiContract {
    /// `jsonplaceholder`-style: PATCH updates, `title` field, bare list.
    Typicode,
    /// `dummyjson`-style: `/todos/add`, PUT updates, `todo` field, wrapped list.
    Dummyjson,
}

impl ApiContract {
    /// The public service that speaks this contract.
    #[must_use]
    pub fn default_base_url(self) -> &'static str {
        match self {
            Self::Typicode => "https://jsonplaceholder.typicode.com",
            Self::Dummyjson => "https://dummyjson.com",
        }
    }
}

/// Resolved configuration for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// Base URL of the task service, without trailing slash.
    pub base_url: String,
    /// Contract spoken by the service.
    pub contract: ApiContract,
    /// Owner assigned to newly created tasks.
    pub owner_id: i64,
    /// Automatic retries of a failed list before the error is surfaced.
    pub list_retries: u32,
    /// Base delay between automatic list retries.
    pub retry_delay: Duration,
    /// Record all client interactions under this directory.
    pub record_dir: Option<PathBuf>,
    /// Serve all client interactions from this cassette.
    pub replay: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        let contract = ApiContract::Typicode;
        Self {
            base_url: contract.default_base_url().to_string(),
            contract,
            owner_id: 1,
            list_retries: 2,
            retry_delay: Duration::from_millis(1000),
            record_dir: None,
            replay: None,
        }
    }
}

/// CLI flags that take precedence over the environment.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    /// `--api-url`
    pub api_url: Option<String>,
    /// `--contract`
    pub contract: Option<ApiContract>,
    /// `--owner`
    pub owner_id: Option<i64>,
}

impl Settings {
    /// Reads `TASKLIST_*` variables from the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error naming the variable when a value cannot be parsed.
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds settings from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns an error naming the variable when a value cannot be parsed.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, String> {
        let mut settings = Self::default();

        if let Some(raw) = lookup("TASKLIST_API_CONTRACT") {
            settings.contract = ApiContract::from_str(raw.trim(), true)
                .map_err(|_| format!("TASKLIST_API_CONTRACT: unknown contract {raw:?}"))?;
            settings.base_url = settings.contract.default_base_url().to_string();
        }
        if let Some(raw) = lookup("TASKLIST_API_URL") {
            settings.base_url = normalize_url(&raw);
        }
        if let Some(raw) = lookup("TASKLIST_OWNER_ID") {
            settings.owner_id = parse_var("TASKLIST_OWNER_ID", &raw)?;
        }
        if let Some(raw) = lookup("TASKLIST_LIST_RETRIES") {
            settings.list_retries = parse_var("TASKLIST_LIST_RETRIES", &raw)?;
        }
        if let Some(raw) = lookup("TASKLIST_RETRY_DELAY_MS") {
            settings.retry_delay =
                Duration::from_millis(parse_var("TASKLIST_RETRY_DELAY_MS", &raw)?);
        }
        settings.record_dir = lookup("TASKLIST_RECORD").map(PathBuf::from);
        settings.replay = lookup("TASKLIST_REPLAY").map(PathBuf::from);

        if settings.record_dir.is_some() && settings.replay.is_some() {
            return Err("TASKLIST_RECORD and TASKLIST_REPLAY cannot both be set".to_string());
        }
        Ok(settings)
    }

    /// Applies CLI flags on top of the environment.
    ///
    /// Choosing a contract without a URL switches to that contract's default
    /// service, unless a URL came from the environment.
    #[must_use]
    pub fn with_overrides(mut self, overrides: &Overrides) -> Self {
        if let Some(contract) = overrides.contract {
            if self.base_url == self.contract.default_base_url() {
                self.base_url = contract.default_base_url().to_string();
            }
            self.contract = contract;
        }
        if let Some(url) = &overrides.api_url {
            self.base_url = normalize_url(url);
        }
        if let Some(owner_id) = overrides.owner_id {
            self.owner_id = owner_id;
        }
        self
    }
}

fn normalize_url(raw: &str) -> String {
    raw.trim().trim_end_matches('/').to_string()
}

fn parse_var<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T, String>
where
    T::Err: std::fmt::Display,
{
    raw.trim().parse().map_err(|e| format!("{key}: invalid value {raw:?}: {e}"))
}
