// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use reelshelf_app::{
    DEFAULT_MIN_QUERY_CHARS, DEFAULT_QUIET_WINDOW, Identity, SearchSettings, UserEmail,
};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

pub const APP_NAME: &str = "reelshelf";

const CONFIG_VERSION: i64 = 1;
const DEFAULT_API_TIMEOUT: &str = "10s";
const DEFAULT_DEBOUNCE: &str = "500ms";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub version: i64,
    #[serde(default)]
    pub api: Api,
    #[serde(default)]
    pub search: Search,
    #[serde(default)]
    pub session: Session,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            api: Api::default(),
            search: Search::default(),
            session: Session::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Api {
    pub base_url: Option<String>,
    pub timeout: Option<String>,
}

impl Default for Api {
    fn default() -> Self {
        Self {
            base_url: Some(reelshelf_api::DEFAULT_BASE_URL.to_owned()),
            timeout: Some(DEFAULT_API_TIMEOUT.to_owned()),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Search {
    pub debounce: Option<String>,
    pub min_query_chars: Option<i64>,
}

impl Default for Search {
    fn default() -> Self {
        Self {
            debounce: Some(DEFAULT_DEBOUNCE.to_owned()),
            min_query_chars: Some(DEFAULT_MIN_QUERY_CHARS as i64),
        }
    }
}

/// Identity handed over by the authentication provider. No email means
/// signed out.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Session {
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub photo_url: Option<String>,
}

impl Config {
    pub fn default_path() -> Result<PathBuf> {
        if let Some(path) = env::var_os("REELSHELF_CONFIG_PATH") {
            return Ok(PathBuf::from(path));
        }

        let config_root = dirs::config_dir().ok_or_else(|| {
            anyhow!("cannot resolve config directory; set REELSHELF_CONFIG_PATH to the config file")
        })?;

        let app_dir = config_root.join(APP_NAME);
        fs::create_dir_all(&app_dir)
            .with_context(|| format!("create config directory {}", app_dir.display()))?;
        Ok(app_dir.join("config.toml"))
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(path)
            .with_context(|| format!("read config file {}", path.display()))?;
        let value: toml::Value = toml::from_str(&raw)
            .with_context(|| format!("parse TOML config {}", path.display()))?;

        let version = value
            .get("version")
            .and_then(toml::Value::as_integer)
            .ok_or_else(|| {
                anyhow!(
                    "config file {} has no version. Add `version = 1` and put values under [api], [search], and [session]",
                    path.display()
                )
            })?;

        if version != CONFIG_VERSION {
            bail!(
                "unsupported config version {} in {}; expected version = 1",
                version,
                path.display()
            );
        }

        let config: Config = value
            .try_into()
            .with_context(|| format!("decode config {}", path.display()))?;
        config.validate(path)?;
        debug!(path = %path.display(), "config loaded");
        Ok(config)
    }

    fn validate(&self, path: &Path) -> Result<()> {
        if let Some(base_url) = &self.api.base_url
            && base_url.trim().is_empty()
        {
            bail!("api.base_url in {} must not be empty", path.display());
        }

        if let Some(timeout) = &self.api.timeout {
            let parsed = parse_duration(timeout)?;
            if parsed.is_zero() {
                bail!(
                    "api.timeout in {} must be positive, got {}",
                    path.display(),
                    timeout
                );
            }
        }

        if let Some(debounce) = &self.search.debounce {
            let parsed = parse_duration(debounce)?;
            if parsed.is_zero() {
                bail!(
                    "search.debounce in {} must be positive, got {}",
                    path.display(),
                    debounce
                );
            }
        }

        if let Some(min_chars) = self.search.min_query_chars
            && min_chars < 1
        {
            bail!(
                "search.min_query_chars in {} must be at least 1, got {}",
                path.display(),
                min_chars
            );
        }

        if let Some(email) = &self.session.email
            && !email.trim().is_empty()
            && !email.contains('@')
        {
            bail!(
                "session.email in {} does not look like an email address: {:?}",
                path.display(),
                email
            );
        }

        Ok(())
    }

    pub fn api_base_url(&self) -> &str {
        self.api
            .base_url
            .as_deref()
            .unwrap_or(reelshelf_api::DEFAULT_BASE_URL)
            .trim_end_matches('/')
    }

    pub fn api_timeout(&self) -> Result<Duration> {
        parse_duration(self.api.timeout.as_deref().unwrap_or(DEFAULT_API_TIMEOUT))
    }

    pub fn search_settings(&self) -> Result<SearchSettings> {
        let quiet_window = match &self.search.debounce {
            Some(raw) => parse_duration(raw)?,
            None => DEFAULT_QUIET_WINDOW,
        };
        let min_query_chars = self
            .search
            .min_query_chars
            .and_then(|value| usize::try_from(value).ok())
            .unwrap_or(DEFAULT_MIN_QUERY_CHARS);
        Ok(SearchSettings {
            quiet_window,
            min_query_chars,
        })
    }

    pub fn identity(&self) -> Option<Identity> {
        let email = self.session.email.as_deref()?.trim();
        if email.is_empty() {
            return None;
        }
        Some(Identity {
            email: UserEmail::new(email),
            display_name: self.session.display_name.clone().unwrap_or_default(),
            photo_url: self
                .session
                .photo_url
                .clone()
                .filter(|url| !url.trim().is_empty()),
        })
    }

    pub fn example_config(path: &Path) -> String {
        format!(
            "# reelshelf config\n# Place this file at: {}\n\nversion = 1\n\n[api]\nbase_url = \"{}\"\ntimeout = \"{}\"\n\n[search]\n# Quiet period after the last keystroke before suggestions are fetched\ndebounce = \"{}\"\nmin_query_chars = {}\n\n[session]\n# Signed-in identity. Leave email unset to browse signed out.\n# email = \"you@example.com\"\n# display_name = \"You\"\n# photo_url = \"https://example.com/you.png\"\n",
            path.display(),
            reelshelf_api::DEFAULT_BASE_URL,
            DEFAULT_API_TIMEOUT,
            DEFAULT_DEBOUNCE,
            DEFAULT_MIN_QUERY_CHARS,
        )
    }
}

pub fn parse_duration(raw: &str) -> Result<Duration> {
    if let Some(value) = raw.strip_suffix("ms") {
        let millis: u64 = value
            .parse()
            .with_context(|| format!("invalid duration {raw:?}"))?;
        return Ok(Duration::from_millis(millis));
    }
    if let Some(value) = raw.strip_suffix('s') {
        let secs: u64 = value
            .parse()
            .with_context(|| format!("invalid duration {raw:?}"))?;
        return Ok(Duration::from_secs(secs));
    }
    if let Some(value) = raw.strip_suffix('m') {
        let mins: u64 = value
            .parse()
            .with_context(|| format!("invalid duration {raw:?}"))?;
        return Ok(Duration::from_secs(mins * 60));
    }

    bail!("invalid duration {raw:?}; use one of: <N>ms, <N>s, <N>m (for example 500ms or 10s)")
}

#[cfg(test)]
mod tests {
    use super::{Config, parse_duration};
    use anyhow::Result;
    use reelshelf_app::UserEmail;
    use std::path::PathBuf;
    use std::sync::{Mutex, OnceLock};
    use std::time::Duration;

    fn write_config(content: &str) -> Result<(tempfile::TempDir, PathBuf)> {
        let temp = tempfile::tempdir()?;
        let path = temp.path().join("config.toml");
        std::fs::write(&path, content)?;
        Ok((temp, path))
    }

    fn env_lock() -> std::sync::MutexGuard<'static, ()> {
        static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
        match ENV_LOCK.get_or_init(|| Mutex::new(())).lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    #[test]
    fn missing_config_uses_defaults() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let config = Config::load(&temp.path().join("missing.toml"))?;
        assert_eq!(config.version, 1);
        assert_eq!(config.api_base_url(), reelshelf_api::DEFAULT_BASE_URL);
        assert_eq!(config.api_timeout()?, Duration::from_secs(10));
        let search = config.search_settings()?;
        assert_eq!(search.quiet_window, Duration::from_millis(500));
        assert_eq!(search.min_query_chars, 2);
        assert!(config.identity().is_none());
        Ok(())
    }

    #[test]
    fn unversioned_config_is_rejected_with_actionable_message() -> Result<()> {
        let (_temp, path) = write_config("[api]\nbase_url=\"http://localhost:3000\"\n")?;
        let error = Config::load(&path).expect_err("unversioned config should fail");
        let message = error.to_string();
        assert!(message.contains("version = 1"));
        assert!(message.contains("[api], [search], and [session]"));
        Ok(())
    }

    #[test]
    fn full_config_parses() -> Result<()> {
        let (_temp, path) = write_config(
            "version = 1\n[api]\nbase_url = \"http://localhost:3000//\"\ntimeout = \"2s\"\n[search]\ndebounce = \"250ms\"\nmin_query_chars = 3\n[session]\nemail = \"neil@example.com\"\ndisplay_name = \"Neil\"\n",
        )?;

        let config = Config::load(&path)?;
        assert_eq!(config.api_base_url(), "http://localhost:3000");
        assert_eq!(config.api_timeout()?, Duration::from_secs(2));
        let search = config.search_settings()?;
        assert_eq!(search.quiet_window, Duration::from_millis(250));
        assert_eq!(search.min_query_chars, 3);

        let identity = config.identity().expect("session email configured");
        assert_eq!(identity.email, UserEmail::new("neil@example.com"));
        assert_eq!(identity.label(), "Neil");
        assert!(identity.photo_url.is_none());
        Ok(())
    }

    #[test]
    fn blank_session_email_means_signed_out() -> Result<()> {
        let (_temp, path) = write_config("version = 1\n[session]\nemail = \"  \"\n")?;
        let config = Config::load(&path)?;
        assert!(config.identity().is_none());
        Ok(())
    }

    #[test]
    fn malformed_config_returns_parse_error() -> Result<()> {
        let (_temp, path) = write_config("{{not toml")?;
        let error = Config::load(&path).expect_err("malformed config should fail");
        assert!(error.to_string().contains("parse TOML config"));
        Ok(())
    }

    #[test]
    fn unsupported_config_version_is_rejected() -> Result<()> {
        let (_temp, path) = write_config("version = 2\n")?;
        let error = Config::load(&path).expect_err("v2 config should fail");
        assert!(error.to_string().contains("unsupported config version 2"));
        Ok(())
    }

    #[test]
    fn invalid_values_name_the_key() -> Result<()> {
        let cases = [
            ("[api]\ntimeout = \"0s\"\n", "api.timeout"),
            ("[api]\nbase_url = \" \"\n", "api.base_url"),
            ("[search]\ndebounce = \"0ms\"\n", "search.debounce"),
            ("[search]\nmin_query_chars = 0\n", "search.min_query_chars"),
            ("[session]\nemail = \"neil\"\n", "session.email"),
        ];
        for (body, key) in cases {
            let (_temp, path) = write_config(&format!("version = 1\n{body}"))?;
            let error = Config::load(&path).expect_err("invalid value should fail");
            assert!(
                error.to_string().contains(key),
                "expected {key} in {error}"
            );
        }
        Ok(())
    }

    #[test]
    fn default_path_honors_env_override() -> Result<()> {
        let _guard = env_lock();
        let temp = tempfile::tempdir()?;
        let override_path = temp.path().join("custom-config.toml");
        // SAFETY: test-only process-local env mutation.
        unsafe {
            std::env::set_var("REELSHELF_CONFIG_PATH", &override_path);
        }
        let resolved = Config::default_path()?;
        // SAFETY: test cleanup for process-local env mutation.
        unsafe {
            std::env::remove_var("REELSHELF_CONFIG_PATH");
        }
        assert_eq!(resolved, override_path);
        Ok(())
    }

    #[test]
    fn default_path_uses_config_toml_suffix_when_no_env_override() -> Result<()> {
        let _guard = env_lock();
        // SAFETY: test-only process-local env mutation.
        unsafe {
            std::env::remove_var("REELSHELF_CONFIG_PATH");
        }
        let path = Config::default_path()?;
        assert!(path.ends_with("config.toml"));
        Ok(())
    }

    #[test]
    fn durations_parse_ms_seconds_and_minutes() -> Result<()> {
        assert_eq!(parse_duration("500ms")?, Duration::from_millis(500));
        assert_eq!(parse_duration("5s")?, Duration::from_secs(5));
        assert_eq!(parse_duration("2m")?, Duration::from_secs(120));
        Ok(())
    }

    #[test]
    fn durations_reject_garbage() {
        let error = parse_duration("soon").expect_err("invalid duration should fail");
        assert!(error.to_string().contains("invalid duration"));
    }

    #[test]
    fn example_config_round_trips() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let path = temp.path().join("config.toml");
        let example = Config::example_config(&path);
        assert!(example.contains("[api]"));
        assert!(example.contains("[search]"));
        assert!(example.contains("[session]"));

        std::fs::write(&path, example)?;
        let config = Config::load(&path)?;
        assert_eq!(config.api_base_url(), reelshelf_api::DEFAULT_BASE_URL);
        Ok(())
    }
}
