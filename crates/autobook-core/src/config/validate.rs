//! Validation of the raw config into immutable run settings.

use chrono::{FixedOffset, NaiveTime};
use std::time::Duration;
use url::Url;

use crate::api::{ApiSettings, Credentials};
use crate::filter::FilterCriteria;
use crate::retry::RetryPolicy;
use crate::schedule::ScheduleSpec;

use super::{AutobookConfig, RetryConfig};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required setting {0}")]
    Missing(&'static str),
    #[error("invalid {field} {value:?}: {reason}")]
    Invalid {
        field: &'static str,
        value: String,
        reason: &'static str,
    },
}

/// Poll-loop parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSettings {
    pub schedule: ScheduleSpec,
    pub poll_interval: Duration,
    pub page_size: u32,
}

/// Fully validated configuration. Built once at startup, never mutated.
#[derive(Debug, Clone)]
pub struct Settings {
    pub credentials: Credentials,
    pub api: ApiSettings,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub run: RunSettings,
    pub criteria: FilterCriteria,
    pub read_retry: RetryPolicy,
    pub write_retry: RetryPolicy,
}

impl AutobookConfig {
    /// Check every required value and parse every structured one.
    /// `local_offset` is used for the time window when `filters.utc_offset`
    /// is not set.
    pub fn validate(&self, local_offset: FixedOffset) -> Result<Settings, ConfigError> {
        self.validate_with(local_offset, true)
    }

    /// Like [`validate`](Self::validate) but without the login values
    /// (account and OAuth client). For catalog-only use: the returned
    /// credentials and client values may be empty and must not be sent.
    pub fn validate_catalog(&self, local_offset: FixedOffset) -> Result<Settings, ConfigError> {
        self.validate_with(local_offset, false)
    }

    fn validate_with(&self, local_offset: FixedOffset, login: bool) -> Result<Settings, ConfigError> {
        let login_value = |field: &'static str, value: &str| {
            if login {
                required(field, value)
            } else {
                Ok(value.trim().to_string())
            }
        };
        let email = login_value("account.email", &self.account.email)?;
        let password = login_value("account.password", &self.account.password)?;
        let client_id = login_value("api.client_id", &self.api.client_id)?;
        let client_secret = login_value("api.client_secret", &self.api.client_secret)?;

        if self.booking.location_id == 0 {
            return Err(ConfigError::Missing("booking.location_id"));
        }
        if self.booking.poll_interval_secs == 0 {
            return Err(invalid(
                "booking.poll_interval_secs",
                "0",
                "must be at least 1 second",
            ));
        }
        if self.booking.page_size == 0 {
            return Err(invalid("booking.page_size", "0", "must be at least 1"));
        }
        if self.api.request_timeout_secs == 0 {
            return Err(invalid("api.request_timeout_secs", "0", "must be at least 1 second"));
        }

        let base_url = parse_base_url(&self.api.base_url)?;

        let window_start = parse_time_of_day("filters.time_start", &self.filters.time_start)?;
        let window_end = parse_time_of_day("filters.time_end", &self.filters.time_end)?;
        if let (Some(s), Some(e)) = (window_start, window_end) {
            if s > e {
                return Err(invalid(
                    "filters.time_end",
                    &self.filters.time_end,
                    "must not be earlier than filters.time_start",
                ));
            }
        }
        let utc_offset = match self.filters.utc_offset.as_deref().map(str::trim) {
            None | Some("") => local_offset,
            Some(raw) => parse_offset(raw)
                .ok_or_else(|| invalid("filters.utc_offset", raw, "expected +HH:MM or -HH:MM"))?,
        };

        let retry = self.retry.clone().unwrap_or_default();
        let (read_retry, write_retry) = retry_policies(&retry)?;

        let mut default_headers = Vec::new();
        for (name, value) in [
            ("user-agent", &self.api.user_agent),
            ("accept-language", &self.api.accept_language),
            ("accept-encoding", &self.api.accept_encoding),
        ] {
            if !value.trim().is_empty() {
                default_headers.push((name.to_string(), value.trim().to_string()));
            }
        }

        Ok(Settings {
            credentials: Credentials { email, password },
            api: ApiSettings {
                base_url,
                client_id,
                client_secret,
                default_headers,
            },
            connect_timeout: Duration::from_secs(self.api.connect_timeout_secs.max(1)),
            request_timeout: Duration::from_secs(self.api.request_timeout_secs),
            run: RunSettings {
                schedule: ScheduleSpec {
                    location_id: self.booking.location_id,
                    advance_days: self.booking.advance_days,
                    align_to_monday: self.booking.align_to_monday,
                },
                poll_interval: Duration::from_secs(self.booking.poll_interval_secs),
                page_size: self.booking.page_size,
            },
            criteria: FilterCriteria {
                title: optional(&self.filters.title),
                instructor: optional(&self.filters.instructor),
                window_start,
                window_end,
                utc_offset,
            },
            read_retry,
            write_retry,
        })
    }
}

fn invalid(field: &'static str, value: &str, reason: &'static str) -> ConfigError {
    ConfigError::Invalid {
        field,
        value: value.to_string(),
        reason,
    }
}

fn required(field: &'static str, value: &str) -> Result<String, ConfigError> {
    let v = value.trim();
    if v.is_empty() {
        return Err(ConfigError::Missing(field));
    }
    Ok(v.to_string())
}

fn optional(value: &str) -> Option<String> {
    let v = value.trim();
    (!v.is_empty()).then(|| v.to_string())
}

fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw.trim()).map_err(|_| invalid("api.base_url", raw, "not a URL"))?;
    if !matches!(url.scheme(), "http" | "https") || url.cannot_be_a_base() {
        return Err(invalid("api.base_url", raw, "must be an http(s) URL"));
    }
    Ok(url)
}

fn parse_time_of_day(field: &'static str, raw: &str) -> Result<Option<NaiveTime>, ConfigError> {
    let v = raw.trim();
    if v.is_empty() {
        return Ok(None);
    }
    NaiveTime::parse_from_str(v, "%H:%M")
        .map(Some)
        .map_err(|_| invalid(field, raw, "expected HH:MM"))
}

/// `+HH:MM`, `-HH:MM`, `+HHMM`, `Z`, or `UTC`.
fn parse_offset(raw: &str) -> Option<FixedOffset> {
    if raw.eq_ignore_ascii_case("z") || raw.eq_ignore_ascii_case("utc") {
        return FixedOffset::east_opt(0);
    }
    let (sign, rest) = match raw.as_bytes().first()? {
        b'+' => (1, &raw[1..]),
        b'-' => (-1, &raw[1..]),
        _ => return None,
    };
    let digits: String = rest.chars().filter(|c| *c != ':').collect();
    if digits.len() != 4 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let hours: i32 = digits[..2].parse().ok()?;
    let minutes: i32 = digits[2..].parse().ok()?;
    if hours > 23 || minutes > 59 {
        return None;
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

fn retry_policies(cfg: &RetryConfig) -> Result<(RetryPolicy, RetryPolicy), ConfigError> {
    if !cfg.backoff_base.is_finite() || cfg.backoff_base < 1.0 {
        return Err(invalid(
            "retry.backoff_base",
            &cfg.backoff_base.to_string(),
            "must be a number >= 1",
        ));
    }
    let base = RetryPolicy {
        max_retries: cfg.read_max_retries,
        backoff_base: cfg.backoff_base,
        backoff_unit: Duration::from_millis(cfg.backoff_unit_ms),
        max_delay: Duration::from_secs(cfg.max_delay_secs),
    };
    let write = RetryPolicy {
        max_retries: cfg.write_max_retries,
        ..base
    };
    Ok((base, write))
}
