//! Validator strategies
//!
//! Each validator is a small named object with a pure
//! `validate(&Value) -> Result<(), String>` contract. Attributes hold an
//! ordered list of them; the first failure per attribute is reported.

use std::fmt;

use cachegroup_value::Value;
use once_cell::sync::Lazy;
use regex::Regex;

/// Pure predicate over an attribute value
pub trait Validator: Send + Sync + fmt::Debug {
    /// Stable name, shown in schema listings
    fn name(&self) -> &'static str;

    /// Check a value
    ///
    /// # Errors
    /// Returns a human-readable reason when the value is rejected.
    fn validate(&self, value: &Value) -> Result<(), String>;
}

fn expect_str(value: &Value) -> Result<&str, String> {
    value
        .as_str()
        .ok_or_else(|| format!("expected string, found {}", value.kind()))
}

/// Rejects empty strings
#[derive(Debug, Clone, Copy, Default)]
pub struct NotEmpty;

impl Validator for NotEmpty {
    fn name(&self) -> &'static str {
        "not_empty"
    }

    fn validate(&self, value: &Value) -> Result<(), String> {
        if expect_str(value)?.is_empty() {
            return Err("must not be empty".to_string());
        }
        Ok(())
    }
}

/// Accepts only one of a fixed set of strings
#[derive(Debug, Clone)]
pub struct OneOf {
    allowed: Vec<&'static str>,
    ignore_case: bool,
}

impl OneOf {
    /// Case-sensitive membership
    #[must_use]
    pub fn new(allowed: &[&'static str]) -> Self {
        Self {
            allowed: allowed.to_vec(),
            ignore_case: false,
        }
    }

    /// Case-insensitive membership
    #[must_use]
    pub fn ignore_case(allowed: &[&'static str]) -> Self {
        Self {
            allowed: allowed.to_vec(),
            ignore_case: true,
        }
    }

    /// Allowed values
    #[must_use]
    pub fn allowed(&self) -> &[&'static str] {
        &self.allowed
    }
}

impl Validator for OneOf {
    fn name(&self) -> &'static str {
        "one_of"
    }

    fn validate(&self, value: &Value) -> Result<(), String> {
        let s = expect_str(value)?;
        let found = self.allowed.iter().any(|a| {
            if self.ignore_case {
                a.eq_ignore_ascii_case(s)
            } else {
                *a == s
            }
        });

        if found {
            Ok(())
        } else {
            Err(format!("expected one of [{}], got {s:?}", self.allowed.join(", ")))
        }
    }
}

/// Upper bound on an integer
#[derive(Debug, Clone, Copy)]
pub struct IntAtMost(pub i64);

impl Validator for IntAtMost {
    fn name(&self) -> &'static str {
        "int_at_most"
    }

    fn validate(&self, value: &Value) -> Result<(), String> {
        let i = value
            .as_int()
            .ok_or_else(|| format!("expected int, found {}", value.kind()))?;
        if i > self.0 {
            return Err(format!("expected at most {}, got {i}", self.0));
        }
        Ok(())
    }
}

/// String length bounds, counted in UTF-8 bytes
#[derive(Debug, Clone, Copy)]
pub struct LengthBetween {
    /// Inclusive minimum
    pub min: usize,
    /// Inclusive maximum
    pub max: usize,
}

impl Validator for LengthBetween {
    fn name(&self) -> &'static str {
        "length_between"
    }

    fn validate(&self, value: &Value) -> Result<(), String> {
        let len = expect_str(value)?.len();
        if len < self.min || len > self.max {
            return Err(format!(
                "must be from {} to {} bytes long, got {len}",
                self.min, self.max
            ));
        }
        Ok(())
    }
}

/// Rejects strings containing any of the given characters
#[derive(Debug, Clone, Copy)]
pub struct ExcludesChars(pub &'static str);

impl Validator for ExcludesChars {
    fn name(&self) -> &'static str {
        "excludes_chars"
    }

    fn validate(&self, value: &Value) -> Result<(), String> {
        let s = expect_str(value)?;
        if let Some(c) = s.chars().find(|c| self.0.contains(*c)) {
            return Err(format!("must not contain {c:?} (excluded: {:?})", self.0));
        }
        Ok(())
    }
}

static ARN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^arn:aws(-[a-z]+)*:[a-z0-9-]+:([a-z]{2}(-[a-z]+)+-\d)?:(\d{12}|aws)?:.+$")
        .expect("static regex")
});

/// Amazon Resource Name
#[derive(Debug, Clone, Copy, Default)]
pub struct Arn;

impl Validator for Arn {
    fn name(&self) -> &'static str {
        "arn"
    }

    fn validate(&self, value: &Value) -> Result<(), String> {
        let s = expect_str(value)?;
        if ARN.is_match(s) {
            Ok(())
        } else {
            Err(format!("{s:?} is not a valid ARN"))
        }
    }
}

static WEEKLY_WINDOW: Lazy<Regex> = Lazy::new(|| {
    let time = "(sun|mon|tue|wed|thu|fri|sat):([0-1][0-9]|2[0-3]):([0-5][0-9])";
    Regex::new(&format!("^({time}-{time}|)$")).expect("static regex")
});

/// Weekly window `ddd:hh24:mi-ddd:hh24:mi`
///
/// Day names are matched case-insensitively; the empty string is allowed.
#[derive(Debug, Clone, Copy, Default)]
pub struct WeeklyWindow;

impl Validator for WeeklyWindow {
    fn name(&self) -> &'static str {
        "weekly_window"
    }

    fn validate(&self, value: &Value) -> Result<(), String> {
        let s = expect_str(value)?;
        if WEEKLY_WINDOW.is_match(&s.to_lowercase()) {
            Ok(())
        } else {
            Err(format!("{s:?} must satisfy the format \"ddd:hh24:mi-ddd:hh24:mi\""))
        }
    }
}

static DAILY_WINDOW: Lazy<Regex> = Lazy::new(|| {
    let time = "([0-1][0-9]|2[0-3]):([0-5][0-9])";
    Regex::new(&format!("^({time}-{time}|)$")).expect("static regex")
});

/// Daily window `hh24:mi-hh24:mi`; the empty string is allowed
#[derive(Debug, Clone, Copy, Default)]
pub struct DailyWindow;

impl Validator for DailyWindow {
    fn name(&self) -> &'static str {
        "daily_window"
    }

    fn validate(&self, value: &Value) -> Result<(), String> {
        let s = expect_str(value)?;
        if DAILY_WINDOW.is_match(s) {
            Ok(())
        } else {
            Err(format!("{s:?} must satisfy the format \"hh24:mi-hh24:mi\""))
        }
    }
}

static REDIS_VERSION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([1-5](\.[0-9]+){2}|([6-9]|[1-9][0-9])\.x|([6-9]|[1-9][0-9])\.[0-9]+)$")
        .expect("static regex")
});

/// Redis engine version
///
/// `X.Y.Z` before 6, `N.x` or `N.M` from 6 onwards.
#[derive(Debug, Clone, Copy, Default)]
pub struct RedisVersion;

impl Validator for RedisVersion {
    fn name(&self) -> &'static str {
        "redis_version"
    }

    fn validate(&self, value: &Value) -> Result<(), String> {
        let s = expect_str(value)?;
        if REDIS_VERSION.is_match(s) {
            Ok(())
        } else {
            Err(format!("{s:?} is not a valid Redis version"))
        }
    }
}

/// Replication group identifier
///
/// 1 to 40 alphanumerics or hyphens, starting with a letter, no `--`,
/// no trailing hyphen.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReplicationGroupId;

impl Validator for ReplicationGroupId {
    fn name(&self) -> &'static str {
        "replication_group_id"
    }

    fn validate(&self, value: &Value) -> Result<(), String> {
        let s = expect_str(value)?;

        if s.is_empty() || s.len() > 40 {
            return Err("must contain from 1 to 40 alphanumeric characters or hyphens".to_string());
        }
        if !s.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            return Err("only alphanumeric characters and hyphens allowed".to_string());
        }
        if !s.starts_with(|c: char| c.is_ascii_alphabetic()) {
            return Err("must begin with a letter".to_string());
        }
        if s.contains("--") {
            return Err("cannot contain two consecutive hyphens".to_string());
        }
        if s.ends_with('-') {
            return Err("cannot end with a hyphen".to_string());
        }
        Ok(())
    }
}
