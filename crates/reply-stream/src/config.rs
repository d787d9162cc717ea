//! Stream configuration: segment size limit, prompt snip threshold, code-to-file thresholds, typing period.

use anyhow::{bail, Result};
use std::env;
use std::time::Duration;

/// Platform-imposed size of one message, in characters.
pub const DEFAULT_SEGMENT_LIMIT: usize = 2000;
/// Prompt characters shown before the ellipsis.
pub const DEFAULT_PROMPT_SNIP_THRESHOLD: usize = 100;
/// Minimum code block lines moved into an attachment.
pub const DEFAULT_CODE_FILE_MIN_LINES: usize = 10;
/// Same for shell-family languages.
pub const DEFAULT_SHELL_CODE_FILE_MIN_LINES: usize = 15;
/// Period of the typing indicator while a reply is open.
pub const DEFAULT_TYPING_INTERVAL_SECS: u64 = 10;

/// Settings for rendering, chunking, and the typing heartbeat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamConfig {
    /// SEGMENT_LIMIT
    pub segment_limit: usize,
    /// PROMPT_SNIP_THRESHOLD
    pub prompt_snip_threshold: usize,
    /// CODE_FILE_MIN_LINES
    pub code_file_min_lines: usize,
    /// SHELL_CODE_FILE_MIN_LINES
    pub shell_code_file_min_lines: usize,
    /// TYPING_INTERVAL_SECS
    pub typing_interval_secs: u64,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            segment_limit: DEFAULT_SEGMENT_LIMIT,
            prompt_snip_threshold: DEFAULT_PROMPT_SNIP_THRESHOLD,
            code_file_min_lines: DEFAULT_CODE_FILE_MIN_LINES,
            shell_code_file_min_lines: DEFAULT_SHELL_CODE_FILE_MIN_LINES,
            typing_interval_secs: DEFAULT_TYPING_INTERVAL_SECS,
        }
    }
}

/// Parses `raw` (the value of `key`), or returns `default` when unset. Unparsable values are errors.
fn parse_or<T: std::str::FromStr>(key: &str, raw: Option<String>, default: T) -> Result<T> {
    match raw {
        Some(raw) => match raw.trim().parse() {
            Ok(value) => Ok(value),
            Err(_) => bail!("{} must be a non-negative integer, got {:?}", key, raw),
        },
        None => Ok(default),
    }
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> Result<T> {
    parse_or(key, env::var(key).ok(), default)
}

impl StreamConfig {
    /// Load from environment variables; unset values fall back to the defaults, unparsable ones fail.
    pub fn from_env() -> Result<Self> {
        let config = Self {
            segment_limit: env_or("SEGMENT_LIMIT", DEFAULT_SEGMENT_LIMIT)?,
            prompt_snip_threshold: env_or("PROMPT_SNIP_THRESHOLD", DEFAULT_PROMPT_SNIP_THRESHOLD)?,
            code_file_min_lines: env_or("CODE_FILE_MIN_LINES", DEFAULT_CODE_FILE_MIN_LINES)?,
            shell_code_file_min_lines: env_or(
                "SHELL_CODE_FILE_MIN_LINES",
                DEFAULT_SHELL_CODE_FILE_MIN_LINES,
            )?,
            typing_interval_secs: env_or("TYPING_INTERVAL_SECS", DEFAULT_TYPING_INTERVAL_SECS)?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Rejects zero limits and thresholds.
    pub fn validate(&self) -> Result<()> {
        if self.segment_limit == 0 {
            bail!("SEGMENT_LIMIT must be greater than 0");
        }
        if self.prompt_snip_threshold == 0 {
            bail!("PROMPT_SNIP_THRESHOLD must be greater than 0");
        }
        if self.code_file_min_lines == 0 || self.shell_code_file_min_lines == 0 {
            bail!("CODE_FILE_MIN_LINES and SHELL_CODE_FILE_MIN_LINES must be greater than 0");
        }
        if self.typing_interval_secs == 0 {
            bail!("TYPING_INTERVAL_SECS must be greater than 0");
        }
        Ok(())
    }

    pub fn typing_interval(&self) -> Duration {
        Duration::from_secs(self.typing_interval_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = StreamConfig::default();
        assert_eq!(config.segment_limit, 2000);
        assert_eq!(config.prompt_snip_threshold, 100);
        assert_eq!(config.code_file_min_lines, 10);
        assert_eq!(config.shell_code_file_min_lines, 15);
        assert_eq!(config.typing_interval(), Duration::from_secs(10));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_limit() {
        let config = StreamConfig {
            segment_limit: 0,
            ..StreamConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_snip_threshold() {
        let config = StreamConfig {
            prompt_snip_threshold: 0,
            ..StreamConfig::default()
        };
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("PROMPT_SNIP_THRESHOLD"));
    }

    /// **Test: unset values take the default, set values are parsed, garbage is an error.**
    #[test]
    fn test_parse_or() {
        assert_eq!(parse_or("SEGMENT_LIMIT", None, 2000usize).unwrap(), 2000);
        assert_eq!(parse_or("SEGMENT_LIMIT", Some(" 4096 ".to_string()), 2000usize).unwrap(), 4096);

        let err = parse_or("SEGMENT_LIMIT", Some("lots".to_string()), 2000usize)
            .unwrap_err()
            .to_string();
        assert!(err.contains("SEGMENT_LIMIT"));
        assert!(parse_or("TYPING_INTERVAL_SECS", Some("-3".to_string()), 10u64).is_err());
    }
}
