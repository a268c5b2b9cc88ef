//! Configuration from command-line arguments and environment variables.

use std::env;
use std::path::PathBuf;

use chrono_tz::Tz;
use clap::{Parser, ValueEnum};

use crate::error::ConfigError;

const DEFAULT_NE_IDS: &[&str] = &["0205"];
const DEFAULT_STATE_PATH: &str = "state.json";
const DEFAULT_NE_MAP_PATH: &str = "ne_id_map.json";

/// Delivery transport selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum TransportKind {
    /// SMTP email
    #[default]
    Email,
    /// Incoming chat webhook
    Webhook,
    /// Log the message instead of delivering it
    Log,
}

#[derive(Debug, Clone, Parser)]
#[command(name = "outage-monitor")]
#[command(about = "Poll DEDDIE power outage reports and notify on changes")]
pub struct Args {
    /// Comma-separated NE ids to poll. Falls back to NE_IDS env, then 0205.
    #[arg(long, value_delimiter = ',')]
    pub ne_ids: Vec<String>,

    /// State file path. Falls back to STATE_PATH env.
    #[arg(long)]
    pub state: Option<PathBuf>,

    /// NE id to prefecture label map. Falls back to NE_MAP_PATH env.
    #[arg(long)]
    pub ne_map: Option<PathBuf>,

    /// Send a snapshot even when nothing changed (also FORCE_NOTIFY env)
    #[arg(long)]
    pub force_notify: bool,

    /// Verbose logging (also DEBUG_LOG env)
    #[arg(long)]
    pub debug: bool,

    /// Delivery transport
    #[arg(long, value_enum, default_value_t = TransportKind::Email)]
    pub transport: TransportKind,

    /// Time zone used to render timestamps
    #[arg(long, default_value = "Europe/Athens")]
    pub timezone: String,
}

/// Resolved, immutable configuration for one run.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Partitions (NE ids) to poll, in order.
    pub partition_ids: Vec<String>,
    pub state_path: PathBuf,
    pub labels_path: PathBuf,
    pub force_notify: bool,
    pub debug: bool,
    pub transport: TransportKind,
    pub timezone: Tz,
}

impl MonitorConfig {
    /// Resolve arguments against the process environment.
    ///
    /// | Variable | Description | Default |
    /// |----------|-------------|---------|
    /// | `NE_IDS` | Comma-separated NE ids | `0205` |
    /// | `STATE_PATH` | State file | `state.json` |
    /// | `NE_MAP_PATH` | NE id label map | `ne_id_map.json` |
    /// | `FORCE_NOTIFY` | Snapshot when unchanged | off |
    /// | `DEBUG_LOG` | Verbose logging | off |
    pub fn from_args(args: Args) -> Result<Self, ConfigError> {
        Self::resolve(args, |name| env::var(name).ok())
    }

    /// Resolve arguments against an arbitrary variable lookup.
    pub fn resolve<F>(args: Args, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let partition_ids = if !args.ne_ids.is_empty() {
            clean_ids(args.ne_ids.iter().map(String::as_str))
        } else {
            match lookup("NE_IDS").filter(|raw| !raw.trim().is_empty()) {
                Some(raw) => clean_ids(raw.split(',')),
                None => DEFAULT_NE_IDS.iter().map(|s| s.to_string()).collect(),
            }
        };

        let state_path = args
            .state
            .or_else(|| lookup("STATE_PATH").map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STATE_PATH));
        let labels_path = args
            .ne_map
            .or_else(|| lookup("NE_MAP_PATH").map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_NE_MAP_PATH));

        let timezone = args
            .timezone
            .parse::<Tz>()
            .map_err(|_| ConfigError::InvalidTimezone(args.timezone.clone()))?;

        Ok(Self {
            partition_ids,
            state_path,
            labels_path,
            force_notify: args.force_notify || env_true(lookup("FORCE_NOTIFY")),
            debug: args.debug || env_true(lookup("DEBUG_LOG")),
            transport: args.transport,
            timezone,
        })
    }
}

/// Whether debug logging was requested on the command line or in the env.
pub fn debug_requested(args: &Args) -> bool {
    args.debug || env_true(env::var("DEBUG_LOG").ok())
}

/// `1`, `true`, `yes`, `y` and `on` (any case) are true; anything else is false.
pub fn env_true(value: Option<String>) -> bool {
    value.is_some_and(|v| {
        matches!(
            v.trim().to_ascii_lowercase().as_str(),
            "1" | "true" | "yes" | "y" | "on"
        )
    })
}

fn clean_ids<'a>(raw: impl Iterator<Item = &'a str>) -> Vec<String> {
    raw.map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    fn args() -> Args {
        Args::parse_from(["outage-monitor"])
    }

    #[test]
    fn test_defaults() {
        let config = MonitorConfig::resolve(args(), lookup(&[])).unwrap();
        assert_eq!(config.partition_ids, vec!["0205"]);
        assert_eq!(config.state_path, PathBuf::from("state.json"));
        assert_eq!(config.labels_path, PathBuf::from("ne_id_map.json"));
        assert!(!config.force_notify);
        assert!(!config.debug);
        assert_eq!(config.transport, TransportKind::Email);
        assert_eq!(config.timezone, chrono_tz::Europe::Athens);
    }

    #[test]
    fn test_env_fallbacks() {
        let config = MonitorConfig::resolve(
            args(),
            lookup(&[
                ("NE_IDS", " 0205, ,0206 "),
                ("FORCE_NOTIFY", "Yes"),
                ("DEBUG_LOG", "0"),
                ("STATE_PATH", "/var/lib/monitor/state.json"),
            ]),
        )
        .unwrap();
        assert_eq!(config.partition_ids, vec!["0205", "0206"]);
        assert!(config.force_notify);
        assert!(!config.debug);
        assert_eq!(config.state_path, PathBuf::from("/var/lib/monitor/state.json"));
    }

    #[test]
    fn test_args_override_env() {
        let args = Args::parse_from([
            "outage-monitor",
            "--ne-ids",
            "0301,0302",
            "--state",
            "custom.json",
            "--transport",
            "webhook",
            "--debug",
        ]);
        let config = MonitorConfig::resolve(
            args,
            lookup(&[("NE_IDS", "0205"), ("STATE_PATH", "env.json")]),
        )
        .unwrap();
        assert_eq!(config.partition_ids, vec!["0301", "0302"]);
        assert_eq!(config.state_path, PathBuf::from("custom.json"));
        assert_eq!(config.transport, TransportKind::Webhook);
        assert!(config.debug);
    }

    #[test]
    fn test_invalid_timezone() {
        let args = Args::parse_from(["outage-monitor", "--timezone", "Mars/Olympus"]);
        assert!(matches!(
            MonitorConfig::resolve(args, lookup(&[])),
            Err(ConfigError::InvalidTimezone(_))
        ));
    }

    #[test]
    fn test_env_true() {
        for value in ["1", "true", "TRUE", " yes ", "y", "On"] {
            assert!(env_true(Some(value.to_string())), "{value}");
        }
        for value in ["", "0", "false", "no", "enabled"] {
            assert!(!env_true(Some(value.to_string())), "{value}");
        }
        assert!(!env_true(None));
    }
}
