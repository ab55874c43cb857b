use crate::reminder::{PermissionDecision, ReminderTime};
use crate::storage::DEFAULT_DATA_PATH;
use std::{env, net::SocketAddr, path::PathBuf};
use tracing::warn;

pub const DEFAULT_PORT: u16 = 8080;

/// Settings read from the environment at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub port: u16,
    pub data_path: PathBuf,
    pub reminder_time: ReminderTime,
    pub reminder_permission: PermissionDecision,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a config from any key lookup. Unparsable values fall back to
    /// their defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();

        let port = parse_or(&lookup, "PORT", defaults.port);
        let hour = parse_or(&lookup, "REMINDER_HOUR", defaults.reminder_time.hour);
        let minute = parse_or(&lookup, "REMINDER_MINUTE", defaults.reminder_time.minute);
        let reminder_time = ReminderTime::new(hour, minute).unwrap_or_else(|err| {
            warn!(%err, "ignoring configured reminder time");
            defaults.reminder_time
        });

        let reminder_permission = match lookup("REMINDER_PERMISSION")
            .map(|value| value.trim().to_ascii_lowercase())
            .as_deref()
        {
            None | Some("granted") => PermissionDecision::Granted,
            Some("denied") => PermissionDecision::Denied,
            Some(other) => {
                warn!(value = other, "unknown REMINDER_PERMISSION, using granted");
                PermissionDecision::Granted
            }
        };

        let data_path = lookup("APP_DATA_PATH")
            .filter(|path| !path.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or(defaults.data_path);

        Self {
            port,
            data_path,
            reminder_time,
            reminder_permission,
        }
    }

    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::from(([0, 0, 0, 0], self.port))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            reminder_time: ReminderTime::default(),
            reminder_permission: PermissionDecision::Granted,
        }
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    lookup(key)
        .and_then(|value| value.trim().parse::<T>().ok())
        .unwrap_or(default)
}
