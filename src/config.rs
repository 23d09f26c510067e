//! Process-wide settings, read once at start-up.
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Parser;

use crate::error::ConfigError;
use crate::types::Member;

#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(
    name = "order-approval",
    about = "Approve, reject or dismiss webhook-posted orders from chat",
    version
)]
pub struct Settings {
    /// Prefix every command starts with
    #[arg(long, env = "COMMAND_PREFIX", default_value = "./")]
    pub prefix: String,

    /// Channel commands are confined to (unset: accepted anywhere)
    #[arg(long, env = "ORDER_CHANNEL_ID")]
    pub order_channel: Option<String>,

    /// Channel approvals are announced in (unset: no announcement)
    #[arg(long, env = "ANNOUNCE_CHANNEL_ID")]
    pub announce_channel: Option<String>,

    /// Who rejected buyers are told to contact
    #[arg(long, env = "SUPPORT_CONTACT", default_value = "a server administrator")]
    pub support_contact: String,

    /// Seconds before the original order notification is deleted after a decision
    #[arg(long, env = "CLEANUP_DELAY_SECS", default_value_t = 10)]
    pub cleanup_delay_secs: u64,

    /// Seconds before a command posted outside the order channel is deleted
    #[arg(long, env = "REDIRECT_DELETE_SECS", default_value_t = 5)]
    pub redirect_delete_secs: u64,

    /// JSON file with member directories for the console transport
    #[arg(long, env = "MEMBERS_FILE")]
    pub members_file: Option<PathBuf>,

    /// Name shown in message footers
    #[arg(long, env = "BOT_BRAND", default_value = "Order Desk")]
    pub brand: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            prefix: "./".to_string(),
            order_channel: None,
            announce_channel: None,
            support_contact: "a server administrator".to_string(),
            cleanup_delay_secs: 10,
            redirect_delete_secs: 5,
            members_file: None,
            brand: "Order Desk".to_string(),
        }
    }
}

impl Settings {
    pub fn validate(self) -> Result<Self, ConfigError> {
        if self.prefix.trim().is_empty() {
            return Err(ConfigError::EmptyPrefix);
        }
        Ok(self)
    }
    pub fn cleanup_delay(&self) -> Duration {
        Duration::from_secs(self.cleanup_delay_secs)
    }
    pub fn redirect_delete_delay(&self) -> Duration {
        Duration::from_secs(self.redirect_delete_secs)
    }
}

/// Directory id and its members, as stored in the members file.
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
pub struct DirectorySeed {
    pub id: String,
    #[serde(default)]
    pub members: Vec<Member>,
}

pub fn load_directories(path: &Path) -> Result<Vec<DirectorySeed>, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::MembersFile {
        path: path.display().to_string(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| ConfigError::MembersJson {
        path: path.display().to_string(),
        source,
    })
}
