#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum CommandError {
    #[error("You do not have permission to manage orders")]
    PermissionDenied,
    #[error("Usage: `{usage}`")]
    InvalidCommand { usage: String },
    #[error("Order ID `{0}` not found in pending orders")]
    OrderNotFound(String),
}

#[derive(thiserror::Error, Debug)]
pub enum GatewayError {
    #[error("message delivery failed: {0}")]
    Delivery(String),
    #[error("target not found: {0}")]
    NotFound(String),
    #[error("member directory `{guild}` unavailable: {reason}")]
    Directory { guild: String, reason: String },
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("command prefix must not be empty")]
    EmptyPrefix,
    #[error("failed to read members file {path}: {source}")]
    MembersFile {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("members file {path} is not valid JSON: {source}")]
    MembersJson {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}
