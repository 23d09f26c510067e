//! Boundary to the chat platform. Every call is a fallible remote call with no
//! built-in retry.
use async_trait::async_trait;

use crate::error::GatewayError;
use crate::notice::Notice;
use crate::types::{Identity, Member, MessageRef};

#[async_trait]
pub trait ChatGateway: Send + Sync {
    /// Reply to a message in its own channel.
    async fn reply(&self, to: &MessageRef, notice: &Notice) -> Result<(), GatewayError>;

    async fn send_channel(&self, channel_id: &str, notice: &Notice) -> Result<(), GatewayError>;

    async fn send_direct(&self, user: &Identity, notice: &Notice) -> Result<(), GatewayError>;

    async fn delete_message(&self, message: &MessageRef) -> Result<(), GatewayError>;

    /// Ids of every membership directory (guild) the bot can see.
    async fn directories(&self) -> Result<Vec<String>, GatewayError>;

    async fn members(&self, directory: &str) -> Result<Vec<Member>, GatewayError>;
}
