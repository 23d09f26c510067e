//! JSON-lines transport for running the bot without a platform connection.
//!
//! Inbound messages are read by the binary; every outbound call made through
//! this gateway is written as one JSON object per line.
use std::io::Write;
use std::sync::Mutex;

use async_trait::async_trait;
use serde::Serialize;

use crate::config::DirectorySeed;
use crate::error::GatewayError;
use crate::gateway::ChatGateway;
use crate::notice::Notice;
use crate::types::{Identity, Member, MessageRef};

#[derive(Debug, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
enum Outbound<'a> {
    Reply {
        to: &'a MessageRef,
        notice: &'a Notice,
    },
    SendChannel {
        channel_id: &'a str,
        notice: &'a Notice,
    },
    SendDirect {
        user: &'a Identity,
        notice: &'a Notice,
    },
    DeleteMessage {
        message: &'a MessageRef,
    },
}

pub struct ConsoleGateway {
    directories: Vec<DirectorySeed>,
    out: Mutex<Box<dyn Write + Send>>,
}

impl ConsoleGateway {
    pub fn new(directories: Vec<DirectorySeed>) -> Self {
        Self::with_writer(directories, Box::new(std::io::stdout()))
    }

    pub fn with_writer(directories: Vec<DirectorySeed>, out: Box<dyn Write + Send>) -> Self {
        Self {
            directories,
            out: Mutex::new(out),
        }
    }

    fn emit(&self, event: &Outbound<'_>) -> Result<(), GatewayError> {
        let line = serde_json::to_string(event)?;
        let mut out = self
            .out
            .lock()
            .map_err(|_| GatewayError::Delivery("console writer poisoned".into()))?;
        writeln!(out, "{line}")?;
        out.flush()?;
        Ok(())
    }
}

#[async_trait]
impl ChatGateway for ConsoleGateway {
    async fn reply(&self, to: &MessageRef, notice: &Notice) -> Result<(), GatewayError> {
        self.emit(&Outbound::Reply { to, notice })
    }

    async fn send_channel(&self, channel_id: &str, notice: &Notice) -> Result<(), GatewayError> {
        self.emit(&Outbound::SendChannel { channel_id, notice })
    }

    async fn send_direct(&self, user: &Identity, notice: &Notice) -> Result<(), GatewayError> {
        self.emit(&Outbound::SendDirect { user, notice })
    }

    async fn delete_message(&self, message: &MessageRef) -> Result<(), GatewayError> {
        self.emit(&Outbound::DeleteMessage { message })
    }

    async fn directories(&self) -> Result<Vec<String>, GatewayError> {
        Ok(self.directories.iter().map(|d| d.id.clone()).collect())
    }

    async fn members(&self, directory: &str) -> Result<Vec<Member>, GatewayError> {
        self.directories
            .iter()
            .find(|d| d.id == directory)
            .map(|d| d.members.clone())
            .ok_or_else(|| GatewayError::NotFound(format!("directory {directory}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[derive(Clone, Default)]
    struct Buffer(Arc<Mutex<Vec<u8>>>);

    impl Write for Buffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().write(buf)
        }
        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn writes_one_tagged_line_per_call() {
        let buffer = Buffer::default();
        let gateway = ConsoleGateway::with_writer(vec![], Box::new(buffer.clone()));

        gateway
            .send_channel("announce", &Notice::text("hi"))
            .await
            .unwrap();
        gateway
            .delete_message(&MessageRef::new("orders", "42"))
            .await
            .unwrap();

        let written = String::from_utf8(buffer.0.lock().unwrap().clone()).unwrap();
        let lines: Vec<serde_json::Value> = written
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["action"], "send_channel");
        assert_eq!(lines[0]["notice"]["text"], "hi");
        assert_eq!(lines[1]["action"], "delete_message");
        assert_eq!(lines[1]["message"]["message_id"], "42");
    }

    #[tokio::test]
    async fn unknown_directory_is_an_error() {
        let gateway = ConsoleGateway::with_writer(vec![], Box::new(Buffer::default()));
        assert!(matches!(
            gateway.members("nope").await,
            Err(GatewayError::NotFound(_))
        ));
    }
}
