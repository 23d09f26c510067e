//! Command router: turns raw inbound messages into intake or decisions and
//! sends the single reply every command gets.
use std::sync::Arc;

use chrono::Utc;
use tokio::task::{JoinError, JoinSet};
use tracing::{debug, info, warn};

use crate::config::Settings;
use crate::error::CommandError;
use crate::gateway::ChatGateway;
use crate::notice::{self, Notice};
use crate::schedule::ScheduledTask;
use crate::service::{DecisionReport, OrderService, Verdict};
use crate::types::{InboundMessage, PendingOrder};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Decide(Verdict),
    Orders,
    Ping,
    Help,
}

impl Command {
    pub const ALL: [Command; 6] = [
        Command::Decide(Verdict::Approved),
        Command::Decide(Verdict::Rejected),
        Command::Decide(Verdict::Dismissed),
        Command::Orders,
        Command::Ping,
        Command::Help,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Command::Decide(verdict) => verdict.command(),
            Command::Orders => "orders",
            Command::Ping => "ping",
            Command::Help => "help",
        }
    }

    /// Split `content` into a command and its arguments. `None` when the
    /// message is not addressed to the bot.
    pub fn parse<'a>(content: &'a str, prefix: &str) -> Option<(Command, Vec<&'a str>)> {
        let rest = content.trim().strip_prefix(prefix)?;
        // the command word must follow the prefix directly
        if rest.starts_with(char::is_whitespace) {
            return None;
        }
        let mut words = rest.split_whitespace();
        let name = words.next()?;
        let command = Self::ALL.into_iter().find(|c| c.name() == name)?;
        Some((command, words.collect()))
    }
}

/// What handling one inbound message amounted to.
#[derive(Debug)]
pub enum Handled {
    Ignored,
    OrderStored(PendingOrder),
    Redirected(ScheduledTask),
    Replied(Notice),
    Decided { reply: Notice, report: DecisionReport },
}

#[derive(Clone)]
pub struct Router {
    service: Arc<OrderService>,
    gateway: Arc<dyn ChatGateway>,
    settings: Arc<Settings>,
}

impl Router {
    pub fn new(
        service: Arc<OrderService>,
        gateway: Arc<dyn ChatGateway>,
        settings: Arc<Settings>,
    ) -> Self {
        Self {
            service,
            gateway,
            settings,
        }
    }

    pub fn service(&self) -> &OrderService {
        &self.service
    }

    pub async fn handle(&self, message: InboundMessage) -> Handled {
        if message.is_webhook() {
            return self.intake(&message).await;
        }
        if message.author.is_bot {
            return Handled::Ignored;
        }
        let Some((command, args)) = Command::parse(&message.content, &self.settings.prefix) else {
            return Handled::Ignored;
        };

        if let Some(order_channel) = self.settings.order_channel.as_deref() {
            if message.reference.channel_id != order_channel {
                return self.redirect(&message, order_channel).await;
            }
        }

        debug!(command = command.name(), author = %message.author.tag, "dispatching command");
        match command {
            Command::Decide(verdict) => {
                match self.service.decide(verdict, &message.author, &args).await {
                    Ok(report) => {
                        let reply = report.acknowledgement.to_notice();
                        self.reply(&message, &reply).await;
                        Handled::Decided { reply, report }
                    }
                    Err(e) => self.reply_error(&message, e).await,
                }
            }
            Command::Orders => match self.service.list_orders(&message.author) {
                Ok(orders) => {
                    let reply = notice::pending_orders(&orders);
                    self.reply(&message, &reply).await;
                    Handled::Replied(reply)
                }
                Err(e) => self.reply_error(&message, e).await,
            },
            Command::Ping => {
                let latency = (Utc::now() - message.created_at).num_milliseconds().max(0);
                let reply = Notice::text(format!("🏓 Pong! Latency: {latency}ms"));
                self.reply(&message, &reply).await;
                Handled::Replied(reply)
            }
            Command::Help => {
                let reply = notice::help(&self.settings.prefix, &self.settings.brand);
                self.reply(&message, &reply).await;
                Handled::Replied(reply)
            }
        }
    }

    async fn intake(&self, message: &InboundMessage) -> Handled {
        let Some(order) = self.service.ingest_notification(message) else {
            return Handled::Ignored;
        };
        let received = notice::new_order_received(&order.order_id, &order.requester_handle);
        if let Err(e) = self
            .gateway
            .send_channel(&message.reference.channel_id, &received)
            .await
        {
            warn!(order_id = %order.order_id, error = %e, "could not post new order notice");
        }
        Handled::OrderStored(order)
    }

    async fn redirect(&self, message: &InboundMessage, order_channel: &str) -> Handled {
        info!(
            channel = %message.reference.channel_id,
            author = %message.author.tag,
            "command outside the order channel"
        );
        self.reply(message, &notice::channel_redirect(order_channel))
            .await;

        let gateway = self.gateway.clone();
        let offending = message.reference.clone();
        Handled::Redirected(ScheduledTask::after(
            self.settings.redirect_delete_delay(),
            async move {
                if let Err(e) = gateway.delete_message(&offending).await {
                    warn!(message = %offending.message_id, error = %e, "could not delete misplaced command");
                }
            },
        ))
    }

    async fn reply_error(&self, message: &InboundMessage, error: CommandError) -> Handled {
        info!(author = %message.author.tag, error = %error, "command refused");
        let reply = Notice::text(format!("❌ {error}"));
        self.reply(message, &reply).await;
        Handled::Replied(reply)
    }

    async fn reply(&self, message: &InboundMessage, reply: &Notice) {
        if let Err(e) = self.gateway.reply(&message.reference, reply).await {
            warn!(message = %message.reference.message_id, error = %e, "reply failed");
        }
    }
}

/// Message handlers running concurrently. Finished handlers are reaped on
/// every spawn, so the set only holds what is still in flight.
#[derive(Default)]
pub struct HandlerSet {
    handlers: JoinSet<()>,
}

impl HandlerSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawn(&mut self, router: &Router, message: InboundMessage) {
        self.reap();
        let router = router.clone();
        self.handlers.spawn(async move {
            router.handle(message).await;
        });
    }

    /// Drop every finished handler, returning how many were dropped.
    pub fn reap(&mut self) -> usize {
        let mut reaped = 0;
        while let Some(joined) = self.handlers.try_join_next() {
            log_handler_exit(joined);
            reaped += 1;
        }
        reaped
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Wait for every handler still running.
    pub async fn drain(mut self) {
        while let Some(joined) = self.handlers.join_next().await {
            log_handler_exit(joined);
        }
    }
}

fn log_handler_exit(joined: Result<(), JoinError>) {
    if let Err(e) = joined {
        warn!(error = %e, "message handler panicked");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_decisions_with_arguments() {
        let (command, args) = Command::parse("./approved ORD_AB12", "./").unwrap();
        assert_eq!(command, Command::Decide(Verdict::Approved));
        assert_eq!(args, vec!["ORD_AB12"]);

        let (command, args) = Command::parse("  ./dismiss   ORD_1  ", "./").unwrap();
        assert_eq!(command, Command::Decide(Verdict::Dismissed));
        assert_eq!(args, vec!["ORD_1"]);
    }

    #[test]
    fn ignores_unknown_and_unprefixed_text() {
        assert!(Command::parse("approved ORD_1", "./").is_none());
        assert!(Command::parse("./approve ORD_1", "./").is_none());
        assert!(Command::parse("./", "./").is_none());
        assert!(Command::parse("hello there", "./").is_none());
    }

    #[test]
    fn command_word_must_touch_the_prefix() {
        assert!(Command::parse("./   approved ORD_1", "./").is_none());
        assert!(Command::parse("./ ping", "./").is_none());
        assert!(Command::parse("  ./ping  ", "./").is_some());
    }

    #[test]
    fn every_command_round_trips_through_its_name() {
        for command in Command::ALL {
            let text = format!("!{}", command.name());
            assert_eq!(Command::parse(&text, "!").map(|(c, _)| c), Some(command));
        }
    }
}
