//! Service layer: order intake and the approve / reject / dismiss decisions
use std::sync::Arc;

use tracing::{debug, info, warn};

use super::config::Settings;
use super::context::{DecisionJournal, Witness, WitnessType};
use super::error::CommandError;
use super::extract::extract;
use super::gateway::ChatGateway;
use super::identity::resolve_identity;
use super::notice::Notice;
use super::notifier::{Dispatch, Notifier};
use super::registry::OrderRegistry;
use super::types::{Author, InboundMessage, MessageRef, PendingOrder, TimeStamp};
use super::utils::new_decision_id;
use chrono::Utc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Approved,
    Rejected,
    Dismissed,
}

impl Verdict {
    /// Command word that produces this verdict.
    pub fn command(&self) -> &'static str {
        match self {
            Verdict::Approved => "approved",
            Verdict::Rejected => "rejected",
            Verdict::Dismissed => "dismiss",
        }
    }
    fn witness_type(&self) -> WitnessType {
        match self {
            Verdict::Approved => WitnessType::Approve,
            Verdict::Rejected => WitnessType::Reject,
            Verdict::Dismissed => WitnessType::Dismiss,
        }
    }
}

/// A decision that has been accepted. Produced once, consumed once by the notifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecisionOutcome {
    pub decision_id: String,
    pub verdict: Verdict,
    pub order: PendingOrder, // snapshot at decision time
    pub actor: Author,
    pub decided_at: TimeStamp<Utc>,
}

/// What the deciding administrator is told.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Acknowledgement {
    Approved { order_id: String, requester: String },
    Rejected { order_id: String, requester: String },
    Dismissed { order_id: String },
    // decision is final, the buyer just could not be reached
    UserNotFound {
        order_id: String,
        requester: String,
        verdict: Verdict,
    },
}

impl Acknowledgement {
    pub fn to_notice(&self) -> Notice {
        match self {
            Acknowledgement::Approved {
                order_id,
                requester,
            } => Notice::text(format!(
                "✅ Order `{order_id}` approved! Notifying {requester}."
            )),
            Acknowledgement::Rejected {
                order_id,
                requester,
            } => Notice::text(format!(
                "❌ Order `{order_id}` rejected. Notifying {requester}."
            )),
            Acknowledgement::Dismissed { order_id } => {
                Notice::text(format!("🗑️ Order `{order_id}` dismissed."))
            }
            Acknowledgement::UserNotFound {
                order_id,
                requester,
                verdict,
            } => Notice::text(format!(
                "⚠️ Order `{order_id}` {}, but user not found: {requester}. No DM was sent.",
                verdict.command()
            )),
        }
    }
}

#[derive(Debug)]
pub struct DecisionReport {
    pub outcome: DecisionOutcome,
    pub acknowledgement: Acknowledgement,
    pub dispatch: Dispatch,
}

pub struct OrderService {
    registry: OrderRegistry,
    journal: DecisionJournal,
    gateway: Arc<dyn ChatGateway>,
    notifier: Notifier,
    settings: Arc<Settings>,
}

impl OrderService {
    pub fn new(
        registry: OrderRegistry,
        journal: DecisionJournal,
        gateway: Arc<dyn ChatGateway>,
        settings: Arc<Settings>,
    ) -> Self {
        let notifier = Notifier::new(gateway.clone(), settings.clone());
        Self {
            registry,
            journal,
            gateway,
            notifier,
            settings,
        }
    }

    pub fn registry(&self) -> &OrderRegistry {
        &self.registry
    }

    pub fn journal(&self) -> &DecisionJournal {
        &self.journal
    }

    /// Store the order announced by a webhook message, if its first embed
    /// names both an order id and a requester.
    pub fn ingest_notification(&self, message: &InboundMessage) -> Option<PendingOrder> {
        let embed = message.embeds.first()?;
        let Some((order_id, requester, details)) = extract(embed).into_parts() else {
            debug!(message = %message.reference.message_id, "webhook message carries no order");
            return None;
        };
        self.submit_order(order_id, requester, details, message.reference.clone())
    }

    /// Store an order directly, bypassing extraction. A blank order id or
    /// requester handle is refused.
    pub fn submit_order(
        &self,
        order_id: String,
        requester: String,
        details: String,
        origin: MessageRef,
    ) -> Option<PendingOrder> {
        if order_id.trim().is_empty() || requester.trim().is_empty() {
            warn!(order_id = %order_id, message = %origin.message_id, "refusing order without id or requester");
            return None;
        }

        let order = PendingOrder::new(order_id, requester, details, origin);
        if let Some(previous) = self.registry.put(order.clone()) {
            warn!(
                order_id = %order.order_id,
                previous_message = %previous.origin.message_id,
                "pending order replaced by a newer notification"
            );
        }
        info!(order_id = %order.order_id, requester = %order.requester_handle, "order stored");
        Some(order)
    }

    pub async fn approve_order(
        &self,
        actor: &Author,
        args: &[&str],
    ) -> Result<DecisionReport, CommandError> {
        self.decide(Verdict::Approved, actor, args).await
    }

    pub async fn reject_order(
        &self,
        actor: &Author,
        args: &[&str],
    ) -> Result<DecisionReport, CommandError> {
        self.decide(Verdict::Rejected, actor, args).await
    }

    pub async fn dismiss_order(
        &self,
        actor: &Author,
        args: &[&str],
    ) -> Result<DecisionReport, CommandError> {
        self.decide(Verdict::Dismissed, actor, args).await
    }

    /// Pending orders, oldest first.
    pub fn list_orders(&self, actor: &Author) -> Result<Vec<(String, PendingOrder)>, CommandError> {
        if !actor.is_admin {
            return Err(CommandError::PermissionDenied);
        }
        Ok(self.registry.list_all())
    }

    pub async fn decide(
        &self,
        verdict: Verdict,
        actor: &Author,
        args: &[&str],
    ) -> Result<DecisionReport, CommandError> {
        if !actor.is_admin {
            return Err(CommandError::PermissionDenied);
        }

        let [order_id] = args else {
            return Err(CommandError::InvalidCommand {
                usage: format!("{}{} <order_id>", self.settings.prefix, verdict.command()),
            });
        };

        if self.registry.get(order_id).is_none() {
            return Err(CommandError::OrderNotFound(order_id.to_string()));
        }
        // a concurrent decision may have won between get and remove
        let Some(order) = self.registry.remove(order_id) else {
            return Err(CommandError::OrderNotFound(order_id.to_string()));
        };

        let outcome = self.finalise(verdict, actor, order);

        let (acknowledgement, recipient) = match verdict {
            Verdict::Dismissed => (
                Acknowledgement::Dismissed {
                    order_id: outcome.order.order_id.clone(),
                },
                None,
            ),
            Verdict::Approved | Verdict::Rejected => {
                let resolved =
                    resolve_identity(self.gateway.as_ref(), &outcome.order.requester_handle).await;
                let order_id = outcome.order.order_id.clone();
                let requester = outcome.order.requester_handle.clone();
                match (resolved, verdict) {
                    (None, _) => {
                        warn!(order_id = %order_id, requester = %requester, "requester not found");
                        (
                            Acknowledgement::UserNotFound {
                                order_id,
                                requester,
                                verdict,
                            },
                            None,
                        )
                    }
                    (Some(user), Verdict::Approved) => (
                        Acknowledgement::Approved {
                            order_id,
                            requester,
                        },
                        Some(user),
                    ),
                    (Some(user), _) => (
                        Acknowledgement::Rejected {
                            order_id,
                            requester,
                        },
                        Some(user),
                    ),
                }
            }
        };

        let dispatch = self.notifier.notify(&outcome, recipient);

        Ok(DecisionReport {
            outcome,
            acknowledgement,
            dispatch,
        })
    }

    // Runs after the registry removal; nothing here may fail the command.
    fn finalise(&self, verdict: Verdict, actor: &Author, order: PendingOrder) -> DecisionOutcome {
        let decision_id = new_decision_id().unwrap_or_else(|e| {
            warn!(error = %e, "falling back to a plain uuid decision id");
            uuid7::uuid7().to_string()
        });
        let decided_at = TimeStamp::new();

        let witness = Witness::new(
            order.order_id.clone(),
            actor.id.clone(),
            decided_at.clone(),
            verdict.witness_type(),
        );
        match self.journal.record(witness) {
            Ok(receipt) => info!(
                order_id = %order.order_id,
                decision = %decision_id,
                verdict = verdict.command(),
                actor = %actor.tag,
                receipt = %receipt,
                "decision accepted"
            ),
            Err(e) => warn!(order_id = %order.order_id, error = %e, "decision journal write failed"),
        }

        DecisionOutcome {
            decision_id,
            verdict,
            order,
            actor: actor.clone(),
            decided_at,
        }
    }
}
