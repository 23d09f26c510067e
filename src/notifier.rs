//! Side effects of a decision.
//!
//! The direct message, the public announcement and the origin cleanup each run
//! in their own task. A failure in one is logged and never reaches the others
//! or the caller.
use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::config::Settings;
use crate::gateway::ChatGateway;
use crate::notice;
use crate::schedule::ScheduledTask;
use crate::service::{DecisionOutcome, Verdict};
use crate::types::Identity;

/// Handles to the side effects started for one outcome.
#[derive(Debug)]
pub struct Dispatch {
    pub direct: Option<JoinHandle<()>>,
    pub announcement: Option<JoinHandle<()>>,
    pub cleanup: ScheduledTask,
}

impl Dispatch {
    /// Wait for the direct message and the announcement. The deferred cleanup
    /// keeps running on its own.
    pub async fn settled(self) -> ScheduledTask {
        for handle in [self.direct, self.announcement].into_iter().flatten() {
            if let Err(e) = handle.await {
                warn!(error = %e, "notification task aborted");
            }
        }
        self.cleanup
    }
}

#[derive(Clone)]
pub struct Notifier {
    gateway: Arc<dyn ChatGateway>,
    settings: Arc<Settings>,
}

impl Notifier {
    pub fn new(gateway: Arc<dyn ChatGateway>, settings: Arc<Settings>) -> Self {
        Self { gateway, settings }
    }

    /// Start every side effect that applies to `outcome`. `recipient` is the
    /// resolved requester; without one neither the DM nor the announcement is sent.
    pub fn notify(&self, outcome: &DecisionOutcome, recipient: Option<Identity>) -> Dispatch {
        let direct = recipient
            .as_ref()
            .and_then(|user| self.spawn_direct(outcome, user.clone()));
        let announcement = recipient.as_ref().and_then(|_| self.spawn_announcement(outcome));
        let cleanup = self.schedule_cleanup(outcome);

        Dispatch {
            direct,
            announcement,
            cleanup,
        }
    }

    fn spawn_direct(&self, outcome: &DecisionOutcome, user: Identity) -> Option<JoinHandle<()>> {
        let order_id = &outcome.order.order_id;
        let brand = &self.settings.brand;
        let message = match outcome.verdict {
            Verdict::Approved => notice::approved_dm(order_id, &outcome.decided_at, brand),
            Verdict::Rejected => notice::rejected_dm(
                order_id,
                &outcome.decided_at,
                &self.settings.support_contact,
                brand,
            ),
            // dismissal is silent towards the buyer
            Verdict::Dismissed => return None,
        };

        let gateway = self.gateway.clone();
        let order_id = order_id.clone();
        Some(tokio::spawn(async move {
            match gateway.send_direct(&user, &message).await {
                Ok(()) => info!(order_id = %order_id, user = %user.tag, "direct notification sent"),
                Err(e) => {
                    warn!(order_id = %order_id, user = %user.tag, error = %e, "direct notification failed")
                }
            }
        }))
    }

    fn spawn_announcement(&self, outcome: &DecisionOutcome) -> Option<JoinHandle<()>> {
        if outcome.verdict != Verdict::Approved {
            return None;
        }
        let channel = self.settings.announce_channel.clone()?;
        let message = notice::approval_announcement(&outcome.order, &self.settings.brand);

        let gateway = self.gateway.clone();
        let order_id = outcome.order.order_id.clone();
        Some(tokio::spawn(async move {
            match gateway.send_channel(&channel, &message).await {
                Ok(()) => info!(order_id = %order_id, channel = %channel, "approval announced"),
                Err(e) => {
                    warn!(order_id = %order_id, channel = %channel, error = %e, "announcement failed")
                }
            }
        }))
    }

    fn schedule_cleanup(&self, outcome: &DecisionOutcome) -> ScheduledTask {
        let gateway = self.gateway.clone();
        let origin = outcome.order.origin.clone();
        let order_id = outcome.order.order_id.clone();
        ScheduledTask::after(self.settings.cleanup_delay(), async move {
            match gateway.delete_message(&origin).await {
                Ok(()) => info!(order_id = %order_id, message = %origin.message_id, "origin notification removed"),
                Err(e) => warn!(order_id = %order_id, error = %e, "origin cleanup failed"),
            }
        })
    }
}
