//! Outbound message payloads and the text the bot sends.
//!
//! Rendering into the platform's rich format is the gateway's job; a `Notice`
//! only carries what is shown.
use serde::{Deserialize, Serialize};

use crate::types::{PendingOrder, TimeStamp};
use chrono::Utc;

pub const COLOR_APPROVED: u32 = 0x00FF00;
pub const COLOR_REJECTED: u32 = 0xFF0000;
pub const COLOR_PENDING: u32 = 0xFFA500;
pub const COLOR_INFO: u32 = 0x0099FF;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub text: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<(String, String)>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub footer: Option<String>,
}

impl Notice {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }
    pub fn titled(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
    pub fn field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push((name.into(), value.into()));
        self
    }
    pub fn color(mut self, color: u32) -> Self {
        self.color = Some(color);
        self
    }
    pub fn footer(mut self, footer: impl Into<String>) -> Self {
        self.footer = Some(footer.into());
        self
    }
    pub fn field_value(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }
}

pub fn approved_dm(order_id: &str, decided_at: &TimeStamp<Utc>, brand: &str) -> Notice {
    Notice::text("Your purchase has been approved successfully!")
        .titled("🎉 ORDER APPROVED!")
        .field("🆔 Order ID", format!("`{order_id}`"))
        .field("⭐ Status", "✅ Approved")
        .field("⏰ Approved At", decided_at.to_local_string())
        .color(COLOR_APPROVED)
        .footer(format!("{brand} - Thank you for your purchase!"))
}

pub fn rejected_dm(
    order_id: &str,
    decided_at: &TimeStamp<Utc>,
    support_contact: &str,
    brand: &str,
) -> Notice {
    Notice::text("Unfortunately your purchase could not be approved.")
        .titled("❌ ORDER REJECTED")
        .field("🆔 Order ID", format!("`{order_id}`"))
        .field("⭐ Status", "❌ Rejected")
        .field("⏰ Rejected At", decided_at.to_local_string())
        .field("📞 Support", format!("Please contact {support_contact} if you have questions."))
        .color(COLOR_REJECTED)
        .footer(brand.to_string())
}

/// Public approval announcement. Carries no order id.
pub fn approval_announcement(order: &PendingOrder, brand: &str) -> Notice {
    Notice::text(format!("{} just had a purchase approved!", order.requester_handle))
        .titled("🎉 New Purchase Approved")
        .field("👤 Buyer", order.requester_handle.clone())
        .field("📦 Package", order.order_details.clone())
        .color(COLOR_APPROVED)
        .footer(format!("{brand} - Thank you for your support!"))
}

pub fn new_order_received(order_id: &str, handle: &str) -> Notice {
    Notice::text(format!("📥 New order received: `{order_id}` for {handle}"))
}

pub fn pending_orders(orders: &[(String, PendingOrder)]) -> Notice {
    if orders.is_empty() {
        return Notice::text("📭 No pending orders found.");
    }
    let listing = orders
        .iter()
        .map(|(id, order)| {
            format!(
                "• **{id}** - {} · {} ({})",
                order.requester_handle,
                order.order_details,
                order.created_at.to_local_time_string()
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    Notice::text(listing)
        .titled("📦 Pending Orders")
        .color(COLOR_PENDING)
        .footer(format!("Total: {} orders", orders.len()))
}

pub fn help(prefix: &str, brand: &str) -> Notice {
    Notice::text("Available commands:")
        .titled("🤖 Order Bot Help")
        .field(format!("{prefix}approved <order_id>"), "Approve an order and DM the buyer")
        .field(format!("{prefix}rejected <order_id>"), "Reject an order and DM the buyer")
        .field(format!("{prefix}dismiss <order_id>"), "Close an order silently")
        .field(format!("{prefix}orders"), "List all pending orders")
        .field(format!("{prefix}ping"), "Check bot latency")
        .field(format!("{prefix}help"), "Show this message")
        .color(COLOR_INFO)
        .footer(format!("{brand} - Order Management System"))
}

pub fn channel_redirect(order_channel: &str) -> Notice {
    Notice::text(format!("❌ Please use bot commands in <#{order_channel}>."))
}
