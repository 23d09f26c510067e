//! Heuristic extraction of order data from webhook embeds.
//!
//! The producer guarantees no field schema, so every lookup scans the fields
//! in order and the first qualifying field wins. Nothing here fails: a miss is
//! `None` (or the details sentinel).
use regex::Regex;
use std::sync::OnceLock;

use crate::types::{Embed, EmbedField, UNSPECIFIED_DETAILS};
use crate::utils::strip_code_spans;

static ORDER_ID_RE: OnceLock<Regex> = OnceLock::new();
static DETAILS_RE: OnceLock<Regex> = OnceLock::new();

fn order_id_re() -> &'static Regex {
    ORDER_ID_RE.get_or_init(|| Regex::new(r"ORD_[A-Za-z0-9_]+").unwrap())
}

fn details_re() -> &'static Regex {
    DETAILS_RE.get_or_init(|| Regex::new(r"(?i)\b(?:product|item|package)\s*:\s*([^\n]+)").unwrap())
}

/// Everything a single embed yields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extracted {
    pub order_id: Option<String>,
    pub requester_handle: Option<String>,
    pub order_details: String,
}

impl Extracted {
    /// Both the id and the requester are required before an order may be stored.
    pub fn into_parts(self) -> Option<(String, String, String)> {
        match (self.order_id, self.requester_handle) {
            (Some(id), Some(handle)) => Some((id, handle, self.order_details)),
            _ => None,
        }
    }
}

pub fn extract(embed: &Embed) -> Extracted {
    Extracted {
        order_id: extract_order_id(&embed.fields),
        requester_handle: extract_requester_handle(&embed.fields),
        order_details: extract_order_details(embed),
    }
}

pub fn extract_order_id(fields: &[EmbedField]) -> Option<String> {
    let by_value = fields
        .iter()
        .find_map(|field| order_id_re().find(&field.value))
        .map(|m| m.as_str().to_string());
    if by_value.is_some() {
        return by_value;
    }

    fields
        .iter()
        .filter(|field| is_order_id_name(&field.name))
        .map(|field| strip_code_spans(&field.value))
        .find(|value| !value.is_empty())
}

pub fn extract_requester_handle(fields: &[EmbedField]) -> Option<String> {
    let by_name = fields
        .iter()
        .filter(|field| is_requester_name(&field.name))
        .map(|field| strip_code_spans(&field.value))
        .find(|value| !value.is_empty());
    if by_name.is_some() {
        return by_name;
    }

    // legacy `name#discriminator` values
    fields
        .iter()
        .filter(|field| field.value.contains('#') || field.value.to_lowercase().contains("discord"))
        .map(|field| strip_code_spans(&field.value))
        .find(|value| !value.is_empty())
}

pub fn extract_order_details(embed: &Embed) -> String {
    let by_name = embed
        .fields
        .iter()
        .filter(|field| is_details_name(&field.name))
        .map(|field| strip_code_spans(&field.value))
        .find(|value| !value.is_empty());
    if let Some(details) = by_name {
        return details;
    }

    embed
        .description
        .as_deref()
        .and_then(details_from_description)
        .unwrap_or_else(|| UNSPECIFIED_DETAILS.to_string())
}

fn details_from_description(description: &str) -> Option<String> {
    let plain: String = description.chars().filter(|c| !matches!(c, '*' | '`')).collect();
    details_re()
        .captures(&plain)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|details| !details.is_empty())
}

fn is_order_id_name(name: &str) -> bool {
    name.contains("Order") || name.contains('🆔')
}

fn is_requester_name(name: &str) -> bool {
    let lower = name.to_lowercase();
    lower.contains("discord") || lower.contains("user") || name.contains('👤')
}

fn is_details_name(name: &str) -> bool {
    let lower = name.to_lowercase();
    lower.contains("product") || lower.contains("item") || lower.contains("package")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_is_cut_out_of_a_longer_value() {
        let embed = Embed::with_fields([("Reference", "paid via card, ref ORD_9x_Q1 ok")]);
        assert_eq!(extract(&embed).order_id.as_deref(), Some("ORD_9x_Q1"));
    }

    #[test]
    fn value_match_beats_an_earlier_order_named_field() {
        let embed = Embed::with_fields([
            ("Order Status", "pending"),
            ("Ref", "`ORD_77`"),
        ]);
        assert_eq!(extract_order_id(&embed.fields).as_deref(), Some("ORD_77"));
    }

    #[test]
    fn order_named_field_is_used_verbatim_without_token() {
        let embed = Embed::with_fields([("🆔 Order ID", " `12345` ")]);
        assert_eq!(extract_order_id(&embed.fields).as_deref(), Some("12345"));
    }

    #[test]
    fn requester_falls_back_to_discriminator_value() {
        let embed = Embed::with_fields([("Buyer", "`carol#4242`")]);
        assert_eq!(
            extract_requester_handle(&embed.fields).as_deref(),
            Some("carol#4242")
        );
    }

    #[test]
    fn requester_falls_back_to_value_mentioning_discord() {
        let embed = Embed::with_fields([("Price", "$5"), ("Contact", "DISCORD: erin")]);
        assert_eq!(
            extract_requester_handle(&embed.fields).as_deref(),
            Some("DISCORD: erin")
        );
        let (_, handle, _) = extract(&Embed::with_fields([
            ("Ref", "ORD_5"),
            ("Contact", "Discord: erin"),
        ]))
        .into_parts()
        .unwrap();
        assert_eq!(handle, "Discord: erin");
    }

    #[test]
    fn requester_named_field_wins_over_fallback() {
        let embed = Embed::with_fields([("Note", "ticket #5"), ("Username", "dave")]);
        assert_eq!(extract_requester_handle(&embed.fields).as_deref(), Some("dave"));
    }

    #[test]
    fn details_from_named_field() {
        let embed = Embed::with_fields([("📦 Package", "VIP Rank")]);
        assert_eq!(extract_order_details(&embed), "VIP Rank");
    }

    #[test]
    fn details_from_description_token() {
        let embed = Embed {
            description: Some("New purchase!\n**Product:** Diamond Kit\nThanks".into()),
            fields: vec![],
        };
        assert_eq!(extract_order_details(&embed), "Diamond Kit");
    }

    #[test]
    fn details_default_to_sentinel() {
        let embed = Embed::with_fields([("Price", "$5")]);
        assert_eq!(extract_order_details(&embed), UNSPECIFIED_DETAILS);
    }

    #[test]
    fn missing_requester_yields_no_parts() {
        let embed = Embed::with_fields([("Order ID", "ORD_1")]);
        assert!(extract(&embed).into_parts().is_none());
    }
}
