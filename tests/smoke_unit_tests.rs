//! Smoke Screen Unit tests for order approval components
//!
//! These are unit tests that span the codebase, testing behavior in
//! isolation from the router scenarios. They are intended as a smoke screen
//! and generally test the happy path.
//!
#![allow(unused_imports)]

use chrono::{Datelike, Timelike, Utc};
use std::io::Write;
use order_approval::{
    config::load_directories,
    context::{DecisionJournal, Witness, WitnessType},
    error::ConfigError,
    extract::extract,
    notice,
    registry::OrderRegistry,
    types::{Embed, MessageRef, PendingOrder, TimeStamp, UNSPECIFIED_DETAILS},
    utils::new_uuid_to_bech32,
};

// UTILS MODULE TESTS
#[cfg(test)]
mod utils_tests {
    use super::*;

    /// Test that new_uuid_to_bech32 generates valid bech32-encoded strings
    /// with the correct human-readable prefix
    #[test]
    fn generates_valid_bech32_with_hrp() {
        let encoded = new_uuid_to_bech32("dec_").unwrap();
        assert!(encoded.starts_with("dec_1"));
        assert!(encoded.len() > 10);
    }

    /// Test that an empty prefix is rejected rather than producing a bare id
    #[test]
    fn handles_empty_hrp() {
        assert!(new_uuid_to_bech32("").is_err());
    }
}

// TYPES MODULE TESTS
#[cfg(test)]
mod types_tests {
    use super::*;

    /// Test that TimeStamp::new() creates a timestamp close to current time
    #[test]
    fn timestamp_new_creates_current_time() {
        let ts = TimeStamp::new();
        let diff = (Utc::now() - ts.to_datetime_utc()).num_seconds().abs();
        assert!(diff < 1);
    }

    /// Test that TimeStamp can be created with specific date/time values
    #[test]
    fn timestamp_new_with_creates_specific_time() {
        let dt = TimeStamp::new_with(2024, 6, 15, 10, 30, 0)
            .unwrap()
            .to_datetime_utc();
        assert_eq!(dt.year(), 2024);
        assert_eq!(dt.month(), 6);
        assert_eq!(dt.hour(), 10);
        assert_eq!(dt.minute(), 30);
    }

    /// Test that impossible dates are rejected instead of panicking
    #[test]
    fn timestamp_new_with_rejects_invalid_date() {
        assert!(TimeStamp::new_with(2024, 2, 30, 0, 0, 0).is_none());
    }

    /// Test that a webhook message decodes from its JSON line form
    #[test]
    fn inbound_message_decodes_with_defaults() {
        let line = r#"{
            "reference": {"channel_id": "orders", "message_id": "1"},
            "author": {"id": "9", "tag": "Store#0000", "is_bot": true, "webhook_id": "w"},
            "embeds": [{"fields": [{"name": "Order ID", "value": "ORD_1"}]}]
        }"#;
        let message: order_approval::types::InboundMessage = serde_json::from_str(line).unwrap();
        assert!(message.is_webhook());
        assert!(message.content.is_empty());
        assert_eq!(message.embeds[0].fields[0].value, "ORD_1");
    }
}

// EXTRACT MODULE TESTS
#[cfg(test)]
mod extract_tests {
    use super::*;

    /// Test the canonical store payload
    #[test]
    fn extracts_canonical_payload() {
        let embed = Embed::with_fields([
            ("🆔 Order ID", "`ORD_AB12`"),
            ("👤 Discord", "alice#0001"),
            ("📦 Product", "VIP Rank"),
        ]);
        let (id, handle, details) = extract(&embed).into_parts().unwrap();
        assert_eq!(id, "ORD_AB12");
        assert_eq!(handle, "alice#0001");
        assert_eq!(details, "VIP Rank");
    }

    /// Test that an empty embed yields nothing and never panics
    #[test]
    fn empty_embed_yields_nothing() {
        let extracted = extract(&Embed::default());
        assert!(extracted.order_id.is_none());
        assert!(extracted.requester_handle.is_none());
        assert_eq!(extracted.order_details, UNSPECIFIED_DETAILS);
    }
}

// REGISTRY MODULE TESTS
#[cfg(test)]
mod registry_tests {
    use super::*;

    fn order(id: &str) -> PendingOrder {
        PendingOrder::new(
            id.into(),
            "alice#0001".into(),
            UNSPECIFIED_DETAILS.into(),
            MessageRef::new("orders", id),
        )
    }

    /// Test the put / get / remove / size contract
    #[test]
    fn put_get_remove() {
        let registry = OrderRegistry::new();
        assert!(registry.put(order("ORD_1")).is_none());
        assert_eq!(registry.size(), 1);
        assert_eq!(registry.get("ORD_1").unwrap().requester_handle, "alice#0001");
        assert_eq!(registry.remove("ORD_1").unwrap().order_id, "ORD_1");
        assert_eq!(registry.size(), 0);
    }

    /// Test that a missing key is reported as absent, not as an error
    #[test]
    fn missing_key_is_none() {
        let registry = OrderRegistry::new();
        assert!(registry.get("ORD_404").is_none());
        assert!(registry.remove("ORD_404").is_none());
    }
}

// CONTEXT MODULE TESTS
#[cfg(test)]
mod context_tests {
    use super::*;

    /// Test that identical witnesses produce identical receipts
    #[test]
    fn identical_witnesses_share_a_digest() {
        let at = TimeStamp::new_with(2024, 6, 15, 10, 30, 0).unwrap();
        let a = Witness::new("ORD_1".into(), "admin".into(), at.clone(), WitnessType::Approve);
        let b = Witness::new("ORD_1".into(), "admin".into(), at, WitnessType::Approve);
        assert_eq!(a.build().unwrap().0, b.build().unwrap().0);
    }

    /// Test that the verdict is part of the receipt
    #[test]
    fn verdict_changes_the_digest() {
        let at = TimeStamp::new_with(2024, 6, 15, 10, 30, 0).unwrap();
        let a = Witness::new("ORD_1".into(), "admin".into(), at.clone(), WitnessType::Approve);
        let b = Witness::new("ORD_1".into(), "admin".into(), at, WitnessType::Dismiss);
        assert_ne!(a.build().unwrap().0, b.build().unwrap().0);
    }

    /// Test that the journal returns the digest it stored
    #[test]
    fn journal_records_receipts() {
        let journal = DecisionJournal::new();
        let witness = Witness::new("ORD_1".into(), "admin".into(), TimeStamp::new(), WitnessType::Reject);
        let digest = journal.record(witness.clone()).unwrap();
        assert_eq!(digest, witness.build().unwrap().0);
        assert_eq!(journal.entries()[0].digest, digest);
    }
}

// NOTICE MODULE TESTS
#[cfg(test)]
mod notice_tests {
    use super::*;

    /// Test that the approval DM carries id, status and time
    #[test]
    fn approved_dm_fields() {
        let dm = notice::approved_dm("ORD_1", &TimeStamp::new(), "Shop");
        assert_eq!(dm.field_value("🆔 Order ID"), Some("`ORD_1`"));
        assert_eq!(dm.field_value("⭐ Status"), Some("✅ Approved"));
        assert!(dm.field_value("⏰ Approved At").is_some());
    }

    /// Test that the help text lists every command under the configured prefix
    #[test]
    fn help_uses_prefix() {
        let help = notice::help("!", "Shop");
        for name in ["!approved <order_id>", "!rejected <order_id>", "!dismiss <order_id>", "!orders", "!ping", "!help"] {
            assert!(help.field_value(name).is_some(), "{name}");
        }
    }
}

// CONFIG MODULE TESTS
#[cfg(test)]
mod config_tests {
    use super::*;
    use tempfile::NamedTempFile;

    /// Test that member directories load from a JSON file
    #[test]
    fn loads_member_directories() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"id": "guild-1", "members": [{{"user_id": "1", "tag": "alice#0001", "username": "alice"}}]}}]"#
        )
        .unwrap();

        let directories = load_directories(file.path()).unwrap();
        assert_eq!(directories.len(), 1);
        assert_eq!(directories[0].members[0].tag, "alice#0001");
        assert!(directories[0].members[0].display_name.is_none());
    }

    /// Test that a malformed file is a configuration error
    #[test]
    fn rejects_malformed_members_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();

        assert!(matches!(
            load_directories(file.path()),
            Err(ConfigError::MembersJson { .. })
        ));
    }

    /// Test that a missing file is a configuration error
    #[test]
    fn rejects_missing_members_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            load_directories(&dir.path().join("absent.json")),
            Err(ConfigError::MembersFile { .. })
        ));
    }
}
