//! Decision witnesses and the volatile journal they are appended to
use super::types::TimeStamp;
use chrono::Utc;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Debug, PartialEq, Eq, minicbor::Encode, minicbor::Decode, Clone)]
pub struct Witness {
    #[n(0)]
    pub order_id: String,
    #[n(1)]
    pub actor_id: String, // the administrator who decided
    #[n(2)]
    pub decided_at: TimeStamp<Utc>,
    #[n(3)]
    pub witness_type: WitnessType,
}

#[derive(Debug, PartialEq, Eq, minicbor::Encode, minicbor::Decode, Clone, Copy)]
pub enum WitnessType {
    #[n(0)]
    Approve,
    #[n(1)]
    Reject,
    #[n(2)]
    Dismiss,
}

impl Witness {
    pub fn new(
        order_id: String,
        actor_id: String,
        decided_at: TimeStamp<Utc>,
        witness_type: WitnessType,
    ) -> Self {
        Self {
            order_id,
            actor_id,
            decided_at,
            witness_type,
        }
    }
    /// CBOR encoding of the witness and the sha256 digest of that encoding.
    pub fn build(&self) -> anyhow::Result<(String, Vec<u8>)> {
        let cbor = minicbor::to_vec(self)?;
        let hash = sha256::digest(&cbor);

        Ok((hash, cbor))
    }
}

/// Receipt of one accepted decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JournalEntry {
    pub digest: String,
    pub witness: Witness,
}

/// Append-only, in-memory record of decisions. Dropped on restart with the registry.
#[derive(Debug, Clone, Default)]
pub struct DecisionJournal {
    entries: Arc<Mutex<Vec<JournalEntry>>>,
}

impl DecisionJournal {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<JournalEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append and return the receipt digest.
    pub fn record(&self, witness: Witness) -> anyhow::Result<String> {
        let (digest, _) = witness.build()?;
        self.lock().push(JournalEntry {
            digest: digest.clone(),
            witness,
        });
        Ok(digest)
    }

    pub fn entries(&self) -> Vec<JournalEntry> {
        self.lock().clone()
    }

    pub fn for_order(&self, order_id: &str) -> Vec<JournalEntry> {
        self.lock()
            .iter()
            .filter(|entry| entry.witness.order_id == order_id)
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn witness_cbor_roundtrip_and_digest() {
        let witness = Witness::new(
            "ORD_1".into(),
            "admin".into(),
            TimeStamp::new(),
            WitnessType::Reject,
        );
        let (hash, cbor) = witness.build().unwrap();

        let decoded: Witness = minicbor::decode(&cbor).unwrap();
        assert_eq!(decoded, witness);
        assert_eq!(hash, sha256::digest(&cbor));
    }

    #[test]
    fn journal_keeps_append_order() {
        let journal = DecisionJournal::new();
        let at = TimeStamp::new();
        let first = journal
            .record(Witness::new("ORD_1".into(), "a".into(), at.clone(), WitnessType::Approve))
            .unwrap();
        journal
            .record(Witness::new("ORD_2".into(), "a".into(), at, WitnessType::Dismiss))
            .unwrap();

        let entries = journal.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].digest, first);
        assert_eq!(journal.for_order("ORD_2")[0].witness.witness_type, WitnessType::Dismiss);
    }
}
