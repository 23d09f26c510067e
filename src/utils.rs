//! Identifier helpers

use bech32::Bech32m;
use uuid7::uuid7;

/// Human readable prefix carried by every decision id.
pub const DECISION_HRP: &str = "dec_";

/// Encode a fresh uuid7 with bech32m under the given human readable part.
pub fn new_uuid_to_bech32(hrp: &str) -> anyhow::Result<String> {
    let hrp = bech32::Hrp::parse(hrp)?;
    Ok(bech32::encode::<Bech32m>(hrp, uuid7().as_bytes())?)
}

/// Correlation id for a single decision, e.g. `dec_1qyq…`.
pub fn new_decision_id() -> anyhow::Result<String> {
    new_uuid_to_bech32(DECISION_HRP)
}

/// Remove markdown emphasis and code markers (`` ` * _ ~ | ``) and trim.
pub fn strip_markdown(value: &str) -> String {
    value
        .chars()
        .filter(|c| !matches!(c, '`' | '*' | '_' | '~' | '|'))
        .collect::<String>()
        .trim()
        .to_string()
}

/// Remove code-span markers only and trim.
pub fn strip_code_spans(value: &str) -> String {
    value.replace('`', "").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decision_ids_are_prefixed_and_unique() {
        let a = new_decision_id().unwrap();
        let b = new_decision_id().unwrap();
        assert!(a.starts_with("dec_1"));
        assert_ne!(a, b);
    }

    #[test]
    fn strip_markdown_removes_emphasis() {
        assert_eq!(strip_markdown(" **alice#0001** "), "alice#0001");
        assert_eq!(strip_markdown("`~bob~`"), "bob");
    }

    #[test]
    fn strip_code_spans_keeps_underscores() {
        assert_eq!(strip_code_spans(" `ORD_AB12` "), "ORD_AB12");
    }
}
