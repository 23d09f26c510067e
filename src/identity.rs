//! Resolve a free-text requester handle to an addressable platform user.
//!
//! Every call walks every member of every directory; there is no index or cache.
use tracing::{debug, warn};

use crate::gateway::ChatGateway;
use crate::types::{Identity, Member};
use crate::utils::strip_markdown;

/// Match a cleaned handle against one directory: tag first, then username,
/// then display name. Directory names get the same markdown stripping as the
/// handle; otherwise comparisons are exact and case-sensitive.
pub fn find_member<'a>(members: &'a [Member], handle: &str) -> Option<&'a Member> {
    let same = |name: &str| strip_markdown(name) == handle;
    members
        .iter()
        .find(|m| same(&m.tag))
        .or_else(|| members.iter().find(|m| same(&m.username)))
        .or_else(|| {
            members
                .iter()
                .find(|m| m.display_name.as_deref().is_some_and(same))
        })
}

/// First match across directories, in the platform's directory order. A
/// directory that fails to list is skipped.
pub async fn resolve_identity(gateway: &dyn ChatGateway, handle: &str) -> Option<Identity> {
    let cleaned = strip_markdown(handle);
    if cleaned.is_empty() {
        return None;
    }
    debug!(handle = %cleaned, "resolving requester");

    let directories = match gateway.directories().await {
        Ok(directories) => directories,
        Err(e) => {
            warn!(error = %e, "could not enumerate member directories");
            return None;
        }
    };

    for directory in directories {
        match gateway.members(&directory).await {
            Ok(members) => {
                if let Some(member) = find_member(&members, &cleaned) {
                    debug!(handle = %cleaned, user = %member.tag, "requester resolved");
                    return Some(Identity::from(member));
                }
            }
            Err(e) => warn!(directory = %directory, error = %e, "skipping member directory"),
        }
    }
    None
}
