use crate::membership::types::{MembershipView, NodeId};
use std::hash::Hasher;
use twox_hash::XxHash64;

/// Size of the slot space keys are hashed into before being reduced onto the ring.
pub const NUM_SLOTS: u64 = 1024;

/// The two members designated to hold a key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplicaSet {
    pub primary: NodeId,
    pub secondary: NodeId,
}

/// Where a node stands relative to a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Primary,
    Secondary,
    Other,
}

impl ReplicaSet {
    /// A node that is both primary and secondary (single-member ring) is primary.
    pub fn role_of(&self, id: &NodeId) -> Role {
        if &self.primary == id {
            Role::Primary
        } else if &self.secondary == id {
            Role::Secondary
        } else {
            Role::Other
        }
    }

    pub fn is_single(&self) -> bool {
        self.primary == self.secondary
    }
}

/// xxHash64 (seed 0) of the UTF-8 key, folded into `0..NUM_SLOTS`.
pub fn key_slot(key: &str) -> u64 {
    let mut hasher = XxHash64::with_seed(0);
    hasher.write(key.as_bytes());
    hasher.finish() % NUM_SLOTS
}

/// Maps a key onto its primary and secondary replica.
///
/// `None` only for an empty view.
pub fn place(view: &MembershipView, key: &str) -> Option<ReplicaSet> {
    let members = view.members();
    if members.is_empty() {
        return None;
    }

    let slot = key_slot(key) as usize;
    let primary_idx = slot % members.len();
    let secondary_idx = (slot + 1) % members.len();

    Some(ReplicaSet {
        primary: members[primary_idx].clone(),
        secondary: members[secondary_idx].clone(),
    })
}
