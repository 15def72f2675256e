//! Storage Module
//!
//! Key placement and the node-local half of the replicated cache.
//!
//! ## Core Concepts
//! - **Slots**: Keys are hashed (xxHash64) into a fixed space of 1024 slots.
//! - **Placement**: A slot is reduced modulo the live-member count onto the sorted ring; the
//!   member at that index is the primary, the next one (wrapping) the secondary.
//! - **Local Store**: Whatever this node holds for the keys it is a replica of. Data is not
//!   migrated when membership changes; placement is simply recomputed from the current view.

pub mod memory;
pub mod partitioner;
