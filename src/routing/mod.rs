//! Routing Module
//!
//! Turns any node into an entry point for the whole cache.
//!
//! ## Request Flow
//! - **Classification**: For every request the node computes the key's replicas from its current
//!   membership view and decides whether it is the primary, the secondary, or neither.
//! - **Relay Flag**: Requests forwarded between nodes carry `relayed=true`, which stops a replica
//!   from fanning the request out again.
//! - **Fallbacks**: Reads fall back from one replica to the other and, as a last resort, sweep
//!   forward around the ring with a bounded hop count. Writes go to both replicas and succeed if
//!   either accepted them.
//! - **Failure Absorption**: The relay client turns unreachable peers into "no data" or a failed
//!   write; nothing is retried.

pub mod handlers;
pub mod protocol;
pub mod relay;
pub mod router;

#[cfg(test)]
mod tests;
