//! Membership Module
//!
//! Maintains this node's view of the live cluster.
//!
//! ## Core Mechanisms
//! - **Discovery**: An external facility (a load balancer's target health, or a static roster)
//!   reports which member identifiers are alive.
//! - **Inventory**: Each live identifier is resolved to a socket address once per refresh.
//! - **Snapshot Swap**: Every refresh builds a complete `MembershipView` and publishes it
//!   atomically; routing never observes a half-built ring.
//! - **Phase Alignment**: The first refresh waits for the next wall-clock minute, then repeats on
//!   a fixed interval, so all nodes change their view at about the same time.

pub mod discovery;
pub mod service;
pub mod types;
