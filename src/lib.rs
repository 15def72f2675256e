//! Replicated In-Memory Cache Node
//!
//! This library crate defines the modules that make up one node of a self-organizing cache
//! cluster. Every node runs the same code; any node can serve any key.
//! It serves as the foundation for the binary executable (`main.rs`).
//!
//! ## Architecture Modules
//! - **`membership`**: The live-member view. Polls an external discovery facility and an
//!   inventory, and publishes a sorted ring as an atomically swapped snapshot.
//! - **`storage`**: Key placement (hash slot → primary and secondary on the ring) and the
//!   process-local store holding this node's replicas.
//! - **`routing`**: The request state machine and HTTP surface. Decides, per request, whether to
//!   answer locally, ask the replicas, or sweep around the ring; relays between nodes.
//! - **`config`**: Command line and environment configuration.
//! - **`error`**: Client-facing and collaborator error types.

pub mod config;
pub mod error;
pub mod membership;
pub mod routing;
pub mod storage;
