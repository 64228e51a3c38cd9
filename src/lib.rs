//! mqprobe: HTTP probe harness for a priority message store.
//!
//! The store itself is an external collaborator reachable only over
//! HTTP/JSON. This crate ships a typed client for its `/api` surface, a
//! sequential scenario suite asserting the client-observable contract,
//! and a CLI binary that drives either.

pub mod api;
pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod scenario;

pub use client::StoreClient;
pub use config::ProbeConfig;
pub use error::{ConfigError, ProbeError};
pub use scenario::{PriorityScope, ProbeSuite, SuiteReport};
