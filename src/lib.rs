//! # shiftlog-client
//!
//! Request orchestration layer for the shiftlog workforce API.
//!
//! Every page-level API wrapper sends through an
//! [`orchestrator::Orchestrator`], which derives a canonical request key,
//! suppresses duplicate in-flight GETs, injects auth and sandbox headers,
//! retries network failures and 5xx responses with linear backoff, and
//! normalizes every result into an [`model::Outcome`].

pub mod config;
pub mod error;
pub mod model;
pub mod orchestrator;
pub mod session;
pub mod telemetry;
pub mod transport;
