//! Client for the Control4 2-way web driver.
//!
//! The driver exposes proxy variables over a query-string RPC: every request
//! is an HTTP GET against a fixed base URL with `command`, `proxyID`,
//! `variableID` and (for writes) `newValue` merged into its query string.
//!
//! [`VariableClient::get`] reads a set of variables into a
//! [`VariableSnapshot`]; [`VariableClient::set`] writes a single variable.
//! Neither retries: retry policy belongs to whoever schedules the calls.

mod client;
mod endpoint;
mod error;
pub mod query;
mod snapshot;

pub use client::VariableClient;
pub use endpoint::DEFAULT_TIMEOUT;
pub use endpoint::Endpoint;
pub use error::Error;
pub use snapshot::VariableSnapshot;
