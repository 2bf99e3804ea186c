//! GitHub domain client — typed operations over the tool-server transport.

mod canned;
pub mod client;

pub use client::{GitHubToolClient, ToolClientConfig, TransportMode};
