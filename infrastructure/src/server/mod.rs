//! Tool-server transport — process lifecycle, wire codec, and timed I/O.
//!
//! The external tool-server is a child process speaking newline-delimited
//! JSON over its standard streams (one request line in, one response line
//! out). This module owns everything between "here is a [`ToolRequest`]"
//! and "here is a [`ToolResponse`]":
//!
//! - [`command`] — the configuration-supplied launch vector
//! - [`launcher`] — spawning with piped streams
//! - [`codec`] — request/response line encoding
//! - [`reader`] — deadline-bounded reads with a concurrent stderr drain
//! - [`session`] — the `NotStarted → Running → Stopped` session manager,
//!   with both persistent and one-shot exchange modes
//! - [`http`] — the HTTP-fronted variant of the same exchange
//!
//! [`ToolRequest`]: harvest_domain::ToolRequest
//! [`ToolResponse`]: harvest_domain::ToolResponse

pub mod codec;
pub mod command;
pub mod error;
pub mod http;
pub(crate) mod launcher;
pub(crate) mod reader;
pub mod session;
