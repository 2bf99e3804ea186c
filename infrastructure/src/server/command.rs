//! Launch configuration for the external tool-server.
//!
//! The full command vector comes from configuration — platform quirks
//! (e.g. a Windows shell wrapper) are resolved there, never inside the
//! transport. Credentials travel in the environment overlay only, so they
//! never show up in process listings.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Program, argument vector, and environment overlay for one tool-server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerCommand {
    /// Program name or path, resolved on `PATH`.
    pub program: String,
    /// Arguments passed verbatim.
    #[serde(default)]
    pub args: Vec<String>,
    /// Environment variables added on top of the inherited environment.
    #[serde(default)]
    pub env: BTreeMap<String, String>,
}

impl ServerCommand {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            env: BTreeMap::new(),
        }
    }

    /// Append an argument (builder style).
    pub fn with_arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Add an environment variable to the overlay.
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// Loggable rendering of the command line. The environment overlay is
    /// deliberately omitted — it may carry credentials.
    pub fn display_line(&self) -> String {
        let mut line = self.program.clone();
        for arg in &self.args {
            line.push(' ');
            line.push_str(arg);
        }
        line
    }
}
