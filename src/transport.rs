//! Blocking HTTP transport used to download lists.

use once_cell::sync::Lazy;
use std::io::Read;
use std::time::Duration;

use crate::{Error, Result};

/// User agent sent when none is configured.
pub const DEFAULT_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Shared agent for transports created without custom settings.
static DEFAULT_AGENT: Lazy<ureq::Agent> = Lazy::new(|| build_agent(None, None));

/// Status and body of a completed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub body: Vec<u8>,
}

impl Response {
    /// Whether the status is in the 2xx range.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Source of remote list payloads.
///
/// Implementations return `Ok` with the status for any answer the server
/// gave, success or not, and `Err(Error::Fetch)` when no answer could be
/// obtained or its body could not be read.
pub trait Transport: Send + Sync {
    fn get(&self, url: &str) -> Result<Response>;
}

/// [`Transport`] backed by a blocking `ureq` agent.
///
/// Gzip content-encoding is negotiated transparently. No timeout is set
/// unless [`with_timeout`](Self::with_timeout) is called.
#[derive(Clone)]
pub struct HttpTransport {
    agent: ureq::Agent,
    timeout: Option<Duration>,
    user_agent: Option<String>,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self {
            agent: DEFAULT_AGENT.clone(),
            timeout: None,
            user_agent: None,
        }
    }

    /// Set an overall timeout for each request.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self.agent = build_agent(self.timeout, self.user_agent.as_deref());
        self
    }

    /// Set the `User-Agent` header.
    pub fn with_user_agent(mut self, user_agent: &str) -> Self {
        self.user_agent = Some(user_agent.to_string());
        self.agent = build_agent(self.timeout, self.user_agent.as_deref());
        self
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub fn user_agent(&self) -> &str {
        self.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT)
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for HttpTransport {
    fn get(&self, url: &str) -> Result<Response> {
        let response = match self.agent.get(url).call() {
            Ok(response) => response,
            // ureq reports 4xx/5xx as errors; hand the status back to the caller
            Err(ureq::Error::Status(status, _)) => {
                return Ok(Response {
                    status,
                    body: Vec::new(),
                })
            }
            Err(ureq::Error::Transport(t)) => return Err(Error::Fetch(t.to_string())),
        };

        let status = response.status();
        let mut body = Vec::new();
        response
            .into_reader()
            .read_to_end(&mut body)
            .map_err(|e| Error::Fetch(format!("could not read response: {}", e)))?;

        Ok(Response { status, body })
    }
}

fn build_agent(timeout: Option<Duration>, user_agent: Option<&str>) -> ureq::Agent {
    let mut builder =
        ureq::AgentBuilder::new().user_agent(user_agent.unwrap_or(DEFAULT_USER_AGENT));
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }
    builder.build()
}
