use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use serde_json::Value;

/// A piece of data a response context may or may not carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    Status,
    Headers,
    Body,
    ParsedBody,
    Timing,
}

impl Capability {
    pub fn as_str(self) -> &'static str {
        match self {
            Capability::Status => "status",
            Capability::Headers => "headers",
            Capability::Body => "body",
            Capability::ParsedBody => "parsed_body",
            Capability::Timing => "timing",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whatever a node's execution produced, as seen by extractors.
///
/// Accessors return `None` when the capability is absent; extractors are
/// expected to check [`has_capability`](Self::has_capability) first.
pub trait ResponseContext: Send + Sync {
    fn has_capability(&self, capability: Capability) -> bool;
    fn status(&self) -> Option<u16>;
    /// Case-insensitive lookup.
    fn header(&self, name: &str) -> Option<&str>;
    fn raw_body(&self) -> Option<&[u8]>;
    fn parsed_body(&self) -> Option<&Value>;
    fn duration(&self) -> Option<Duration> {
        None
    }
}

/// Response context assembled from an HTTP exchange. Each capability is
/// advertised only when its field is set.
#[derive(Debug, Clone, Default)]
pub struct HttpResponseContext {
    status: Option<u16>,
    headers: Option<BTreeMap<String, String>>,
    body: Option<Vec<u8>>,
    parsed_body: Option<Value>,
    duration: Option<Duration>,
}

impl HttpResponseContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_headers(mut self, headers: BTreeMap<String, String>) -> Self {
        self.headers = Some(headers);
        self
    }

    pub fn with_body(mut self, body: Vec<u8>) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_parsed_body(mut self, parsed: Value) -> Self {
        self.parsed_body = Some(parsed);
        self
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = Some(duration);
        self
    }
}

impl ResponseContext for HttpResponseContext {
    fn has_capability(&self, capability: Capability) -> bool {
        match capability {
            Capability::Status => self.status.is_some(),
            Capability::Headers => self.headers.is_some(),
            Capability::Body => self.body.is_some(),
            Capability::ParsedBody => self.parsed_body.is_some(),
            Capability::Timing => self.duration.is_some(),
        }
    }

    fn status(&self) -> Option<u16> {
        self.status
    }

    fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .as_ref()?
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    fn raw_body(&self) -> Option<&[u8]> {
        self.body.as_deref()
    }

    fn parsed_body(&self) -> Option<&Value> {
        self.parsed_body.as_ref()
    }

    fn duration(&self) -> Option<Duration> {
        self.duration
    }
}
