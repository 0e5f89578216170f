use std::fmt;

/// What a request does to the resource, as far as token scopes are concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Read,
    Write,
    /// No scope is ever granted for this; kept so the request still gets a decision.
    Unknown,
}

impl Operation {
    /// Map the original HTTP method (as forwarded by the front-end) to an operation.
    pub fn from_method(method: &str) -> Self {
        match method {
            "GET" => Self::Read,
            "PUT" | "POST" | "DELETE" | "MKCOL" | "COPY" | "MOVE" => Self::Write,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Write => "write",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
