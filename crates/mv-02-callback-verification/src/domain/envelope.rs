//! The inbound signed request, detached from any HTTP framework.

/// A callback as received: request line, headers, and raw body bytes.
///
/// Built per request and dropped once the response is sent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallbackEnvelope {
    pub method: String,
    /// Path plus query string exactly as received
    pub path_and_query: String,
    /// Header pairs in arrival order; names compared case-insensitively
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl CallbackEnvelope {
    pub fn new(method: impl Into<String>, path_and_query: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            path_and_query: path_and_query.into(),
            ..Default::default()
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// All values for `name`, in arrival order.
    pub fn header_values<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.headers
            .iter()
            .filter(move |(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Values for `name` joined with `", "`, or `None` if absent.
    pub fn header(&self, name: &str) -> Option<String> {
        let values: Vec<&str> = self.header_values(name).map(str::trim).collect();
        if values.is_empty() {
            None
        } else {
            Some(values.join(", "))
        }
    }
}
