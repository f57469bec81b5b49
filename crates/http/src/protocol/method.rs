use std::fmt;

/// Request methods understood by the parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum HttpMethod {
    Get,
    Head,
    Post,
    Put,
    Delete,
    #[default]
    Unknown,
}

impl HttpMethod {
    /// Matches a request-line token exactly; anything else is `Unknown`.
    pub fn from_token(token: &[u8]) -> Self {
        match token {
            b"GET" => Self::Get,
            b"HEAD" => Self::Head,
            b"POST" => Self::Post,
            b"PUT" => Self::Put,
            b"DELETE" => Self::Delete,
            _ => Self::Unknown,
        }
    }

    /// The wire token, `"?"` for `Unknown`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Head => "HEAD",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
            Self::Unknown => "?",
        }
    }

    pub fn is_known(self) -> bool {
        self != Self::Unknown
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for HttpMethod {
    fn from(token: &str) -> Self {
        Self::from_token(token.as_bytes())
    }
}

/// Fails only for `Unknown`.
impl TryFrom<HttpMethod> for http::Method {
    type Error = HttpMethod;

    fn try_from(method: HttpMethod) -> Result<Self, Self::Error> {
        match method {
            HttpMethod::Get => Ok(http::Method::GET),
            HttpMethod::Head => Ok(http::Method::HEAD),
            HttpMethod::Post => Ok(http::Method::POST),
            HttpMethod::Put => Ok(http::Method::PUT),
            HttpMethod::Delete => Ok(http::Method::DELETE),
            HttpMethod::Unknown => Err(method),
        }
    }
}
