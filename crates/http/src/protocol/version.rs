use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum HttpVersion {
    Http1_0,
    Http1_1,
    #[default]
    Unknown,
}

impl HttpVersion {
    pub fn from_token(token: &[u8]) -> Self {
        match token {
            b"HTTP/1.0" => Self::Http1_0,
            b"HTTP/1.1" => Self::Http1_1,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Http1_0 => "HTTP/1.0",
            Self::Http1_1 => "HTTP/1.1",
            Self::Unknown => "?",
        }
    }

    pub fn is_known(self) -> bool {
        self != Self::Unknown
    }
}

impl fmt::Display for HttpVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for HttpVersion {
    fn from(token: &str) -> Self {
        Self::from_token(token.as_bytes())
    }
}

impl TryFrom<HttpVersion> for http::Version {
    type Error = HttpVersion;

    fn try_from(version: HttpVersion) -> Result<Self, Self::Error> {
        match version {
            HttpVersion::Http1_0 => Ok(http::Version::HTTP_10),
            HttpVersion::Http1_1 => Ok(http::Version::HTTP_11),
            HttpVersion::Unknown => Err(version),
        }
    }
}
