//! Origin identity and same-origin checks.

use http::Uri;

/// Error type for origin parsing.
#[derive(Debug, thiserror::Error)]
pub enum OriginError {
    #[error("invalid origin url: {0}")]
    Invalid(String),

    #[error("unsupported scheme: {0}")]
    UnsupportedScheme(String),

    #[error("origin url has no host: {0}")]
    MissingHost(String),
}

/// Scheme + host + port identity of the hosting application.
///
/// A request is same-origin when its target shares all three components.
/// Relative URLs (no scheme, no authority) are same-origin by definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Origin {
    scheme: String,
    host: String,
    port: Option<u16>,
}

impl Origin {
    /// Create an origin from components.
    pub fn new(scheme: impl Into<String>, host: impl Into<String>, port: Option<u16>) -> Self {
        Self {
            scheme: scheme.into(),
            host: host.into(),
            port,
        }
    }

    /// Parse an origin from an absolute URL.
    pub fn parse(url: &str) -> Result<Self, OriginError> {
        let uri: Uri = url
            .parse()
            .map_err(|_| OriginError::Invalid(url.to_string()))?;

        let scheme = uri
            .scheme_str()
            .ok_or_else(|| OriginError::Invalid(url.to_string()))?;
        if scheme != "http" && scheme != "https" {
            return Err(OriginError::UnsupportedScheme(scheme.to_string()));
        }

        let host = uri
            .host()
            .ok_or_else(|| OriginError::MissingHost(url.to_string()))?;

        Ok(Self::new(scheme, host, uri.port_u16()))
    }

    /// Get the scheme.
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// Get the host.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Port in effect, falling back to the scheme default.
    fn effective_port(&self) -> u16 {
        self.port.unwrap_or_else(|| default_port(&self.scheme))
    }

    /// Check whether a request target belongs to this origin.
    pub fn contains(&self, uri: &Uri) -> bool {
        let Some(scheme) = uri.scheme_str() else {
            // Relative target, resolved against the hosting document.
            return uri.host().is_none();
        };

        let Some(host) = uri.host() else {
            return false;
        };

        scheme == self.scheme
            && host == self.host
            && uri.port_u16().unwrap_or_else(|| default_port(scheme)) == self.effective_port()
    }

    /// Absolute URL for a path under this origin.
    pub fn url_for(&self, path: &str) -> String {
        let sep = if path.starts_with('/') { "" } else { "/" };
        match self.port {
            Some(port) => format!("{}://{}:{}{}{}", self.scheme, self.host, port, sep, path),
            None => format!("{}://{}{}{}", self.scheme, self.host, sep, path),
        }
    }
}

impl std::fmt::Display for Origin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.port {
            Some(port) => write!(f, "{}://{}:{}", self.scheme, self.host, port),
            None => write!(f, "{}://{}", self.scheme, self.host),
        }
    }
}

fn default_port(scheme: &str) -> u16 {
    match scheme {
        "https" => 443,
        _ => 80,
    }
}
