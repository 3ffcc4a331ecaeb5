use axum::http::HeaderName;
use axum::http::request::Parts;
use std::fmt;
use tracing::debug;
use verneg_core::NegotiatedVersion;

/// Decides which version a request asks for.
///
/// Returning `None` means the strategy has no opinion; the response is still negotiated, with no
/// version, but never gets a `Vary` header. Route data is available through `parts.extensions`
/// (for example `axum::extract::MatchedPath`).
///
/// Any `Fn(&Parts) -> Option<NegotiatedVersion>` closure is a strategy.
pub trait VersionStrategy: Send + Sync + 'static {
    fn version(&self, parts: &Parts) -> Option<NegotiatedVersion>;
}

impl<F> VersionStrategy for F
where
    F: Fn(&Parts) -> Option<NegotiatedVersion> + Send + Sync + 'static,
{
    fn version(&self, parts: &Parts) -> Option<NegotiatedVersion> {
        self(parts)
    }
}

/// Reads the version from a request header such as `api-version: 2`, accepting an optional
/// `v` prefix.
///
/// The response always varies on the header. A missing or malformed value negotiates no
/// version, so the default mappers apply.
#[derive(Clone)]
pub struct HeaderStrategy {
    header: HeaderName,
}

impl HeaderStrategy {
    #[must_use]
    pub const fn new(header: HeaderName) -> Self {
        Self { header }
    }

    #[must_use]
    pub const fn header(&self) -> &HeaderName {
        &self.header
    }
}

impl VersionStrategy for HeaderStrategy {
    fn version(&self, parts: &Parts) -> Option<NegotiatedVersion> {
        let raw = parts.headers.get(&self.header).map(|value| value.to_str().map(str::trim));

        let version = match raw {
            None => None,
            Some(Ok(text)) => {
                let digits = text.strip_prefix(['v', 'V']).unwrap_or(text);
                digits.parse::<u32>().ok().or_else(|| {
                    debug!(header = %self.header, value = text, "Ignoring malformed version");
                    None
                })
            },
            Some(Err(_)) => {
                debug!(header = %self.header, "Ignoring non-ASCII version header");
                None
            },
        };

        Some(NegotiatedVersion::new(version).with_vary(self.header.as_str()))
    }
}

impl fmt::Debug for HeaderStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("HeaderStrategy").field(&self.header.as_str()).finish()
    }
}
