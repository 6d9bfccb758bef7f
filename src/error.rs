//! Gate-level error types shared across the permit pool, credential renewal, and submissions.

// self
use crate::{_prelude::*, http::Endpoint};

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical gate error exposed by public APIs.
///
/// Business failures reported by the registry inside a well-formed submission response are not
/// errors; they travel back as fields of [`SubmissionResponse`](crate::gate::SubmissionResponse).
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Transport failure (DNS, TCP, TLS).
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// Registry answered with a body that could not be decoded.
	#[error(transparent)]
	Decode(#[from] DecodeError),
	/// Injected challenge signer failed.
	#[error(transparent)]
	Signing(#[from] crate::auth::SigningError),

	/// Document could not be serialized before submission.
	#[error("Document could not be encoded as JSON.")]
	Encode {
		/// Underlying serializer failure.
		#[source]
		source: serde_json::Error,
	},
	/// Token endpoint refused to issue a credential for the signed challenge.
	#[error("Token endpoint refused the signed challenge: {reason}.")]
	TokenRejected {
		/// HTTP status code returned by the token endpoint.
		status: u16,
		/// Registry-supplied error code, when present.
		code: Option<String>,
		/// Registry- or gate-supplied reason string.
		reason: String,
	},
	/// A renewal this call queued behind failed; the leading caller received the full error.
	#[error("Credential renewal shared with a concurrent caller failed: {reason}")]
	RenewalFailed {
		/// Rendered error of the failed renewal.
		reason: String,
	},
	/// Caller interrupted the wait for a permit.
	#[error("Permit acquisition was cancelled.")]
	Cancelled,
	/// The gate was shut down.
	#[error("The gate has been shut down.")]
	Closed,
}

/// Configuration and validation failures raised at construction time.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// Request limit must allow at least one request per window.
	#[error("The request limit must be a positive number.")]
	NonPositiveRequestLimit,
	/// Window must span a positive amount of time.
	#[error("The replenishment window must be positive.")]
	NonPositiveWindow,
	/// Credentials must live for a positive amount of time.
	#[error("The credential lifetime must be positive.")]
	NonPositiveCredentialLifetime,
	/// Refresh margin is negative or swallows the whole credential lifetime.
	#[error("The refresh margin must be non-negative and shorter than the credential lifetime.")]
	InvalidRefreshMargin,
	/// Registry base URL cannot be joined with the endpoint paths.
	#[error("Registry base URL is invalid.")]
	InvalidBaseUrl {
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Endpoints must use HTTPS.
	#[error("The {endpoint} endpoint must use HTTPS: {url}.")]
	InsecureEndpoint {
		/// Which endpoint failed validation.
		endpoint: Endpoint,
		/// Endpoint URL that failed validation.
		url: String,
	},
	/// The replenishment ticker needs a running tokio runtime.
	#[error("A tokio runtime is required to drive permit replenishment.")]
	RuntimeUnavailable,
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the {endpoint} endpoint.")]
	Network {
		/// Registry endpoint being called.
		endpoint: Endpoint,
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the registry.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error raised while calling `endpoint`.
	pub fn network(
		endpoint: Endpoint,
		src: impl 'static + Send + Sync + std::error::Error,
	) -> Self {
		Self::Network { endpoint, source: Box::new(src) }
	}
}

/// Registry response body could not be decoded into the expected structure.
#[derive(Debug, ThisError)]
#[error("The {endpoint} endpoint returned a malformed response (HTTP {status}).")]
pub struct DecodeError {
	/// Registry endpoint that produced the body.
	pub endpoint: Endpoint,
	/// HTTP status code attached to the body.
	pub status: u16,
	/// Structured parsing failure, including the JSON path.
	#[source]
	pub source: serde_path_to_error::Error<serde_json::Error>,
}
