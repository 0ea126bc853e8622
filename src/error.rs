//! Pipeline-level error types shared across the fetch pipeline, transports, and signers.

// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Terminal outcome of a failed authorized fetch.
///
/// These are the only errors [`AuthorizedFetch::fetch`](crate::fetch::AuthorizedFetch::fetch)
/// produces. Each one is delivered to the caller exactly once and never alongside a result.
#[derive(Debug, ThisError)]
pub enum Error {
	/// No credential is present, or the request could not be bound to one.
	#[error("No token is available to authorize the request.")]
	TokenUnavailable,
	/// Transport failure (DNS, TCP, TLS, timeout, malformed response).
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// The token source confirmed the credential cannot be recovered; reauthenticate.
	#[error("Token expired and could not be refreshed.")]
	Unrecoverable,
}
impl Error {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn kind(&self) -> &'static str {
		match self {
			Self::TokenUnavailable => "token_unavailable",
			Self::Transport(_) => "transport",
			Self::Unrecoverable => "unrecoverable",
		}
	}
}
impl From<SignError> for Error {
	fn from(_: SignError) -> Self {
		Self::TokenUnavailable
	}
}

/// Configuration and validation failures raised while assembling a pipeline.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// A zero request timeout would fail every dispatch.
	#[error("Request timeout must be greater than zero.")]
	ZeroTimeout,
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

/// Transport-level failures (network, IO, protocol).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while dispatching the request.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// The request did not complete within the transport's deadline.
	#[error("Request timed out.")]
	Timeout {
		/// Transport-specific timeout error.
		#[source]
		source: BoxError,
	},
	/// The peer answered with something that is not a usable HTTP response.
	#[error("Response could not be read.")]
	InvalidResponse {
		/// Transport-specific decoding error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while dispatching the request.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}

	/// Wraps a transport-specific timeout error.
	pub fn timeout(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Timeout { source: Box::new(src) }
	}

	/// Wraps a response decoding error.
	pub fn invalid_response(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::InvalidResponse { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		if e.is_timeout() {
			Self::timeout(e)
		} else if e.is_body() || e.is_decode() {
			Self::invalid_response(e)
		} else {
			Self::network(e)
		}
	}
}

/// Failures raised while binding a token to a request.
#[derive(Debug, ThisError)]
pub enum SignError {
	/// The token cannot be encoded as a header value.
	#[error("Token cannot be encoded as an authorization header.")]
	InvalidHeader {
		/// Underlying header encoding failure.
		#[source]
		source: http::header::InvalidHeaderValue,
	},
}
impl From<http::header::InvalidHeaderValue> for SignError {
	fn from(source: http::header::InvalidHeaderValue) -> Self {
		Self::InvalidHeader { source }
	}
}
