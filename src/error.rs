//! Client-level error types shared across credentials, login, uploads, and results.

// self
use crate::{_prelude::*, auth::TokenError};

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical client error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Transport failure (DNS, TCP, TLS, timeout).
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// Issued bearer token could not be decoded.
	#[error(transparent)]
	Token(#[from] TokenError),
	/// Token refresh failed; every caller waiting on that refresh shares this error.
	#[error(transparent)]
	Refresh(Arc<Error>),

	/// OAuth endpoint rejected the credentials or answered with an unusable body.
	#[error("Client didn't respond with appropriate result.")]
	Authentication {
		/// HTTP status code, when a response was received.
		status: Option<u16>,
	},
	/// Upload endpoint answered with a non-2xx status or an empty body.
	#[error("Sypht upload failed.")]
	Upload {
		/// HTTP status code returned by the upload endpoint.
		status: u16,
	},
	/// Result endpoint answered with a non-2xx status or an empty body.
	#[error("Sypht result fetch failed for fileId `{file_id}`.")]
	ResultFetch {
		/// File identifier whose prediction was requested.
		file_id: String,
		/// HTTP status code returned by the result endpoint.
		status: u16,
	},
	/// Endpoint answered with JSON that lacks the expected shape.
	#[error("The {endpoint} endpoint returned malformed JSON.")]
	MalformedResponse {
		/// Endpoint label (`upload`, `oauth`).
		endpoint: &'static str,
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
}
impl Error {
	/// Returns the underlying error, looking through a shared refresh failure.
	pub fn root(&self) -> &Error {
		match self {
			Self::Refresh(inner) => inner.root(),
			_ => self,
		}
	}

	/// Returns the HTTP status attached to the error, if any.
	pub fn status(&self) -> Option<u16> {
		match self.root() {
			Self::Authentication { status } => *status,
			Self::Upload { status } | Self::ResultFetch { status, .. } => Some(*status),
			_ => None,
		}
	}

	/// Reports whether repeating the same call might succeed.
	///
	/// The client never retries on its own; this is a hint for callers that do.
	pub fn is_retryable(&self) -> bool {
		match self.root() {
			Self::Transport(_) => true,
			root @ (Self::Authentication { .. } | Self::Upload { .. } | Self::ResultFetch { .. }) =>
				root.status().is_some_and(|status| status >= 500),
			_ => false,
		}
	}
}

/// Configuration and validation failures raised while building clients.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// Neither explicit values nor environment variables yielded a client id and secret.
	#[error(
		"SYPHT_API_KEY -OR- OAUTH_CLIENT_ID, OAUTH_CLIENT_SECRET environment variables must be set before running this process."
	)]
	MissingCredentials,
	/// An endpoint override is not a usable base URL.
	#[error("The {name} endpoint is invalid: {value}.")]
	InvalidEndpoint {
		/// Endpoint label (`auth`, `api`).
		name: &'static str,
		/// Offending value.
		value: String,
	},
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the Sypht API.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Local IO failure, such as reading an upload from disk.
	#[error("I/O error occurred while preparing a Sypht request.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}
impl From<ReqwestError> for Error {
	fn from(e: ReqwestError) -> Self {
		TransportError::from(e).into()
	}
}
impl From<std::io::Error> for Error {
	fn from(e: std::io::Error) -> Self {
		TransportError::from(e).into()
	}
}
