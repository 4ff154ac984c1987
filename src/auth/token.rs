//! Bearer tokens and unverified JWT claim decoding.
//!
//! Tokens come straight from the trusted OAuth endpoint, so only the header and the `exp` claim
//! are read; the signature segment is never checked.

// crates.io
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
// self
use crate::{_prelude::*, auth::TokenSecret};

/// Margin subtracted from a token's real expiry before it is considered stale.
pub const GRACE_PERIOD: Duration = Duration::minutes(10);

/// Failures raised while decoding an issued JWT.
#[derive(Debug, ThisError)]
pub enum TokenError {
	/// Token does not have the `header.payload.signature` shape.
	#[error("Bearer token must have three dot-separated segments, found {segments}.")]
	Malformed {
		/// Number of segments observed.
		segments: usize,
	},
	/// A segment is not valid base64url.
	#[error("Bearer token {segment} segment is not valid base64url.")]
	Base64 {
		/// Segment label (`header`, `payload`).
		segment: &'static str,
		/// Underlying decoding failure.
		#[source]
		source: base64::DecodeError,
	},
	/// A segment does not hold the expected JSON object.
	#[error("Bearer token {segment} segment is not the expected JSON object.")]
	Json {
		/// Segment label (`header`, `payload`).
		segment: &'static str,
		/// Underlying parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// The `exp` claim cannot be represented as an instant.
	#[error("Bearer token exp claim {exp} is out of range.")]
	ExpiryOutOfRange {
		/// Raw claim value in seconds since the Unix epoch.
		exp: i64,
	},
}

/// Decoded JOSE header of a bearer token.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct TokenHeader {
	/// Signing algorithm, e.g. `RS256`.
	pub alg: String,
	/// Media type, usually `JWT`.
	#[serde(default)]
	pub typ: Option<String>,
	/// Signing key identifier.
	#[serde(default)]
	pub kid: Option<String>,
}

#[derive(Deserialize)]
struct ExpiryClaims {
	exp: i64,
}

/// Signed JWT plus the expiry read from its unverified payload.
#[derive(Clone, Debug)]
pub struct BearerToken {
	secret: TokenSecret,
	header: TokenHeader,
	expires_at: OffsetDateTime,
}
impl BearerToken {
	/// Decodes `raw` without verifying its signature.
	pub fn decode(raw: impl Into<String>) -> Result<Self, TokenError> {
		let raw = raw.into();
		let segments = raw.split('.').collect::<Vec<_>>();
		let [header, payload, _signature] = segments.as_slice() else {
			return Err(TokenError::Malformed { segments: segments.len() });
		};
		let header = decode_segment::<TokenHeader>("header", header)?;
		let claims = decode_segment::<ExpiryClaims>("payload", payload)?;
		let expires_at = OffsetDateTime::from_unix_timestamp(claims.exp)
			.map_err(|_| TokenError::ExpiryOutOfRange { exp: claims.exp })?;

		Ok(Self { secret: TokenSecret::new(raw), header, expires_at })
	}

	/// Raw token value for `Authorization` headers.
	pub fn secret(&self) -> &TokenSecret {
		&self.secret
	}

	/// Decoded JOSE header.
	pub fn header(&self) -> &TokenHeader {
		&self.header
	}

	/// Instant taken from the `exp` claim.
	pub fn expires_at(&self) -> OffsetDateTime {
		self.expires_at
	}

	/// Expiry minus [`GRACE_PERIOD`]; the token is reused only before this instant.
	pub fn effective_expiry(&self) -> OffsetDateTime {
		self.expires_at - GRACE_PERIOD
	}

	/// Whether the token may still be reused at `now`.
	pub fn is_fresh_at(&self, now: OffsetDateTime) -> bool {
		now < self.effective_expiry()
	}
}
impl PartialEq for BearerToken {
	fn eq(&self, other: &Self) -> bool {
		self.secret == other.secret
	}
}
impl Eq for BearerToken {}

fn decode_segment<T>(segment: &'static str, encoded: &str) -> Result<T, TokenError>
where
	T: for<'de> Deserialize<'de>,
{
	let bytes = URL_SAFE_NO_PAD
		.decode(encoded.trim_end_matches('='))
		.map_err(|source| TokenError::Base64 { segment, source })?;
	let mut de = serde_json::Deserializer::from_slice(&bytes);

	serde_path_to_error::deserialize(&mut de).map_err(|source| TokenError::Json { segment, source })
}
