//! Transport primitives shared by the OAuth and API clients.
//!
//! Every client instance owns one [`HttpClient`]; reqwest pools connections inside it, so
//! concurrent uploads and result fetches reuse the same transport.

// std
use std::{ops::Deref, time::Duration as StdDuration};
// crates.io
use reqwest::Response;
// self
use crate::{_prelude::*, error::ConfigError};

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
///
/// Requests never follow redirects: the OAuth and API endpoints answer directly, and a
/// redirect would carry the bearer token to an unexpected host.
#[derive(Clone, Debug)]
pub struct HttpClient {
	client: ReqwestClient,
	timeout: Option<StdDuration>,
}
impl HttpClient {
	/// Wraps an existing reqwest [`ReqwestClient`]; its own timeouts stay in effect.
	pub fn with_client(client: ReqwestClient) -> Self {
		Self { client, timeout: None }
	}

	/// Builds a client that bounds connecting and each read of the response by `timeout`.
	///
	/// Slow but steady transfers, such as large uploads, are not cut off as a whole.
	pub fn with_timeout(timeout: StdDuration) -> Result<Self, ConfigError> {
		let client = ReqwestClient::builder()
			.connect_timeout(timeout)
			.read_timeout(timeout)
			.redirect(reqwest::redirect::Policy::none())
			.build()
			.map_err(ConfigError::http_client_build)?;

		Ok(Self { client, timeout: Some(timeout) })
	}

	/// Connect and read timeout applied by [`HttpClient::with_timeout`], if this client was
	/// built by it.
	pub fn timeout(&self) -> Option<StdDuration> {
		self.timeout
	}
}
impl AsRef<ReqwestClient> for HttpClient {
	fn as_ref(&self) -> &ReqwestClient {
		&self.client
	}
}
impl Deref for HttpClient {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.client
	}
}

/// Status plus fully buffered body of a completed exchange.
#[derive(Clone, Debug)]
pub(crate) struct BufferedResponse {
	pub(crate) status: StatusCode,
	pub(crate) body: String,
}
impl BufferedResponse {
	pub(crate) async fn read(response: Response) -> Result<Self> {
		let status = response.status();
		let body = response.text().await?;

		Ok(Self { status, body })
	}

	/// Returns the body of a 2xx response with content, or the status code otherwise.
	pub(crate) fn into_success_body(self) -> Result<String, u16> {
		if self.status.is_success() && !self.body.trim().is_empty() {
			Ok(self.body)
		} else {
			Err(self.status.as_u16())
		}
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn empty_success_body_is_rejected() {
		let response = BufferedResponse { status: StatusCode::OK, body: "  ".into() };

		assert_eq!(response.into_success_body(), Err(200));
	}

	#[test]
	fn error_status_is_rejected() {
		let response =
			BufferedResponse { status: StatusCode::UNAUTHORIZED, body: "{\"error\":1}".into() };

		assert_eq!(response.into_success_body(), Err(401));
	}

	#[test]
	fn success_body_is_returned() {
		let response = BufferedResponse { status: StatusCode::OK, body: "{}".into() };

		assert_eq!(response.into_success_body().as_deref(), Ok("{}"));
	}

	#[test]
	fn client_records_timeout() {
		let client =
			HttpClient::with_timeout(StdDuration::from_secs(45)).expect("Client should build.");

		assert_eq!(client.timeout(), Some(StdDuration::from_secs(45)));
		assert_eq!(HttpClient::with_client(ReqwestClient::new()).timeout(), None);
	}
}
