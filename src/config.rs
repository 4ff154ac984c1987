//! Client configuration: endpoints and request timeout policy.
//!
//! Configuration is an explicit value handed to constructors. [`ClientConfig::from_env`] reads
//! the process environment once; [`ClientConfig::from_lookup`] reads through any lookup
//! function, which keeps tests free of global state.

// std
use std::time::Duration as StdDuration;
// self
use crate::{_prelude::*, error::ConfigError};

/// Default OAuth token endpoint.
pub const DEFAULT_AUTH_ENDPOINT: &str = "https://login.sypht.com/oauth/token";
/// Default API base endpoint.
pub const DEFAULT_API_ENDPOINT: &str = "https://api.sypht.com";
/// Default request timeout; also the lowest accepted value.
pub const DEFAULT_REQUEST_TIMEOUT: StdDuration = StdDuration::from_secs(30);

/// Environment variable holding the request timeout in seconds.
pub const REQUEST_TIMEOUT_VAR: &str = "REQUEST_TIMEOUT";
/// Environment variable overriding the OAuth token endpoint.
pub const AUTH_ENDPOINT_VAR: &str = "SYPHT_AUTH_ENDPOINT";
/// Environment variable overriding the API base endpoint.
pub const API_ENDPOINT_VAR: &str = "SYPHT_API_ENDPOINT";

/// Endpoints and timeout shared by the OAuth and API clients.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientConfig {
	/// OAuth token endpoint receiving client-credentials exchanges.
	pub auth_endpoint: Url,
	/// Base URL for `fileupload` and `result/final/<fileId>`.
	pub api_endpoint: Url,
	request_timeout: StdDuration,
}
impl ClientConfig {
	/// Returns a builder seeded with the public Sypht endpoints.
	pub fn builder() -> ClientConfigBuilder {
		ClientConfigBuilder::default()
	}

	/// Reads overrides from the process environment.
	pub fn from_env() -> Result<Self, ConfigError> {
		Self::from_lookup(|key| std::env::var(key).ok())
	}

	/// Reads overrides through `lookup`, which maps a variable name to its value.
	///
	/// Non-numeric or too-small `REQUEST_TIMEOUT` values leave the 30 second default in place.
	pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
	where
		F: Fn(&str) -> Option<String>,
	{
		let mut builder = Self::builder();

		if let Some(raw) = lookup(AUTH_ENDPOINT_VAR).filter(|value| !value.is_empty()) {
			builder = builder.auth_endpoint(parse_endpoint("auth", &raw)?);
		}
		if let Some(raw) = lookup(API_ENDPOINT_VAR).filter(|value| !value.is_empty()) {
			builder = builder.api_endpoint(parse_endpoint("api", &raw)?);
		}
		if let Some(secs) = lookup(REQUEST_TIMEOUT_VAR).and_then(|raw| raw.trim().parse().ok()) {
			builder = builder.request_timeout(StdDuration::from_secs(secs));
		}

		Ok(builder.build())
	}

	/// Timeout applied to connect, read, and write phases of every request.
	pub fn request_timeout(&self) -> StdDuration {
		self.request_timeout
	}

	/// Replaces the timeout, clamping values below [`DEFAULT_REQUEST_TIMEOUT`].
	pub fn with_request_timeout(mut self, timeout: StdDuration) -> Self {
		self.request_timeout = clamp_timeout(timeout);

		self
	}

	/// Builds an API URL by appending path segments to [`ClientConfig::api_endpoint`].
	pub fn api_url<'a, I>(&self, segments: I) -> Result<Url, ConfigError>
	where
		I: IntoIterator<Item = &'a str>,
	{
		let mut url = self.api_endpoint.clone();

		url.path_segments_mut()
			.map_err(|_| ConfigError::InvalidEndpoint {
				name: "api",
				value: self.api_endpoint.to_string(),
			})?
			.pop_if_empty()
			.extend(segments);

		Ok(url)
	}
}
impl Default for ClientConfig {
	fn default() -> Self {
		Self::builder().build()
	}
}

/// Builder for [`ClientConfig`] values.
#[derive(Debug)]
pub struct ClientConfigBuilder {
	auth_endpoint: Url,
	api_endpoint: Url,
	request_timeout: StdDuration,
}
impl ClientConfigBuilder {
	/// Overrides the OAuth token endpoint.
	pub fn auth_endpoint(mut self, url: Url) -> Self {
		self.auth_endpoint = url;

		self
	}

	/// Overrides the API base endpoint.
	pub fn api_endpoint(mut self, url: Url) -> Self {
		self.api_endpoint = url;

		self
	}

	/// Overrides the request timeout; values below 30 seconds are clamped up.
	pub fn request_timeout(mut self, timeout: StdDuration) -> Self {
		self.request_timeout = clamp_timeout(timeout);

		self
	}

	/// Finalizes the configuration.
	pub fn build(self) -> ClientConfig {
		ClientConfig {
			auth_endpoint: self.auth_endpoint,
			api_endpoint: self.api_endpoint,
			request_timeout: self.request_timeout,
		}
	}
}
impl Default for ClientConfigBuilder {
	fn default() -> Self {
		Self {
			auth_endpoint: Url::parse(DEFAULT_AUTH_ENDPOINT)
				.expect("Default auth endpoint must parse."),
			api_endpoint: Url::parse(DEFAULT_API_ENDPOINT)
				.expect("Default API endpoint must parse."),
			request_timeout: DEFAULT_REQUEST_TIMEOUT,
		}
	}
}

fn clamp_timeout(timeout: StdDuration) -> StdDuration {
	timeout.max(DEFAULT_REQUEST_TIMEOUT)
}

fn parse_endpoint(name: &'static str, raw: &str) -> Result<Url, ConfigError> {
	let url = Url::parse(raw)
		.map_err(|_| ConfigError::InvalidEndpoint { name, value: raw.to_owned() })?;

	if url.cannot_be_a_base() {
		return Err(ConfigError::InvalidEndpoint { name, value: raw.to_owned() });
	}

	Ok(url)
}
