//! Pluggable sources of OAuth client id, secret, and audience.

// self
use crate::{_prelude::*, auth::ClientSecret, error::ConfigError};

/// Audience requested when no override is configured.
pub const DEFAULT_OAUTH_AUDIENCE: &str = "https://api.sypht.com";

/// Environment variable holding the OAuth client id.
pub const CLIENT_ID_VAR: &str = "OAUTH_CLIENT_ID";
/// Environment variable holding the OAuth client secret.
pub const CLIENT_SECRET_VAR: &str = "OAUTH_CLIENT_SECRET";
/// Environment variable holding a composite `id:secret` API key.
pub const API_KEY_VAR: &str = "SYPHT_API_KEY";
/// Environment variable overriding the OAuth audience.
pub const AUDIENCE_VAR: &str = "OAUTH_AUDIENCE";

/// Anything that can supply OAuth client credentials.
pub trait CredentialProvider
where
	Self: Send + Sync,
{
	/// OAuth client identifier.
	fn client_id(&self) -> &str;

	/// OAuth client secret.
	fn client_secret(&self) -> &ClientSecret;

	/// Audience requested in the client-credentials exchange.
	fn oauth_audience(&self) -> &str;
}

/// Immutable client id + secret pair with an optional audience override.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Credential {
	client_id: String,
	client_secret: ClientSecret,
	audience: Option<String>,
}
impl Credential {
	/// Creates a credential using the default audience.
	pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
		Self {
			client_id: client_id.into(),
			client_secret: ClientSecret::new(client_secret),
			audience: None,
		}
	}

	/// Overrides the audience; an empty value restores the default.
	pub fn set_oauth_audience(&mut self, audience: impl Into<String>) {
		let audience = audience.into();

		self.audience = (!audience.is_empty()).then_some(audience);
	}
}
impl CredentialProvider for Credential {
	fn client_id(&self) -> &str {
		&self.client_id
	}

	fn client_secret(&self) -> &ClientSecret {
		&self.client_secret
	}

	fn oauth_audience(&self) -> &str {
		self.audience.as_deref().unwrap_or(DEFAULT_OAUTH_AUDIENCE)
	}
}

/// Provider built from caller-supplied values.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BasicCredentialProvider(Credential);
impl BasicCredentialProvider {
	/// Creates a provider for the given client id and secret.
	pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
		Self(Credential::new(client_id, client_secret))
	}

	/// Overrides the audience in place.
	pub fn set_oauth_audience(&mut self, audience: impl Into<String>) {
		self.0.set_oauth_audience(audience);
	}

	/// Overrides the audience.
	pub fn with_oauth_audience(mut self, audience: impl Into<String>) -> Self {
		self.set_oauth_audience(audience);

		self
	}
}
impl CredentialProvider for BasicCredentialProvider {
	fn client_id(&self) -> &str {
		self.0.client_id()
	}

	fn client_secret(&self) -> &ClientSecret {
		self.0.client_secret()
	}

	fn oauth_audience(&self) -> &str {
		self.0.oauth_audience()
	}
}

/// Provider that reads `OAUTH_CLIENT_ID`, `OAUTH_CLIENT_SECRET`, `SYPHT_API_KEY`, and
/// `OAUTH_AUDIENCE` once at construction.
///
/// Each of the id and secret falls back independently to its half of `SYPHT_API_KEY`
/// (`id:secret`). Empty values count as unset.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EnvironmentCredentialProvider(Credential);
impl EnvironmentCredentialProvider {
	/// Reads credentials from the process environment.
	pub fn from_env() -> Result<Self, ConfigError> {
		Self::from_lookup(|key| std::env::var(key).ok())
	}

	/// Reads credentials through `lookup`, which maps a variable name to its value.
	pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
	where
		F: Fn(&str) -> Option<String>,
	{
		let get = |key: &str| lookup(key).filter(|value| !value.is_empty());
		let api_key = get(API_KEY_VAR);
		let (key_id, key_secret) = match api_key.as_deref().map(|key| key.split_once(':')) {
			Some(Some((id, secret))) => (Some(id.to_owned()), Some(secret.to_owned())),
			Some(None) => (api_key.clone(), None),
			None => (None, None),
		};
		let client_id = get(CLIENT_ID_VAR).or(key_id).filter(|value| !value.is_empty());
		let client_secret =
			get(CLIENT_SECRET_VAR).or(key_secret).filter(|value| !value.is_empty());
		let (Some(client_id), Some(client_secret)) = (client_id, client_secret) else {
			return Err(ConfigError::MissingCredentials);
		};
		let mut credential = Credential::new(client_id, client_secret);

		if let Some(audience) = get(AUDIENCE_VAR) {
			credential.set_oauth_audience(audience);
		}

		Ok(Self(credential))
	}

	/// Overrides the audience in place.
	pub fn set_oauth_audience(&mut self, audience: impl Into<String>) {
		self.0.set_oauth_audience(audience);
	}
}
impl CredentialProvider for EnvironmentCredentialProvider {
	fn client_id(&self) -> &str {
		self.0.client_id()
	}

	fn client_secret(&self) -> &ClientSecret {
		self.0.client_secret()
	}

	fn oauth_audience(&self) -> &str {
		self.0.oauth_audience()
	}
}

impl<P> CredentialProvider for Arc<P>
where
	P: ?Sized + CredentialProvider,
{
	fn client_id(&self) -> &str {
		(**self).client_id()
	}

	fn client_secret(&self) -> &ClientSecret {
		(**self).client_secret()
	}

	fn oauth_audience(&self) -> &str {
		(**self).oauth_audience()
	}
}

#[cfg(test)]
mod tests {
	// std
	use std::collections::HashMap;
	// self
	use super::*;

	fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
		let map: HashMap<String, String> =
			pairs.iter().map(|(k, v)| ((*k).to_owned(), (*v).to_owned())).collect();

		move |key| map.get(key).cloned()
	}

	#[test]
	fn api_key_is_split_into_id_and_secret() {
		let provider =
			EnvironmentCredentialProvider::from_lookup(env(&[("SYPHT_API_KEY", "abc:def")]))
				.expect("API key should yield credentials.");

		assert_eq!(provider.client_id(), "abc");
		assert_eq!(provider.client_secret().expose(), "def");
		assert_eq!(provider.oauth_audience(), DEFAULT_OAUTH_AUDIENCE);
	}

	#[test]
	fn explicit_variables_take_precedence() {
		let provider = EnvironmentCredentialProvider::from_lookup(env(&[
			("OAUTH_CLIENT_ID", "invalidClientId"),
			("OAUTH_CLIENT_SECRET", "invalidClientSecret"),
			("OAUTH_AUDIENCE", "invalidAudience"),
			("SYPHT_API_KEY", "abc:def"),
		]))
		.expect("Explicit variables should yield credentials.");

		assert_eq!(provider.client_id(), "invalidClientId");
		assert_eq!(provider.client_secret().expose(), "invalidClientSecret");
		assert_eq!(provider.oauth_audience(), "invalidAudience");
	}

	#[test]
	fn id_and_secret_fall_back_independently() {
		let provider = EnvironmentCredentialProvider::from_lookup(env(&[
			("OAUTH_CLIENT_ID", "explicit"),
			("SYPHT_API_KEY", "abc:def"),
		]))
		.expect("Mixed sources should yield credentials.");

		assert_eq!(provider.client_id(), "explicit");
		assert_eq!(provider.client_secret().expose(), "def");
	}

	#[test]
	fn missing_everything_is_a_config_error() {
		let err = EnvironmentCredentialProvider::from_lookup(env(&[]))
			.expect_err("Empty environment should fail.");

		assert!(matches!(err, ConfigError::MissingCredentials));
	}

	#[test]
	fn api_key_without_delimiter_lacks_secret() {
		let err =
			EnvironmentCredentialProvider::from_lookup(env(&[("SYPHT_API_KEY", "abcdef")]))
				.expect_err("Key without a secret should fail.");

		assert!(matches!(err, ConfigError::MissingCredentials));
	}

	#[test]
	fn basic_provider_audience_override() {
		let mut provider = BasicCredentialProvider::new("abc", "def");

		assert_eq!(provider.client_id(), "abc");
		assert_eq!(provider.client_secret().expose(), "def");
		assert_eq!(provider.oauth_audience(), DEFAULT_OAUTH_AUDIENCE);

		provider.set_oauth_audience("ghi");

		assert_eq!(provider.oauth_audience(), "ghi");

		provider.set_oauth_audience("");

		assert_eq!(provider.oauth_audience(), DEFAULT_OAUTH_AUDIENCE);
	}

	#[test]
	fn debug_output_redacts_secret() {
		let provider = BasicCredentialProvider::new("abc", "very-secret");

		assert!(!format!("{provider:?}").contains("very-secret"));
	}
}
