//! Authorized upload and result calls against the Sypht API.

pub mod upload;

pub use upload::*;

// crates.io
use reqwest::{RequestBuilder, header::AUTHORIZATION};
// self
use crate::{
	_prelude::*,
	auth::{BearerToken, CredentialProvider, EnvironmentCredentialProvider},
	cache::TokenCache,
	config::ClientConfig,
	http::{BufferedResponse, HttpClient},
	oauth::{self, OAuthClient},
	obs::{self, OpKind},
};

/// Header the API reads to negotiate the response type.
pub const ACCEPTS_HEADER: &str = "Accepts";

/// Identifier returned by the upload endpoint.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileId(String);
impl FileId {
	/// Wraps an identifier received elsewhere.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Returns the identifier as a string slice.
	pub fn as_str(&self) -> &str {
		&self.0
	}
}
impl AsRef<str> for FileId {
	fn as_ref(&self) -> &str {
		self.as_str()
	}
}
impl Display for FileId {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.0)
	}
}

#[derive(Deserialize)]
struct UploadResponse {
	#[serde(rename = "fileId")]
	file_id: FileId,
}

/// Client for the Sypht API that manages bearer tokens automatically.
///
/// Clones share the token cache and transport, so one client can serve many tasks.
#[derive(Clone)]
pub struct SyphtClient {
	config: ClientConfig,
	http_client: HttpClient,
	oauth: OAuthClient,
	tokens: Arc<TokenCache>,
}
impl SyphtClient {
	/// Creates a client for `config` that logs in with `credentials`.
	pub fn new(config: ClientConfig, credentials: impl CredentialProvider + 'static) -> Result<Self> {
		let http_client = HttpClient::with_timeout(config.request_timeout())?;

		Ok(Self::with_http_client(config, Arc::new(credentials), http_client))
	}

	/// Creates a client from `REQUEST_TIMEOUT`, endpoint overrides, and environment credentials.
	pub fn from_env() -> Result<Self> {
		Self::new(ClientConfig::from_env()?, EnvironmentCredentialProvider::from_env()?)
	}

	/// Creates a client that starts with a caller-supplied bearer token.
	///
	/// The token is reused until its effective expiry; later lookups log in with `credentials`.
	pub fn with_bearer_token(
		config: ClientConfig,
		credentials: impl CredentialProvider + 'static,
		bearer_token: impl Into<String>,
	) -> Result<Self> {
		let token = BearerToken::decode(bearer_token)?;
		let mut client = Self::new(config, credentials)?;

		client.tokens = Arc::new(TokenCache::seeded(token));

		Ok(client)
	}

	/// Creates a client that reuses the caller-provided transport for logins and API calls.
	pub fn with_http_client(
		config: ClientConfig,
		credentials: Arc<dyn CredentialProvider>,
		http_client: HttpClient,
	) -> Self {
		let oauth = OAuthClient::with_http_client(&config, credentials, http_client.clone());

		Self { config, http_client, oauth, tokens: Default::default() }
	}

	/// Configuration this client was built with.
	pub fn config(&self) -> &ClientConfig {
		&self.config
	}

	/// Transport used for upload and result calls.
	pub fn http_client(&self) -> &HttpClient {
		&self.http_client
	}

	/// OAuth client used for token refreshes.
	pub fn oauth(&self) -> &OAuthClient {
		&self.oauth
	}

	/// Token cache shared by every clone of this client.
	pub fn token_cache(&self) -> &TokenCache {
		&self.tokens
	}

	/// Returns a bearer token that is valid now, logging in first when needed.
	pub async fn bearer_token(&self) -> Result<BearerToken> {
		self.tokens.get_valid_token(&self.oauth).await
	}

	/// Uploads `file` for extraction and returns the service-assigned file id.
	pub async fn upload(&self, file: UploadFile, options: &UploadOptions) -> Result<FileId> {
		obs::observe(OpKind::Upload, "upload", async move {
			let url = self.config.api_url(["fileupload"])?;
			let form = upload::build_form(file, options)?;
			let request = self.authorized(self.http_client.post(url)).await?.multipart(form);
			let response = BufferedResponse::read(request.send().await?).await?;
			let body = response.into_success_body().map_err(|status| Error::Upload { status })?;
			let parsed: UploadResponse = oauth::parse_json(&body)
				.map_err(|source| Error::MalformedResponse { endpoint: "upload", source })?;

			#[cfg(feature = "tracing")]
			tracing::info!(file_id = %parsed.file_id, "Sypht file upload successful.");

			Ok(parsed.file_id)
		})
		.await
	}

	/// Fetches the final prediction for `file_id` as an unparsed JSON string.
	pub async fn result(&self, file_id: impl AsRef<str>) -> Result<String> {
		let file_id = file_id.as_ref();

		obs::observe(OpKind::Result, "result", async move {
			let url = self.config.api_url(["result", "final", file_id])?;
			let request = self.authorized(self.http_client.get(url)).await?;
			let response = BufferedResponse::read(request.send().await?).await?;
			let body = response.into_success_body().map_err(|status| Error::ResultFetch {
				file_id: file_id.to_owned(),
				status,
			})?;

			#[cfg(feature = "tracing")]
			tracing::info!(file_id, "Sypht results successfully fetched.");

			Ok(body)
		})
		.await
	}

	async fn authorized(&self, request: RequestBuilder) -> Result<RequestBuilder> {
		let token = self.bearer_token().await?;

		Ok(request
			.header(ACCEPTS_HEADER, "application/json")
			.header(AUTHORIZATION, format!("Bearer {}", token.secret().expose())))
	}
}
impl Debug for SyphtClient {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("SyphtClient")
			.field("config", &self.config)
			.field("oauth", &self.oauth)
			.finish()
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::auth::BasicCredentialProvider;

	#[test]
	fn file_id_serializes_transparently() {
		let parsed: UploadResponse =
			serde_json::from_str("{\"fileId\":\"f123\"}").expect("Upload body should parse.");

		assert_eq!(parsed.file_id, FileId::new("f123"));
		assert_eq!(parsed.file_id.to_string(), "f123");
	}

	#[test]
	fn invalid_seed_token_is_rejected() {
		let err = SyphtClient::with_bearer_token(
			ClientConfig::default(),
			BasicCredentialProvider::new("abc", "def"),
			"not-a-jwt",
		)
		.expect_err("Seed token without segments should fail.");

		assert!(matches!(err, Error::Token(_)));
	}

	#[test]
	fn short_request_timeout_is_raised_on_both_transports() {
		let config = ClientConfig::from_lookup(|key| {
			(key == crate::config::REQUEST_TIMEOUT_VAR).then(|| "5".to_owned())
		})
		.expect("Config should load.");
		let client = SyphtClient::new(config, BasicCredentialProvider::new("abc", "def"))
			.expect("Client should build.");
		let floor = Some(std::time::Duration::from_secs(30));

		assert_eq!(client.http_client().timeout(), floor);
		assert_eq!(client.oauth().http_client().timeout(), floor);
	}

	#[test]
	fn clones_share_token_cache() {
		let client =
			SyphtClient::new(ClientConfig::default(), BasicCredentialProvider::new("abc", "def"))
				.expect("Client should build.");
		let clone = client.clone();

		assert!(std::ptr::eq(client.token_cache(), clone.token_cache()));
	}
}
