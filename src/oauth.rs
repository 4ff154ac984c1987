//! OAuth client-credentials exchange against the Sypht login endpoint.

// self
use crate::{
	_prelude::*,
	auth::{BearerToken, CredentialProvider},
	config::ClientConfig,
	http::{BufferedResponse, HttpClient},
	obs::{self, OpKind},
};

const GRANT_TYPE: &str = "client_credentials";

#[derive(Serialize)]
struct TokenRequest<'a> {
	client_id: &'a str,
	client_secret: &'a str,
	audience: &'a str,
	grant_type: &'static str,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
	access_token: String,
}

/// Exchanges client credentials for signed bearer tokens.
///
/// The client owns its transport, so the configured timeout applies to every login.
#[derive(Clone)]
pub struct OAuthClient {
	http_client: HttpClient,
	endpoint: Url,
	credentials: Arc<dyn CredentialProvider>,
}
impl OAuthClient {
	/// Creates a client for `config.auth_endpoint` using `credentials`.
	pub fn new(config: &ClientConfig, credentials: Arc<dyn CredentialProvider>) -> Result<Self> {
		let http_client = HttpClient::with_timeout(config.request_timeout())?;

		Ok(Self::with_http_client(config, credentials, http_client))
	}

	/// Creates a client that reuses the caller-provided transport.
	pub fn with_http_client(
		config: &ClientConfig,
		credentials: Arc<dyn CredentialProvider>,
		http_client: HttpClient,
	) -> Self {
		Self { http_client, endpoint: config.auth_endpoint.clone(), credentials }
	}

	/// Transport used for every exchange.
	pub fn http_client(&self) -> &HttpClient {
		&self.http_client
	}

	/// Credential source used for every exchange.
	pub fn credentials(&self) -> &dyn CredentialProvider {
		self.credentials.as_ref()
	}

	/// Performs one exchange and decodes the issued token's expiry.
	pub async fn login(&self) -> Result<BearerToken> {
		let raw = self.login_raw().await?;

		Ok(BearerToken::decode(raw)?)
	}

	/// Performs one exchange and returns the raw `access_token` string.
	pub async fn login_raw(&self) -> Result<String> {
		obs::observe(OpKind::Login, "login", async move {
			let credentials = self.credentials.as_ref();
			let body = TokenRequest {
				client_id: credentials.client_id(),
				client_secret: credentials.client_secret().expose(),
				audience: credentials.oauth_audience(),
				grant_type: GRANT_TYPE,
			};
			let response = self.http_client.post(self.endpoint.clone()).json(&body).send().await?;
			let response = BufferedResponse::read(response).await?;
			let status = response.status.as_u16();
			let body = response
				.into_success_body()
				.map_err(|status| Error::Authentication { status: Some(status) })?;
			let parsed: TokenResponse = parse_json(&body).map_err(|_e| {
				#[cfg(feature = "tracing")]
				tracing::debug!(error = %_e, "Token endpoint body lacks access_token.");

				Error::Authentication { status: Some(status) }
			})?;

			if parsed.access_token.is_empty() {
				return Err(Error::Authentication { status: Some(status) });
			}

			#[cfg(feature = "tracing")]
			tracing::info!(client_id = credentials.client_id(), "Logged into Sypht.");

			Ok(parsed.access_token)
		})
		.await
	}
}
impl Debug for OAuthClient {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("OAuthClient")
			.field("endpoint", &self.endpoint.as_str())
			.field("client_id", &self.credentials.client_id())
			.field("audience", &self.credentials.oauth_audience())
			.finish()
	}
}

pub(crate) fn parse_json<T>(body: &str) -> Result<T, serde_path_to_error::Error<serde_json::Error>>
where
	T: for<'de> Deserialize<'de>,
{
	let mut de = serde_json::Deserializer::from_str(body);

	serde_path_to_error::deserialize(&mut de)
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::auth::BasicCredentialProvider;

	#[test]
	fn request_body_carries_grant_and_audience() {
		let provider = BasicCredentialProvider::new("abc", "def").with_oauth_audience("ghi");
		let body = TokenRequest {
			client_id: provider.client_id(),
			client_secret: provider.client_secret().expose(),
			audience: provider.oauth_audience(),
			grant_type: GRANT_TYPE,
		};
		let json = serde_json::to_value(&body).expect("Request body should serialize.");

		assert_eq!(
			json,
			serde_json::json!({
				"client_id": "abc",
				"client_secret": "def",
				"audience": "ghi",
				"grant_type": "client_credentials",
			})
		);
	}

	#[test]
	fn debug_output_omits_secret() {
		let provider: Arc<dyn CredentialProvider> =
			Arc::new(BasicCredentialProvider::new("abc", "hidden-secret"));
		let client = OAuthClient::new(&ClientConfig::default(), provider)
			.expect("OAuth client should build.");
		let rendered = format!("{client:?}");

		assert!(rendered.contains("abc"));
		assert!(!rendered.contains("hidden-secret"));
	}

	#[test]
	fn parse_json_reports_missing_field() {
		let err = parse_json::<TokenResponse>("{\"token_type\":\"bearer\"}")
			.expect_err("Missing access_token should fail.");

		assert!(err.to_string().contains("access_token"));
	}
}
