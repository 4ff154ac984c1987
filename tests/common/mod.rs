//! Shared helpers for integration tests: mock-backed configs and unsigned JWT minting.

#![allow(dead_code)]

// crates.io
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use httpmock::prelude::*;
use time::OffsetDateTime;
// self
use sypht_client::{config::ClientConfig, url::Url};

pub const OAUTH_PATH: &str = "/oauth/token";
pub const CLIENT_ID: &str = "client-abc";
pub const CLIENT_SECRET: &str = "secret-def";

/// Mints a JWT-shaped token whose payload carries `exp`; the signature is a placeholder.
pub fn mint_token(exp: i64) -> String {
	let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"RS256","typ":"JWT","kid":"test"}"#);
	let payload = URL_SAFE_NO_PAD
		.encode(format!(r#"{{"iss":"https://login.sypht.com/","sub":"{CLIENT_ID}@clients","exp":{exp}}}"#));

	format!("{header}.{payload}.c2lnbmF0dXJl")
}

/// Token expiring `secs` seconds from now.
pub fn token_expiring_in(secs: i64) -> String {
	mint_token(OffsetDateTime::now_utc().unix_timestamp() + secs)
}

/// Config pointing both endpoints at `server`.
pub fn mock_config(server: &MockServer) -> ClientConfig {
	ClientConfig::builder()
		.auth_endpoint(Url::parse(&server.url(OAUTH_PATH)).expect("Mock OAuth URL should parse."))
		.api_endpoint(Url::parse(&server.base_url()).expect("Mock API URL should parse."))
		.build()
}

/// Registers a token endpoint that issues `token` for any POST.
pub async fn mock_login<'a>(server: &'a MockServer, token: &str) -> httpmock::Mock<'a> {
	let body = format!("{{\"access_token\":\"{token}\",\"token_type\":\"Bearer\"}}");

	server
		.mock_async(|when, then| {
			when.method(POST).path(OAUTH_PATH);
			then.status(200).header("content-type", "application/json").body(body);
		})
		.await
}
