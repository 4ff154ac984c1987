//! Demonstrates the full client round trip (login, upload, result) against a local mock of the
//! Sypht endpoints, reusing one cached bearer token for both API calls.

// crates.io
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use color_eyre::Result;
use httpmock::prelude::*;
use time::OffsetDateTime;
// self
use sypht_client::{
	auth::BasicCredentialProvider,
	client::{SyphtClient, UploadFile, UploadOptions},
	config::ClientConfig,
	url::Url,
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let exp = OffsetDateTime::now_utc().unix_timestamp() + 3600;
	let token = format!(
		"{}.{}.demo-signature",
		URL_SAFE_NO_PAD.encode(r#"{"alg":"RS256","typ":"JWT"}"#),
		URL_SAFE_NO_PAD.encode(format!(r#"{{"exp":{exp}}}"#)),
	);
	let login_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth/token");
			then.status(200)
				.header("content-type", "application/json")
				.body(format!("{{\"access_token\":\"{token}\"}}"));
		})
		.await;
	let _upload_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/fileupload");
			then.status(200).header("content-type", "application/json").body("{\"fileId\":\"demo-file\"}");
		})
		.await;
	let _result_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/result/final/demo-file");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"fileId\":\"demo-file\",\"results\":{\"fields\":[{\"name\":\"invoice.total\",\"value\":\"10.00\"}]}}");
		})
		.await;
	let config = ClientConfig::builder()
		.auth_endpoint(Url::parse(&server.url("/oauth/token"))?)
		.api_endpoint(Url::parse(&server.base_url())?)
		.build();
	let client = SyphtClient::new(config, BasicCredentialProvider::new("demo-client", "demo-secret"))?;
	let file = UploadFile::from_bytes("receipt.pdf", b"%PDF-1.4 demo".to_vec());
	let file_id = client.upload(file, &UploadOptions::new().field_sets(["sypht.invoice"])).await?;
	let prediction = client.result(&file_id).await?;

	println!("Uploaded {file_id}; prediction: {prediction}.");

	login_mock.assert_async().await;

	Ok(())
}
