//! Async client for the Sypht document-extraction API: OAuth client-credentials login,
//! single-flight bearer-token caching, file uploads, and raw prediction results.
//!
//! ```no_run
//! # async fn demo() -> sypht_client::error::Result<()> {
//! use sypht_client::client::{SyphtClient, UploadFile, UploadOptions};
//!
//! let client = SyphtClient::from_env()?;
//! let file = UploadFile::from_path("receipt.pdf").await?;
//! let options = UploadOptions::new().field_sets(["sypht.invoice"]);
//! let file_id = client.upload(file, &options).await?;
//! let prediction = client.result(&file_id).await?;
//!
//! println!("{prediction}");
//! # Ok(())
//! # }
//! ```

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod oauth;
mod obs;

mod _prelude {
	pub use std::{
		collections::BTreeMap,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		sync::Arc,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError, StatusCode};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

pub use reqwest;
pub use url;
#[cfg(test)] use {color_eyre as _, httpmock as _};
