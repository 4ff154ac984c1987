//! Upload payloads and per-upload form options.

// std
use std::path::Path;
// crates.io
use reqwest::multipart::{Form, Part};
use tokio::io::{AsyncRead, AsyncReadExt};
// self
use crate::_prelude::*;

/// Multipart part name carrying the document bytes.
pub const FILE_PART: &str = "fileToUpload";
/// Form field used by [`UploadOptions::field_sets`].
pub const FIELD_SETS_FIELD: &str = "fieldSets";

/// Document to upload: a file name plus its bytes.
///
/// The service accepts PDF (up to 16 pages), JPEG, GIF, and PNG files up to 20MB; those limits
/// are enforced remotely.
#[derive(Clone, PartialEq, Eq)]
pub struct UploadFile {
	file_name: String,
	bytes: Vec<u8>,
}
impl UploadFile {
	/// Wraps in-memory bytes.
	pub fn from_bytes(file_name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
		Self { file_name: file_name.into(), bytes: bytes.into() }
	}

	/// Reads a file from disk, naming the part after the file's last path component.
	pub async fn from_path(path: impl AsRef<Path>) -> Result<Self> {
		let path = path.as_ref();
		let bytes = tokio::fs::read(path).await?;
		let file_name = path
			.file_name()
			.map(|name| name.to_string_lossy().into_owned())
			.unwrap_or_else(|| path.display().to_string());

		Ok(Self { file_name, bytes })
	}

	/// Drains `reader` to the end and names the part `file_name`.
	pub async fn from_reader<R>(file_name: impl Into<String>, mut reader: R) -> Result<Self>
	where
		R: AsyncRead + Unpin,
	{
		let mut bytes = Vec::new();

		reader.read_to_end(&mut bytes).await?;

		Ok(Self { file_name: file_name.into(), bytes })
	}

	/// File name sent with the part.
	pub fn file_name(&self) -> &str {
		&self.file_name
	}

	/// Document bytes.
	pub fn bytes(&self) -> &[u8] {
		&self.bytes
	}

	/// Content type sent with the part, guessed from the file name's extension.
	pub fn content_type(&self) -> &'static str {
		let extension = self.file_name.rsplit_once('.').map(|(_, ext)| ext.to_ascii_lowercase());

		match extension.as_deref() {
			Some("pdf") => "application/pdf",
			Some("jpg" | "jpeg") => "image/jpeg",
			Some("gif") => "image/gif",
			Some("png") => "image/png",
			_ => "application/octet-stream",
		}
	}

	pub(crate) fn into_part(self) -> Result<Part> {
		let content_type = self.content_type();

		Ok(Part::bytes(self.bytes).file_name(self.file_name).mime_str(content_type)?)
	}
}
impl Debug for UploadFile {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("UploadFile")
			.field("file_name", &self.file_name)
			.field("len", &self.bytes.len())
			.finish()
	}
}

/// Extra form fields sent alongside the document, one text part per entry.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UploadOptions(BTreeMap<String, String>);
impl UploadOptions {
	/// Creates an empty option set.
	pub fn new() -> Self {
		Self::default()
	}

	/// Adds or replaces a form field.
	pub fn insert(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.0.insert(key.into(), value.into());

		self
	}

	/// Requests field sets (for example `sypht.invoice`) as a JSON array in `fieldSets`.
	pub fn field_sets<I, S>(self, field_sets: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		let values = field_sets.into_iter().map(Into::into).collect::<Vec<String>>();

		self.insert(FIELD_SETS_FIELD, serde_json::Value::from(values).to_string())
	}

	/// Looks up a form field.
	pub fn get(&self, key: &str) -> Option<&str> {
		self.0.get(key).map(String::as_str)
	}

	/// Iterates fields in key order.
	pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
		self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
	}

	/// Whether no fields are set.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}
impl<K, V> FromIterator<(K, V)> for UploadOptions
where
	K: Into<String>,
	V: Into<String>,
{
	fn from_iter<T>(iter: T) -> Self
	where
		T: IntoIterator<Item = (K, V)>,
	{
		Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
	}
}

pub(crate) fn build_form(file: UploadFile, options: &UploadOptions) -> Result<Form> {
	let form = Form::new().part(FILE_PART, file.into_part()?);

	Ok(options.iter().fold(form, |form, (key, value)| form.text(key.to_owned(), value.to_owned())))
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn field_sets_are_json_encoded() {
		let options = UploadOptions::new().field_sets(["sypht.invoice", "sypht.document"]);

		assert_eq!(options.get(FIELD_SETS_FIELD), Some("[\"sypht.invoice\",\"sypht.document\"]"));
	}

	#[test]
	fn options_collect_from_pairs() {
		let options: UploadOptions =
			[("workflowId", "w-1"), ("fieldSets", "[]")].into_iter().collect();

		assert_eq!(options.iter().collect::<Vec<_>>(), [("fieldSets", "[]"), ("workflowId", "w-1")]);
		assert!(!options.is_empty());
	}

	#[test]
	fn debug_omits_bytes() {
		let file = UploadFile::from_bytes("receipt.pdf", vec![1_u8; 4]);

		assert_eq!(format!("{file:?}"), "UploadFile { file_name: \"receipt.pdf\", len: 4 }");
	}

	#[test]
	fn content_type_follows_extension() {
		let content_type = |name: &str| UploadFile::from_bytes(name, Vec::new()).content_type();

		assert_eq!(content_type("receipt.pdf"), "application/pdf");
		assert_eq!(content_type("scan.JPG"), "image/jpeg");
		assert_eq!(content_type("scan.jpeg"), "image/jpeg");
		assert_eq!(content_type("logo.gif"), "image/gif");
		assert_eq!(content_type("photo.png"), "image/png");
		assert_eq!(content_type("notes.txt"), "application/octet-stream");
		assert_eq!(content_type("no-extension"), "application/octet-stream");
	}

	#[tokio::test]
	async fn reader_is_drained() {
		let file = UploadFile::from_reader("receipt.png", &b"\x89PNG"[..])
			.await
			.expect("Reader should drain.");

		assert_eq!(file.file_name(), "receipt.png");
		assert_eq!(file.bytes(), b"\x89PNG");
	}

	#[tokio::test]
	async fn missing_path_is_an_io_error() {
		let err = UploadFile::from_path("/definitely/not/here.pdf")
			.await
			.expect_err("Missing file should fail.");

		assert!(matches!(err, Error::Transport(crate::error::TransportError::Io(_))));
	}
}
