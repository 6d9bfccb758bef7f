//! Submission payloads and wire types.

// crates.io
use base64::{Engine, engine::general_purpose::STANDARD};
// self
use crate::_prelude::*;

/// Encoding of the submitted document.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DocumentFormat {
	#[default]
	/// JSON document entered through the manual API.
	Manual,
	/// XML document.
	Xml,
	/// CSV document.
	Csv,
}

/// Registry document type tag.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DocumentType {
	#[default]
	/// Introduction of domestically produced goods into circulation.
	LpIntroduceGoods,
}

/// Document submission requested by a caller.
///
/// The document itself stays opaque: any [`Serialize`] value is encoded as JSON and then as
/// base64 before it is posted.
#[derive(Debug)]
pub struct Submission<'a, D>
where
	D: ?Sized,
{
	/// Document encoding tag.
	pub format: DocumentFormat,
	/// Document type tag.
	pub kind: DocumentType,
	/// Document payload.
	pub document: &'a D,
	/// Detached signature of the document.
	pub signature: &'a str,
}
impl<'a, D> Submission<'a, D>
where
	D: ?Sized + Serialize,
{
	/// Creates a submission with explicit format and type tags.
	pub fn new(
		format: DocumentFormat,
		kind: DocumentType,
		document: &'a D,
		signature: &'a str,
	) -> Self {
		Self { format, kind, document, signature }
	}

	/// Creates a `MANUAL` + `LP_INTRODUCE_GOODS` submission.
	pub fn introduce_goods(document: &'a D, signature: &'a str) -> Self {
		Self::new(DocumentFormat::Manual, DocumentType::LpIntroduceGoods, document, signature)
	}

	/// Builds the JSON request body.
	pub fn encode(&self) -> Result<Vec<u8>> {
		let document =
			serde_json::to_vec(self.document).map_err(|source| Error::Encode { source })?;
		let request = SubmissionRequest {
			document_format: self.format,
			product_document: STANDARD.encode(document),
			signature: self.signature,
			kind: self.kind,
		};

		serde_json::to_vec(&request).map_err(|source| Error::Encode { source })
	}
}

/// Body posted to the submission endpoint.
#[derive(Debug, Serialize)]
struct SubmissionRequest<'a> {
	document_format: DocumentFormat,
	product_document: String,
	signature: &'a str,
	#[serde(rename = "type")]
	kind: DocumentType,
}

/// Registry answer to a submission.
///
/// Business failures arrive here as data: inspect [`is_accepted`](Self::is_accepted),
/// `code`, and `error_message` rather than expecting an `Err`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct SubmissionResponse {
	/// Identifier assigned to the accepted document.
	#[serde(default)]
	pub value: Option<String>,
	/// Registry status or error code.
	#[serde(default)]
	pub code: Option<String>,
	/// Registry error message.
	#[serde(default)]
	pub error_message: Option<String>,
	/// Registry error description.
	#[serde(default)]
	pub description: Option<String>,
	/// HTTP status code of the response.
	#[serde(skip)]
	pub status: u16,
}
impl SubmissionResponse {
	/// Returns `true` when the registry accepted the document.
	pub fn is_accepted(&self) -> bool {
		(200..300).contains(&self.status)
			&& self.value.is_some()
			&& self.error_message.is_none()
	}
}
