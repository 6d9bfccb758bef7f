//! Transport primitives for registry calls.
//!
//! The module exposes [`RegistryHttpClient`] alongside the transport-agnostic [`HttpRequest`] and
//! [`HttpResponse`] values so downstream crates can plug in their own HTTP stack. The gate only
//! ever issues three calls (challenge fetch, token exchange, document submission), each labeled
//! with an [`Endpoint`] so failures and telemetry name the call that produced them.

// crates.io
use serde::de::DeserializeOwned;
// self
use crate::{_prelude::*, error::DecodeError};

/// `Authorization` header name.
pub const AUTHORIZATION: &str = "authorization";
/// `Accept` header name.
pub const ACCEPT: &str = "accept";
/// `Content-Type` header name.
pub const CONTENT_TYPE: &str = "content-type";
/// Media type sent and accepted on every registry call.
pub const JSON_UTF8: &str = "application/json;charset=UTF-8";

/// Boxed future returned by [`RegistryHttpClient::execute`].
pub type HttpFuture<'a, E> = Pin<Box<dyn Future<Output = Result<HttpResponse, E>> + 'a + Send>>;

/// Abstraction over HTTP transports capable of executing registry calls.
///
/// The trait is the gate's only dependency on an HTTP stack. Implementations must be
/// `Send + Sync + 'static` so a single transport can be shared by the credential flow and the
/// submission path behind one `Arc`, and the futures they return must be `Send` so gate futures
/// can hop executors.
pub trait RegistryHttpClient
where
	Self: 'static + Send + Sync,
{
	/// Concrete error emitted by the underlying transport.
	type TransportError: 'static + Send + Sync + StdError;

	/// Executes `request` and resolves to the raw response, whatever its status code.
	///
	/// Non-2xx responses are not transport errors; only failures to obtain a response are.
	fn execute(&self, request: HttpRequest) -> HttpFuture<'_, Self::TransportError>;
}

/// Registry endpoints called by the gate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Endpoint {
	/// `GET` endpoint issuing a signable challenge.
	Challenge,
	/// `POST` endpoint exchanging a signed challenge for a credential.
	Token,
	/// `POST` endpoint accepting documents.
	Submission,
}
impl Endpoint {
	/// Returns a stable label suitable for error messages or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			Endpoint::Challenge => "challenge",
			Endpoint::Token => "token",
			Endpoint::Submission => "submission",
		}
	}
}
impl Display for Endpoint {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// HTTP verbs used by the registry protocol.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HttpMethod {
	/// `GET`.
	Get,
	/// `POST`.
	Post,
}

/// Transport-agnostic outbound request.
#[derive(Clone, Debug)]
pub struct HttpRequest {
	/// HTTP verb.
	pub method: HttpMethod,
	/// Absolute target URL.
	pub url: Url,
	/// Header name/value pairs; names are lowercase.
	pub headers: Vec<(&'static str, String)>,
	/// Request body, if any.
	pub body: Option<Vec<u8>>,
}
impl HttpRequest {
	/// Creates a `GET` request that accepts JSON.
	pub fn get(url: Url) -> Self {
		Self {
			method: HttpMethod::Get,
			url,
			headers: vec![(ACCEPT, JSON_UTF8.into())],
			body: None,
		}
	}

	/// Creates a `POST` request carrying a JSON body.
	pub fn post_json(url: Url, body: Vec<u8>) -> Self {
		Self {
			method: HttpMethod::Post,
			url,
			headers: vec![(CONTENT_TYPE, JSON_UTF8.into()), (ACCEPT, JSON_UTF8.into())],
			body: Some(body),
		}
	}

	/// Appends a header.
	pub fn with_header(mut self, name: &'static str, value: impl Into<String>) -> Self {
		self.headers.push((name, value.into()));

		self
	}

	/// Returns the first value recorded for `name`.
	pub fn header(&self, name: &str) -> Option<&str> {
		self.headers
			.iter()
			.find(|(key, _)| key.eq_ignore_ascii_case(name))
			.map(|(_, value)| value.as_str())
	}
}

/// Raw response returned by a [`RegistryHttpClient`].
#[derive(Clone, Debug, Default)]
pub struct HttpResponse {
	/// HTTP status code.
	pub status: u16,
	/// Response body bytes.
	pub body: Vec<u8>,
}
impl HttpResponse {
	/// Creates a response from a status code and body.
	pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
		Self { status, body: body.into() }
	}

	/// Returns `true` for 2xx statuses.
	pub fn is_success(&self) -> bool {
		(200..300).contains(&self.status)
	}

	/// Decodes the JSON body, reporting the failing path on error.
	pub fn decode<T>(&self, endpoint: Endpoint) -> Result<T, DecodeError>
	where
		T: DeserializeOwned,
	{
		let mut deserializer = serde_json::Deserializer::from_slice(&self.body);

		serde_path_to_error::deserialize(&mut deserializer).map_err(|source| DecodeError {
			endpoint,
			status: self.status,
			source,
		})
	}
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
#[cfg(feature = "reqwest")]
#[derive(Clone, Default)]
pub struct ReqwestHttpClient(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestHttpClient {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestHttpClient {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl RegistryHttpClient for ReqwestHttpClient {
	type TransportError = ReqwestError;

	fn execute(&self, request: HttpRequest) -> HttpFuture<'_, Self::TransportError> {
		let client = self.0.clone();

		Box::pin(async move {
			let method = match request.method {
				HttpMethod::Get => reqwest::Method::GET,
				HttpMethod::Post => reqwest::Method::POST,
			};
			let mut builder = client.request(method, request.url);

			for (name, value) in request.headers {
				builder = builder.header(name, value);
			}
			if let Some(body) = request.body {
				builder = builder.body(body);
			}

			let response = builder.send().await?;
			let status = response.status().as_u16();
			let body = response.bytes().await?.to_vec();

			Ok::<_, ReqwestError>(HttpResponse { status, body })
		})
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[derive(Debug, Deserialize)]
	struct Probe {
		#[allow(dead_code)]
		uuid: String,
	}

	#[test]
	fn decode_reports_endpoint_status_and_path() {
		let response = HttpResponse::new(502, r#"{"uuid":42}"#);
		let err = response
			.decode::<Probe>(Endpoint::Challenge)
			.expect_err("Numeric uuid should fail to decode.");

		assert_eq!(err.endpoint, Endpoint::Challenge);
		assert_eq!(err.status, 502);
		assert_eq!(err.source.path().to_string(), "uuid");
	}

	#[test]
	fn post_json_sets_media_headers() {
		let url = Url::parse("https://registry.example.com/api").expect("Fixture URL should parse.");
		let request =
			HttpRequest::post_json(url, b"{}".to_vec()).with_header(AUTHORIZATION, "Bearer t");

		assert_eq!(request.method, HttpMethod::Post);
		assert_eq!(request.header("Content-Type"), Some(JSON_UTF8));
		assert_eq!(request.header(ACCEPT), Some(JSON_UTF8));
		assert_eq!(request.header(AUTHORIZATION), Some("Bearer t"));
	}
}
