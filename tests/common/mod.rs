//! Shared fixtures for integration tests.

#![allow(dead_code)]

// crates.io
use httpmock::MockServer;
// self
use registry_gate::{
	auth::{ChallengeSigner, SigningError},
	config::{ClientConfig, RegistryEndpoints, WindowUnit},
	gate::ReqwestGate,
	http::ReqwestHttpClient,
	reqwest::Client,
	url::Url,
};

pub const CHALLENGE_PATH: &str = "/api/v3/auth/cert/key";
pub const TOKEN_PATH: &str = "/api/v3/auth/cert";
pub const SUBMISSION_PATH: &str = "/api/v3/lk/documents/create";

/// Builds a reqwest client that accepts the self-signed certificates produced by `httpmock`.
pub fn test_reqwest_http_client() -> ReqwestHttpClient {
	let client = Client::builder()
		.danger_accept_invalid_certs(true)
		.danger_accept_invalid_hostnames(true)
		.build()
		.expect("Failed to build insecure reqwest client for tests.");

	ReqwestHttpClient::with_client(client)
}

/// Registry base URL served by `server` over TLS.
pub fn base_url(server: &MockServer) -> Url {
	let mut url = Url::parse(&server.url("/api/v3/")).expect("Mock base URL should parse.");

	url.set_scheme("https").expect("Mock base URL should accept the https scheme.");

	url
}

pub fn endpoints(server: &MockServer) -> RegistryEndpoints {
	RegistryEndpoints::from_base(&base_url(server)).expect("Mock endpoints should derive.")
}

pub fn config(server: &MockServer, request_limit: u32) -> ClientConfig {
	ClientConfig::builder(WindowUnit::Seconds, request_limit)
		.endpoints(endpoints(server))
		.build()
		.expect("Mock gate configuration should validate.")
}

/// Signer that answers challenge `data` with `signed:<data>`.
pub fn echo_signer() -> std::sync::Arc<dyn ChallengeSigner> {
	std::sync::Arc::new(|data: &str| Ok::<_, SigningError>(format!("signed:{data}")))
}

pub fn gate(server: &MockServer, request_limit: u32) -> ReqwestGate {
	ReqwestGate::with_http_client(
		config(server, request_limit),
		echo_signer(),
		test_reqwest_http_client(),
	)
	.expect("Mock gate should start.")
}
