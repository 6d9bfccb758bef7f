//! Client configuration: rate-limit window, credential lifetime, and registry endpoints.
//!
//! Values are assembled through [`ClientConfigBuilder`] and validated once, so every
//! [`ClientConfig`] handed to the gate already satisfies the construction-time invariants
//! (positive request limit and window, HTTPS endpoints, sane credential lifetime).

/// Builder API for assembling client configuration.
pub mod builder;
/// Window time units.
pub mod window;

pub use builder::*;
pub use window::*;

// self
use crate::{_prelude::*, error::ConfigError, http::Endpoint};

/// Base URL of the reference registry API.
pub const DEFAULT_BASE_URL: &str = "https://ismp.crpt.ru/api/v3/";
/// Credential lifetime assumed when the token endpoint does not advertise one.
pub const DEFAULT_CREDENTIAL_LIFETIME: Duration = Duration::hours(10);

const CHALLENGE_PATH: &str = "auth/cert/key";
const TOKEN_PATH: &str = "auth/cert";
const SUBMISSION_PATH: &str = "lk/documents/create";

/// Endpoint set called by the gate.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryEndpoints {
	/// Endpoint issuing signable challenges.
	pub challenge: Url,
	/// Endpoint exchanging signed challenges for credentials.
	pub token: Url,
	/// Endpoint accepting documents.
	pub submission: Url,
}
impl RegistryEndpoints {
	/// Derives all three endpoints from a registry base URL such as
	/// `https://ismp.crpt.ru/api/v3/`.
	///
	/// A missing trailing slash is tolerated; the base path is always treated as a directory.
	pub fn from_base(base: &Url) -> Result<Self, ConfigError> {
		let mut base = base.clone();

		if !base.path().ends_with('/') {
			let path = format!("{}/", base.path());

			base.set_path(&path);
		}

		let join =
			|path: &str| base.join(path).map_err(|source| ConfigError::InvalidBaseUrl { source });

		Ok(Self {
			challenge: join(CHALLENGE_PATH)?,
			token: join(TOKEN_PATH)?,
			submission: join(SUBMISSION_PATH)?,
		})
	}

	/// Endpoints of the reference registry rooted at [`DEFAULT_BASE_URL`].
	pub fn reference() -> Result<Self, ConfigError> {
		let base =
			Url::parse(DEFAULT_BASE_URL).map_err(|source| ConfigError::InvalidBaseUrl { source })?;

		Self::from_base(&base)
	}

	/// Returns the URL configured for `endpoint`.
	pub fn url(&self, endpoint: Endpoint) -> &Url {
		match endpoint {
			Endpoint::Challenge => &self.challenge,
			Endpoint::Token => &self.token,
			Endpoint::Submission => &self.submission,
		}
	}

	fn validate(&self) -> Result<(), ConfigError> {
		for endpoint in [Endpoint::Challenge, Endpoint::Token, Endpoint::Submission] {
			let url = self.url(endpoint);

			if url.scheme() != "https" {
				return Err(ConfigError::InsecureEndpoint { endpoint, url: url.to_string() });
			}
		}

		Ok(())
	}
}

/// Immutable, validated client configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientConfig {
	/// Maximum number of submissions per window.
	pub request_limit: u32,
	/// Time unit of the replenishment window.
	pub window_unit: WindowUnit,
	/// Number of [`WindowUnit`]s per window.
	pub window_count: u32,
	/// Fixed lifetime assigned to freshly issued credentials.
	pub credential_lifetime: Duration,
	/// Credentials are renewed once fewer than this much lifetime remains (zero by default).
	pub refresh_margin: Duration,
	/// Registry endpoints.
	pub endpoints: RegistryEndpoints,
}
impl ClientConfig {
	/// Creates a builder for `request_limit` submissions per `window_unit`.
	pub fn builder(window_unit: WindowUnit, request_limit: u32) -> ClientConfigBuilder {
		ClientConfigBuilder::new(window_unit, request_limit)
	}

	/// Returns the replenishment window.
	pub fn window(&self) -> Duration {
		self.window_unit.times(self.window_count)
	}
}
