// self
use crate::{
	_prelude::*,
	config::{ClientConfig, DEFAULT_CREDENTIAL_LIFETIME, RegistryEndpoints, WindowUnit},
	error::ConfigError,
};

/// Builder for [`ClientConfig`] values.
#[derive(Debug)]
pub struct ClientConfigBuilder {
	/// Maximum number of submissions per window.
	pub request_limit: u32,
	/// Time unit of the replenishment window.
	pub window_unit: WindowUnit,
	/// Number of units per window (defaults to one).
	pub window_count: u32,
	/// Credential lifetime (defaults to ten hours).
	pub credential_lifetime: Duration,
	/// Early-renewal margin (defaults to zero).
	pub refresh_margin: Duration,
	/// Explicit endpoints; the reference registry is used when unset.
	pub endpoints: Option<RegistryEndpoints>,
}
impl ClientConfigBuilder {
	/// Creates a new builder for `request_limit` submissions per `window_unit`.
	pub fn new(window_unit: WindowUnit, request_limit: u32) -> Self {
		Self {
			request_limit,
			window_unit,
			window_count: 1,
			credential_lifetime: DEFAULT_CREDENTIAL_LIFETIME,
			refresh_margin: Duration::ZERO,
			endpoints: None,
		}
	}

	/// Stretches the window to `count` units.
	pub fn window_count(mut self, count: u32) -> Self {
		self.window_count = count;

		self
	}

	/// Overrides the credential lifetime.
	pub fn credential_lifetime(mut self, lifetime: Duration) -> Self {
		self.credential_lifetime = lifetime;

		self
	}

	/// Renews credentials once fewer than `margin` of their lifetime remains.
	pub fn refresh_margin(mut self, margin: Duration) -> Self {
		self.refresh_margin = margin;

		self
	}

	/// Uses explicit endpoints.
	pub fn endpoints(mut self, endpoints: RegistryEndpoints) -> Self {
		self.endpoints = Some(endpoints);

		self
	}

	/// Derives the endpoints from a registry base URL.
	pub fn base_url(mut self, base: &Url) -> Result<Self, ConfigError> {
		self.endpoints = Some(RegistryEndpoints::from_base(base)?);

		Ok(self)
	}

	/// Consumes the builder and validates the resulting configuration.
	pub fn build(self) -> Result<ClientConfig, ConfigError> {
		let endpoints = match self.endpoints {
			Some(endpoints) => endpoints,
			None => RegistryEndpoints::reference()?,
		};
		let config = ClientConfig {
			request_limit: self.request_limit,
			window_unit: self.window_unit,
			window_count: self.window_count,
			credential_lifetime: self.credential_lifetime,
			refresh_margin: self.refresh_margin,
			endpoints,
		};

		config.validate()?;

		Ok(config)
	}
}

impl ClientConfig {
	/// Validates invariants for the configuration.
	fn validate(&self) -> Result<(), ConfigError> {
		if self.request_limit == 0 {
			return Err(ConfigError::NonPositiveRequestLimit);
		}
		if !self.window().is_positive() {
			return Err(ConfigError::NonPositiveWindow);
		}
		if !self.credential_lifetime.is_positive() {
			return Err(ConfigError::NonPositiveCredentialLifetime);
		}
		if self.refresh_margin.is_negative() || self.refresh_margin >= self.credential_lifetime {
			return Err(ConfigError::InvalidRefreshMargin);
		}

		self.endpoints.validate()
	}
}
