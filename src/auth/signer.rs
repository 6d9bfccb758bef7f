//! Challenge signing contract.
//!
//! The gate never signs anything itself. Callers inject a [`ChallengeSigner`] (an HSM client, a
//! CryptoPro bridge, a test double) and the renewal flow hands it each challenge payload.

// self
use crate::_prelude::*;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Boxed future returned by [`ChallengeSigner::sign`].
pub type SignatureFuture<'a> =
	Pin<Box<dyn Future<Output = Result<String, SigningError>> + 'a + Send>>;

/// Capability that turns challenge data into the signature the token endpoint expects.
pub trait ChallengeSigner
where
	Self: Send + Sync,
{
	/// Signs `data` and returns the encoded signature.
	fn sign<'a>(&'a self, data: &'a str) -> SignatureFuture<'a>;
}
impl<F> ChallengeSigner for F
where
	F: Send + Sync + Fn(&str) -> Result<String, SigningError>,
{
	fn sign<'a>(&'a self, data: &'a str) -> SignatureFuture<'a> {
		let signature = self(data);

		Box::pin(async move { signature })
	}
}

/// Failure reported by a [`ChallengeSigner`].
#[derive(Debug, ThisError)]
#[error("Challenge signer failed: {message}.")]
pub struct SigningError {
	/// Signer-supplied message.
	pub message: String,
	/// Underlying signer failure, when available.
	#[source]
	pub source: Option<BoxError>,
}
impl SigningError {
	/// Creates an error from a message.
	pub fn new(message: impl Into<String>) -> Self {
		Self { message: message.into(), source: None }
	}

	/// Creates an error that wraps the signer's own failure.
	pub fn with_source(
		message: impl Into<String>,
		src: impl 'static + Send + Sync + std::error::Error,
	) -> Self {
		Self { message: message.into(), source: Some(Box::new(src)) }
	}
}
