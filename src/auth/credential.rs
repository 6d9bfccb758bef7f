//! Bearer credentials and the redacted secret wrapper they carry.

// self
use crate::_prelude::*;

/// Redacted token secret wrapper keeping sensitive material out of logs.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSecret(String);
impl TokenSecret {
	/// Wraps a new secret string.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Returns the inner token value. Callers must avoid logging this string.
	pub fn expose(&self) -> &str {
		&self.0
	}
}
impl AsRef<str> for TokenSecret {
	fn as_ref(&self) -> &str {
		self.expose()
	}
}
impl Debug for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("TokenSecret").field(&"<redacted>").finish()
	}
}
impl Display for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("<redacted>")
	}
}

/// Immutable bearer credential with a fixed validity window.
///
/// The cache replaces credentials wholesale on renewal; a record is never edited in place.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct Credential {
	/// Bearer token value.
	pub token: TokenSecret,
	/// Instant the credential was obtained.
	pub issued_at: OffsetDateTime,
	/// First instant at which the credential is no longer valid.
	pub expires_at: OffsetDateTime,
}
impl Credential {
	/// Creates a credential valid for `lifetime` starting at `issued_at`.
	pub fn new(token: impl Into<String>, issued_at: OffsetDateTime, lifetime: Duration) -> Self {
		Self { token: TokenSecret::new(token), issued_at, expires_at: issued_at + lifetime }
	}

	/// Returns `true` once `instant` reaches the expiry.
	pub fn is_expired_at(&self, instant: OffsetDateTime) -> bool {
		instant >= self.expires_at
	}

	/// Returns `true` if the credential stays valid for more than `margin` after `instant`.
	///
	/// With a zero margin this is exactly `!is_expired_at(instant)`.
	pub fn is_usable_at(&self, instant: OffsetDateTime, margin: Duration) -> bool {
		!self.is_expired_at(instant + margin)
	}

	/// Renders the `Authorization` header value.
	pub fn authorization_header(&self) -> String {
		format!("Bearer {}", self.token.expose())
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros;
	// self
	use super::*;

	#[test]
	fn secret_formatters_redact() {
		let secret = TokenSecret::new("super-secret");

		assert_eq!(format!("{secret:?}"), "TokenSecret(\"<redacted>\")");
		assert_eq!(format!("{secret}"), "<redacted>");
	}

	#[test]
	fn credential_debug_never_leaks_token() {
		let issued = macros::datetime!(2025-01-01 00:00 UTC);
		let credential = Credential::new("bearer-value", issued, Duration::hours(10));

		assert!(!format!("{credential:?}").contains("bearer-value"));
		assert_eq!(credential.authorization_header(), "Bearer bearer-value");
	}

	#[test]
	fn validity_is_a_strict_wall_clock_comparison() {
		let issued = macros::datetime!(2025-01-01 00:00 UTC);
		let credential = Credential::new("token", issued, Duration::hours(10));

		assert_eq!(credential.expires_at, macros::datetime!(2025-01-01 10:00 UTC));
		assert!(!credential.is_expired_at(macros::datetime!(2025-01-01 09:59 UTC)));
		assert!(credential.is_expired_at(macros::datetime!(2025-01-01 10:00 UTC)));
		assert!(credential.is_usable_at(macros::datetime!(2025-01-01 09:59 UTC), Duration::ZERO));
		assert!(!credential.is_usable_at(
			macros::datetime!(2025-01-01 09:59 UTC),
			Duration::minutes(1)
		));
	}
}
