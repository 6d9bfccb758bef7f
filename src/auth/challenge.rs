//! Wire types for the challenge/token exchange.

// self
use crate::{_prelude::*, auth::TokenSecret};

/// Server-issued data that must be signed to obtain a credential.
///
/// A challenge is consumed by value when it is exchanged, so each one backs exactly one
/// authentication attempt.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Challenge {
	/// Challenge identifier echoed back to the token endpoint.
	#[serde(rename = "uuid")]
	pub id: String,
	/// Opaque payload handed to the signer.
	pub data: String,
}

/// Body posted to the token endpoint.
#[derive(Debug, Serialize)]
pub(crate) struct SignedChallenge<'a> {
	pub(crate) uuid: &'a str,
	pub(crate) data: &'a str,
}

/// Token endpoint answer.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct TokenResponse {
	/// Issued bearer token, absent when the registry refused the challenge.
	#[serde(default)]
	pub token: Option<TokenSecret>,
	/// Registry error code.
	#[serde(default)]
	pub code: Option<String>,
	/// Registry error message.
	#[serde(default)]
	pub error_message: Option<String>,
	/// Registry error description.
	#[serde(default)]
	pub description: Option<String>,
}
impl TokenResponse {
	/// Returns the issued token if it is present and non-empty.
	pub fn issued_token(&self) -> Option<&TokenSecret> {
		self.token.as_ref().filter(|token| !token.expose().is_empty())
	}

	/// Best available human-readable explanation of a refusal.
	pub fn rejection_reason(&self) -> String {
		self.error_message
			.as_deref()
			.or(self.description.as_deref())
			.unwrap_or("Token endpoint response did not include a token")
			.to_owned()
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn challenge_uses_registry_field_names() {
		let challenge: Challenge = serde_json::from_str(r#"{"uuid":"c-1","data":"to-sign"}"#)
			.expect("Challenge fixture should decode.");

		assert_eq!(challenge.id, "c-1");
		assert_eq!(challenge.data, "to-sign");

		let body = serde_json::to_value(SignedChallenge { uuid: &challenge.id, data: "sig" })
			.expect("Signed challenge should encode.");

		assert_eq!(body, serde_json::json!({ "uuid": "c-1", "data": "sig" }));
	}

	#[test]
	fn refusal_prefers_error_message() {
		let response: TokenResponse = serde_json::from_str(
			r#"{"token":"","code":"403","error_message":"Signature rejected","description":"x"}"#,
		)
		.expect("Refusal fixture should decode.");

		assert!(response.issued_token().is_none());
		assert_eq!(response.rejection_reason(), "Signature rejected");
		assert_eq!(
			TokenResponse::default().rejection_reason(),
			"Token endpoint response did not include a token"
		);
	}
}
