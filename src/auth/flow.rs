//! Challenge/sign/exchange renewal flow.
//!
//! [`AuthChallengeFlow::authenticate`] runs one full authentication cycle: fetch a challenge, hand
//! its payload to the injected [`ChallengeSigner`], post the signed challenge to the token
//! endpoint, and stamp the returned token with a fixed lifetime starting when it was issued. Any
//! failure aborts the cycle and is returned as is; nothing is retried here.

// self
use crate::{
	_prelude::*,
	auth::{
		Challenge, ChallengeSigner, Credential, SignedChallenge, TokenResponse, TokenSecret,
	},
	config::RegistryEndpoints,
	error::TransportError,
	http::{Endpoint, HttpRequest, HttpResponse, RegistryHttpClient},
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
};

/// Boxed future returned by [`CredentialRenewal::renew`].
pub type RenewalFuture<'a> = Pin<Box<dyn Future<Output = Result<Credential>> + 'a + Send>>;

/// Source of fresh credentials consulted by the
/// [`CredentialCache`](crate::auth::CredentialCache) when its credential is absent or stale.
pub trait CredentialRenewal
where
	Self: Send + Sync,
{
	/// Obtains a new credential, stamped with the instant it was issued.
	fn renew(&self) -> RenewalFuture<'_>;
}

/// Registry authentication flow backed by a [`RegistryHttpClient`].
pub struct AuthChallengeFlow<C>
where
	C: ?Sized + RegistryHttpClient,
{
	http_client: Arc<C>,
	signer: Arc<dyn ChallengeSigner>,
	challenge_url: Url,
	token_url: Url,
	lifetime: Duration,
}
impl<C> AuthChallengeFlow<C>
where
	C: ?Sized + RegistryHttpClient,
{
	/// Creates a flow that issues credentials valid for `lifetime`.
	pub fn new(
		http_client: impl Into<Arc<C>>,
		signer: Arc<dyn ChallengeSigner>,
		endpoints: &RegistryEndpoints,
		lifetime: Duration,
	) -> Self {
		Self {
			http_client: http_client.into(),
			signer,
			challenge_url: endpoints.challenge.clone(),
			token_url: endpoints.token.clone(),
			lifetime,
		}
	}

	/// Runs one authentication cycle and returns the issued credential.
	pub async fn authenticate(&self) -> Result<Credential> {
		const KIND: FlowKind = FlowKind::Renewal;

		let span = FlowSpan::new(KIND, "renew");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async {
				let challenge = self.fetch_challenge().await?;

				span.note("challenge received");

				let signature = self.signer.sign(&challenge.data).await?;
				let token = self.exchange(challenge, &signature).await?;

				Ok::<_, Error>(Credential::new(
					token.expose(),
					OffsetDateTime::now_utc(),
					self.lifetime,
				))
			})
			.await;

		match &result {
			Ok(_) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
			Err(Error::TokenRejected { .. }) =>
				obs::record_flow_outcome(KIND, FlowOutcome::Rejected),
			Err(_) => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
		}

		result
	}

	/// Fetches a fresh challenge.
	pub async fn fetch_challenge(&self) -> Result<Challenge> {
		let request = HttpRequest::get(self.challenge_url.clone());
		let response = self.call(Endpoint::Challenge, request).await?;

		Ok(response.decode(Endpoint::Challenge)?)
	}

	async fn exchange(&self, challenge: Challenge, signature: &str) -> Result<TokenSecret> {
		let body = serde_json::to_vec(&SignedChallenge { uuid: &challenge.id, data: signature })
			.map_err(|source| Error::Encode { source })?;
		let response =
			self.call(Endpoint::Token, HttpRequest::post_json(self.token_url.clone(), body)).await?;
		let status = response.status;
		let decoded = response.decode::<TokenResponse>(Endpoint::Token)?;

		match decoded.issued_token() {
			Some(token) if response.is_success() => Ok(token.clone()),
			_ => Err(Error::TokenRejected {
				status,
				code: decoded.code.clone(),
				reason: decoded.rejection_reason(),
			}),
		}
	}

	async fn call(&self, endpoint: Endpoint, request: HttpRequest) -> Result<HttpResponse> {
		self.http_client
			.execute(request)
			.await
			.map_err(|err| TransportError::network(endpoint, err).into())
	}
}
impl<C> CredentialRenewal for AuthChallengeFlow<C>
where
	C: ?Sized + RegistryHttpClient,
{
	fn renew(&self) -> RenewalFuture<'_> {
		Box::pin(self.authenticate())
	}
}
impl<C> Debug for AuthChallengeFlow<C>
where
	C: ?Sized + RegistryHttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AuthChallengeFlow")
			.field("challenge_url", &self.challenge_url.as_str())
			.field("token_url", &self.token_url.as_str())
			.field("lifetime", &self.lifetime)
			.finish()
	}
}
