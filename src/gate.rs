//! Permit-gated, credential-aware document submission.
//!
//! [`SubmissionGate`] owns the client's two pieces of shared state (the [`PermitPool`] and the
//! [`CredentialCache`]) together with the transport. Every [`SubmissionGate::submit`] call takes
//! exactly one permit before anything else happens, then obtains a valid credential (renewing it
//! if needed), posts the document, and hands back the decoded registry answer. A permit spent on
//! a call that later fails is not refunded. After [`SubmissionGate::shutdown`] every call fails
//! with [`Error::Closed`] before touching the pool.

pub mod submission;

pub use submission::*;

// self
use crate::{
	_prelude::*,
	auth::{AuthChallengeFlow, ChallengeSigner, CredentialCache, CredentialRenewal},
	config::ClientConfig,
	error::TransportError,
	http::{AUTHORIZATION, Endpoint, HttpRequest, RegistryHttpClient},
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	permit::PermitPool,
};
#[cfg(feature = "reqwest")] use crate::{error::ConfigError, http::ReqwestHttpClient};

#[cfg(feature = "reqwest")]
/// Gate specialized for the crate's default reqwest transport.
pub type ReqwestGate = SubmissionGate<ReqwestHttpClient>;

/// Rate-limited, credential-caching registry client.
///
/// One gate is meant to be shared (typically behind an `Arc`) by every task that submits
/// documents for the same account. Construct it inside a tokio runtime; the permit ticker runs on
/// that runtime until [`shutdown`](Self::shutdown) is called or the gate is dropped.
pub struct SubmissionGate<C>
where
	C: ?Sized + RegistryHttpClient,
{
	http_client: RwLock<Option<Arc<C>>>,
	submission_url: Url,
	permits: PermitPool,
	credentials: CredentialCache,
}
impl<C> SubmissionGate<C>
where
	C: ?Sized + RegistryHttpClient,
{
	/// Creates a gate that authenticates through the registry challenge flow, signing challenges
	/// with `signer`.
	pub fn with_http_client(
		config: ClientConfig,
		signer: Arc<dyn ChallengeSigner>,
		http_client: impl Into<Arc<C>>,
	) -> Result<Self> {
		let http_client: Arc<C> = http_client.into();
		let flow = AuthChallengeFlow::<C>::new(
			Arc::clone(&http_client),
			signer,
			&config.endpoints,
			config.credential_lifetime,
		);

		Self::with_renewal(config, http_client, Arc::new(flow))
	}

	/// Creates a gate that obtains credentials from a caller-provided [`CredentialRenewal`].
	pub fn with_renewal(
		config: ClientConfig,
		http_client: Arc<C>,
		renewal: Arc<dyn CredentialRenewal>,
	) -> Result<Self> {
		let permits = PermitPool::start(config.request_limit, config.window())?;
		let credentials = CredentialCache::new(renewal).with_refresh_margin(config.refresh_margin);

		Ok(Self {
			http_client: RwLock::new(Some(http_client)),
			submission_url: config.endpoints.submission,
			permits,
			credentials,
		})
	}

	/// Submits a document, waiting for a permit first.
	///
	/// Registry-reported failures come back inside [`SubmissionResponse`]; only encoding,
	/// transport, decoding, and credential renewal faults are returned as [`Error`].
	pub async fn submit<D>(&self, submission: Submission<'_, D>) -> Result<SubmissionResponse>
	where
		D: ?Sized + Serialize + Sync,
	{
		self.submit_or_cancel(submission, std::future::pending::<()>()).await
	}

	/// Like [`submit`](Self::submit), but abandons the permit wait with [`Error::Cancelled`] as
	/// soon as `signal` resolves. A cancelled call consumes no permit and sends nothing.
	pub async fn submit_or_cancel<D, F>(
		&self,
		submission: Submission<'_, D>,
		signal: F,
	) -> Result<SubmissionResponse>
	where
		D: ?Sized + Serialize + Sync,
		F: Future,
	{
		const KIND: FlowKind = FlowKind::Submission;

		let span = FlowSpan::new(KIND, "submit");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async {
				if self.is_closed() {
					return Err(Error::Closed);
				}

				self.permits.acquire_or_cancel(signal).await?;

				span.note("permit acquired");

				let http_client = self.http_client.read().clone().ok_or(Error::Closed)?;
				let credential = self.credentials.get().await?;
				let body = submission.encode()?;
				let request = HttpRequest::post_json(self.submission_url.clone(), body)
					.with_header(AUTHORIZATION, credential.authorization_header());
				let response = http_client
					.execute(request)
					.await
					.map_err(|err| TransportError::network(Endpoint::Submission, err))?;

				// The registry no longer honors this credential; make the next call renew it.
				if response.status == 401 {
					self.credentials.invalidate();
				}

				let mut decoded = response.decode::<SubmissionResponse>(Endpoint::Submission)?;

				decoded.status = response.status;

				Ok::<_, Error>(decoded)
			})
			.await;

		match &result {
			Ok(response) if response.is_accepted() =>
				obs::record_flow_outcome(KIND, FlowOutcome::Success),
			Ok(_) => obs::record_flow_outcome(KIND, FlowOutcome::Rejected),
			Err(_) => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
		}

		result
	}

	/// Stops permit replenishment and releases the transport. Safe to call more than once.
	///
	/// Later calls fail with [`Error::Closed`]. Callers already waiting for a permit are not
	/// woken; once granted they fail the same way. Requests already on the wire finish on the
	/// transport handle they hold.
	pub fn shutdown(&self) {
		self.permits.stop();
		self.credentials.close();
		self.http_client.write().take();
	}

	/// Returns `true` once [`shutdown`](Self::shutdown) has been called.
	pub fn is_closed(&self) -> bool {
		self.http_client.read().is_none()
	}

	/// Permit pool shared by all submissions.
	pub fn permits(&self) -> &PermitPool {
		&self.permits
	}

	/// Credential cache shared by all submissions.
	pub fn credentials(&self) -> &CredentialCache {
		&self.credentials
	}
}
#[cfg(feature = "reqwest")]
impl SubmissionGate<ReqwestHttpClient> {
	/// Creates a gate backed by its own reqwest client.
	pub fn new(config: ClientConfig, signer: Arc<dyn ChallengeSigner>) -> Result<Self> {
		let client = ReqwestClient::builder().build().map_err(ConfigError::from)?;

		Self::with_http_client(config, signer, ReqwestHttpClient::with_client(client))
	}
}
impl<C> Debug for SubmissionGate<C>
where
	C: ?Sized + RegistryHttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("SubmissionGate")
			.field("submission_url", &self.submission_url.as_str())
			.field("permits", &self.permits)
			.field("credentials", &self.credentials)
			.field("closed", &self.is_closed())
			.finish()
	}
}
