//! Credential lifecycle: challenge signing, token exchange, and the shared credential cache.

pub mod cache;
pub mod challenge;
pub mod credential;
pub mod flow;
pub mod signer;

pub use cache::*;
pub use challenge::*;
pub use credential::*;
pub use flow::*;
pub use signer::*;
