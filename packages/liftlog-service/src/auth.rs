//! Bearer token resolution and per-user ownership checks.
//!
//! Both checks are pure. Callers run them before touching the pool so a rejected request
//! never issues a query.

use uuid::Uuid;

use crate::{Error, LiftlogService, Result};

/// The user a request acts as.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Principal {
	pub user_id: Uuid,
}

impl LiftlogService {
	/// Resolves a bearer token against `security.auth_keys`.
	pub fn authenticate(&self, token: Option<&str>) -> Result<Principal> {
		let Some(token) = token.map(str::trim).filter(|token| !token.is_empty()) else {
			return Err(Error::Unauthorized { message: "A bearer token is required.".to_string() });
		};
		let Some(key) = self
			.cfg
			.security
			.auth_keys
			.iter()
			.find(|key| tokens_match(key.token.as_bytes(), token.as_bytes()))
		else {
			tracing::warn!("Rejected request with an unknown bearer token.");

			return Err(Error::Unauthorized { message: "The bearer token is not valid.".to_string() });
		};

		tracing::debug!(token_id = %key.token_id, user_id = %key.user_id, "Authenticated request.");

		Ok(Principal { user_id: key.user_id })
	}
}

/// Fails with `Forbidden` when a request names a user other than the caller.
pub fn ensure_owner(principal: &Principal, requested: Option<Uuid>) -> Result<()> {
	match requested {
		Some(user_id) if user_id != principal.user_id => Err(Error::Forbidden {
			message: "Requests may only read the caller's own records.".to_string(),
		}),
		_ => Ok(()),
	}
}

// Compares every byte of equal-length tokens instead of stopping at the first mismatch.
fn tokens_match(expected: &[u8], provided: &[u8]) -> bool {
	if expected.len() != provided.len() {
		return false;
	}

	expected.iter().zip(provided).fold(0_u8, |acc, (a, b)| acc | (a ^ b)) == 0
}
