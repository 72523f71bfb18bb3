//! Session token store with a single-flight login.
//!
//! The store moves from unset to set exactly once per successful login. While a login is in
//! flight, every caller that needs a token awaits the same shared future, so concurrent requests
//! never stampede the sign-in endpoint. A failed login hands the same `Arc`-shared error to every
//! waiter and returns the store to the unset state so a later call can try again. Dropping one
//! waiter never cancels the login for the others.
//!
//! A login future only makes progress while someone awaits it. If every waiter is dropped, the
//! pending login stays parked in the store, together with the client clone it owns, until the
//! next caller resumes it; no second login is started. That client clone holds the store, so a
//! parked login keeps both alive.

// crates.io
use futures::future::{BoxFuture, FutureExt, Shared};
// self
use crate::{
	_prelude::*,
	auth::{LoginFuture, SessionToken},
	error::AuthError,
};

type LoginOutcome = Result<SessionToken, Arc<Error>>;
type SharedLogin = Shared<BoxFuture<'static, LoginOutcome>>;

enum TokenState {
	Unset,
	Fetching(SharedLogin),
	Set(SessionToken),
}

/// Holds at most one session token and deduplicates concurrent logins.
pub struct CredentialStore {
	state: Mutex<TokenState>,
}
impl CredentialStore {
	/// Creates an empty store.
	pub fn new() -> Self {
		Self { state: Mutex::new(TokenState::Unset) }
	}

	/// Creates a store that already holds `token`.
	pub fn with_token(token: SessionToken) -> Self {
		Self { state: Mutex::new(TokenState::Set(token)) }
	}

	/// Returns the current token without triggering a login.
	pub fn current(&self) -> Option<SessionToken> {
		match &*self.state.lock() {
			TokenState::Set(token) => Some(token.clone()),
			_ => None,
		}
	}

	/// Returns `true` while a login is in flight.
	pub fn is_fetching(&self) -> bool {
		matches!(&*self.state.lock(), TokenState::Fetching(_))
	}

	/// Returns the stored token, logging in through `start_login` when none is present.
	///
	/// With `allow_fetch` unset the call never waits: it yields the current token or `None`.
	/// `start_login` is invoked at most once per login cycle, under the state lock, and must
	/// only construct the future.
	pub async fn get_token<F>(
		&self,
		allow_fetch: bool,
		start_login: F,
	) -> Result<Option<SessionToken>>
	where
		F: FnOnce() -> LoginFuture,
	{
		let pending = {
			let mut state = self.state.lock();

			match &*state {
				TokenState::Set(token) => return Ok(Some(token.clone())),
				_ if !allow_fetch => return Ok(None),
				TokenState::Fetching(pending) => pending.clone(),
				TokenState::Unset => {
					let pending =
						start_login().map(|outcome| outcome.map_err(Arc::new)).boxed().shared();

					*state = TokenState::Fetching(pending.clone());

					pending
				},
			}
		};
		let outcome = pending.clone().await;

		self.settle(&pending, &outcome);

		match outcome {
			Ok(token) => Ok(Some(token)),
			Err(e) => Err(AuthError::Login(e).into()),
		}
	}

	fn settle(&self, pending: &SharedLogin, outcome: &LoginOutcome) {
		let mut state = self.state.lock();
		let current = match &*state {
			TokenState::Fetching(current) => current,
			_ => return,
		};

		if !current.ptr_eq(pending) {
			return;
		}

		*state = match outcome {
			Ok(token) => TokenState::Set(token.clone()),
			Err(_) => TokenState::Unset,
		};
	}
}
impl Default for CredentialStore {
	fn default() -> Self {
		Self::new()
	}
}
impl Debug for CredentialStore {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		let state = match &*self.state.lock() {
			TokenState::Unset => "unset",
			TokenState::Fetching(_) => "fetching",
			TokenState::Set(_) => "set",
		};

		f.debug_struct("CredentialStore").field("state", &state).finish()
	}
}

#[cfg(test)]
mod tests {
	// std
	use std::sync::atomic::{AtomicUsize, Ordering};
	// crates.io
	use futures::future;
	// self
	use super::*;
	use crate::error::NetworkError;

	fn counting_login(
		calls: &Arc<AtomicUsize>,
		succeed: bool,
	) -> impl FnOnce() -> LoginFuture + use<> {
		let calls = calls.clone();

		move || {
			calls.fetch_add(1, Ordering::SeqCst);

			Box::pin(async move {
				tokio::time::sleep(std::time::Duration::from_millis(30)).await;

				if succeed {
					Ok(SessionToken::new("shared-token"))
				} else {
					Err(NetworkError::transport(std::io::Error::other("sign-in unreachable")).into())
				}
			})
		}
	}

	#[tokio::test]
	async fn concurrent_callers_share_one_login() {
		let store = CredentialStore::new();
		let calls = Arc::new(AtomicUsize::new(0));
		let results = future::join_all(
			(0..8).map(|_| store.get_token(true, counting_login(&calls, true))),
		)
		.await;

		assert_eq!(calls.load(Ordering::SeqCst), 1);

		for result in results {
			let token = result
				.expect("Every waiter should receive the shared token.")
				.expect("Fetching callers should always receive a token.");

			assert_eq!(token.expose(), "shared-token");
		}

		assert_eq!(
			store.current().expect("Store should hold the token after login.").expose(),
			"shared-token"
		);
	}

	#[tokio::test]
	async fn failed_login_reaches_every_waiter_and_resets() {
		let store = CredentialStore::new();
		let calls = Arc::new(AtomicUsize::new(0));
		let results = future::join_all(
			(0..4).map(|_| store.get_token(true, counting_login(&calls, false))),
		)
		.await;

		assert_eq!(calls.load(Ordering::SeqCst), 1);

		let sources = results
			.into_iter()
			.map(|result| match result {
				Err(Error::Auth(AuthError::Login(source))) => source,
				other => panic!("Expected a shared login failure, got {other:?}."),
			})
			.collect::<Vec<_>>();

		assert!(sources.windows(2).all(|pair| Arc::ptr_eq(&pair[0], &pair[1])));
		assert!(store.current().is_none());
		assert!(!store.is_fetching());

		let retry = store
			.get_token(true, counting_login(&calls, true))
			.await
			.expect("A later call should retry the login.");

		assert!(retry.is_some());
		assert_eq!(calls.load(Ordering::SeqCst), 2);
	}

	#[tokio::test]
	async fn no_fetch_returns_current_token_only() {
		let store = CredentialStore::new();
		let calls = Arc::new(AtomicUsize::new(0));
		let token = store
			.get_token(false, counting_login(&calls, true))
			.await
			.expect("Peeking should never fail.");

		assert!(token.is_none());
		assert_eq!(calls.load(Ordering::SeqCst), 0);

		let seeded = CredentialStore::with_token(SessionToken::new("seeded"));
		let token = seeded
			.get_token(false, counting_login(&calls, true))
			.await
			.expect("Peeking should never fail.")
			.expect("Seeded store should return its token.");

		assert_eq!(token.expose(), "seeded");
		assert_eq!(calls.load(Ordering::SeqCst), 0);
	}

	#[tokio::test]
	async fn abandoned_waiter_does_not_cancel_login() {
		let store = Arc::new(CredentialStore::new());
		let calls = Arc::new(AtomicUsize::new(0));
		let first = {
			let store = store.clone();
			let login = counting_login(&calls, true);

			tokio::spawn(async move { store.get_token(true, login).await.map(|_| ()) })
		};

		tokio::time::sleep(std::time::Duration::from_millis(5)).await;
		first.abort();

		let token = store
			.get_token(true, counting_login(&calls, true))
			.await
			.expect("Remaining waiter should still receive the token.")
			.expect("Fetching callers should always receive a token.");

		assert_eq!(token.expose(), "shared-token");
		assert_eq!(calls.load(Ordering::SeqCst), 1);
	}

	#[test]
	fn debug_reports_state_only() {
		let store = CredentialStore::with_token(SessionToken::new("hidden"));

		assert_eq!(format!("{store:?}"), "CredentialStore { state: \"set\" }");
	}
}
