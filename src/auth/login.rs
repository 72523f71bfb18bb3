//! Login collaborators that obtain a session token.
//!
//! The credential store never knows how a token is obtained; it calls a [`Login`] through the
//! client and shares the resulting future with every waiter. [`PasswordLogin`] signs in with an
//! account, [`StaticToken`] hands out a token issued elsewhere.

// self
use crate::{
	_prelude::*,
	auth::SessionToken,
	client::Client,
	error::{AuthError, DecodeError},
	http::ApiHttpClient,
	request::ApiRequest,
};

/// Endpoint accepting account credentials.
pub const SIGN_IN_TEMPLATE: &str = "auth/sign-in";

/// Boxed, owned future resolving to a freshly issued session token.
pub type LoginFuture = Pin<Box<dyn Future<Output = Result<SessionToken>> + Send>>;

/// Obtains a session token, typically by calling the API through `client`.
///
/// The returned future must own everything it needs: it outlives the call that started it and is
/// awaited by every request waiting for a token. Calls made through `client` must skip
/// authentication, or the login would wait on itself.
pub trait Login<C>
where
	Self: Send + Sync,
	C: ?Sized + ApiHttpClient,
{
	/// Starts a login.
	fn login(&self, client: Client<C>) -> LoginFuture;
}

/// Signs in with an email and password.
#[derive(Clone, Deserialize)]
pub struct PasswordLogin {
	email: String,
	password: String,
}
impl PasswordLogin {
	/// Creates a login for the given account.
	pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
		Self { email: email.into(), password: password.into() }
	}

	/// Account email.
	pub fn email(&self) -> &str {
		&self.email
	}
}
impl<C> Login<C> for PasswordLogin
where
	C: ?Sized + ApiHttpClient,
{
	fn login(&self, client: Client<C>) -> LoginFuture {
		let request = ApiRequest::new(SIGN_IN_TEMPLATE)
			.with_body(serde_json::json!({ "email": self.email, "password": self.password }))
			.skip_auth();

		Box::pin(async move {
			let response = client.dispatch(request).await?;

			token_from_sign_in(response)
		})
	}
}
impl Debug for PasswordLogin {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("PasswordLogin")
			.field("email", &self.email)
			.field("password", &"<redacted>")
			.finish()
	}
}

/// Hands out a token obtained out of band.
#[derive(Clone, Debug)]
pub struct StaticToken(SessionToken);
impl StaticToken {
	/// Wraps an existing token.
	pub fn new(token: SessionToken) -> Self {
		Self(token)
	}
}
impl<C> Login<C> for StaticToken
where
	C: ?Sized + ApiHttpClient,
{
	fn login(&self, _: Client<C>) -> LoginFuture {
		let token = self.0.clone();

		Box::pin(async move { Ok(token) })
	}
}

#[derive(Deserialize)]
struct SignInEnvelope {
	#[serde(default)]
	message: Option<String>,
	#[serde(default)]
	data: Option<SignInData>,
}

#[derive(Deserialize)]
struct SignInData {
	#[serde(default)]
	token: Option<String>,
}

fn token_from_sign_in(body: JsonValue) -> Result<SessionToken> {
	let envelope: SignInEnvelope =
		serde_path_to_error::deserialize(body).map_err(|source| DecodeError::Shape { source })?;

	match envelope.data.and_then(|data| data.token).filter(|token| !token.is_empty()) {
		Some(token) => Ok(SessionToken::new(token)),
		None => Err(AuthError::LoginRejected {
			message: envelope.message.unwrap_or_else(|| "no token in response".into()),
		}
		.into()),
	}
}
