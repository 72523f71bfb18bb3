//! Credential material, session tokens, and the single-flight login store.

pub mod credentials;
pub mod login;
pub mod secret;
pub mod store;

pub use credentials::*;
pub use login::*;
pub use secret::*;
pub use store::*;
