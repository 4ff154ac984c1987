//! Credential providers, redacted secrets, and bearer-token decoding.

pub mod credential;
pub mod secret;
pub mod token;

pub use credential::*;
pub use secret::*;
pub use token::*;
