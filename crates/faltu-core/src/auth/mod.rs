//! Authentication module for the session gate.
//!
//! This module provides:
//! - `AuthGate`: the single writer of the stored credential, publishing an
//!   `AuthState` that the rest of the program watches
//! - `Claims`/`Identity`: local (unverified) decoding of the JWT payload
//! - `CredentialStore`: persistence for the bearer token, either a file in
//!   the cache directory or the OS keychain via keyring
//! - `parse_callback`: extraction of the token from the OAuth callback URL
//!
//! Tokens are validated locally against their `exp` claim; the server is
//! never contacted to answer "am I logged in?".

pub mod callback;
pub mod claims;
pub mod credentials;
pub mod gate;

pub use callback::{parse_callback, CallbackError};
pub use claims::{Claims, Identity};
pub use credentials::{
    CredentialStore, FileCredentialStore, KeyringCredentialStore, MemoryCredentialStore,
};
pub use gate::{AuthGate, AuthState};
