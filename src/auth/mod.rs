//! Authentication support for the chat client.
//!
//! Only reading is supported: tokens are issued by the platform's sign-in
//! flow and stored under the `authToken` / `tokenType` keys.

pub mod credentials;

pub use credentials::{AuthToken, CredentialsStore, StoredCredentials, DEFAULT_TOKEN_TYPE};
