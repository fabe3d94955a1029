//! Secret handling for provider credentials.

mod credentials;

pub use credentials::SecretString;
