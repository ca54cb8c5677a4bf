pub mod password;

pub use password::{CredentialHasher, HashingConfig};
