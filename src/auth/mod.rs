//! Admin credentials.

mod password;

pub use password::{hash_password, is_password_hash, verify_password, PasswordError};
