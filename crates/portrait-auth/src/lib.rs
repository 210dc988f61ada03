//! Portrait Authentication
//!
//! This crate provides password hashing, the encrypted-subject JWT
//! scheme, and bearer-token verification for Portrait.

pub mod cipher;
pub mod error;
pub mod jwt;
pub mod middleware;
pub mod password;

pub use cipher::SubjectCipher;
pub use error::AuthError;
pub use jwt::{Claims, JwtManager};
pub use middleware::{authenticate, extract_bearer_token};
pub use password::{hash_password, verify_password};
