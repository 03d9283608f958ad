//! Authentication and authorization primitives for the taskhub backend

pub mod config;
pub mod jwt;
pub mod password;

pub use config::AuthConfig;
pub use jwt::{Claims, JwtError, JwtValidator, TOKEN_TTL_SECS};
pub use password::{hash_password, verify_password, PasswordError};
