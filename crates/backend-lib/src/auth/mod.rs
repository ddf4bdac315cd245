// ============================
// parley-backend-lib/src/auth/mod.rs
// ============================
//! Authentication: password hashing and the signup/login service.

pub mod password;
pub mod service;

pub use password::{hash_password, hash_password_secure, verify_password};
pub use service::{login, signup};
