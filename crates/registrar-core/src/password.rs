//! Password hashing and verification over bcrypt.
//!
//! The service layer never stores or compares plaintext; it stores the
//! digest produced here and checks candidates with [`verify_password`].

use bcrypt::{DEFAULT_COST, hash, verify};

use crate::errors::AppError;

pub fn hash_password(password: &str) -> Result<String, AppError> {
    Ok(hash(password, DEFAULT_COST)?)
}

pub fn verify_password(password: &str, hash: &str) -> Result<bool, AppError> {
    Ok(verify(password, hash)?)
}
