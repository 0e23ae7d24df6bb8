//! Identity data models and DTOs.
//!
//! Re-exported from the `registrar-models` crate.

pub use registrar_models::users::*;
