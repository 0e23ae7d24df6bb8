//! Identity: users, credentials, role profiles, and the admin
//! bootstrap.

pub mod model;
pub mod service;
