//! Authentication

mod errors;
mod models;
mod password;
mod repository;
mod service;
mod tokens;

pub use errors::*;
pub use models::*;
pub use password::{hash_password, verify_password};
pub use service::*;
pub use tokens::*;
