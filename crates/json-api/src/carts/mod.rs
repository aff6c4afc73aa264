//! Server-side cart of the signed-in user.

mod errors;
pub(crate) mod handlers;
mod models;

pub(crate) use handlers::*;
