//! Domain model structs and DTOs.
//!
//! Each submodule contains a `FromRow` entity struct matching the database
//! row, plus create DTOs where inserts take more than a couple of scalars.

pub mod pending_user;
pub mod session;
pub mod user;
