//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod pending_user_repo;
pub mod session_repo;
pub mod user_repo;

pub use pending_user_repo::PendingUserRepo;
pub use session_repo::{RenewError, SessionRepo};
pub use user_repo::UserRepo;
