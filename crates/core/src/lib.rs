//! Domain types shared across the Gatehouse workspace.
//!
//! Keeps the pieces with no I/O of their own: the error taxonomy, ID and
//! timestamp aliases, and the verification-code generator.

pub mod error;
pub mod otp;
pub mod types;
