//! Authentication building blocks: token codec, password/OTP hashing,
//! cookie handling, and the per-request reauthentication procedure.

pub mod cookies;
pub mod password;
pub mod reauth;
pub mod tokens;
