pub mod auth;
pub mod signup;
