//! Offer Signup: a multi-step registration wizard with offer selection.

pub mod config;
pub mod error;
pub mod services;
pub mod signup;
pub mod store;
