//! Hosted database/auth backend access.

pub mod admin;
mod client;

pub use admin::AdminClient;
pub use client::SupabaseClient;
