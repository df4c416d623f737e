//! Trailblaize BFF — API routes and shared helpers for the Trailblaize web app.

pub mod api;
pub mod auth;
pub mod conference;
pub mod config;
pub mod email_classify;
pub mod error;
pub mod oauth;
pub mod outreach;
pub mod supabase;
pub mod ui;
