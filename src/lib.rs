//! Chairside - streaming chat client for the dental-clinic booking platform
//!
//! This library exposes modules for use in integration tests.

pub mod adapters;
pub mod auth;
pub mod chat;
pub mod config;
pub mod error;
pub mod notifications;
pub mod reader;
pub mod session;
pub mod spacing;
pub mod sse;
pub mod thinking;
pub mod token;
pub mod traits;
