//! Core backdrop logic and server configuration

pub mod backdrop;
#[cfg(feature = "ssr")]
pub mod config;
