//! Core library components.
//!
//! This module contains the session gate, credential storage, the HTTP
//! client with its request augmenter, and secure reveal.

pub mod api;
pub mod clipboard;
pub mod config;
pub mod constants;
pub mod gate;
pub mod reveal;
pub mod session;
pub mod store;
pub mod types;
