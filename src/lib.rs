//! Latchkey - A terminal client for a self-hosted password manager.
//!
//! # Architecture
//!
//! ```text
//! src/
//! ├── cli/              # Command-line interface
//! │   ├── status        # One-shot gate evaluation
//! │   ├── logout        # Clear stored credentials
//! │   ├── session/      # Interactive vault shell
//! │   ├── config        # Show or write config.toml
//! │   └── completions   # Shell completions
//! └── core/             # Core library components
//!     ├── api/          # REST client
//!     │   ├── mod       # ApiClient, error mapping
//!     │   ├── middleware # Header injection, forced logout
//!     │   └── models    # Wire types
//!     ├── store/        # Credential storage
//!     │   ├── mod       # CredentialStore, Scope trait
//!     │   ├── fs        # Durable file scope
//!     │   └── memory    # Volatile in-process scope
//!     ├── session       # Pure session-state derivation
//!     ├── gate          # Lock/unlock state machine
//!     ├── reveal        # Decrypt to clipboard with auto-clear
//!     ├── clipboard     # Clipboard backends
//!     └── config        # config.toml management
//! ```
//!
//! # Features
//!
//! - Master password held only in process memory, never on disk
//! - Session token and master password attached to every request
//! - Automatic logout on any `401` from the server
//! - Clipboard copies wiped after a fixed delay

pub mod cli;
pub mod core;
pub mod error;
