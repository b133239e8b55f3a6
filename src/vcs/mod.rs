//! Repository hosting abstraction and latest-reference resolution
//!
//! This module normalizes the GitHub, GitLab and Bitbucket REST APIs into one
//! small operation set and decides which ref represents the latest release.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   Checker   │────▶│  Resolver   │────▶│   VcsApi    │
//! │ (entry pt.) │     │ (priority)  │     │ (interface) │
//! └─────────────┘     └─────────────┘     └─────────────┘
//!                            │                   │
//!                            ▼                   ▼
//!                     ┌─────────────┐     ┌─────────────┐
//!                     │   Readme    │     │    Apis     │──▶ Transport
//!                     │(stable tag) │     │(gh,gl,bb)   │
//!                     └─────────────┘     └─────────────┘
//! ```
//!
//! # Modules
//!
//! - [`api`]: The `VcsApi` trait every provider client implements
//! - [`apis`]: Concrete clients (GitHub, GitLab, Bitbucket)
//! - [`checker`]: Host entry point constructing clients and resolving references
//! - [`error`]: Error types for construction, transport and API failures
//! - [`identity`]: Repository path extraction from URLs
//! - [`readme`]: `Stable tag` header parsing
//! - [`resolver`]: The stable tag / version tag / branch priority chain
//! - [`rest`]: Request plumbing shared by the clients
//! - [`transport`]: HTTP transport trait and its reqwest implementation
//! - [`types`]: `Reference`, `Credentials`, `Provider`
//! - [`version`]: Version-aware tag ordering

pub mod api;
pub mod apis;
pub mod checker;
pub mod error;
pub mod identity;
pub mod readme;
pub mod resolver;
pub mod rest;
pub mod transport;
pub mod types;
pub mod version;
