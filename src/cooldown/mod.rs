//! Cooldown layer: hides module versions younger than a configured window
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  Upstream   │────▶│    Cache    │◀────│   Filter    │
//! │  (fetch)    │     │  (LRU, mem) │     │ (eligible?) │
//! └─────────────┘     └─────────────┘     └─────────────┘
//!        │                                       │
//!        ▼                                       ▼
//! ┌─────────────┐                         ┌─────────────┐
//! │  Go proxy   │                         │  Duration   │
//! │  (reqwest)  │                         │  (7d, 2M)   │
//! └─────────────┘                         └─────────────┘
//! ```
//!
//! # Modules
//!
//! - [`cache`]: Bounded LRU cache of version metadata keyed by (module, version)
//! - [`duration`]: Duration parser with day, month and year units
//! - [`error`]: Error types for parsing, caching and upstream requests
//! - [`filter`]: Cooldown filtering for version lists, single versions and latest
//! - [`go_proxy`]: reqwest-based client for a GOPROXY upstream
//! - [`types`]: `VersionInfo` and the eligibility cutoff
//! - [`upstream`]: Upstream trait consumed by the filter

pub mod cache;
pub mod duration;
pub mod error;
pub mod filter;
pub mod go_proxy;
pub mod types;
pub mod upstream;
