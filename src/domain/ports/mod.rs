//! Port trait definitions (Hexagonal Architecture)
//!
//! - TokenProvider: obtains a fresh bearer token from the identity provider
//! - UpstreamApi: authenticated calls against the contact-center task API
//! - TaskFeed: queue and history lists as seen by the widget
//!
//! Services depend on these traits only, so tests can swap in
//! [`MockUpstream`](crate::adapters::mock_upstream::MockUpstream) or a
//! counting token provider.

pub mod task_feed;
pub mod token_provider;
pub mod upstream_api;

pub use task_feed::TaskFeed;
pub use token_provider::TokenProvider;
pub use upstream_api::{RequestOptions, UpstreamApi};
