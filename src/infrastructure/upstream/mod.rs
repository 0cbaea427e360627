//! Upstream contact-center platform: OAuth exchange and the authenticated
//! task API client.

pub mod client;
pub mod credentials;

pub use client::UpstreamClient;
pub use credentials::ClientCredentialsProvider;
