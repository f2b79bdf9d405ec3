//! Authenticated delivery of metric sets to the push gateway.
//!
//! [`token::TokenStore`] persists the bearer credential on disk,
//! [`client::AuthClient`] attaches it to outbound requests and transparently
//! refreshes it across an authorization failure, and [`gateway::Pusher`]
//! serializes gathered samples and PUTs them to the gateway.

pub mod client;
pub mod error;
pub mod gateway;
pub mod token;
