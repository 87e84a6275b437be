//! Client side state: what the browser holds between requests and how it
//! talks to the JSON API.
//!
//! Everything in here is single threaded. Shared state lives in one
//! [`store::Store`]; components read through it and only change it through
//! its entry points.

pub mod client;
pub mod favorite;
pub mod nav;
pub mod store;
pub mod watch;

#[cfg(test)]
pub(crate) mod fake;
