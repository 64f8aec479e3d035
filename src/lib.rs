//! ProofLayer rate limiting.
//!
//! An in-memory, fixed-window rate limiter for request handlers. Each
//! identifier (typically an operation name plus a client address) gets a
//! counter that resets when its window ends; a background sweep evicts
//! windows nobody revisits. The store lives in one process, so each
//! instance of a horizontally scaled deployment enforces its own limit.

pub mod client_ip;
pub mod config;
pub mod error;
pub mod headers;
pub mod http;
pub mod ratelimit;
