//! Scheduler layer for the server
//!
//! Owns the background loop that refreshes the state store from the
//! upstream workflow source on a fixed interval.

pub mod poller;

pub use poller::StatePoller;
