//! Core domain types
//!
//! This module contains the structures that flow from the resolver into the
//! state cache and out to the renderers. They are shared between the server
//! (which caches them) and the CLI (which prints them directly).

pub mod filter;
pub mod repository;
pub mod run;
