//! Data Transfer Objects for the upstream API
//!
//! This module contains the wire shapes returned by the GitHub Actions API.
//! They are adapted into domain types as soon as they are received and are
//! never exposed downstream.

pub mod github;
