//! Flowboard Core
//!
//! Core types shared by the Flowboard client, server and CLI.
//!
//! This crate contains:
//! - Domain types: workflow runs, run parameters, repository snapshots and filters
//! - DTOs: wire representations of the GitHub Actions REST API

pub mod domain;
pub mod dto;
