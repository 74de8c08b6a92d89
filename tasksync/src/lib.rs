//! Client-side state synchronizer for a remote task list.
//!
//! The remote service owns the canonical, ordered collection of tasks.
//! This crate keeps a local mirror ([`store::TaskStore`]) that only changes
//! when the service answers, derives filtered views of it, and presents a
//! bounded window of rows at a time.

pub mod cli;
pub mod config;
pub mod edit;
pub mod filter;
pub mod gateway;
pub mod store;
pub mod window;
