//! Core types and engines for the Agora forum store.
//!
//! This crate is free of HTTP and storage dependencies. It defines the
//! entities, the [`store::ForumStore`] trait, and the read engines built on
//! top of it: score ranking ([`rank`]) and bounded branch expansion
//! ([`branch`]).

pub mod branch;
pub mod comment;
pub mod error;
pub mod id;
pub mod post;
pub mod rank;
pub mod store;
pub mod user;
pub mod vote;

pub use error::{Error, Result};
