//! Internal utilities for the mbcomp multiband compressor.
//!
//! Shared between `mbcomp-core` and the compressor crate. Everything here is
//! `const fn` where possible and has no external dependencies.
//!
//! # Contents
//!
//! - [`fnv1a_32`] - FNV-1a hash used to derive parameter IDs from parameter keys

pub mod hash;

pub use hash::fnv1a_32;
