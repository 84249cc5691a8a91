//! Internal implementation modules for `pxb-core`.
//!
//! Most callers should go through [`crate::Backend`] rather than importing
//! these modules directly.

pub mod backend;
pub mod distribution;
pub mod error;
pub mod filter;
pub mod hash;
pub mod metadata;
pub mod outcome;
pub mod record;
pub mod walk;
