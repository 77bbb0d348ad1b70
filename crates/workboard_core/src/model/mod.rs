//! Editor document and public form model.
//!
//! # Responsibility
//! - Define the block record shared by the codec, editor and search layers.
//! - Define the public form contract types.
//!
//! # Invariants
//! - Every block is identified by a stable `BlockId`.
//! - A block's type and its type-specific fields cannot disagree.

pub mod block;
pub mod form;
