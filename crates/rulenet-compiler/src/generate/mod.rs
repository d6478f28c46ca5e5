//! Test generation.
//!
//! - `field`: per-conjunct tests and their stage (local, join, deferred)
//! - `assemble`: per-field merging and attachment to the owning pattern
//! - `replace`: variable substitution inside sub-expressions

mod assemble;
mod field;
mod replace;


pub(crate) use field::Stage;
