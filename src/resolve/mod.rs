//! Request resolution.
//!
//! Turns a request path into a [`RequestDescriptor`] by validating it against
//! the [`Catalog`] of bucket aliases and assortments. Resolution is pure; it
//! performs no I/O.

mod catalog;
mod descriptor;

pub use catalog::Catalog;
pub use descriptor::{DescriptorResolver, RequestDescriptor};
