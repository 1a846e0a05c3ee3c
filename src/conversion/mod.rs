//! Document to typed-tree conversion

pub mod converter;

pub use converter::{convert, TreeConverter};
