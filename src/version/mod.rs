//! The metadata schema versions understood by this crate.

pub use self::v13::*;

pub mod v13;
