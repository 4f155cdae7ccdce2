//! Command implementations

pub mod colors;
pub mod exons;
pub mod layout;
