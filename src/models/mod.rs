//! Domain model module declarations.

pub mod entry;
pub mod submission;
