//! Command implementations

pub mod ask;
pub mod classify;
pub mod index;
pub mod status;
