//! Record types the demo can browse.

pub mod files;
pub mod people;
