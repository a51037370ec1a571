//! Modal popup components
//!
//! The page alert dialog and the key help screen.

pub mod alert;
pub mod help;
