//! Pipeline middleware shared by all applications.

pub mod access_log;

pub use access_log::AccessLog;
