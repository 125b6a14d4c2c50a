pub mod config;
pub mod predict;
pub mod session;
