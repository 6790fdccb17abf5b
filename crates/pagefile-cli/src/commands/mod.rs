pub mod apply;
pub mod config;
pub mod list;
pub mod validate;
