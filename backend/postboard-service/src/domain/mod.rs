pub mod models;
pub mod permissions;
pub mod thread;
pub mod validation;
