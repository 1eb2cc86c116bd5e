//! Repository contracts implemented by the infrastructure layer.

pub mod user;

pub use user::UserDirectory;
