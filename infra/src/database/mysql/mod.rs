//! MySQL implementations of the domain repositories

pub mod user_directory;

pub use user_directory::MySqlUserDirectory;
