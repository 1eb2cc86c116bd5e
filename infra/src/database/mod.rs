//! Database module - MySQL implementations using SQLx

pub mod connection;
pub mod mysql;

pub use connection::connect_pool;
pub use mysql::MySqlUserDirectory;
