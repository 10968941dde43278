// Database service module
// SQLite database connection and schema management

mod connection;
mod migrations;
mod schema;

pub use connection::Database;
