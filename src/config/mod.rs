/// Configuration types for actionable
///
/// This module contains the declarative rule format and the connection
/// settings for the document database.

mod connection;
mod rule;

pub use connection::ConnectionConfig;
pub use rule::{Operation, Rule};
