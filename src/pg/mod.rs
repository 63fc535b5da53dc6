pub mod connection;
pub mod deploy;
pub mod extract;

pub use connection::PgConnection;
pub use deploy::{deploy, DeployReport};
pub use extract::{extract, extract_model};
