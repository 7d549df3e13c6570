use error::Error;

pub mod collect;
pub mod connection;
pub mod error;
pub mod token;
pub mod utils;

pub type Result<T, E = Error> = std::result::Result<T, E>;
