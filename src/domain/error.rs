use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("token is expired")]
    TokenExpired,
    #[error("invalid credential: {0}")]
    InvalidCredential(String),
    #[error("{0}")]
    Transport(String),
    #[error("{0}")]
    Config(String),
    #[error("{0}")]
    Unexpected(String),
}

impl From<reqwest::Error> for Error {
    fn from(value: reqwest::Error) -> Self {
        Self::Unexpected(value.to_string())
    }
}
impl From<serde_json::Error> for Error {
    fn from(value: serde_json::Error) -> Self {
        Self::Unexpected(value.to_string())
    }
}
impl From<std::io::Error> for Error {
    fn from(value: std::io::Error) -> Self {
        Self::Unexpected(value.to_string())
    }
}
