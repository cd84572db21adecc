use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionStoreError {
    #[error("unknown session '{token}'")]
    UnknownSession { token: String },
}

impl SessionStoreError {
    #[must_use]
    pub fn unknown(token: impl Into<String>) -> Self {
        Self::UnknownSession {
            token: token.into(),
        }
    }
}
