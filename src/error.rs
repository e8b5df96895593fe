use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),
    #[error("index out of range: position {position} not in 1..={len}")]
    IndexOutOfRange { position: u32, len: u32 },
    #[error("queue lock poisoned")]
    LockPoisoned,
    #[error("corrupt queue: {0}")]
    Corrupt(String),
}

pub type Result<T> = std::result::Result<T, Error>;
