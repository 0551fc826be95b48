use thiserror::Error;

#[derive(Debug, Error)]
pub enum DictionaryError {
    #[error("failed to build dictionary index: {0}")]
    Build(#[from] fst::Error),

    #[error("failed to read dictionary source: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("spell-check engine has stopped")]
    EngineStopped,

    #[error("engine rejected request: {0}")]
    Rejected(String),
}
