use thiserror::Error;

#[derive(Error, Debug)]
pub enum FactLensError {
    #[error("Configuration error: {0}")]
    Config(String),
}
