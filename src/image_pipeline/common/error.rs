use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
    
    #[error("Corrupt RAW data: {0}")]
    CorruptData(String),
    
    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),
    
    #[error("Invalid image dimensions: width={0}, height={1}")]
    InvalidDimensions(f64, f64),
    
    #[error("Render pipeline failed: {0}")]
    Render(String),
    
    #[error("Background task failed: {0}")]
    TaskFailed(String),
    
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
