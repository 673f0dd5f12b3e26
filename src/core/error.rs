use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Config parse error: {0}")]
    Parse(String),
    #[error("Threshold order violated: auth_threshold {auth} must be below ai_threshold {ai}")]
    ThresholdOrder { auth: f64, ai: f64 },
    #[error("Value out of range: {field} = {value}")]
    OutOfRange { field: String, value: f64 },
    #[error("Weight profile '{profile}' sums to {sum}, expected 1.0")]
    WeightSum { profile: String, sum: f64 },
    #[error("Invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Error)]
pub enum FrameError {
    #[error("Frame {frame_number}: buffer length {actual} does not match {expected}")]
    BufferSize {
        frame_number: u64,
        expected: usize,
        actual: usize,
    },
    #[error("Frame {frame_number}: empty dimensions {width}x{height}")]
    EmptyDimensions {
        frame_number: u64,
        width: u32,
        height: u32,
    },
    #[error("Frame {frame_number}: decode failed: {source}")]
    Decode {
        frame_number: u64,
        #[source]
        source: image::ImageError,
    },
}

#[derive(Debug, Error)]
pub enum LogoStoreError {
    #[error("Logo directory not found: {0}")]
    DirectoryMissing(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
    #[error("Logo store error: {0}")]
    LogoStore(#[from] LogoStoreError),
    #[error("Worker pool build failed: {0}")]
    WorkerPool(String),
}
