use alloc::string::String;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ErosionError {
    #[error("Percentage {0} is outside of (0, 1]")]
    InvalidPercentage(f64),
    #[error("Duration for {0} must be non-zero")]
    InvalidDuration(&'static str),
    #[error("At least one initial phase is required")]
    InvalidPhaseCount,
    #[error("Invalid erosion config: {0}")]
    InvalidConfig(String),
    #[error("Island needs a non-empty path")]
    EmptyPath,
    #[error("Island needs at least {min} layers, got {layers}")]
    InvalidIsland { layers: u8, min: u8 },
    #[error("Island of {width}x{height} cells exceeds the {max} cell side limit")]
    IslandTooLarge { width: u64, height: u64, max: u64 },
}

pub type Result<T> = core::result::Result<T, ErosionError>;
