use thiserror::Error;

/// Construction-time failures. Once built, an index never fails on insert or query.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum IndexError {
    #[error("Invalid index configuration: {0}")]
    InvalidConfig(String),
    #[error("Invalid region: R [{min_r}, {max_r}], G [{min_g}, {max_g}]")]
    InvalidRegion {
        min_r: f64,
        max_r: f64,
        min_g: f64,
        max_g: f64,
    },
}

pub type Result<T> = std::result::Result<T, IndexError>;
