use thiserror::Error;

/// Invalid configuration detected at the mutator boundary, before any
/// numerical state changes.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("increment must be a positive finite number, got {0}")]
    NonPositiveIncrement(f64),

    #[error("grid dimensions must be positive, got {width}x{height}")]
    EmptyGrid { width: usize, height: usize },

    #[error("cycle count must be positive")]
    ZeroCycles,

    #[error("polynomial must have degree at least 1, got {0} coefficient(s)")]
    ConstantPolynomial(usize),

    #[error("root set must not be empty")]
    EmptyRootSet,
}
