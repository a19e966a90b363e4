use thiserror::Error;

/// Error type for invalid operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RSForestError {
    #[error("{0}")]
    Error(String),
    /// Malformed horizon, pole layout, missing or inconsistent constants.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),
    /// A value left the domain where the computation is defined.
    #[error("Numeric domain error in {series} at year {year}: {reason}")]
    NumericDomainError {
        series: String,
        year: i32,
        reason: String,
    },
    /// A Jacobian entry links a future input to a past output.
    ///
    /// This always indicates a defect in a local derivative.
    #[error("Causality violation: d({output})/d({input}) is {value} at output year {output_year}, input year {input_year}")]
    CausalityViolation {
        output: String,
        input: String,
        output_year: i32,
        input_year: i32,
        value: f64,
    },
    #[error("Unknown variable: {0}")]
    UnknownVariable(String),
    #[error("Series {name} covers {start}-{end}, expected {expected_start}-{expected_end}")]
    HorizonMismatch {
        name: String,
        start: i32,
        end: i32,
        expected_start: i32,
        expected_end: i32,
    },
}

/// Convenience type for `Result<T, RSForestError>`.
pub type RSForestResult<T> = Result<T, RSForestError>;
