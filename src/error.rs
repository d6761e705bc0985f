//! Errors raised by the simulation core.

/// Misuse of an agent or population operation.
///
/// These are caller errors: the core never retries them and the driver
/// treats them as fatal.
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    #[error("precondition violated: {0}")]
    PreconditionViolation(String),

    #[error("{name} must be in [{min}, {max}], but is {value}")]
    OutOfRange {
        name: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error(transparent)]
    Uniform(#[from] rand_distr::uniform::Error),

    #[error(transparent)]
    Bernoulli(#[from] rand_distr::BernoulliError),
}

/// Check that `value` lies in the closed interval `[min, max]`.
///
/// NaN is always out of range.
pub fn check_range(name: &'static str, value: f64, min: f64, max: f64) -> Result<(), SimError> {
    if !(min..=max).contains(&value) {
        return Err(SimError::OutOfRange {
            name,
            value,
            min,
            max,
        });
    }
    Ok(())
}
