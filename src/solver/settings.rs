use super::SolverError;
use crate::algebra::*;
use derive_builder::Builder;

#[cfg(feature = "serde")]
use serde::{de::DeserializeOwned, Deserialize, Serialize};

/// Solver tuning knobs.
///
/// All defaults suit the intended real-time use: iterate without a cap until
/// convergence, stay silent, and keep the Hessian artifact in whatever
/// factor form is cheapest to produce.
#[derive(Builder, Debug, Clone)]
#[builder(build_fn(validate = "Self::validate"))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(bound = "T: Serialize + DeserializeOwned"))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Settings<T: FloatT> {
    /// tolerance for all numeric comparisons (violations, pivots, duals)
    #[builder(default = "(1e-12).as_T()")]
    pub tolerance: T,

    /// cap on inequality iterations; `None` means unlimited
    #[builder(default = "None")]
    pub max_iterations: Option<usize>,

    /// leave the inverted Cholesky factor in the Hessian artifact, so a
    /// resolve can skip the triangular inversion as well
    #[builder(default = "false")]
    pub return_inverted_factor: bool,

    /// verbose progress printing
    #[builder(default = "false")]
    pub verbose: bool,
}

impl<T> Default for Settings<T>
where
    T: FloatT,
{
    fn default() -> Settings<T> {
        SettingsBuilder::<T>::default().build().unwrap()
    }
}

impl<T> Settings<T>
where
    T: FloatT,
{
    /// Checks that the settings hold usable values.
    pub fn validate(&self) -> Result<(), SolverError> {
        if !(self.tolerance > T::zero()) || !self.tolerance.is_finite() {
            return Err(SolverError::BadSettings(
                "tolerance must be positive and finite",
            ));
        }
        Ok(())
    }
}

// pre build checker (for auto-validation when using the builder)

impl From<SolverError> for SettingsBuilderError {
    fn from(e: SolverError) -> Self {
        SettingsBuilderError::ValidationError(e.to_string())
    }
}

/// Automatic pre-build settings validation
impl<T> SettingsBuilder<T>
where
    T: FloatT,
{
    fn validate(&self) -> Result<(), SolverError> {
        if let Some(tolerance) = self.tolerance {
            if !(tolerance > T::zero()) || !tolerance.is_finite() {
                return Err(SolverError::BadSettings(
                    "tolerance must be positive and finite",
                ));
            }
        }
        Ok(())
    }
}

#[test]
fn test_settings_validate() {
    // all standard settings
    SettingsBuilder::<f64>::default().build().unwrap();

    // fail on a non-positive tolerance
    assert!(SettingsBuilder::<f64>::default()
        .tolerance(0.0)
        .build()
        .is_err());

    // directly construct bad Settings and manually check
    let settings = Settings::<f64> {
        tolerance: -1.0,
        ..Settings::default()
    };
    assert!(settings.validate().is_err());

    let settings = Settings::<f64> {
        max_iterations: Some(3),
        ..Settings::default()
    };
    assert!(settings.validate().is_ok());
}
