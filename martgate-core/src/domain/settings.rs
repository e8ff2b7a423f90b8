// martgate-core/src/domain/settings.rs

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

/// Numeric knobs of the rule battery.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, Validate)]
#[serde(default)]
pub struct RuleSettings {
    /// Absolute tolerance between CHURN_RATE_90D and CHURNED / TOTAL.
    #[validate(range(min = 0.0), custom(function = "finite_tolerance"))]
    pub churn_rate_tolerance: f64,

    /// Allowed |ACTIVE + CHURNED - TOTAL|. Zero means exact equality.
    #[validate(range(min = 0.0), custom(function = "finite_tolerance"))]
    pub kpi_count_tolerance: f64,

    /// Max |diff| on the reconciliation column, in currency units.
    #[validate(range(min = 0.0), custom(function = "finite_tolerance"))]
    pub recon_abs_tolerance: f64,

    /// Max |CHURNED + ACTIVE - TOTAL| on the revenue split, in currency units.
    #[validate(range(min = 0.0), custom(function = "finite_tolerance"))]
    pub split_abs_tolerance: f64,

    #[validate(range(min = 1))]
    pub churn_threshold_days: i64,

    /// Row cap of every reproduction query.
    #[validate(range(min = 1, max = 1000))]
    pub sample_limit: usize,

    #[validate(
        length(min = 1, message = "at least one reconciliation marker is required"),
        custom(function = "non_blank_markers")
    )]
    pub recon_markers: Vec<String>,

    /// Pins the reconciliation column instead of discovering it by marker.
    pub recon_column: Option<String>,
}

impl Default for RuleSettings {
    fn default() -> Self {
        Self {
            churn_rate_tolerance: 0.005,
            kpi_count_tolerance: 0.0,
            recon_abs_tolerance: 1.0,
            split_abs_tolerance: 1.0,
            churn_threshold_days: 90,
            sample_limit: 10,
            recon_markers: vec!["DIFF".to_string(), "RECON".to_string()],
            recon_column: None,
        }
    }
}

// NaN slips through `range`: every comparison against it is false.
fn finite_tolerance(value: f64) -> Result<(), ValidationError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ValidationError::new("finite").with_message("tolerance must be a finite number".into()))
    }
}

/// A blank marker would match every column.
fn non_blank_markers(markers: &[String]) -> Result<(), ValidationError> {
    if markers.iter().any(|m| m.trim().is_empty()) {
        return Err(ValidationError::new("blank_marker")
            .with_message("reconciliation markers must not be blank".into()));
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(RuleSettings::default().validate().is_ok());
    }

    #[test]
    fn test_negative_tolerance_and_empty_markers_rejected() {
        let settings = RuleSettings {
            recon_abs_tolerance: -1.0,
            recon_markers: vec![],
            ..RuleSettings::default()
        };
        let errors = settings.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("recon_abs_tolerance"));
        assert!(fields.contains_key("recon_markers"));
    }

    #[test]
    fn test_nan_tolerances_rejected() {
        let settings: RuleSettings = serde_yaml::from_str(
            "churn_rate_tolerance: .nan\nsplit_abs_tolerance: .inf\n",
        )
        .unwrap();
        assert!(settings.churn_rate_tolerance.is_nan());

        let errors = settings.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("churn_rate_tolerance"));
        assert!(fields.contains_key("split_abs_tolerance"));
        assert!(!fields.contains_key("recon_abs_tolerance"));
    }

    #[test]
    fn test_blank_marker_rejected() {
        let settings = RuleSettings {
            recon_markers: vec!["DIFF".into(), "  ".into()],
            ..RuleSettings::default()
        };
        let errors = settings.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("recon_markers"));
    }
}
