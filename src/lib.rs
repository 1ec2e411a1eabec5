pub mod advisory;
pub mod collector;
pub mod error;
pub mod model_inference;
pub mod parameters;
pub mod predictor;
pub mod report;

pub use collector::{FormInput, Submission};
pub use error::{InputError, PredictionError};
pub use model_inference::{Classifier, OnnxClassifier};
pub use parameters::{CircuitParameters, ComponentDescriptor, ComponentKind};
pub use predictor::predict_noise;
pub use report::NoiseReport;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NoiseLevel {
    Low = 0,
    Medium = 1,
    High = 2,
}

impl NoiseLevel {
    pub fn from_class_id(value: i64) -> Option<Self> {
        match value {
            0 => Some(NoiseLevel::Low),
            1 => Some(NoiseLevel::Medium),
            2 => Some(NoiseLevel::High),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            NoiseLevel::Low => "Low",
            NoiseLevel::Medium => "Medium",
            NoiseLevel::High => "High",
        }
    }
}

impl std::fmt::Display for NoiseLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

pub type Result<T> = anyhow::Result<T>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn class_ids_map_to_levels() {
        assert_eq!(NoiseLevel::from_class_id(0), Some(NoiseLevel::Low));
        assert_eq!(NoiseLevel::from_class_id(1), Some(NoiseLevel::Medium));
        assert_eq!(NoiseLevel::from_class_id(2), Some(NoiseLevel::High));
    }

    #[test]
    fn out_of_domain_class_ids_have_no_level() {
        assert_eq!(NoiseLevel::from_class_id(-1), None);
        assert_eq!(NoiseLevel::from_class_id(3), None);
    }

    #[test]
    fn labels_are_plain_level_names() {
        assert_eq!(NoiseLevel::Medium.to_string(), "Medium");
        assert_eq!(NoiseLevel::High as usize, 2);
    }
}
