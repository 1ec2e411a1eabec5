use log::{debug, error};

use crate::error::PredictionError;
use crate::model_inference::Classifier;
use crate::parameters::CircuitParameters;
use crate::NoiseLevel;

/// Classifies one set of circuit parameters.
///
/// The classifier sees a single row `[vdd, vth, load_capacitance, temperature]`
/// and only its first prediction is used. Class ids outside 0..=2 are an
/// error rather than a silent fallback.
pub fn predict_noise(
    classifier: &mut dyn Classifier,
    params: &CircuitParameters,
) -> Result<NoiseLevel, PredictionError> {
    let features = params.feature_matrix();
    debug!("Feature vector: {:?}", features.row(0).to_vec());

    let predictions = classifier.predict(&features).map_err(|e| {
        error!("Classifier failed: {:#}", e);
        PredictionError::Inference(e)
    })?;

    let class_id = *predictions.first().ok_or(PredictionError::EmptyOutput)?;
    NoiseLevel::from_class_id(class_id).ok_or(PredictionError::UnknownClass(class_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    struct Fixed(Vec<i64>);

    impl Classifier for Fixed {
        fn predict(&mut self, _features: &Array2<f64>) -> crate::Result<Vec<i64>> {
            Ok(self.0.clone())
        }
    }

    #[test]
    fn every_class_id_maps_to_a_level() {
        let params = CircuitParameters::default();
        for (id, level) in [(0, NoiseLevel::Low), (1, NoiseLevel::Medium), (2, NoiseLevel::High)] {
            assert_eq!(predict_noise(&mut Fixed(vec![id]), &params).unwrap(), level);
        }
    }

    #[test]
    fn only_the_first_prediction_counts() {
        let level = predict_noise(&mut Fixed(vec![2, 0]), &CircuitParameters::default()).unwrap();
        assert_eq!(level, NoiseLevel::High);
    }

    #[test]
    fn unknown_class_is_an_error() {
        let err = predict_noise(&mut Fixed(vec![7]), &CircuitParameters::default()).unwrap_err();
        assert!(matches!(err, PredictionError::UnknownClass(7)));
    }

    #[test]
    fn empty_output_is_an_error() {
        let err = predict_noise(&mut Fixed(vec![]), &CircuitParameters::default()).unwrap_err();
        assert!(matches!(err, PredictionError::EmptyOutput));
    }
}
