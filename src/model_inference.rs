use std::cmp::Ordering;
use std::path::Path;

use anyhow::Context;
use log::{debug, info};
use ndarray::{Array2, ArrayD, Axis, Ix2};
use ort::{
    session::{
        builder::{GraphOptimizationLevel, SessionBuilder},
        Session,
    },
    value::Value,
};

use crate::Result;

/// Number of noise classes the model distinguishes.
const CLASS_COUNT: usize = 3;

/// A pre-trained model that assigns one class id per feature row.
pub trait Classifier {
    fn predict(&mut self, features: &Array2<f64>) -> Result<Vec<i64>>;
}

/// Classifier backed by an ONNX export of the trained noise model.
pub struct OnnxClassifier {
    session: Session,
}

impl OnnxClassifier {
    pub fn load<P: AsRef<Path>>(model_path: P) -> Result<Self> {
        let model_path = model_path.as_ref();
        let session = SessionBuilder::new()?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .commit_from_file(model_path)
            .with_context(|| format!("failed to load model from {}", model_path.display()))?;

        info!("Model loaded from {}", model_path.display());
        info!("Input count: {}", session.inputs.len());
        if let Some(input) = session.inputs.first() {
            info!("Input name: {}", input.name);
        }
        info!("Output count: {}", session.outputs.len());
        if let Some(output) = session.outputs.first() {
            info!("Output name: {}", output.name);
        }

        Ok(Self { session })
    }

    fn labels_from_f32(predictions: &ArrayD<f32>) -> Result<Vec<i64>> {
        match predictions.shape() {
            // Class labels stored as floats, flat or as a single column
            [_] | [_, 1] => predictions.iter().map(|&pred| float_label(pred)).collect(),
            // Per-class scores, take argmax
            [_, CLASS_COUNT] => {
                let scores = predictions.view().into_dimensionality::<Ix2>()?;
                Ok(scores
                    .rows()
                    .into_iter()
                    .map(|row| {
                        row.iter()
                            .enumerate()
                            .max_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap_or(Ordering::Equal))
                            .map(|(idx, _)| idx as i64)
                            .unwrap_or(-1)
                    })
                    .collect())
            }
            shape => Err(anyhow::anyhow!("Unexpected output tensor shape: {:?}", shape)),
        }
    }

    fn labels_from_i64(predictions: &ArrayD<i64>) -> Result<Vec<i64>> {
        match predictions.shape() {
            [_] | [_, 1] => Ok(predictions.iter().copied().collect()),
            [_, CLASS_COUNT] => {
                let scores = predictions.view().into_dimensionality::<Ix2>()?;
                Ok(scores
                    .rows()
                    .into_iter()
                    .map(|row| {
                        row.iter()
                            .enumerate()
                            .max_by(|(_, a), (_, b)| a.cmp(b))
                            .map(|(idx, _)| idx as i64)
                            .unwrap_or(-1)
                    })
                    .collect())
            }
            shape => Err(anyhow::anyhow!("Unexpected output tensor shape: {:?}", shape)),
        }
    }
}

/// A float label must hold an exact integer class id.
fn float_label(pred: f32) -> Result<i64> {
    if !pred.is_finite() || pred.fract() != 0.0 {
        return Err(anyhow::anyhow!("Non-integer class label: {}", pred));
    }
    Ok(pred as i64)
}

impl Classifier for OnnxClassifier {
    fn predict(&mut self, features: &Array2<f64>) -> Result<Vec<i64>> {
        let batch_size = features.len_of(Axis(0));

        // ONNX exports of tree models take f32 inputs
        let features_f32: Array2<f32> = features.mapv(|x| x as f32);
        let shape = features_f32.shape().to_vec();
        let data = features_f32.into_raw_vec();
        let input_tensor = Value::from_array((shape, data))?;

        let outputs = self.session.run(ort::inputs![input_tensor])?;
        let output = &outputs[0];

        let labels = if let Ok((shape, data)) = output.try_extract_tensor::<i64>() {
            let shape_vec: Vec<usize> = shape.iter().map(|&x| x as usize).collect();
            let labels = ArrayD::from_shape_vec(shape_vec, data.to_vec())?;
            Self::labels_from_i64(&labels)?
        } else if let Ok((shape, data)) = output.try_extract_tensor::<f32>() {
            let shape_vec: Vec<usize> = shape.iter().map(|&x| x as usize).collect();
            let labels = ArrayD::from_shape_vec(shape_vec, data.to_vec())?;
            Self::labels_from_f32(&labels)?
        } else {
            return Err(anyhow::anyhow!("Unsupported output tensor type"));
        };

        if labels.len() != batch_size {
            return Err(anyhow::anyhow!(
                "Prediction count mismatch: expected {}, got {}",
                batch_size,
                labels.len()
            ));
        }

        debug!("Raw predictions: {:?}", labels);
        Ok(labels)
    }
}
