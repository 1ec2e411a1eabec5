use std::io::Write;

use log::info;
use serde::Serialize;

use crate::advisory::noise_reduction_tips;
use crate::collector::Submission;
use crate::model_inference::Classifier;
use crate::parameters::ComponentDescriptor;
use crate::predictor::predict_noise;
use crate::{NoiseLevel, Result};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Detail {
    pub name: &'static str,
    pub value: String,
}

/// What the user sees after pressing "Check Noise".
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum NoiseReport {
    Classified {
        noise_level: NoiseLevel,
        tips: Vec<&'static str>,
        details: Vec<Detail>,
        components: Vec<ComponentDescriptor>,
    },
    Failed {
        error: String,
    },
}

impl NoiseReport {
    /// Runs one classification and turns the outcome into a report. A
    /// prediction failure becomes an inline error, never a partial result.
    pub fn check(classifier: &mut dyn Classifier, submission: &Submission) -> Self {
        match predict_noise(classifier, &submission.parameters) {
            Ok(noise_level) => {
                info!("Noise level prediction: {}", noise_level);
                NoiseReport::Classified {
                    noise_level,
                    tips: noise_reduction_tips(noise_level).to_vec(),
                    details: submission
                        .parameters
                        .details()
                        .into_iter()
                        .map(|(name, value)| Detail { name, value })
                        .collect(),
                    components: submission.components.clone(),
                }
            }
            Err(e) => NoiseReport::Failed {
                error: format!("Error predicting noise: {}", e),
            },
        }
    }

    pub fn noise_level(&self) -> Option<NoiseLevel> {
        match self {
            NoiseReport::Classified { noise_level, .. } => Some(*noise_level),
            NoiseReport::Failed { .. } => None,
        }
    }

    pub fn write_text<W: Write>(&self, out: &mut W) -> Result<()> {
        match self {
            NoiseReport::Classified {
                noise_level,
                tips,
                details,
                components,
            } => {
                writeln!(out, "# Noise Level: {}", noise_level)?;

                if !tips.is_empty() {
                    writeln!(out)?;
                    writeln!(out, "## Noise Reduction Tips")?;
                    for tip in tips {
                        writeln!(out, "- {}", tip)?;
                    }
                }

                writeln!(out)?;
                writeln!(out, "## Circuit Details")?;
                for detail in details {
                    writeln!(out, "{}: {}", detail.name, detail.value)?;
                }

                if !components.is_empty() {
                    writeln!(out)?;
                    writeln!(out, "## Circuit Components")?;
                    for component in components {
                        writeln!(out, "{}", component)?;
                    }
                }
            }
            NoiseReport::Failed { error } => writeln!(out, "{}", error)?,
        }
        Ok(())
    }

    pub fn write_json<W: Write>(&self, out: &mut W) -> Result<()> {
        serde_json::to_writer_pretty(&mut *out, self)?;
        writeln!(out)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parameters::{CircuitParameters, ComponentKind};
    use ndarray::Array2;

    struct Failing;

    impl Classifier for Failing {
        fn predict(&mut self, _features: &Array2<f64>) -> Result<Vec<i64>> {
            Err(anyhow::anyhow!("model exploded"))
        }
    }

    struct Fixed(i64);

    impl Classifier for Fixed {
        fn predict(&mut self, _features: &Array2<f64>) -> Result<Vec<i64>> {
            Ok(vec![self.0])
        }
    }

    fn render(report: &NoiseReport) -> String {
        let mut out = Vec::new();
        report.write_text(&mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    fn submission(components: Vec<ComponentDescriptor>) -> Submission {
        Submission::new(CircuitParameters::default(), components).unwrap()
    }

    #[test]
    fn low_noise_report_has_no_tip_section() {
        let text = render(&NoiseReport::check(&mut Fixed(0), &submission(vec![])));

        assert_eq!(
            text,
            "# Noise Level: Low\n\
             \n\
             ## Circuit Details\n\
             VDD: 3.3 V\n\
             Threshold Voltage: 0.7 V\n\
             Temperature: 25 °C\n\
             Load Capacitance: 10 pF\n"
        );
    }

    #[test]
    fn components_section_follows_details() {
        let source = ComponentDescriptor::new(ComponentKind::VoltageSource, 5.0, "V").unwrap();
        let components = vec![source];
        let text = render(&NoiseReport::check(&mut Fixed(1), &submission(components)));

        assert!(text.contains("## Noise Reduction Tips\n- Shield Your Cables"));
        assert!(text.ends_with("## Circuit Components\nVoltage Source: 5 V\n"));
    }

    #[test]
    fn failure_renders_only_the_error() {
        let report = NoiseReport::check(&mut Failing, &submission(vec![]));

        assert_eq!(report.noise_level(), None);
        assert_eq!(render(&report), "Error predicting noise: model exploded\n");
    }

    #[test]
    fn json_report_carries_level_and_tips() {
        let report = NoiseReport::check(&mut Fixed(2), &submission(vec![]));
        let mut out = Vec::new();
        report.write_json(&mut out).unwrap();

        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["noise_level"], "High");
        assert_eq!(value["tips"].as_array().unwrap().len(), 4);
        assert_eq!(value["details"][0]["name"], "VDD");
        assert_eq!(value["details"][0]["value"], "3.3 V");
    }

    #[test]
    fn json_failure_has_only_an_error_field() {
        let report = NoiseReport::check(&mut Failing, &submission(vec![]));
        let mut out = Vec::new();
        report.write_json(&mut out).unwrap();

        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value.as_object().unwrap().len(), 1);
        assert!(value["error"].as_str().unwrap().contains("model exploded"));
    }
}
