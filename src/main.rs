use std::fs::File;
use std::io::{self, BufReader, Write};
use std::path::PathBuf;

use anyhow::Context;
use circuit_noise_predictor::collector::Prompter;
use circuit_noise_predictor::parameters::{
    DEFAULT_LOAD_CAPACITANCE, DEFAULT_TEMPERATURE, DEFAULT_VDD, DEFAULT_VTH,
};
use circuit_noise_predictor::{
    Classifier, FormInput, NoiseReport, OnnxClassifier, Result, Submission,
};
use clap::{Parser, ValueEnum};
use log::info;

/// Predicts the noise level of a circuit from its operating point
#[derive(Parser)]
#[command(name = "circuit-noise-predictor", version)]
struct Cli {
    /// ONNX export of the trained noise model
    #[arg(long, default_value = "./best_xgb_model.onnx")]
    model: PathBuf,

    /// Supply voltage in volts [0.1, 10]
    #[arg(long, default_value_t = DEFAULT_VDD)]
    vdd: f64,

    /// Threshold voltage in volts [0.1, 5]
    #[arg(long, default_value_t = DEFAULT_VTH)]
    vth: f64,

    /// Temperature in °C [-50, 200]
    #[arg(long, default_value_t = DEFAULT_TEMPERATURE, allow_negative_numbers = true)]
    temperature: i32,

    /// Load capacitance in pF [1, 1000]
    #[arg(long, default_value_t = DEFAULT_LOAD_CAPACITANCE)]
    load_capacitance: f64,

    /// Circuit component as TYPE:VALUE:UNIT, e.g. resistor:100:kΩ (up to 10)
    #[arg(long = "component", value_name = "TYPE:VALUE:UNIT")]
    components: Vec<String>,

    /// Read the form from a JSON file instead of flags
    #[arg(long, conflicts_with = "interactive")]
    input: Option<PathBuf>,

    /// Fill in the form interactively
    #[arg(short, long)]
    interactive: bool,

    /// Report format
    #[arg(long, value_enum, default_value_t = Format::Text)]
    format: Format,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Json,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    env_logger::init();

    // Model is loaded once and lives for the whole process
    info!("Using model: {}", cli.model.display());
    let mut classifier = OnnxClassifier::load(&cli.model)?;

    if cli.interactive {
        return run_interactive(&mut classifier, cli.format);
    }

    let submission = match &cli.input {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("failed to open form file {}", path.display()))?;
            FormInput::from_reader(BufReader::new(file))?.submit()?
        }
        None => submission_from_flags(&cli)?,
    };

    let report = NoiseReport::check(&mut classifier, &submission);
    emit(&report, cli.format, &mut io::stdout().lock())
}

fn submission_from_flags(cli: &Cli) -> Result<Submission> {
    Ok(Submission::from_flags(
        cli.vdd,
        cli.vth,
        cli.temperature,
        cli.load_capacitance,
        &cli.components,
    )?)
}

fn run_interactive(classifier: &mut dyn Classifier, format: Format) -> Result<()> {
    let stdin = io::stdin();
    let mut prompter = Prompter::new(stdin.lock(), io::stderr());

    while let Some(submission) = prompter.collect()? {
        let report = NoiseReport::check(classifier, &submission);
        emit(&report, format, &mut io::stdout().lock())?;

        if !prompter.confirm("Check another circuit?")? {
            break;
        }
    }

    Ok(())
}

fn emit<W: Write>(report: &NoiseReport, format: Format, out: &mut W) -> Result<()> {
    match format {
        Format::Text => report.write_text(out),
        Format::Json => report.write_json(out),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use circuit_noise_predictor::InputError;

    fn parse(args: &[&str]) -> Cli {
        let argv = std::iter::once("circuit-noise-predictor").chain(args.iter().copied());
        Cli::try_parse_from(argv).unwrap()
    }

    #[test]
    fn flags_default_to_the_form_defaults() {
        let submission = submission_from_flags(&parse(&[])).unwrap();

        assert_abs_diff_eq!(submission.parameters.vdd(), 3.3);
        assert_abs_diff_eq!(submission.parameters.vth(), 0.7);
        assert_eq!(submission.parameters.temperature(), 25);
        assert_abs_diff_eq!(submission.parameters.load_capacitance(), 10.0);
        assert!(submission.components.is_empty());
    }

    #[test]
    fn negative_temperature_and_repeated_components_parse() {
        let cli = parse(&[
            "--temperature",
            "-10",
            "--component",
            "resistor:100:kΩ",
            "--component",
            "capacitor:10:nF",
        ]);
        let submission = submission_from_flags(&cli).unwrap();

        assert_eq!(submission.parameters.temperature(), -10);
        let echoed: Vec<String> = submission.components.iter().map(|c| c.to_string()).collect();
        assert_eq!(echoed, vec!["Resistor: 100 kΩ", "Capacitor: 10 nF"]);
    }

    #[test]
    fn eleven_component_flags_are_rejected() {
        let mut args = Vec::new();
        for _ in 0..11 {
            args.extend(["--component", "v:5:V"]);
        }
        let err = submission_from_flags(&parse(&args)).unwrap_err();

        assert!(matches!(
            err.downcast_ref::<InputError>(),
            Some(InputError::TooManyComponents(11))
        ));
    }

    #[test]
    fn input_file_conflicts_with_interactive() {
        let args = ["circuit-noise-predictor", "--input", "form.json", "--interactive"];
        assert!(Cli::try_parse_from(args).is_err());
    }
}
