use std::io::{BufRead, Read, Write};
use std::str::FromStr;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::error::InputError;
use crate::parameters::{
    CircuitParameters, ComponentDescriptor, ComponentKind, DEFAULT_LOAD_CAPACITANCE,
    DEFAULT_TEMPERATURE, DEFAULT_VDD, DEFAULT_VTH,
};
use crate::Result;

pub const MAX_COMPONENTS: usize = 10;

/// Everything captured by one "Check Noise" trigger.
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub parameters: CircuitParameters,
    pub components: Vec<ComponentDescriptor>,
}

impl Submission {
    pub fn new(
        parameters: CircuitParameters,
        components: Vec<ComponentDescriptor>,
    ) -> std::result::Result<Self, InputError> {
        if components.len() > MAX_COMPONENTS {
            return Err(InputError::TooManyComponents(components.len()));
        }
        Ok(Self { parameters, components })
    }

    /// Builds a submission from command-line values. Components use the
    /// `TYPE:VALUE:UNIT` form, in the order given.
    pub fn from_flags<S: AsRef<str>>(
        vdd: f64,
        vth: f64,
        temperature: i32,
        load_capacitance: f64,
        components: &[S],
    ) -> std::result::Result<Self, InputError> {
        let parameters = CircuitParameters::new(vdd, vth, temperature, load_capacitance)?;
        let components = components
            .iter()
            .map(|spec| ComponentDescriptor::parse(spec.as_ref()))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Self::new(parameters, components)
    }
}

/// Raw form fields as they arrive from a JSON form file. Missing fields
/// take the form defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FormInput {
    pub vdd: f64,
    pub vth: f64,
    pub temperature: i32,
    pub load_capacitance: f64,
    pub components: Vec<ComponentInput>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentInput {
    #[serde(rename = "type")]
    pub kind: String,
    pub value: f64,
    pub unit: String,
}

impl Default for FormInput {
    fn default() -> Self {
        Self {
            vdd: DEFAULT_VDD,
            vth: DEFAULT_VTH,
            temperature: DEFAULT_TEMPERATURE,
            load_capacitance: DEFAULT_LOAD_CAPACITANCE,
            components: Vec::new(),
        }
    }
}

impl FormInput {
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        serde_json::from_reader(reader).context("malformed form file")
    }

    pub fn submit(&self) -> std::result::Result<Submission, InputError> {
        let parameters =
            CircuitParameters::new(self.vdd, self.vth, self.temperature, self.load_capacitance)?;
        let components = self
            .components
            .iter()
            .map(|c| ComponentDescriptor::new(ComponentKind::parse(&c.kind)?, c.value, &c.unit))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Submission::new(parameters, components)
    }
}

/// Line-oriented stand-in for the sidebar form. An empty answer keeps the
/// default shown in brackets; an invalid answer is asked again. End of
/// input ends the session.
pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Walks through the whole form once. Returns `None` if input ran out
    /// before the form was complete.
    pub fn collect(&mut self) -> Result<Option<Submission>> {
        writeln!(self.output, "Circuit Parameters")?;
        let Some(vdd) = self.ask_number("VDD (Volts)", DEFAULT_VDD)? else {
            return Ok(None);
        };
        let Some(vth) = self.ask_number("Threshold Voltage (Vth)", DEFAULT_VTH)? else {
            return Ok(None);
        };
        let Some(temperature) = self.ask_number("Temperature (°C)", DEFAULT_TEMPERATURE)? else {
            return Ok(None);
        };
        let Some(load_capacitance) =
            self.ask_number("Load Capacitance (pF)", DEFAULT_LOAD_CAPACITANCE)?
        else {
            return Ok(None);
        };

        writeln!(self.output, "Circuit Components")?;
        let Some(count) = self.ask("Number of Components", "0", |answer| {
            match answer.parse::<usize>() {
                Ok(n) if n <= MAX_COMPONENTS => Ok(n),
                _ => Err(format!("enter a whole number between 0 and {}", MAX_COMPONENTS)),
            }
        })?
        else {
            return Ok(None);
        };

        let mut components = Vec::with_capacity(count);
        for i in 1..=count {
            let Some(component) = self.ask_component(i)? else {
                return Ok(None);
            };
            components.push(component);
        }

        let parameters = CircuitParameters::new(vdd, vth, temperature, load_capacitance)?;
        Ok(Some(Submission::new(parameters, components)?))
    }

    /// Yes/no question defaulting to no.
    pub fn confirm(&mut self, question: &str) -> Result<bool> {
        let answer = self.ask(question, "n", |answer| match answer.to_lowercase().as_str() {
            "y" | "yes" => Ok(true),
            "n" | "no" => Ok(false),
            _ => Err("answer y or n".to_string()),
        })?;
        Ok(answer.unwrap_or(false))
    }

    fn ask_component(&mut self, index: usize) -> Result<Option<ComponentDescriptor>> {
        let Some(kind) = self.ask(&format!("Component {} Type", index), "Resistor", |answer| {
            ComponentKind::parse(answer).map_err(|e| e.to_string())
        })?
        else {
            return Ok(None);
        };
        let Some(value) = self.ask("Value", "0", |answer| parse_finite::<f64>(answer))? else {
            return Ok(None);
        };
        let units = kind.units();
        let Some(unit) = self.ask(&format!("Unit ({})", units.join("/")), units[0], |answer| {
            kind.resolve_unit(answer).map_err(|e| e.to_string())
        })?
        else {
            return Ok(None);
        };

        Ok(Some(ComponentDescriptor::new(kind, value, unit)?))
    }

    fn ask_number<T: FiniteNumber>(&mut self, label: &str, default: T) -> Result<Option<T>> {
        self.ask(label, &default.to_string(), |answer| parse_finite::<T>(answer))
    }

    fn ask<T>(
        &mut self,
        label: &str,
        default: &str,
        parse: impl Fn(&str) -> std::result::Result<T, String>,
    ) -> Result<Option<T>> {
        loop {
            write!(self.output, "{} [{}]: ", label, default)?;
            self.output.flush()?;

            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                return Ok(None);
            }
            let answer = match line.trim() {
                "" => default,
                answer => answer,
            };

            match parse(answer) {
                Ok(value) => return Ok(Some(value)),
                Err(reason) => writeln!(self.output, "  invalid input: {}", reason)?,
            }
        }
    }
}

/// Numeric form fields that can carry a non-finite value.
trait FiniteNumber: FromStr + ToString {
    fn is_finite_number(&self) -> bool;
}

impl FiniteNumber for f64 {
    fn is_finite_number(&self) -> bool {
        self.is_finite()
    }
}

impl FiniteNumber for i32 {
    fn is_finite_number(&self) -> bool {
        true
    }
}

/// Parses a number, rejecting NaN and infinities.
fn parse_finite<T: FiniteNumber>(answer: &str) -> std::result::Result<T, String> {
    let value = answer
        .parse::<T>()
        .map_err(|_| format!("{:?} is not a number", answer))?;
    if !value.is_finite_number() {
        return Err(format!("{:?} is not a finite number", answer));
    }
    Ok(value)
}
