use std::fmt;

use log::warn;
use ndarray::{arr2, Array2};
use serde::Serialize;

use crate::error::InputError;

pub const VDD_RANGE: (f64, f64) = (0.1, 10.0);
pub const VTH_RANGE: (f64, f64) = (0.1, 5.0);
pub const TEMPERATURE_RANGE: (i32, i32) = (-50, 200);
pub const LOAD_CAPACITANCE_RANGE: (f64, f64) = (1.0, 1000.0);

pub const DEFAULT_VDD: f64 = 3.3;
pub const DEFAULT_VTH: f64 = 0.7;
pub const DEFAULT_TEMPERATURE: i32 = 25;
pub const DEFAULT_LOAD_CAPACITANCE: f64 = 10.0;

/// Number of features the classifier expects per sample.
pub const FEATURE_COUNT: usize = 4;

/// Operating point of the circuit under test. Values are clamped into
/// their bounds on construction and never change afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CircuitParameters {
    vdd: f64,
    vth: f64,
    temperature: i32,
    load_capacitance: f64,
}

impl CircuitParameters {
    pub fn new(
        vdd: f64,
        vth: f64,
        temperature: i32,
        load_capacitance: f64,
    ) -> Result<Self, InputError> {
        Ok(Self {
            vdd: clamp_float("vdd", vdd, VDD_RANGE)?,
            vth: clamp_float("vth", vth, VTH_RANGE)?,
            temperature: clamp_int("temperature", temperature, TEMPERATURE_RANGE),
            load_capacitance: clamp_float(
                "load_capacitance",
                load_capacitance,
                LOAD_CAPACITANCE_RANGE,
            )?,
        })
    }

    pub fn vdd(&self) -> f64 {
        self.vdd
    }

    pub fn vth(&self) -> f64 {
        self.vth
    }

    pub fn temperature(&self) -> i32 {
        self.temperature
    }

    pub fn load_capacitance(&self) -> f64 {
        self.load_capacitance
    }

    /// Single-sample feature matrix of shape (1, 4), ordered
    /// `[vdd, vth, load_capacitance, temperature]`.
    pub fn feature_matrix(&self) -> Array2<f64> {
        arr2(&[[
            self.vdd,
            self.vth,
            self.load_capacitance,
            self.temperature as f64,
        ]])
    }

    /// Labelled values echoed back under "Circuit Details".
    pub fn details(&self) -> Vec<(&'static str, String)> {
        vec![
            ("VDD", format!("{} V", self.vdd)),
            ("Threshold Voltage", format!("{} V", self.vth)),
            ("Temperature", format!("{} °C", self.temperature)),
            ("Load Capacitance", format!("{} pF", self.load_capacitance)),
        ]
    }
}

impl Default for CircuitParameters {
    fn default() -> Self {
        Self {
            vdd: DEFAULT_VDD,
            vth: DEFAULT_VTH,
            temperature: DEFAULT_TEMPERATURE,
            load_capacitance: DEFAULT_LOAD_CAPACITANCE,
        }
    }
}

fn clamp_float(field: &str, value: f64, (min, max): (f64, f64)) -> Result<f64, InputError> {
    if !value.is_finite() {
        return Err(InputError::InvalidValue {
            field: field.to_string(),
            value: value.to_string(),
        });
    }
    let clamped = value.clamp(min, max);
    if clamped != value {
        warn!("{} = {} is outside [{}, {}], using {}", field, value, min, max, clamped);
    }
    Ok(clamped)
}

fn clamp_int(field: &str, value: i32, (min, max): (i32, i32)) -> i32 {
    let clamped = value.clamp(min, max);
    if clamped != value {
        warn!("{} = {} is outside [{}, {}], using {}", field, value, min, max, clamped);
    }
    clamped
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ComponentKind {
    Resistor,
    Capacitor,
    VoltageSource,
    CurrentSource,
}

impl ComponentKind {
    pub const ALL: [ComponentKind; 4] = [
        ComponentKind::Resistor,
        ComponentKind::Capacitor,
        ComponentKind::VoltageSource,
        ComponentKind::CurrentSource,
    ];

    pub fn units(&self) -> &'static [&'static str] {
        match self {
            ComponentKind::Resistor => &["Ω", "kΩ", "MΩ"],
            ComponentKind::Capacitor => &["pF", "nF", "μF"],
            ComponentKind::VoltageSource => &["V", "mV"],
            ComponentKind::CurrentSource => &["A", "mA", "μA"],
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ComponentKind::Resistor => "Resistor",
            ComponentKind::Capacitor => "Capacitor",
            ComponentKind::VoltageSource => "Voltage Source",
            ComponentKind::CurrentSource => "Current Source",
        }
    }

    /// Accepts the display name or a short alias, ignoring case.
    pub fn parse(token: &str) -> Result<Self, InputError> {
        let normalized: String = token
            .trim()
            .to_lowercase()
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '_'))
            .collect();

        match normalized.as_str() {
            "resistor" | "r" => Ok(ComponentKind::Resistor),
            "capacitor" | "c" => Ok(ComponentKind::Capacitor),
            "voltagesource" | "v" => Ok(ComponentKind::VoltageSource),
            "currentsource" | "i" => Ok(ComponentKind::CurrentSource),
            _ => Err(InputError::UnknownComponentType(token.to_string())),
        }
    }

    /// Resolves a unit token against this kind's unit set. ASCII spellings
    /// (`ohm`, `kohm`, `Mohm`, `uF`, `uA`) map onto their symbols. `Mohm`
    /// is case-sensitive: lowercase `mohm` would read as milliohm, which no
    /// unit set offers.
    pub fn resolve_unit(&self, token: &str) -> Result<&'static str, InputError> {
        let token = token.trim();
        let symbol = match token {
            "Mohm" | "Mohms" => "MΩ",
            _ => match token.to_lowercase().as_str() {
                "ohm" | "ohms" => "Ω",
                "kohm" | "kohms" => "kΩ",
                "uf" | "µf" => "μF",
                "ua" | "µa" => "μA",
                _ => token,
            },
        };

        self.units()
            .iter()
            .copied()
            .find(|unit| *unit == symbol)
            .ok_or_else(|| InputError::InvalidUnit {
                kind: self.as_str().to_string(),
                unit: token.to_string(),
                allowed: self.units().join(", "),
            })
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A passive or source element listed alongside the circuit. Only echoed
/// in the report; the classifier never sees it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComponentDescriptor {
    kind: ComponentKind,
    value: f64,
    unit: &'static str,
}

impl ComponentDescriptor {
    pub fn new(kind: ComponentKind, value: f64, unit: &str) -> Result<Self, InputError> {
        let unit = kind.resolve_unit(unit)?;
        if !value.is_finite() {
            return Err(InputError::InvalidValue {
                field: format!("{} value", kind),
                value: value.to_string(),
            });
        }
        let value = if value < 0.0 {
            warn!("{} value {} is negative, using 0", kind, value);
            0.0
        } else {
            value
        };

        Ok(Self { kind, value, unit })
    }

    /// Parses the `TYPE:VALUE:UNIT` form used on the command line.
    pub fn parse(spec: &str) -> Result<Self, InputError> {
        let parts: Vec<&str> = spec.split(':').collect();
        let [kind, value, unit] = parts.as_slice() else {
            return Err(InputError::MalformedComponent(spec.to_string()));
        };

        let kind = ComponentKind::parse(kind)?;
        let value = value.trim().parse::<f64>().map_err(|_| InputError::InvalidValue {
            field: format!("{} value", kind),
            value: value.to_string(),
        })?;

        Self::new(kind, value, unit)
    }

    pub fn kind(&self) -> ComponentKind {
        self.kind
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn unit(&self) -> &'static str {
        self.unit
    }
}

impl fmt::Display for ComponentDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} {}", self.kind, self.value, self.unit)
    }
}
