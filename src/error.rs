use thiserror::Error;

/// Failure of a single classification call.
#[derive(Debug, Error)]
pub enum PredictionError {
    #[error("{0}")]
    Inference(#[from] anyhow::Error),

    #[error("classifier returned no prediction")]
    EmptyOutput,

    #[error("classifier returned unknown class id {0}")]
    UnknownClass(i64),
}

/// Rejected form input, raised while collecting a submission.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("unknown component type: {0}")]
    UnknownComponentType(String),

    #[error("unit {unit} is not valid for a {kind} (expected one of {allowed})")]
    InvalidUnit {
        kind: String,
        unit: String,
        allowed: String,
    },

    #[error("invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },

    #[error("malformed component {0:?}, expected TYPE:VALUE:UNIT")]
    MalformedComponent(String),

    #[error("too many components: {0} (at most {max})", max = crate::collector::MAX_COMPONENTS)]
    TooManyComponents(usize),
}
