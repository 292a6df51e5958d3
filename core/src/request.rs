//! Per-iteration request records

use crate::config::{LoadTestConfig, ShapeBase};

/// One synthetic input and the output length the service must produce for it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestRecord {
    /// Value sent to the transform endpoint
    pub original_input: String,

    /// Length (in characters) the transformed value must have
    pub expected_output_length: usize,
}

impl RequestRecord {
    /// Record whose expected length is the input length plus `suffix_length`
    pub fn new(original_input: impl Into<String>, suffix_length: usize) -> Self {
        let original_input = original_input.into();
        let expected_output_length = original_input.chars().count() + suffix_length;
        Self {
            original_input,
            expected_output_length,
        }
    }

    /// Record with an explicit expected length
    pub fn with_expected_length(original_input: impl Into<String>, expected: usize) -> Self {
        Self {
            original_input: original_input.into(),
            expected_output_length: expected,
        }
    }
}

/// Synthesizes `<prefix>test<n>` inputs
#[derive(Debug, Clone)]
pub struct InputGenerator {
    prefix: String,
    suffix_length: usize,
    shape_base: ShapeBase,
}

impl InputGenerator {
    /// Create a generator
    pub fn new(prefix: impl Into<String>, suffix_length: usize, shape_base: ShapeBase) -> Self {
        Self {
            prefix: prefix.into(),
            suffix_length,
            shape_base,
        }
    }

    /// Create a generator from the load test config
    pub fn from_config(config: &LoadTestConfig) -> Self {
        Self::new(
            config.input_prefix.clone(),
            config.suffix_length,
            config.shape_base,
        )
    }

    /// Prefix every input starts with
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Build the record for a worker's `iteration`
    pub fn record(&self, iteration: usize) -> RequestRecord {
        let input = format!("{}test{}", self.prefix, iteration);
        match self.shape_base {
            ShapeBase::Input => RequestRecord::new(input, self.suffix_length),
            ShapeBase::Prefix => RequestRecord::with_expected_length(
                input,
                self.prefix.chars().count() + self.suffix_length,
            ),
        }
    }
}
