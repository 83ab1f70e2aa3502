//! Analog and digital I/O snapshots.

use serde::{Deserialize, Serialize};

/// `analog.inputs`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalogInputs {
    pub value: Vec<f64>,
}

/// `analog.outputs`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalogOutputs {
    pub value: Vec<f64>,
}

/// `digital.inputs`: one entry per input line, 0 or 1.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DigitalInputs {
    pub value: Vec<i32>,
}

impl DigitalInputs {
    pub fn is_set(&self, line: usize) -> bool {
        self.value.get(line).is_some_and(|v| *v != 0)
    }
}

/// `digital.outputs`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DigitalOutputs {
    pub value: Vec<i32>,
}

impl DigitalOutputs {
    pub fn is_set(&self, line: usize) -> bool {
        self.value.get(line).is_some_and(|v| *v != 0)
    }
}
