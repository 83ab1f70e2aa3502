//! Machine functions switched by `cnc.change.function.state.mode`.
//!
//! Each function accepts only its own set of modes: outputs (spindle,
//! coolant, torch, auxiliaries) take off/on/toggle, the jog mode function
//! takes the three jog modes. Any other pair is rejected before sending.

use std::fmt;

use crate::error::ClientError;

/// Number of auxiliary digital outputs (`Aux(1)` ... `Aux(32)`).
pub const AUX_OUTPUTS: u8 = 32;

const AUX_BASE: i32 = 40;

/// Function whose state can be changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FunctionStateName {
    SpindleCw,
    SpindleCcw,
    Mist,
    Flood,
    Torch,
    ThcDisabled,
    JogMode,
    /// Auxiliary digital output, numbered from 1.
    Aux(u8),
}

impl FunctionStateName {
    pub fn code(self) -> i32 {
        match self {
            Self::SpindleCw => 0,
            Self::SpindleCcw => 1,
            Self::Mist => 10,
            Self::Flood => 11,
            Self::Torch => 20,
            Self::ThcDisabled => 21,
            Self::JogMode => 30,
            Self::Aux(n) => AUX_BASE + i32::from(n) - 1,
        }
    }

    /// Whether `mode` is meaningful for this function.
    pub fn accepts(self, mode: FunctionStateMode) -> bool {
        match self {
            Self::JogMode => mode.is_jog_mode(),
            _ => !mode.is_jog_mode(),
        }
    }
}

impl TryFrom<i32> for FunctionStateName {
    type Error = ClientError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        let name = match value {
            0 => Self::SpindleCw,
            1 => Self::SpindleCcw,
            10 => Self::Mist,
            11 => Self::Flood,
            20 => Self::Torch,
            21 => Self::ThcDisabled,
            30 => Self::JogMode,
            n if (AUX_BASE..AUX_BASE + i32::from(AUX_OUTPUTS)).contains(&n) => {
                // In range, so the narrowing cannot truncate.
                Self::Aux((n - AUX_BASE + 1) as u8)
            }
            other => {
                return Err(ClientError::invalid(format!(
                    "unknown function state name {}",
                    other
                )))
            }
        };
        Ok(name)
    }
}

impl fmt::Display for FunctionStateName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SpindleCw => f.write_str("spindle cw"),
            Self::SpindleCcw => f.write_str("spindle ccw"),
            Self::Mist => f.write_str("mist"),
            Self::Flood => f.write_str("flood"),
            Self::Torch => f.write_str("torch"),
            Self::ThcDisabled => f.write_str("thc disabled"),
            Self::JogMode => f.write_str("jog mode"),
            Self::Aux(n) => write!(f, "aux {:02}", n),
        }
    }
}

/// Requested state for a [`FunctionStateName`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum FunctionStateMode {
    Off = 0,
    On = 1,
    Toggle = 2,
    JogModeDefault = 3,
    JogModeAlongTool = 4,
    JogModeToggle = 5,
}

impl FunctionStateMode {
    pub fn code(self) -> i32 {
        self as i32
    }

    fn is_jog_mode(self) -> bool {
        matches!(
            self,
            Self::JogModeDefault | Self::JogModeAlongTool | Self::JogModeToggle
        )
    }
}

impl TryFrom<i32> for FunctionStateMode {
    type Error = ClientError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        let mode = match value {
            0 => Self::Off,
            1 => Self::On,
            2 => Self::Toggle,
            3 => Self::JogModeDefault,
            4 => Self::JogModeAlongTool,
            5 => Self::JogModeToggle,
            other => {
                return Err(ClientError::invalid(format!(
                    "function state mode {} out of range 0..=5",
                    other
                )))
            }
        };
        Ok(mode)
    }
}

/// Check a raw name/mode pair against the allowed combinations.
///
/// # Errors
///
/// Returns [`ClientError::Validation`] for an unknown name or mode, or a
/// mode the function does not accept.
pub fn validate(name: i32, mode: i32) -> Result<(FunctionStateName, FunctionStateMode), ClientError> {
    let name = FunctionStateName::try_from(name)?;
    let mode = FunctionStateMode::try_from(mode)?;
    if !name.accepts(mode) {
        return Err(ClientError::invalid(format!(
            "mode {:?} not allowed for {}",
            mode, name
        )));
    }
    Ok((name, mode))
}
