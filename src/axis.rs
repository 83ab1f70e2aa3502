//! Axis bit masks and jog commands.

use std::fmt;
use std::ops::BitOr;

use crate::error::ClientError;

/// Bit set of machine axes as used by homing and `axes.mask` fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct AxisMask(u32);

impl AxisMask {
    pub const X: AxisMask = AxisMask(0x0001);
    pub const Y: AxisMask = AxisMask(0x0002);
    pub const Z: AxisMask = AxisMask(0x0004);
    pub const A: AxisMask = AxisMask(0x0008);
    pub const B: AxisMask = AxisMask(0x0010);
    pub const C: AxisMask = AxisMask(0x0020);
    pub const U: AxisMask = AxisMask(0x0040);
    pub const V: AxisMask = AxisMask(0x0080);
    pub const W: AxisMask = AxisMask(0x0100);

    /// X through C, the axes that can be homed.
    pub const X_TO_C: AxisMask = AxisMask(0x003F);
    /// Every axis the controller knows.
    pub const X_TO_W: AxisMask = AxisMask(0x01FF);

    /// Wrap raw bits without checking.
    pub const fn from_bits(bits: u32) -> Self {
        AxisMask(bits)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub const fn contains(self, other: AxisMask) -> bool {
        self.0 & other.0 == other.0
    }

    /// Validate a mask for `cnc.homing`: nonzero and restricted to X..C.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Validation`] for an empty mask or one that
    /// names U, V, W or undefined bits.
    pub fn for_homing(bits: u32) -> Result<Self, ClientError> {
        let mask = AxisMask(bits);
        if mask.is_empty() || !Self::X_TO_C.contains(mask) {
            return Err(ClientError::invalid(format!(
                "homing axes mask {:#x} must be nonzero and within {:#x}",
                bits,
                Self::X_TO_C.0
            )));
        }
        Ok(mask)
    }
}

impl BitOr for AxisMask {
    type Output = AxisMask;

    fn bitor(self, rhs: AxisMask) -> AxisMask {
        AxisMask(self.0 | rhs.0)
    }
}

impl fmt::Display for AxisMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const NAMES: [char; 9] = ['X', 'Y', 'Z', 'A', 'B', 'C', 'U', 'V', 'W'];
        if self.is_empty() {
            return f.write_str("-");
        }
        for (bit, name) in NAMES.iter().enumerate() {
            if self.0 & (1 << bit) != 0 {
                write!(f, "{}", name)?;
            }
        }
        Ok(())
    }
}

/// Jog command codes accepted by `cnc.jog.command`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum JogCommand {
    /// Stop the active jog movement.
    None = 0,
    XBackward = 1,
    XForward = 2,
    YBackward = 3,
    YForward = 4,
    ZBackward = 5,
    ZForward = 6,
    ABackward = 7,
    AForward = 8,
    BBackward = 9,
    BForward = 10,
    CBackward = 11,
    CForward = 12,
}

impl JogCommand {
    pub fn code(self) -> i32 {
        self as i32
    }
}

impl TryFrom<i32> for JogCommand {
    type Error = ClientError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        let command = match value {
            0 => Self::None,
            1 => Self::XBackward,
            2 => Self::XForward,
            3 => Self::YBackward,
            4 => Self::YForward,
            5 => Self::ZBackward,
            6 => Self::ZForward,
            7 => Self::ABackward,
            8 => Self::AForward,
            9 => Self::BBackward,
            10 => Self::BForward,
            11 => Self::CBackward,
            12 => Self::CForward,
            other => {
                return Err(ClientError::invalid(format!(
                    "jog command {} out of range 0..=12",
                    other
                )))
            }
        };
        Ok(command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_homing_mask_accepts_x_to_c() {
        for bits in 1..=0x3F {
            assert!(AxisMask::for_homing(bits).is_ok(), "mask {:#x} rejected", bits);
        }
    }

    #[test]
    fn test_homing_mask_rejects_empty_and_uvw() {
        assert!(AxisMask::for_homing(0).is_err());
        assert!(AxisMask::for_homing(AxisMask::U.bits()).is_err());
        assert!(AxisMask::for_homing(0x3F | 0x100).is_err());
        assert!(AxisMask::for_homing(0x8000_0000).is_err());
    }

    #[test]
    fn test_mask_composition_and_display() {
        let mask = AxisMask::X | AxisMask::Y | AxisMask::Z;
        assert_eq!(mask.bits(), 0x7);
        assert!(AxisMask::X_TO_W.contains(mask));
        assert_eq!(mask.to_string(), "XYZ");
        assert_eq!(AxisMask::default().to_string(), "-");
    }

    #[test]
    fn test_jog_command_range() {
        for code in 0..=12 {
            let jog = JogCommand::try_from(code).expect("in range");
            assert_eq!(jog.code(), code);
        }
        assert!(JogCommand::try_from(-1).is_err());
        assert!(JogCommand::try_from(13).is_err());
        assert!(JogCommand::try_from(i32::MAX).is_err());
    }
}
