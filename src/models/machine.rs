//! Static machine configuration: joint types, limits and kinematics.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::models::codes::{AxisType, KinematicsModel, MachineType};

/// Joint key prefixes in `machine.settings`, ordered X, Y, Z, A, B, C.
pub const JOINT_NAMES: [&str; 6] = ["x", "y", "z", "a", "b", "c"];

/// `machine.settings`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MachineSettings {
    pub axis: AxisSettings,
}

/// Type and dynamic limits of one joint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct JointSettings {
    pub joint_type: i32,
    pub max_vel: f64,
    pub acc: f64,
    pub min_lim: f64,
    pub max_lim: f64,
}

impl JointSettings {
    pub fn kind(&self) -> AxisType {
        AxisType::from(self.joint_type)
    }

    pub fn is_enabled(&self) -> bool {
        self.kind() != AxisType::Disabled
    }
}

/// The `axis` group of `machine.settings`.
///
/// The wire object is flat (`x.type`, `x.max.vel`, ..., `kinematics.h.x`);
/// every key must be present for the record to decode.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Map<String, Value>", into = "Map<String, Value>")]
pub struct AxisSettings {
    pub machine_type: i32,
    pub kinematics_model: i32,
    /// Ordered as [`JOINT_NAMES`].
    pub joints: [JointSettings; 6],
    /// Kinematics H vector (x, y, z).
    pub kinematics_h: [f64; 3],
    /// Kinematics J vector (x, y, z).
    pub kinematics_j: [f64; 3],
}

impl AxisSettings {
    pub fn machine(&self) -> MachineType {
        MachineType::from(self.machine_type)
    }

    pub fn kinematics(&self) -> KinematicsModel {
        KinematicsModel::from(self.kinematics_model)
    }

    /// Settings of the joint called `name` (`"x"` ... `"c"`).
    pub fn joint(&self, name: &str) -> Option<&JointSettings> {
        JOINT_NAMES
            .iter()
            .position(|joint| *joint == name)
            .map(|index| &self.joints[index])
    }
}

fn take<T: serde::de::DeserializeOwned>(map: &Map<String, Value>, key: &str) -> Result<T, String> {
    let value = map
        .get(key)
        .ok_or_else(|| format!("missing machine setting {:?}", key))?;
    serde_json::from_value(value.clone()).map_err(|e| format!("machine setting {:?}: {}", key, e))
}

impl TryFrom<Map<String, Value>> for AxisSettings {
    type Error = String;

    fn try_from(map: Map<String, Value>) -> Result<Self, Self::Error> {
        let mut joints = [JointSettings::default(); 6];
        for (joint, name) in joints.iter_mut().zip(JOINT_NAMES) {
            *joint = JointSettings {
                joint_type: take(&map, &format!("{}.type", name))?,
                max_vel: take(&map, &format!("{}.max.vel", name))?,
                acc: take(&map, &format!("{}.acc", name))?,
                min_lim: take(&map, &format!("{}.min.lim", name))?,
                max_lim: take(&map, &format!("{}.max.lim", name))?,
            };
        }

        let vector = |prefix: &str| -> Result<[f64; 3], String> {
            Ok([
                take(&map, &format!("{}.x", prefix))?,
                take(&map, &format!("{}.y", prefix))?,
                take(&map, &format!("{}.z", prefix))?,
            ])
        };

        Ok(Self {
            machine_type: take(&map, "machine.type")?,
            kinematics_model: take(&map, "kinematics.model")?,
            joints,
            kinematics_h: vector("kinematics.h")?,
            kinematics_j: vector("kinematics.j")?,
        })
    }
}

impl From<AxisSettings> for Map<String, Value> {
    fn from(settings: AxisSettings) -> Self {
        let mut map = Map::new();
        map.insert("machine.type".into(), settings.machine_type.into());
        map.insert("kinematics.model".into(), settings.kinematics_model.into());
        for (joint, name) in settings.joints.iter().zip(JOINT_NAMES) {
            map.insert(format!("{}.type", name), joint.joint_type.into());
            map.insert(format!("{}.max.vel", name), joint.max_vel.into());
            map.insert(format!("{}.acc", name), joint.acc.into());
            map.insert(format!("{}.min.lim", name), joint.min_lim.into());
            map.insert(format!("{}.max.lim", name), joint.max_lim.into());
        }
        for (prefix, vector) in [
            ("kinematics.h", settings.kinematics_h),
            ("kinematics.j", settings.kinematics_j),
        ] {
            for (axis, value) in ["x", "y", "z"].iter().zip(vector) {
                map.insert(format!("{}.{}", prefix, axis), value.into());
            }
        }
        map
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::JOINT_NAMES;
    use serde_json::{json, Map, Value};

    /// A three-axis mill with X/Y/Z enabled.
    pub fn machine_settings_res() -> Value {
        let mut axis = Map::new();
        axis.insert("machine.type".into(), json!(0));
        axis.insert("kinematics.model".into(), json!(0));
        for (index, name) in JOINT_NAMES.iter().enumerate() {
            let enabled = index < 3;
            axis.insert(format!("{}.type", name), json!(if enabled { 1 } else { 0 }));
            axis.insert(format!("{}.max.vel", name), json!(if enabled { 5000.0 } else { 0.0 }));
            axis.insert(format!("{}.acc", name), json!(if enabled { 800.0 } else { 0.0 }));
            axis.insert(format!("{}.min.lim", name), json!(-10.0 * index as f64));
            axis.insert(format!("{}.max.lim", name), json!(300.0));
        }
        for prefix in ["kinematics.h", "kinematics.j"] {
            for axis_name in ["x", "y", "z"] {
                axis.insert(format!("{}.{}", prefix, axis_name), json!(0.0));
            }
        }
        json!({ "axis": axis })
    }
}
