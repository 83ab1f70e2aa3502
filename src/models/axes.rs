//! Axis positions, coordinate systems and machine geometry.

use serde::{Deserialize, Serialize};

use crate::axis::AxisMask;

/// `axes.info`: positions and homing state of every joint.
///
/// Position vectors are ordered X, Y, Z, A, B, C.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AxesInfo {
    #[serde(rename = "joint.position")]
    pub joint_position: Vec<f64>,
    #[serde(rename = "machine.position")]
    pub machine_position: Vec<f64>,
    #[serde(rename = "program.position")]
    pub program_position: Vec<f64>,
    #[serde(rename = "machine.target.position")]
    pub machine_target_position: Vec<f64>,
    #[serde(rename = "program.target.position")]
    pub program_target_position: Vec<f64>,
    #[serde(rename = "actual.velocity")]
    pub actual_velocity: Vec<f64>,
    /// Active work coordinate system (1 = G54 ...).
    #[serde(rename = "working.wcs")]
    pub working_wcs: i32,
    #[serde(rename = "working.offset")]
    pub working_offset: Vec<f64>,
    #[serde(rename = "dynamic.offset")]
    pub dynamic_offset: Vec<f64>,
    #[serde(rename = "homing.done")]
    pub homing_done: bool,
    #[serde(rename = "homing.done.mask")]
    pub homing_done_mask: u32,
}

impl AxesInfo {
    pub fn homed_axes(&self) -> AxisMask {
        AxisMask::from_bits(self.homing_done_mask)
    }
}

/// `coordinate.systems.info`: the active WCS and all nine stored offsets.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CoordinateSystemsInfo {
    #[serde(rename = "working.wcs")]
    pub working_wcs: i32,
    #[serde(rename = "working.offset")]
    pub working_offset: Vec<f64>,
    #[serde(rename = "wcs.1")]
    pub wcs_1: Vec<f64>,
    #[serde(rename = "wcs.2")]
    pub wcs_2: Vec<f64>,
    #[serde(rename = "wcs.3")]
    pub wcs_3: Vec<f64>,
    #[serde(rename = "wcs.4")]
    pub wcs_4: Vec<f64>,
    #[serde(rename = "wcs.5")]
    pub wcs_5: Vec<f64>,
    #[serde(rename = "wcs.6")]
    pub wcs_6: Vec<f64>,
    #[serde(rename = "wcs.7")]
    pub wcs_7: Vec<f64>,
    #[serde(rename = "wcs.8")]
    pub wcs_8: Vec<f64>,
    #[serde(rename = "wcs.9")]
    pub wcs_9: Vec<f64>,
}

impl CoordinateSystemsInfo {
    /// Offsets of WCS `index` (1..=9).
    pub fn wcs(&self, index: usize) -> Option<&[f64]> {
        let offsets = match index {
            1 => &self.wcs_1,
            2 => &self.wcs_2,
            3 => &self.wcs_3,
            4 => &self.wcs_4,
            5 => &self.wcs_5,
            6 => &self.wcs_6,
            7 => &self.wcs_7,
            8 => &self.wcs_8,
            9 => &self.wcs_9,
            _ => return None,
        };
        Some(offsets)
    }
}

/// `programmed.points`: tool path points of the loaded program, as sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProgrammedPoints {
    pub points: Vec<serde_json::Value>,
}

/// `scanning.laser.info`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScanningLaserInfo {
    #[serde(rename = "laser.out.bit")]
    pub laser_out_bit: i32,
    #[serde(rename = "laser.out.umf")]
    pub laser_out_umf: i32,
    #[serde(rename = "laser.h.measure")]
    pub laser_h_measure: f64,
    #[serde(rename = "laser.mcs.x.position")]
    pub laser_mcs_x_position: f64,
    #[serde(rename = "laser.mcs.y.position")]
    pub laser_mcs_y_position: f64,
    #[serde(rename = "laser.mcs.z.position")]
    pub laser_mcs_z_position: f64,
}

/// One element of the virtual machine 3D scene (`vm.geometry.info`).
///
/// The same shape is used to query and to update elements.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VmGeometryInfo {
    pub name: String,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    /// RGB packed as an integer.
    pub color: u32,
    pub scale: f64,
    pub visible: bool,
    #[serde(rename = "edges.angle")]
    pub edges_angle: f64,
    #[serde(rename = "edges.visible")]
    pub edges_visible: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::{snapshot, Snapshot};
    use pretty_assertions::assert_eq;

    const AXES_INFO: &str = r#"{"res":{
        "joint.position":[1.0,2.0,3.0,0.0,0.0,0.0],
        "machine.position":[1.0,2.0,3.0,0.0,0.0,0.0],
        "program.position":[0.5,1.5,2.5,0.0,0.0,0.0],
        "machine.target.position":[1.0,2.0,3.0,0.0,0.0,0.0],
        "program.target.position":[0.5,1.5,2.5,0.0,0.0,0.0],
        "actual.velocity":[0,0,0,0,0,0],
        "working.wcs":1,
        "working.offset":[0.5,0.5,0.5,0.0,0.0,0.0],
        "dynamic.offset":[0.0,0.0,0.0],
        "homing.done":true,
        "homing.done.mask":7
    }}"#;

    #[test]
    fn test_axes_info_decodes() {
        let info: Snapshot<AxesInfo> = snapshot(AXES_INFO);
        let info = info.into_data().expect("axes info should decode");
        assert_eq!(info.machine_position[..3], [1.0, 2.0, 3.0]);
        assert_eq!(info.actual_velocity, vec![0.0; 6]);
        assert_eq!(info.working_wcs, 1);
        assert!(info.homing_done);
        assert_eq!(info.homed_axes(), AxisMask::X | AxisMask::Y | AxisMask::Z);
    }

    #[test]
    fn test_axes_info_missing_field_is_empty() {
        let broken = AXES_INFO.replace("\"homing.done.mask\":7", "\"homing.mask\":7");
        let info: Snapshot<AxesInfo> = snapshot(&broken);
        assert_eq!(info, Snapshot::Empty);
    }

    #[test]
    fn test_coordinate_systems_lookup() {
        let mut line = String::from(r#"{"res":{"working.wcs":2,"working.offset":[1,2,3,0,0,0]"#);
        for i in 1..=9 {
            line.push_str(&format!(r#","wcs.{}":[{},0,0,0,0,0]"#, i, i));
        }
        line.push_str("}}");

        let info: CoordinateSystemsInfo = snapshot(&line).into_data().unwrap();
        assert_eq!(info.wcs(2).map(|w| w[0]), Some(2.0));
        assert_eq!(info.wcs(9).map(|w| w[0]), Some(9.0));
        assert_eq!(info.wcs(0), None);
        assert_eq!(info.wcs(10), None);
    }

    #[test]
    fn test_vm_geometry_list_decodes() {
        let line = r#"{"res":[
            {"name":"table","x":0,"y":0,"z":-10.5,"color":16711680,"scale":1.0,
             "visible":true,"edges.angle":30.0,"edges.visible":false}
        ]}"#;
        let items: Vec<VmGeometryInfo> = snapshot(line).into_data().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name, "table");
        assert_eq!(items[0].z, -10.5);
        assert_eq!(items[0].color, 0xFF0000);
    }
}
