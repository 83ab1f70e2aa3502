//! Machine status, overrides, compiler and machining summaries.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::axis::AxisMask;
use crate::filetime::FileTime;
use crate::models::codes::{CompileState, MachineState, SpindleDirection, UnitsMode};

/// `cnc.info`: the main machine status record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CncInfo {
    #[serde(rename = "units.mode")]
    pub units_mode: i32,
    #[serde(rename = "axes.mask")]
    pub axes_mask: u32,
    #[serde(rename = "state.machine")]
    pub state_machine: i32,
    #[serde(rename = "gcode.line")]
    pub gcode_line: i64,
    /// `HH:MM:SS`
    #[serde(rename = "planned.time")]
    pub planned_time: String,
    /// `HH:MM:SS`
    #[serde(rename = "worked.time")]
    pub worked_time: String,
    #[serde(rename = "hud.user.message")]
    pub hud_user_message: String,
    #[serde(rename = "current.alarm")]
    pub current_alarm: CurrentEvent,
    #[serde(rename = "current.warning")]
    pub current_warning: CurrentEvent,
    #[serde(rename = "aux.outputs")]
    pub aux_outputs: u32,
    pub coolant: Coolant,
    pub lube: Lube,
    pub feed: Feed,
    pub spindle: Spindle,
    #[serde(rename = "override")]
    pub overrides: Overrides,
    pub tool: CurrentTool,
}

impl CncInfo {
    pub fn machine_state(&self) -> MachineState {
        MachineState::from(self.state_machine)
    }

    pub fn units(&self) -> UnitsMode {
        UnitsMode::from(self.units_mode)
    }

    pub fn enabled_axes(&self) -> AxisMask {
        AxisMask::from_bits(self.axes_mask)
    }
}

/// Alarm or warning currently shown by the control software.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CurrentEvent {
    pub datetime: FileTime,
    pub code: i32,
    pub info1: i32,
    pub info2: i32,
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Coolant {
    pub mist: bool,
    pub flood: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Lube {
    #[serde(rename = "axis.cycles.made")]
    pub axis_cycles_made: i64,
    #[serde(rename = "axis.time.to.next.cycle")]
    pub axis_time_to_next_cycle: i64,
    #[serde(rename = "spindle.cycles.made")]
    pub spindle_cycles_made: i64,
    #[serde(rename = "spindle.time.to.next.cycle")]
    pub spindle_time_to_next_cycle: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Feed {
    pub programmed: f64,
    pub target: f64,
    pub reference: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Spindle {
    pub programmed: f64,
    pub target: f64,
    pub actual: f64,
    pub load: f64,
    pub torque: f64,
    pub direction: i32,
    #[serde(rename = "not.ready")]
    pub not_ready: bool,
    pub shaft: i32,
    pub status: i32,
    pub voltage: f64,
}

impl Spindle {
    pub fn rotation(&self) -> SpindleDirection {
        SpindleDirection::from(self.direction)
    }
}

/// Tool currently mounted in the spindle.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CurrentTool {
    pub id: i32,
    pub slot: i32,
    #[serde(rename = "slot.enabled")]
    pub slot_enabled: bool,
    #[serde(rename = "type")]
    pub tool_type: i32,
    pub diameter: f64,
    #[serde(rename = "offset.x")]
    pub offset_x: f64,
    #[serde(rename = "offset.y")]
    pub offset_y: f64,
    #[serde(rename = "offset.z")]
    pub offset_z: f64,
    #[serde(rename = "param.1")]
    pub param_1: f64,
    #[serde(rename = "param.2")]
    pub param_2: f64,
    #[serde(rename = "param.3")]
    pub param_3: f64,
    pub description: String,
}

// =============================================================================
// Overrides
// =============================================================================

/// Override channels exposed by the control software.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum OverrideName {
    Fast,
    Feed,
    FeedCustom1,
    FeedCustom2,
    Jog,
    PlasmaPower,
    PlasmaVoltage,
    Spindle,
}

impl OverrideName {
    pub const ALL: [OverrideName; 8] = [
        OverrideName::Fast,
        OverrideName::Feed,
        OverrideName::FeedCustom1,
        OverrideName::FeedCustom2,
        OverrideName::Jog,
        OverrideName::PlasmaPower,
        OverrideName::PlasmaVoltage,
        OverrideName::Spindle,
    ];

    /// Name used on the wire, both as `set override` argument and as key
    /// prefix inside `cnc.info`.
    pub fn as_str(self) -> &'static str {
        match self {
            OverrideName::Fast => "fast",
            OverrideName::Feed => "feed",
            OverrideName::FeedCustom1 => "feed.custom.1",
            OverrideName::FeedCustom2 => "feed.custom.2",
            OverrideName::Jog => "jog",
            OverrideName::PlasmaPower => "plasma.power",
            OverrideName::PlasmaVoltage => "plasma.voltage",
            OverrideName::Spindle => "spindle",
        }
    }
}

impl fmt::Display for OverrideName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One override channel: current percentage, limits and flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Override {
    pub value: i32,
    pub min: i32,
    pub max: i32,
    pub enabled: bool,
    pub locked: bool,
}

impl Default for Override {
    fn default() -> Self {
        Self {
            value: 0,
            min: 0,
            max: 100,
            enabled: false,
            locked: false,
        }
    }
}

/// All override channels of `cnc.info`.
///
/// On the wire this is one flat object (`feed`, `feed.min`, `feed.max`,
/// `feed.enabled`, `feed.locked`, `jog`, ...). Every channel must be
/// present for the record to decode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Map<String, Value>", into = "Map<String, Value>")]
pub struct Overrides {
    channels: BTreeMap<OverrideName, Override>,
}

impl Overrides {
    pub fn get(&self, name: OverrideName) -> Override {
        self.channels.get(&name).copied().unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (OverrideName, Override)> + '_ {
        self.channels.iter().map(|(name, value)| (*name, *value))
    }
}

impl Default for Overrides {
    fn default() -> Self {
        Self {
            channels: OverrideName::ALL
                .iter()
                .map(|name| (*name, Override::default()))
                .collect(),
        }
    }
}

impl TryFrom<Map<String, Value>> for Overrides {
    type Error = String;

    fn try_from(map: Map<String, Value>) -> Result<Self, Self::Error> {
        fn field<T: serde::de::DeserializeOwned>(
            map: &Map<String, Value>,
            key: &str,
        ) -> Result<T, String> {
            let value = map
                .get(key)
                .ok_or_else(|| format!("missing override field {:?}", key))?;
            serde_json::from_value(value.clone())
                .map_err(|e| format!("override field {:?}: {}", key, e))
        }

        let mut channels = BTreeMap::new();
        for name in OverrideName::ALL {
            let base = name.as_str();
            let channel = Override {
                value: field(&map, base)?,
                min: field(&map, &format!("{}.min", base))?,
                max: field(&map, &format!("{}.max", base))?,
                enabled: field(&map, &format!("{}.enabled", base))?,
                locked: field(&map, &format!("{}.locked", base))?,
            };
            channels.insert(name, channel);
        }
        Ok(Self { channels })
    }
}

impl From<Overrides> for Map<String, Value> {
    fn from(overrides: Overrides) -> Self {
        let mut map = Map::new();
        for (name, channel) in overrides.iter() {
            let base = name.as_str();
            map.insert(base.to_string(), channel.value.into());
            map.insert(format!("{}.min", base), channel.min.into());
            map.insert(format!("{}.max", base), channel.max.into());
            map.insert(format!("{}.enabled", base), channel.enabled.into());
            map.insert(format!("{}.locked", base), channel.locked.into());
        }
        map
    }
}

// =============================================================================
// Enabled commands
// =============================================================================

/// `enabled.commands`: which API functions the control software currently
/// accepts. Mask fields tell which axes may be homed, jogged or have their
/// program position set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnabledCommands {
    #[serde(rename = "cnc.connection.close")]
    pub cnc_connection_close: bool,
    #[serde(rename = "cnc.connection.open")]
    pub cnc_connection_open: bool,
    #[serde(rename = "cnc.continue")]
    pub cnc_continue: bool,
    #[serde(rename = "cnc.homing")]
    pub cnc_homing: u32,
    #[serde(rename = "cnc.jog.command")]
    pub cnc_jog_command: u32,
    #[serde(rename = "cnc.mdi.command")]
    pub cnc_mdi_command: bool,
    #[serde(rename = "cnc.parameters")]
    pub cnc_parameters: bool,
    #[serde(rename = "cnc.pause")]
    pub cnc_pause: bool,
    #[serde(rename = "cnc.resume")]
    pub cnc_resume: bool,
    #[serde(rename = "cnc.resume.from.line")]
    pub cnc_resume_from_line: bool,
    #[serde(rename = "cnc.resume.from.point")]
    pub cnc_resume_from_point: bool,
    #[serde(rename = "cnc.start")]
    pub cnc_start: bool,
    #[serde(rename = "cnc.start.from.line")]
    pub cnc_start_from_line: bool,
    #[serde(rename = "cnc.start.from.point")]
    pub cnc_start_from_point: bool,
    #[serde(rename = "cnc.stop")]
    pub cnc_stop: bool,
    #[serde(rename = "program.analysis")]
    pub program_analysis: bool,
    #[serde(rename = "program.analysis.abort")]
    pub program_analysis_abort: bool,
    #[serde(rename = "program.gcode.add.text")]
    pub program_gcode_add_text: bool,
    #[serde(rename = "program.gcode.clear")]
    pub program_gcode_clear: bool,
    #[serde(rename = "program.gcode.set.text")]
    pub program_gcode_set_text: bool,
    #[serde(rename = "program.load")]
    pub program_load: bool,
    #[serde(rename = "program.new")]
    pub program_new: bool,
    #[serde(rename = "program.save")]
    pub program_save: bool,
    #[serde(rename = "program.save.as")]
    pub program_save_as: bool,
    #[serde(rename = "reset.alarms")]
    pub reset_alarms: bool,
    #[serde(rename = "reset.alarms.history")]
    pub reset_alarms_history: bool,
    #[serde(rename = "reset.warnings")]
    pub reset_warnings: bool,
    #[serde(rename = "reset.warnings.history")]
    pub reset_warnings_history: bool,
    #[serde(rename = "set.program.position")]
    pub set_program_position: u32,
    #[serde(rename = "show.ui.dialog")]
    pub show_ui_dialog: bool,
    #[serde(rename = "tools.lib.write")]
    pub tools_lib_write: bool,
}

impl EnabledCommands {
    pub fn homing_axes(&self) -> AxisMask {
        AxisMask::from_bits(self.cnc_homing)
    }
}

// =============================================================================
// Program compiler and analysis
// =============================================================================

/// `compile.info`: state of the NC program compiler and its last message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompileInfo {
    pub code: i32,
    #[serde(rename = "code.line")]
    pub code_line: i64,
    #[serde(rename = "file.line")]
    pub file_line: i64,
    #[serde(rename = "file.name")]
    pub file_name: String,
    pub message: String,
    pub state: i32,
}

impl CompileInfo {
    pub fn compile_state(&self) -> CompileState {
        CompileState::from(self.state)
    }
}

/// `cnc.parameters`: a block of numbered CNC parameters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CncParameters {
    /// First parameter number of the block; filled in by the client from
    /// the request.
    #[serde(default, skip_serializing)]
    pub address: u32,
    pub values: Vec<f64>,
    pub descriptions: Vec<String>,
}

/// `machining.info`: results of the last program analysis.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MachiningInfo {
    #[serde(rename = "tool.path")]
    pub tool_path: ToolPath,
    #[serde(rename = "tcp.extents.in.fast")]
    pub tcp_extents_in_fast: LinearExtents,
    #[serde(rename = "tcp.extents.in.feed")]
    pub tcp_extents_in_feed: LinearExtents,
    #[serde(rename = "joints.in.fast")]
    pub joints_in_fast: JointExtents,
    #[serde(rename = "joints.in.feed")]
    pub joints_in_feed: JointExtents,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolPath {
    #[serde(rename = "in.fast")]
    pub in_fast: f64,
    #[serde(rename = "in.feed")]
    pub in_feed: f64,
    #[serde(rename = "total.path")]
    pub total_path: f64,
    #[serde(rename = "planned.time")]
    pub planned_time: String,
    #[serde(rename = "used.tool")]
    pub used_tools: Vec<UsedTool>,
}

/// Path length covered by one tool.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UsedTool {
    pub id: i32,
    #[serde(rename = "in.fast")]
    pub in_fast: f64,
    #[serde(rename = "in.feed")]
    pub in_feed: f64,
}

/// Tool center point bounding box.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LinearExtents {
    #[serde(rename = "min.x")]
    pub min_x: f64,
    #[serde(rename = "min.y")]
    pub min_y: f64,
    #[serde(rename = "min.z")]
    pub min_z: f64,
    #[serde(rename = "max.x")]
    pub max_x: f64,
    #[serde(rename = "max.y")]
    pub max_y: f64,
    #[serde(rename = "max.z")]
    pub max_z: f64,
    #[serde(rename = "length.x")]
    pub length_x: f64,
    #[serde(rename = "length.y")]
    pub length_y: f64,
    #[serde(rename = "length.z")]
    pub length_z: f64,
}

/// Joint space bounding box including rotary axes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JointExtents {
    #[serde(rename = "min.x")]
    pub min_x: f64,
    #[serde(rename = "min.y")]
    pub min_y: f64,
    #[serde(rename = "min.z")]
    pub min_z: f64,
    #[serde(rename = "min.a")]
    pub min_a: f64,
    #[serde(rename = "min.b")]
    pub min_b: f64,
    #[serde(rename = "min.c")]
    pub min_c: f64,
    #[serde(rename = "max.x")]
    pub max_x: f64,
    #[serde(rename = "max.y")]
    pub max_y: f64,
    #[serde(rename = "max.z")]
    pub max_z: f64,
    #[serde(rename = "max.a")]
    pub max_a: f64,
    #[serde(rename = "max.b")]
    pub max_b: f64,
    #[serde(rename = "max.c")]
    pub max_c: f64,
    #[serde(rename = "length.x")]
    pub length_x: f64,
    #[serde(rename = "length.y")]
    pub length_y: f64,
    #[serde(rename = "length.z")]
    pub length_z: f64,
    #[serde(rename = "length.a")]
    pub length_a: f64,
    #[serde(rename = "length.b")]
    pub length_b: f64,
    #[serde(rename = "length.c")]
    pub length_c: f64,
}

#[cfg(test)]
pub(crate) mod fixtures {
    use serde_json::{json, Value};

    /// A complete `cnc.info` result object.
    pub fn cnc_info_res() -> Value {
        let mut overrides = serde_json::Map::new();
        for name in [
            "fast",
            "feed",
            "feed.custom.1",
            "feed.custom.2",
            "jog",
            "plasma.power",
            "plasma.voltage",
            "spindle",
        ] {
            overrides.insert(name.to_string(), json!(100));
            overrides.insert(format!("{}.min", name), json!(0));
            overrides.insert(format!("{}.max", name), json!(200));
            overrides.insert(format!("{}.enabled", name), json!(true));
            overrides.insert(format!("{}.locked", name), json!(false));
        }
        overrides.insert("feed".into(), json!(80));

        json!({
            "units.mode": 0,
            "axes.mask": 7,
            "state.machine": 5,
            "gcode.line": 12,
            "planned.time": "00:10:00",
            "worked.time": "00:01:30",
            "hud.user.message": "",
            "current.alarm": {"datetime": 0, "code": 0, "info1": 0, "info2": 0, "text": ""},
            "current.warning": {"datetime": "133485408000000000", "code": 3, "info1": 1, "info2": 2, "text": "low air"},
            "aux.outputs": 0,
            "coolant": {"mist": false, "flood": true},
            "lube": {"axis.cycles.made": 1, "axis.time.to.next.cycle": 60,
                     "spindle.cycles.made": 2, "spindle.time.to.next.cycle": 120},
            "feed": {"programmed": 1000.0, "target": 800.0, "reference": 1000.0},
            "spindle": {"programmed": 12000, "target": 12000, "actual": 11950, "load": 12,
                        "torque": 3, "direction": 2, "not.ready": false, "shaft": 1,
                        "status": 2, "voltage": 0},
            "override": Value::Object(overrides),
            "tool": {"id": 4, "slot": 4, "slot.enabled": true, "type": 1, "diameter": 6.0,
                     "offset.x": 0.0, "offset.y": 0.0, "offset.z": 42.5,
                     "param.1": 0.0, "param.2": 0.0, "param.3": 0.0, "description": "6mm flat"}
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::{snapshot, Snapshot};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn line(res: Value) -> String {
        json!({ "res": res }).to_string()
    }

    #[test]
    fn test_cnc_info_decodes() {
        let info: CncInfo = snapshot(&line(fixtures::cnc_info_res()))
            .into_data()
            .expect("cnc.info should decode");
        assert_eq!(info.machine_state(), MachineState::Idle);
        assert_eq!(info.units(), UnitsMode::Metric);
        assert_eq!(info.enabled_axes(), AxisMask::X | AxisMask::Y | AxisMask::Z);
        assert!(info.coolant.flood);
        assert_eq!(info.spindle.rotation(), SpindleDirection::Clockwise);
        assert_eq!(info.spindle.actual, 11950.0);
        assert_eq!(info.tool.description, "6mm flat");
        assert_eq!(info.current_warning.datetime, FileTime(133_485_408_000_000_000));
    }

    #[test]
    fn test_overrides_are_indexed_by_name() {
        let info: CncInfo = snapshot(&line(fixtures::cnc_info_res())).into_data().unwrap();
        let feed = info.overrides.get(OverrideName::Feed);
        assert_eq!(
            feed,
            Override {
                value: 80,
                min: 0,
                max: 200,
                enabled: true,
                locked: false
            }
        );
        assert_eq!(info.overrides.get(OverrideName::PlasmaVoltage).value, 100);
        assert_eq!(info.overrides.iter().count(), 8);
    }

    #[test]
    fn test_missing_override_channel_empties_cnc_info() {
        let mut res = fixtures::cnc_info_res();
        res["override"]
            .as_object_mut()
            .unwrap()
            .remove("plasma.power.locked");
        let info: Snapshot<CncInfo> = snapshot(&line(res));
        assert_eq!(info, Snapshot::Empty);
    }

    #[test]
    fn test_overrides_serialize_back_to_flat_map() {
        let overrides = Overrides::default();
        let value = serde_json::to_value(&overrides).unwrap();
        assert_eq!(value["feed.custom.1.max"], json!(100));
        let back: Overrides = serde_json::from_value(value).unwrap();
        assert_eq!(back, overrides);
    }

    #[test]
    fn test_enabled_commands_decode() {
        let mut res = serde_json::Map::new();
        for key in [
            "cnc.connection.close", "cnc.connection.open", "cnc.continue", "cnc.mdi.command",
            "cnc.parameters", "cnc.pause", "cnc.resume", "cnc.resume.from.line",
            "cnc.resume.from.point", "cnc.start", "cnc.start.from.line", "cnc.start.from.point",
            "cnc.stop", "program.analysis", "program.analysis.abort", "program.gcode.add.text",
            "program.gcode.clear", "program.gcode.set.text", "program.load", "program.new",
            "program.save", "program.save.as", "reset.alarms", "reset.alarms.history",
            "reset.warnings", "reset.warnings.history", "show.ui.dialog", "tools.lib.write",
        ] {
            res.insert(key.into(), json!(true));
        }
        res.insert("cnc.homing".into(), json!(63));
        res.insert("cnc.jog.command".into(), json!(63));
        res.insert("set.program.position".into(), json!(7));

        let enabled: EnabledCommands = snapshot(&line(Value::Object(res))).into_data().unwrap();
        assert!(enabled.cnc_start);
        assert_eq!(enabled.homing_axes(), AxisMask::X_TO_C);
        assert_eq!(enabled.set_program_position, 7);
    }

    #[test]
    fn test_compile_info_decodes() {
        let res = json!({"code": 0, "code.line": 10, "file.line": 12,
                         "file.name": "part.nc", "message": "", "state": 1});
        let info: CompileInfo = snapshot(&line(res)).into_data().unwrap();
        assert_eq!(info.compile_state(), CompileState::Ready);
        assert_eq!(info.file_name, "part.nc");
    }

    #[test]
    fn test_machining_info_decodes() {
        let linear = json!({"min.x": 0, "min.y": 0, "min.z": -5, "max.x": 100, "max.y": 50,
                            "max.z": 5, "length.x": 100, "length.y": 50, "length.z": 10});
        let mut joints = serde_json::Map::new();
        for prefix in ["min", "max", "length"] {
            for axis in ["x", "y", "z", "a", "b", "c"] {
                joints.insert(format!("{}.{}", prefix, axis), json!(1.0));
            }
        }
        let res = json!({
            "tool.path": {"in.fast": 120.0, "in.feed": 800.0, "total.path": 920.0,
                          "planned.time": "00:03:00",
                          "used.tool": [{"id": 1, "in.fast": 120.0, "in.feed": 800.0}]},
            "tcp.extents.in.fast": linear.clone(),
            "tcp.extents.in.feed": linear,
            "joints.in.fast": Value::Object(joints.clone()),
            "joints.in.feed": Value::Object(joints),
        });
        let info: MachiningInfo = snapshot(&line(res)).into_data().unwrap();
        assert_eq!(info.tool_path.used_tools.len(), 1);
        assert_eq!(info.tcp_extents_in_feed.length_z, 10.0);
        assert_eq!(info.joints_in_fast.length_c, 1.0);
    }

    #[test]
    fn test_cnc_parameters_decode() {
        let res = json!({"values": [1, 2.5], "descriptions": ["a", "b"]});
        let params: CncParameters = snapshot(&line(res)).into_data().unwrap();
        assert_eq!(params.values, vec![1.0, 2.5]);
        assert_eq!(params.address, 0);
    }
}
