//! `get` requests: telemetry and configuration snapshots.

use crate::decode::Snapshot;
use crate::error::ClientError;
use crate::models::{
    AlarmsWarningsList, AnalogInputs, AnalogOutputs, AxesInfo, CncInfo, CncParameters, CompileInfo,
    CoordinateSystemsInfo, DigitalInputs, DigitalOutputs, EnabledCommands, LocalizationInfo,
    MachineSettings, MachiningInfo, ProgrammedPoints, ScanningLaserInfo, SystemInfo, ToolIndex,
    ToolLibEntry, ToolsLibCount, ToolsLibInfos, VmGeometryInfo, WorkInfo, WorkOrderCodeList,
    WorkOrderData, WorkOrderFileList,
};
use crate::protocol::Request;

use super::CncApiClient;

impl CncApiClient {
    pub fn get_alarms_current_list(&mut self) -> Snapshot<AlarmsWarningsList> {
        self.get("alarms.current.list")
    }

    pub fn get_alarms_history_list(&mut self) -> Snapshot<AlarmsWarningsList> {
        self.get("alarms.history.list")
    }

    pub fn get_analog_inputs(&mut self) -> Snapshot<AnalogInputs> {
        self.get("analog.inputs")
    }

    pub fn get_analog_outputs(&mut self) -> Snapshot<AnalogOutputs> {
        self.get("analog.outputs")
    }

    /// Axis positions, velocities and homing state.
    pub fn get_axes_info(&mut self) -> Snapshot<AxesInfo> {
        self.get("axes.info")
    }

    /// Machine state, spindle, feed, overrides and current tool.
    pub fn get_cnc_info(&mut self) -> Snapshot<CncInfo> {
        self.get("cnc.info")
    }

    /// Read `elements` parameters starting at `address`.
    pub fn get_cnc_parameters(&mut self, address: u32, elements: u32) -> Snapshot<CncParameters> {
        let request = Request::query("cnc.parameters")
            .with("address", address)
            .with("elements", elements);
        self.dispatcher
            .query::<CncParameters>(Ok(request))
            .map(|params| CncParameters { address, ..params })
    }

    pub fn get_compile_info(&mut self) -> Snapshot<CompileInfo> {
        self.get("compile.info")
    }

    pub fn get_coordinate_systems_info(&mut self) -> Snapshot<CoordinateSystemsInfo> {
        self.get("coordinate.systems.info")
    }

    pub fn get_digital_inputs(&mut self) -> Snapshot<DigitalInputs> {
        self.get("digital.inputs")
    }

    pub fn get_digital_outputs(&mut self) -> Snapshot<DigitalOutputs> {
        self.get("digital.outputs")
    }

    /// Which commands the control software accepts right now.
    pub fn get_enabled_commands(&mut self) -> Snapshot<EnabledCommands> {
        self.get("enabled.commands")
    }

    pub fn get_localization_info(&mut self) -> Snapshot<LocalizationInfo> {
        self.get("localization.info")
    }

    /// Machine type, kinematics and per-joint limits.
    pub fn get_machine_settings(&mut self) -> Snapshot<MachineSettings> {
        self.get("machine.settings")
    }

    /// Results of the last program analysis.
    pub fn get_machining_info(&mut self) -> Snapshot<MachiningInfo> {
        self.get("machining.info")
    }

    pub fn get_programmed_points(&mut self) -> Snapshot<ProgrammedPoints> {
        self.get("programmed.points")
    }

    pub fn get_scanning_laser_info(&mut self) -> Snapshot<ScanningLaserInfo> {
        self.get("scanning.laser.info")
    }

    pub fn get_system_info(&mut self) -> Snapshot<SystemInfo> {
        self.get("system.info")
    }

    pub fn get_tools_lib_count(&mut self) -> Snapshot<ToolsLibCount> {
        self.get("tools.lib.count")
    }

    /// One tool library row by position.
    pub fn get_tools_lib_info(&mut self, index: i32) -> Snapshot<ToolLibEntry> {
        self.dispatcher
            .query(Ok(Request::query("tools.lib.info").with("index", index)))
    }

    /// The whole tool library.
    pub fn get_tools_lib_infos(&mut self) -> Snapshot<ToolsLibInfos> {
        self.get("tools.lib.infos")
    }

    pub fn get_tools_lib_tool_index_from_id(&mut self, tool_id: i32) -> Snapshot<ToolIndex> {
        self.dispatcher
            .query(Ok(Request::query("tools.lib.tool.index.from.id").with("id", tool_id)))
    }

    pub fn get_warnings_current_list(&mut self) -> Snapshot<AlarmsWarningsList> {
        self.get("warnings.current.list")
    }

    pub fn get_warnings_history_list(&mut self) -> Snapshot<AlarmsWarningsList> {
        self.get("warnings.history.list")
    }

    /// Virtual machine scene elements, one per requested name, in order.
    ///
    /// An empty `names` list is rejected without contacting the server, as
    /// is a reply with a different number of elements.
    pub fn get_vm_geometry_info<S: AsRef<str>>(
        &mut self,
        names: &[S],
    ) -> Snapshot<Vec<VmGeometryInfo>> {
        let request = if names.is_empty() {
            Err(ClientError::invalid("at least one geometry name is required"))
        } else {
            let names: Vec<&str> = names.iter().map(AsRef::as_ref).collect();
            Ok(Request::query("vm.geometry.info").with("name", names))
        };
        self.dispatcher.query_list(request, names.len())
    }

    pub fn get_work_info(&mut self) -> Snapshot<WorkInfo> {
        self.get("work.info")
    }

    pub fn get_work_order_code_list(&mut self) -> Snapshot<WorkOrderCodeList> {
        self.get("work.order.code.list")
    }

    /// Full record of one work order. `mode == 1` is forwarded to the
    /// server; other values request the default view.
    pub fn get_work_order_data(&mut self, order_code: &str, mode: i32) -> Snapshot<WorkOrderData> {
        let request = Request::query("work.order.data")
            .with("order.code", order_code)
            .with_opt("mode", (mode == 1).then_some(1));
        self.dispatcher.query(Ok(request))
    }

    /// Files available for work orders, optionally below `path` and
    /// matching `file_filter`. Empty strings are not sent.
    pub fn get_work_order_file_list(
        &mut self,
        path: &str,
        file_filter: &str,
    ) -> Snapshot<WorkOrderFileList> {
        let request = Request::query("work.order.file.list")
            .with_opt("path", (!path.is_empty()).then_some(path))
            .with_opt("file.filter", (!file_filter.is_empty()).then_some(file_filter));
        self.dispatcher.query(Ok(request))
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use crate::models::cnc::fixtures::cnc_info_res;
    use crate::models::machine::fixtures::machine_settings_res;
    use crate::models::MachineState;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_cnc_info_round_trip() {
        let reply = json!({ "res": cnc_info_res() }).to_string();
        let (mut client, seen) = scripted_client(&[reply.as_str()]);
        let info = client.get_cnc_info();
        assert_eq!(info.data().map(|i| i.machine_state()), Some(MachineState::Idle));
        assert_eq!(seen.lock().unwrap().as_slice(), [r#"{"get":"cnc.info"}"#]);
    }

    #[test]
    fn test_machine_settings_all_or_nothing() {
        let full = json!({ "res": machine_settings_res() }).to_string();
        let mut partial = machine_settings_res();
        partial["axis"].as_object_mut().unwrap().remove("b.max.lim");
        let partial = json!({ "res": partial }).to_string();

        let (mut client, seen) = scripted_client(&[full.as_str(), partial.as_str()]);
        let settings = client.get_machine_settings().into_data().unwrap();
        assert_eq!(settings.axis.joint("x").map(|j| j.max_lim), Some(300.0));
        assert_eq!(client.get_machine_settings(), Snapshot::Empty);
        assert!(client.is_connected());
        assert_eq!(sent(&seen)[0], json!({"get": "machine.settings"}));
    }

    #[test]
    fn test_cnc_parameters_keep_address() {
        let (mut client, seen) =
            scripted_client(&[r#"{"res":{"values":[1.5],"descriptions":["a"]}}"#]);
        let params = client.get_cnc_parameters(100, 1).into_data().unwrap();
        assert_eq!(params.address, 100);
        assert_eq!(params.values, vec![1.5]);
        assert_eq!(
            sent(&seen)[0],
            json!({"get": "cnc.parameters", "address": 100, "elements": 1})
        );
    }

    #[test]
    fn test_vm_geometry_requires_names_and_matching_reply() {
        let item = r#"{"name":"head","x":0,"y":0,"z":0,"color":0,"scale":1,"visible":true,"edges.angle":0,"edges.visible":true}"#;
        let one = format!(r#"{{"res":[{}]}}"#, item);
        let (mut client, seen) = scripted_client(&[one.as_str(), one.as_str()]);

        let none: [&str; 0] = [];
        assert_eq!(client.get_vm_geometry_info(&none), Snapshot::Empty);
        assert!(seen.lock().unwrap().is_empty());

        let items = client.get_vm_geometry_info(&["head"]).into_data().unwrap();
        assert_eq!(items[0].name, "head");
        assert_eq!(sent(&seen)[0], json!({"get": "vm.geometry.info", "name": ["head"]}));

        let short = client.get_vm_geometry_info(&["head", "table"]);
        assert_eq!(short, Snapshot::Empty);
        assert!(client.is_connected());
    }

    #[test]
    fn test_work_order_queries_optional_arguments() {
        let (mut client, seen) = scripted_client(&[r#"{"res":[]}"#, r#"{"res":[]}"#, "{}", "{}"]);
        assert!(client.get_work_order_file_list("", "").has_data());
        assert!(client.get_work_order_file_list("jobs", "*.nc").has_data());
        assert!(!client.get_work_order_data("WO-1", 0).has_data());
        assert!(!client.get_work_order_data("WO-1", 1).has_data());

        let sent = sent(&seen);
        assert_eq!(sent[0], json!({"get": "work.order.file.list"}));
        assert_eq!(
            sent[1],
            json!({"get": "work.order.file.list", "path": "jobs", "file.filter": "*.nc"})
        );
        assert_eq!(sent[2], json!({"get": "work.order.data", "order.code": "WO-1"}));
        assert_eq!(sent[3], json!({"get": "work.order.data", "order.code": "WO-1", "mode": 1}));
    }

    #[test]
    fn test_tool_lookups_send_arguments() {
        let (mut client, seen) =
            scripted_client(&[r#"{"res":{"index":5}}"#, r#"{"res":{"count":12}}"#]);
        assert_eq!(
            client.get_tools_lib_tool_index_from_id(42).into_data(),
            Some(ToolIndex { index: 5 })
        );
        assert_eq!(client.get_tools_lib_count().data().map(|c| c.count), Some(12));
        assert_eq!(sent(&seen)[0], json!({"get": "tools.lib.tool.index.from.id", "id": 42}));
    }
}
