//! `cmd` requests: actions answered with a boolean.

use crate::axis::{AxisMask, JogCommand};
use crate::error::ClientError;
use crate::function_state::{self, FunctionStateMode, FunctionStateName};
use crate::models::{ToolsLibUpdate, WorkOrderDraft};
use crate::protocol::Request;

use super::CncApiClient;

/// Flags for `cnc.connection.open`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConnectionOpenOptions {
    pub use_ui: bool,
    pub use_fast_mode: bool,
    pub skip_firmware_check: bool,
    pub overwrite_cnc_settings: bool,
}

impl CncApiClient {
    /// Switch a machine function (spindle, coolant, torch, auxiliary
    /// output, jog mode) using raw codes.
    ///
    /// A name/mode pair the function does not accept returns `false`
    /// without contacting the server.
    pub fn cnc_change_function_state_mode(&mut self, name: i32, mode: i32) -> bool {
        let request = function_state::validate(name, mode).map(|(name, mode)| {
            Request::command("cnc.change.function.state.mode")
                .with("name", name.code())
                .with("mode", mode.code())
        });
        self.command(request)
    }

    pub fn cnc_change_function_state(
        &mut self,
        name: FunctionStateName,
        mode: FunctionStateMode,
    ) -> bool {
        self.cnc_change_function_state_mode(name.code(), mode.code())
    }

    /// Close the link between the control software and the CNC board.
    pub fn cnc_connection_close(&mut self) -> bool {
        self.simple_command("cnc.connection.close")
    }

    /// Open the link between the control software and the CNC board.
    ///
    /// The server only acknowledges the command; the connection itself is
    /// established asynchronously and shows up in `cnc.info`.
    pub fn cnc_connection_open(&mut self, options: ConnectionOpenOptions) -> bool {
        let request = Request::command("cnc.connection.open")
            .with("use.ui", options.use_ui)
            .with("use.fast.mode", options.use_fast_mode)
            .with("skip.firmware.check", options.skip_firmware_check)
            .with("overwrite.cnc.settings", options.overwrite_cnc_settings);
        self.command(Ok(request))
    }

    /// Leave PAUSE and continue the program, macro or MDI command.
    pub fn cnc_continue(&mut self) -> bool {
        self.simple_command("cnc.continue")
    }

    /// Home the axes in `axes_mask`.
    ///
    /// The mask must be nonzero and limited to X..C (`0x3F`); anything else
    /// returns `false` without contacting the server.
    pub fn cnc_homing(&mut self, axes_mask: u32) -> bool {
        let request = AxisMask::for_homing(axes_mask)
            .map(|mask| Request::command("cnc.homing").with("axes.mask", mask.bits()));
        self.command(request)
    }

    /// Start or stop a jog movement. `command` must be in `0..=12`
    /// (see [`JogCommand`]).
    pub fn cnc_jog_command(&mut self, command: i32) -> bool {
        let request = JogCommand::try_from(command)
            .map(|jog| Request::command("cnc.jog.command").with("command", jog.code()));
        self.command(request)
    }

    pub fn cnc_jog(&mut self, command: JogCommand) -> bool {
        self.cnc_jog_command(command.code())
    }

    /// Execute one MDI block.
    pub fn cnc_mdi_command(&mut self, command: &str) -> bool {
        self.command(Ok(Request::command("cnc.mdi.command").with("command", command)))
    }

    pub fn cnc_pause(&mut self) -> bool {
        self.simple_command("cnc.pause")
    }

    /// Resume the program after a STOP; `line > 0` resumes at that line.
    pub fn cnc_resume(&mut self, line: i64) -> bool {
        let line = (line > 0).then_some(line);
        self.command(Ok(Request::command("cnc.resume").with_opt("line", line)))
    }

    pub fn cnc_resume_from_line(&mut self, line: i64) -> bool {
        self.command(Ok(Request::command("cnc.resume.from.line").with("line", line)))
    }

    pub fn cnc_resume_from_point(&mut self, point: i64) -> bool {
        self.command(Ok(Request::command("cnc.resume.from.point").with("point", point)))
    }

    pub fn cnc_start(&mut self) -> bool {
        self.simple_command("cnc.start")
    }

    pub fn cnc_start_from_line(&mut self, line: i64) -> bool {
        self.command(Ok(Request::command("cnc.start.from.line").with("line", line)))
    }

    pub fn cnc_start_from_point(&mut self, point: i64) -> bool {
        self.command(Ok(Request::command("cnc.start.from.point").with("point", point)))
    }

    /// Stop the program or the running procedure.
    pub fn cnc_stop(&mut self) -> bool {
        self.simple_command("cnc.stop")
    }

    /// Append a line to the control software log.
    pub fn log_add(&mut self, text: &str) -> bool {
        self.command(Ok(Request::command("log.add").with("text", text)))
    }

    /// Start analysing the loaded program. `mode` is passed through.
    pub fn program_analysis(&mut self, mode: &str) -> bool {
        self.command(Ok(Request::command("program.analysis").with("mode", mode)))
    }

    pub fn program_analysis_abort(&mut self) -> bool {
        self.simple_command("program.analysis.abort")
    }

    pub fn program_gcode_add_text(&mut self, text: &str) -> bool {
        self.command(Ok(Request::command("program.gcode.add.text").with("text", text)))
    }

    pub fn program_gcode_clear(&mut self) -> bool {
        self.simple_command("program.gcode.clear")
    }

    pub fn program_gcode_set_text(&mut self, text: &str) -> bool {
        self.command(Ok(Request::command("program.gcode.set.text").with("text", text)))
    }

    /// Load a program file on the server side.
    pub fn program_load(&mut self, file_name: &str) -> bool {
        self.command(Ok(Request::command("program.load").with("name", file_name)))
    }

    pub fn program_new(&mut self) -> bool {
        self.simple_command("program.new")
    }

    pub fn program_save(&mut self) -> bool {
        self.simple_command("program.save")
    }

    pub fn program_save_as(&mut self, file_name: &str) -> bool {
        self.command(Ok(Request::command("program.save.as").with("file.name", file_name)))
    }

    pub fn reset_alarms(&mut self) -> bool {
        self.simple_command("reset.alarms")
    }

    pub fn reset_alarms_history(&mut self) -> bool {
        self.simple_command("reset.alarms.history")
    }

    pub fn reset_warnings(&mut self) -> bool {
        self.simple_command("reset.warnings")
    }

    pub fn reset_warnings_history(&mut self) -> bool {
        self.simple_command("reset.warnings.history")
    }

    /// Open a dialog of the control software UI by name.
    pub fn show_ui_dialog(&mut self, name: &str) -> bool {
        self.command(Ok(Request::command("show.ui.dialog").with("name", name)))
    }

    /// Append a tool to the library. `info.index` is ignored.
    pub fn tools_lib_add(&mut self, info: &ToolsLibUpdate) -> bool {
        let request = info.write_fields(Request::command("tools.lib.add"));
        self.command(request)
    }

    pub fn tools_lib_clear(&mut self) -> bool {
        self.simple_command("tools.lib.clear")
    }

    pub fn tools_lib_delete(&mut self, index: i32) -> bool {
        self.command(Ok(Request::command("tools.lib.delete").with("index", index)))
    }

    /// Insert a tool at `info.index`, which is required.
    pub fn tools_lib_insert(&mut self, info: &ToolsLibUpdate) -> bool {
        let request = info.write_indexed(Request::command("tools.lib.insert"));
        self.command(request)
    }

    /// Create a work order, optionally with initial data.
    ///
    /// With `data`, enabling the deadline requires a deadline date and the
    /// order state must be left unset.
    pub fn work_order_add(&mut self, order_code: &str, data: Option<&WorkOrderDraft>) -> bool {
        let request = work_order_request(
            Request::command("work.order.add"),
            order_code,
            data,
            WorkOrderDraft::for_add,
        );
        self.command(request)
    }

    pub fn work_order_delete(&mut self, order_code: &str) -> bool {
        self.command(Ok(Request::command("work.order.delete").with("order.code", order_code)))
    }
}

/// Attach `order.code` and, when given, the validated `data` object.
pub(super) fn work_order_request(
    request: Request,
    order_code: &str,
    data: Option<&WorkOrderDraft>,
    to_data: fn(&WorkOrderDraft) -> Result<serde_json::Value, ClientError>,
) -> Result<Request, ClientError> {
    let request = request.with("order.code", order_code);
    match data {
        Some(draft) => Ok(request.with("data", to_data(draft)?)),
        None => Ok(request),
    }
}
