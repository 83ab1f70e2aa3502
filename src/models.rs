//! Typed records returned by the API server.
//!
//! Every query result decodes from the `res` field of its response line
//! through serde. Field names follow the dotted wire keys (`axes.mask`,
//! `homing.done`) via `#[serde(rename)]`. All fields are required unless
//! noted, so a record either decodes completely or not at all (see
//! [`crate::decode`]).
//!
//! Integer codes (machine state, tool type, ...) are kept raw in the
//! records and interpreted through the enums in [`codes`].

pub mod axes;
pub mod cnc;
pub mod codes;
pub mod io;
pub mod machine;
pub mod system;
pub mod tools;
pub mod work;

pub use axes::{AxesInfo, CoordinateSystemsInfo, ProgrammedPoints, ScanningLaserInfo, VmGeometryInfo};
pub use cnc::{
    CncInfo, CncParameters, CompileInfo, CurrentEvent, CurrentTool, EnabledCommands, MachiningInfo,
    Override, OverrideName, Overrides,
};
pub use codes::{
    AxisType, CompileState, KinematicsModel, MachineState, MachineType, SpindleDirection, SpindleShaft, SpindleStatus, ToolType, UnitsMode,
    WorkMode, WorkOrderFileState, WorkOrderFileType, WorkOrderLogId, WorkOrderPriority,
    WorkOrderState,
};
pub use io::{AnalogInputs, AnalogOutputs, DigitalInputs, DigitalOutputs};
pub use machine::{AxisSettings, JointSettings, MachineSettings};
pub use system::{AlarmWarning, AlarmsWarningsList, LocaleEntry, LocalizationInfo, SystemInfo};
pub use tools::{ToolIndex, ToolLibEntry, ToolsLibCount, ToolsLibInfos, ToolsLibUpdate};
pub use work::{
    WorkInfo, WorkOrderCode, WorkOrderCodeList, WorkOrderData, WorkOrderDraft, WorkOrderFileList,
    WorkOrderFileSpec,
};
