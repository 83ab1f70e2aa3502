//! Integer codes reported by the API server.
//!
//! Records keep the raw integers so decoding never fails on a code this
//! crate does not know yet; these enums interpret them. Unknown values map
//! to `Unknown`.

macro_rules! wire_code {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $($variant:ident = $value:literal => $label:literal,)+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant,)+
            /// Code not known to this client version.
            Unknown(i32),
        }

        impl $name {
            /// Wire value.
            pub fn code(self) -> i32 {
                match self {
                    $($name::$variant => $value,)+
                    $name::Unknown(code) => code,
                }
            }

            /// Human-readable label.
            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $label,)+
                    $name::Unknown(_) => "Unknown",
                }
            }
        }

        impl From<i32> for $name {
            fn from(code: i32) -> Self {
                match code {
                    $($value => $name::$variant,)+
                    other => $name::Unknown(other),
                }
            }
        }
    };
}

wire_code! {
    /// Measurement system of positions and feeds.
    pub enum UnitsMode {
        Metric = 0 => "mm",
        Imperial = 1 => "in",
    }
}

wire_code! {
    /// Control software / CNC board state machine.
    pub enum MachineState {
        Disconnected = 0 => "DISCONNECTED",
        Simulator = 1 => "SIMULATOR",
        Init = 2 => "INIT",
        InitFieldbus = 3 => "INIT FIELDBUS",
        Alarm = 4 => "ALARM",
        Idle = 5 => "IDLE",
        Homing = 6 => "HOMING",
        Jog = 7 => "JOG",
        Run = 8 => "RUN",
        Pause = 9 => "PAUSE",
        Limit = 10 => "LIMIT",
        MeasureTool = 11 => "MEASURE TOOL",
        Scan3d = 12 => "SCANNING",
        SafetyJog = 13 => "SAFETY JOG",
        ChangeTool = 14 => "CHANGE TOOL",
        Safety = 15 => "SAFETY",
        WaitMainPower = 16 => "WAIT MAIN POWER",
        Retract = 17 => "RETRACT",
    }
}

wire_code! {
    /// NC program compiler state.
    pub enum CompileState {
        Init = 0 => "init",
        Ready = 1 => "ready",
        Error = 2 => "error",
        FirstStep = 3 => "first step",
        FirstStepRunning = 4 => "first step running",
        WaitingForData = 5 => "waiting for data",
        WaitingForDataRunning = 6 => "waiting for data running",
        Finished = 7 => "finished",
    }
}

wire_code! {
    pub enum SpindleDirection {
        Stopped = 1 => "stopped",
        Clockwise = 2 => "cw",
        CounterClockwise = 3 => "ccw",
    }
}

wire_code! {
    pub enum SpindleShaft {
        Stopped = 0 => "stopped",
        Rotating = 1 => "rotating",
    }
}

wire_code! {
    pub enum SpindleStatus {
        ColletOpen = 0 => "collet open",
        ColletClosedToolHolderAbsent = 1 => "collet closed, tool holder absent",
        ToolHolderBlockedCorrectly = 2 => "tool holder blocked correctly",
    }
}

wire_code! {
    pub enum ToolType {
        Generic = 0 => "generic",
        FlatEndMill = 1 => "flat end mill",
        BallNoseEndMill = 2 => "ball nose end mill",
        Drill = 3 => "drill",
        Probe = 4 => "probe",
        Saw = 5 => "saw",
        Plasma = 6 => "plasma",
        DragKnife = 7 => "drag knife",
        Lathe = 8 => "lathe",
        Laser = 9 => "laser",
        WaterJet = 10 => "water jet",
    }
}

wire_code! {
    pub enum WorkMode {
        Normal = 0 => "normal",
        WorkOrder = 1 => "work order",
    }
}

wire_code! {
    pub enum WorkOrderPriority {
        Lowest = 0 => "lowest",
        Low = 1 => "low",
        Normal = 2 => "normal",
        High = 3 => "high",
        Highest = 4 => "highest",
    }
}

wire_code! {
    pub enum WorkOrderState {
        Draft = 0 => "draft",
        Edit = 1 => "edit",
        Released = 2 => "released",
        Ready = 3 => "ready",
        Active = 4 => "active",
        Running = 5 => "running",
        Completed = 6 => "completed",
        Archived = 7 => "archived",
        DoesNotExist = 8 => "does not exist",
    }
}

wire_code! {
    pub enum WorkOrderFileState {
        Closed = 0 => "closed",
        Open = 1 => "open",
        Running = 2 => "running",
    }
}

wire_code! {
    pub enum WorkOrderLogId {
        None = 0 => "none",
        Activated = 1 => "activated",
        Deactivated = 2 => "deactivated",
        FileOpened = 3 => "file opened",
        FileClosed = 4 => "file closed",
        FileStarted = 5 => "file started",
        FileStopped = 6 => "file stopped",
        FileFinished = 7 => "file finished",
        Archived = 8 => "archived",
    }
}

wire_code! {
    pub enum WorkOrderFileType {
        Directory = 0 => "directory",
        File = 1 => "file",
    }
}

wire_code! {
    /// `machine.settings` machine type.
    pub enum MachineType {
        Mill = 0 => "mill",
        Lathe = 1 => "lathe",
    }
}

wire_code! {
    /// Kinematic chain of the rotary axes.
    pub enum KinematicsModel {
        Trivial = 0 => "trivial",
        IndependentRotaryAxes = 1 => "independent rotary axes",
        RotaryTableA = 10 => "rotary table A",
        RotaryTableB = 11 => "rotary table B",
        TiltingHeadA = 20 => "tilting head A",
        TiltingHeadB = 21 => "tilting head B",
        RotaryTableAB = 30 => "rotary table A/B",
        RotaryTableBA = 31 => "rotary table B/A",
        RotaryTableAC = 32 => "rotary table A/C",
        RotaryTableBC = 33 => "rotary table B/C",
        TiltingHeadAB = 40 => "tilting head A/B",
        TiltingHeadBA = 41 => "tilting head B/A",
        TiltingHeadCA = 42 => "tilting head C/A",
        TiltingHeadCB = 43 => "tilting head C/B",
        TiltingHeadCBCustom = 100 => "tilting head C/B custom",
    }
}

wire_code! {
    /// Role of one joint in the machine.
    pub enum AxisType {
        Disabled = 0 => "disabled",
        Linear = 1 => "linear",
        RotaryFree = 2 => "rotary free",
        RotaryHead = 3 => "rotary head",
        RotaryTable = 4 => "rotary table",
        Gantry1 = 5 => "gantry 1",
        Gantry2 = 6 => "gantry 2",
        Gantry3 = 7 => "gantry 3",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_codes_round_trip() {
        for code in 0..=17 {
            assert_eq!(MachineState::from(code).code(), code);
        }
        assert_eq!(MachineState::from(8), MachineState::Run);
        assert_eq!(MachineState::Run.as_str(), "RUN");
    }

    #[test]
    fn test_unknown_code_is_preserved() {
        let state = CompileState::from(42);
        assert_eq!(state, CompileState::Unknown(42));
        assert_eq!(state.code(), 42);
        assert_eq!(state.as_str(), "Unknown");
    }

    #[test]
    fn test_spindle_direction_starts_at_one() {
        assert_eq!(SpindleDirection::from(0), SpindleDirection::Unknown(0));
        assert_eq!(SpindleDirection::from(1), SpindleDirection::Stopped);
    }
}
