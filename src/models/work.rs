//! Work mode and work orders.
//!
//! Work order records come from a database on the server side and some
//! numeric fields arrive as strings (or the other way round), so the get
//! side decodes those fields leniently.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::decode::{bool_or_int, int_or_string, stringified};
use crate::error::ClientError;
use crate::filetime::FileTime;
use crate::models::codes::{
    WorkMode, WorkOrderFileState, WorkOrderFileType, WorkOrderLogId, WorkOrderPriority,
    WorkOrderState,
};

/// `work.info`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkInfo {
    #[serde(rename = "work.mode")]
    pub work_mode: i32,
    #[serde(rename = "active.work.order.code")]
    pub active_work_order_code: String,
    /// -1 when no file of the active order is selected.
    #[serde(rename = "active.work.order.file.index")]
    pub active_work_order_file_index: i32,
    #[serde(rename = "file.name")]
    pub file_name: String,
    #[serde(rename = "planned.time")]
    pub planned_time: String,
    #[serde(rename = "worked.time")]
    pub worked_time: String,
}

impl WorkInfo {
    pub fn mode(&self) -> WorkMode {
        WorkMode::from(self.work_mode)
    }
}

impl Default for WorkInfo {
    fn default() -> Self {
        Self {
            work_mode: WorkMode::Normal.code(),
            active_work_order_code: String::new(),
            active_work_order_file_index: -1,
            file_name: String::new(),
            planned_time: "00:00:00".into(),
            worked_time: "00:00:00".into(),
        }
    }
}

/// One row of `work.order.code.list`, sent as `[code, state, revision]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "(String, i32, i64)", into = "(String, i32, i64)")]
pub struct WorkOrderCode {
    pub order_code: String,
    pub order_state: i32,
    pub revision_number: i64,
}

impl WorkOrderCode {
    pub fn state(&self) -> WorkOrderState {
        WorkOrderState::from(self.order_state)
    }
}

impl From<(String, i32, i64)> for WorkOrderCode {
    fn from((order_code, order_state, revision_number): (String, i32, i64)) -> Self {
        Self {
            order_code,
            order_state,
            revision_number,
        }
    }
}

impl From<WorkOrderCode> for (String, i32, i64) {
    fn from(code: WorkOrderCode) -> Self {
        (code.order_code, code.order_state, code.revision_number)
    }
}

/// `work.order.code.list`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkOrderCodeList {
    pub orders: Vec<WorkOrderCode>,
}

/// `work.order.data`: full record of one work order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct WorkOrderData {
    #[serde(rename = "revision.number", deserialize_with = "int_or_string")]
    pub revision_number: i64,
    #[serde(rename = "order.state", deserialize_with = "stringified")]
    pub order_state: String,
    #[serde(rename = "order.locked", deserialize_with = "bool_or_int")]
    pub order_locked: bool,
    #[serde(rename = "order.code")]
    pub order_code: String,
    #[serde(rename = "order.priority")]
    pub order_priority: i32,
    #[serde(rename = "job.order.code")]
    pub job_order_code: String,
    #[serde(rename = "customer.code")]
    pub customer_code: String,
    #[serde(rename = "item.code")]
    pub item_code: String,
    #[serde(rename = "material.code")]
    pub material_code: String,
    #[serde(rename = "order.notes")]
    pub order_notes: String,
    pub files: Vec<WorkOrderFile>,
    #[serde(rename = "use.deadline.datetime", deserialize_with = "bool_or_int")]
    pub use_deadline_datetime: bool,
    #[serde(rename = "creation.datetime")]
    pub creation_datetime: FileTime,
    #[serde(rename = "deadline.datetime")]
    pub deadline_datetime: FileTime,
    #[serde(rename = "reception.datetime")]
    pub reception_datetime: FileTime,
    #[serde(rename = "acceptance.datetime")]
    pub acceptance_datetime: FileTime,
    #[serde(rename = "begin.datetime")]
    pub begin_datetime: FileTime,
    #[serde(rename = "end.datetime")]
    pub end_datetime: FileTime,
    #[serde(rename = "archived.datetime")]
    pub archived_datetime: FileTime,
    /// Seconds.
    #[serde(rename = "time.for.setup", deserialize_with = "int_or_string")]
    pub time_for_setup: i64,
    #[serde(rename = "time.for.idle", deserialize_with = "int_or_string")]
    pub time_for_idle: i64,
    #[serde(rename = "time.for.work", deserialize_with = "int_or_string")]
    pub time_for_work: i64,
    #[serde(rename = "time.total", deserialize_with = "int_or_string")]
    pub time_total: i64,
    #[serde(rename = "operator.notes", deserialize_with = "stringified")]
    pub operator_notes: String,
    #[serde(rename = "log.items")]
    pub log_items: Vec<WorkOrderLogItem>,
}

impl WorkOrderData {
    /// Order state parsed from its textual form.
    pub fn state(&self) -> WorkOrderState {
        self.order_state
            .trim()
            .parse::<i32>()
            .map(WorkOrderState::from)
            .unwrap_or(WorkOrderState::DoesNotExist)
    }

    pub fn priority(&self) -> WorkOrderPriority {
        WorkOrderPriority::from(self.order_priority)
    }
}

/// Program file slot of a work order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct WorkOrderFile {
    #[serde(rename = "file.name")]
    pub file_name: String,
    #[serde(rename = "file.state")]
    pub file_state: i32,
    #[serde(rename = "pieces.per.file")]
    pub pieces_per_file: i32,
    #[serde(rename = "requested.pieces")]
    pub requested_pieces: i32,
    #[serde(rename = "produced.pieces")]
    pub produced_pieces: i32,
    #[serde(rename = "discarded.pieces")]
    pub discarded_pieces: i32,
}

impl WorkOrderFile {
    pub fn state(&self) -> WorkOrderFileState {
        WorkOrderFileState::from(self.file_state)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct WorkOrderLogItem {
    #[serde(rename = "log.id")]
    pub log_id: i32,
    #[serde(rename = "log.datetime")]
    pub log_datetime: FileTime,
    #[serde(rename = "log.info.1", deserialize_with = "stringified")]
    pub log_info_1: String,
    #[serde(rename = "log.info.2", deserialize_with = "stringified")]
    pub log_info_2: String,
}

impl WorkOrderLogItem {
    pub fn id(&self) -> WorkOrderLogId {
        WorkOrderLogId::from(self.log_id)
    }
}

/// One entry of `work.order.file.list`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct WorkOrderFileEntry {
    #[serde(rename = "type")]
    pub entry_type: i32,
    pub name: String,
    pub size: u64,
    #[serde(rename = "creation.datetime")]
    pub creation_datetime: FileTime,
    #[serde(rename = "last.access.datetime")]
    pub last_access_datetime: FileTime,
    #[serde(rename = "last.write.datetime")]
    pub last_write_datetime: FileTime,
}

impl WorkOrderFileEntry {
    pub fn is_directory(&self) -> bool {
        WorkOrderFileType::from(self.entry_type) == WorkOrderFileType::Directory
    }
}

/// `work.order.file.list`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct WorkOrderFileList {
    pub files: Vec<WorkOrderFileEntry>,
}

// =============================================================================
// Write side
// =============================================================================

/// Program file of a work order being created or edited.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkOrderFileSpec {
    pub file_name: Option<String>,
    pub pieces_per_file: Option<i32>,
    pub requested_pieces: Option<i32>,
}

/// Fields of a work order to send with `work.order.add` or
/// `set work.order.data`. Unset fields are left out of the request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkOrderDraft {
    /// Only accepted by `set work.order.data`.
    pub order_state: Option<WorkOrderState>,
    pub order_locked: Option<bool>,
    pub order_priority: Option<WorkOrderPriority>,
    pub job_order_code: Option<String>,
    pub customer_code: Option<String>,
    pub item_code: Option<String>,
    pub material_code: Option<String>,
    pub order_notes: Option<String>,
    pub use_deadline_datetime: Option<bool>,
    pub deadline_datetime: Option<DateTime<Utc>>,
    pub files: Vec<WorkOrderFileSpec>,
}

impl WorkOrderDraft {
    /// `data` object for `work.order.add`.
    ///
    /// # Errors
    ///
    /// Fails when a state is given, when priority is out of range, or when
    /// the deadline is enabled without a deadline date.
    pub(crate) fn for_add(&self) -> Result<Value, ClientError> {
        if self.order_state.is_some() {
            return Err(ClientError::invalid("order state cannot be set when adding a work order"));
        }
        if self.use_deadline_datetime == Some(true) && self.deadline_datetime.is_none() {
            return Err(ClientError::invalid("deadline enabled without a deadline date"));
        }
        self.to_data()
    }

    /// `data` object for `set work.order.data`.
    ///
    /// # Errors
    ///
    /// Fails when state or priority is out of range.
    pub(crate) fn for_set(&self) -> Result<Value, ClientError> {
        if let Some(state) = self.order_state {
            let code = state.code();
            if !(WorkOrderState::Draft.code()..=WorkOrderState::Archived.code()).contains(&code) {
                return Err(ClientError::invalid(format!("work order state {} out of range", code)));
            }
        }
        self.to_data()
    }

    fn to_data(&self) -> Result<Value, ClientError> {
        let mut data = Map::new();

        if let Some(state) = self.order_state {
            data.insert("order.state".into(), state.code().into());
        }
        if let Some(locked) = self.order_locked {
            data.insert("order.locked".into(), locked.into());
        }
        if let Some(priority) = self.order_priority {
            let code = priority.code();
            if !(WorkOrderPriority::Lowest.code()..=WorkOrderPriority::Highest.code()).contains(&code) {
                return Err(ClientError::invalid(format!("work order priority {} out of range", code)));
            }
            data.insert("order.priority".into(), code.into());
        }

        let texts = [
            ("job.order.code", &self.job_order_code),
            ("customer.code", &self.customer_code),
            ("item.code", &self.item_code),
            ("material.code", &self.material_code),
            ("order.notes", &self.order_notes),
        ];
        for (key, value) in texts {
            if let Some(value) = value {
                data.insert(key.into(), value.clone().into());
            }
        }

        if let Some(use_deadline) = self.use_deadline_datetime {
            data.insert("use.deadline.datetime".into(), use_deadline.into());
            if let Some(deadline) = self.deadline_datetime {
                data.insert(
                    "deadline.datetime".into(),
                    FileTime::from_datetime(deadline).ticks().into(),
                );
            }
        }

        if !self.files.is_empty() {
            let files = self
                .files
                .iter()
                .map(|file| {
                    let mut entry = Map::new();
                    if let Some(name) = &file.file_name {
                        entry.insert("file.name".into(), name.clone().into());
                    }
                    if let Some(pieces) = file.pieces_per_file {
                        entry.insert("pieces.per.file".into(), pieces.into());
                    }
                    if let Some(pieces) = file.requested_pieces {
                        entry.insert("requested.pieces".into(), pieces.into());
                    }
                    Value::Object(entry)
                })
                .collect();
            data.insert("files".into(), Value::Array(files));
        }

        Ok(Value::Object(data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::{snapshot, Snapshot};
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn order_json() -> Value {
        let file = json!({"file.name": "a.nc", "file.state": 0, "pieces.per.file": 1,
                          "requested.pieces": 10, "produced.pieces": 3, "discarded.pieces": 0});
        json!({
            "revision.number": "4",
            "order.state": 2,
            "order.locked": 0,
            "order.code": "WO-1",
            "order.priority": 3,
            "job.order.code": "J1",
            "customer.code": "C1",
            "item.code": "I1",
            "material.code": "M1",
            "order.notes": "",
            "files": [file.clone(), file.clone(), file.clone(), file.clone(),
                      file.clone(), file.clone(), file.clone(), file],
            "use.deadline.datetime": 1,
            "creation.datetime": 133485408000000000u64,
            "deadline.datetime": "133485408000000000",
            "reception.datetime": 0,
            "acceptance.datetime": 0,
            "begin.datetime": 0,
            "end.datetime": 0,
            "archived.datetime": 0,
            "time.for.setup": 60,
            "time.for.idle": "0",
            "time.for.work": 120,
            "time.total": 180,
            "operator.notes": 0,
            "log.items": [{"log.id": 1, "log.datetime": 0, "log.info.1": "", "log.info.2": ""}]
        })
    }

    #[test]
    fn test_work_order_data_lenient_fields() {
        let line = json!({ "res": order_json() }).to_string();
        let order: WorkOrderData = snapshot(&line).into_data().unwrap();
        assert_eq!(order.revision_number, 4);
        assert_eq!(order.order_state, "2");
        assert_eq!(order.state(), WorkOrderState::Released);
        assert!(!order.order_locked);
        assert!(order.use_deadline_datetime);
        assert_eq!(order.priority(), WorkOrderPriority::High);
        assert_eq!(order.files.len(), 8);
        assert_eq!(order.operator_notes, "0");
        assert_eq!(order.log_items[0].id(), WorkOrderLogId::Activated);
        assert_eq!(order.deadline_datetime, order.creation_datetime);
    }

    #[test]
    fn test_work_order_data_bad_filetime_is_empty() {
        let mut res = order_json();
        res["end.datetime"] = json!("yesterday");
        let line = json!({ "res": res }).to_string();
        let snap: Snapshot<WorkOrderData> = snapshot(&line);
        assert_eq!(snap, Snapshot::Empty);
    }

    #[test]
    fn test_code_list_from_tuples() {
        let list: WorkOrderCodeList = snapshot(r#"{"res":[["WO-1",2,4],["WO-2",7,1]]}"#)
            .into_data()
            .unwrap();
        assert_eq!(list.orders.len(), 2);
        assert_eq!(list.orders[1].state(), WorkOrderState::Archived);
        assert_eq!(list.orders[0].revision_number, 4);

        let empty: WorkOrderCodeList = snapshot(r#"{"res":[]}"#).into_data().unwrap();
        assert!(empty.orders.is_empty());
    }

    #[test]
    fn test_file_list() {
        let line = r#"{"res":[{"type":0,"name":"sub","size":0,"creation.datetime":0,
            "last.access.datetime":0,"last.write.datetime":0}]}"#;
        let list: WorkOrderFileList = snapshot(line).into_data().unwrap();
        assert!(list.files[0].is_directory());
    }

    #[test]
    fn test_draft_for_add() {
        let deadline = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let draft = WorkOrderDraft {
            order_priority: Some(WorkOrderPriority::Normal),
            customer_code: Some("ACME".into()),
            use_deadline_datetime: Some(true),
            deadline_datetime: Some(deadline),
            files: vec![WorkOrderFileSpec {
                file_name: Some("a.nc".into()),
                requested_pieces: Some(5),
                ..Default::default()
            }],
            ..Default::default()
        };
        assert_eq!(
            draft.for_add().unwrap(),
            json!({
                "order.priority": 2,
                "customer.code": "ACME",
                "use.deadline.datetime": true,
                "deadline.datetime": 133485408000000000u64,
                "files": [{"file.name": "a.nc", "requested.pieces": 5}]
            })
        );
    }

    #[test]
    fn test_draft_validation() {
        let missing_deadline = WorkOrderDraft {
            use_deadline_datetime: Some(true),
            ..Default::default()
        };
        assert!(missing_deadline.for_add().is_err());
        assert!(missing_deadline.for_set().is_ok());

        let with_state = WorkOrderDraft {
            order_state: Some(WorkOrderState::Ready),
            ..Default::default()
        };
        assert!(with_state.for_add().is_err());
        assert_eq!(with_state.for_set().unwrap(), json!({"order.state": 3}));

        let bad_state = WorkOrderDraft {
            order_state: Some(WorkOrderState::DoesNotExist),
            ..Default::default()
        };
        assert!(bad_state.for_set().is_err());

        let bad_priority = WorkOrderDraft {
            order_priority: Some(WorkOrderPriority::Unknown(9)),
            ..Default::default()
        };
        assert!(bad_priority.for_set().is_err());
    }
}
