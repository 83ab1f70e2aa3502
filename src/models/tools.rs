//! Tool library records and the update builder used by add/insert/set.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::ClientError;
use crate::models::codes::ToolType;
use crate::protocol::{finite, Request};

/// Numbers of the free tool parameters the library stores.
pub const TOOL_PARAM_NUMBERS: [u8; 20] = [
    1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 51, 52, 53, 54, 55, 56, 57, 58, 59, 60,
];

/// `tools.lib.count`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolsLibCount {
    pub count: u32,
}

/// `tools.lib.tool.index.from.id`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolIndex {
    pub index: i32,
}

/// One tool library row as returned by `tools.lib.info` and
/// `tools.lib.infos`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolLibEntry {
    pub index: i32,
    pub id: i32,
    pub slot: i32,
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
    #[serde(rename = "param.4")]
    pub param_4: f64,
    #[serde(rename = "param.5")]
    pub param_5: f64,
    #[serde(rename = "param.6")]
    pub param_6: f64,
    #[serde(rename = "param.7")]
    pub param_7: f64,
    #[serde(rename = "param.8")]
    pub param_8: f64,
    #[serde(rename = "param.9")]
    pub param_9: f64,
    #[serde(rename = "param.10")]
    pub param_10: f64,
    #[serde(rename = "param.51")]
    pub param_51: f64,
    #[serde(rename = "param.52")]
    pub param_52: f64,
    #[serde(rename = "param.53")]
    pub param_53: f64,
    #[serde(rename = "param.54")]
    pub param_54: f64,
    #[serde(rename = "param.55")]
    pub param_55: f64,
    #[serde(rename = "param.56")]
    pub param_56: f64,
    #[serde(rename = "param.57")]
    pub param_57: f64,
    #[serde(rename = "param.58")]
    pub param_58: f64,
    #[serde(rename = "param.59")]
    pub param_59: f64,
    #[serde(rename = "param.60")]
    pub param_60: f64,
    pub description: String,
}

impl ToolLibEntry {
    pub fn kind(&self) -> ToolType {
        ToolType::from(self.tool_type)
    }

    /// Free parameter `number` (see [`TOOL_PARAM_NUMBERS`]).
    pub fn param(&self, number: u8) -> Option<f64> {
        let value = match number {
            1 => self.param_1,
            2 => self.param_2,
            3 => self.param_3,
            4 => self.param_4,
            5 => self.param_5,
            6 => self.param_6,
            7 => self.param_7,
            8 => self.param_8,
            9 => self.param_9,
            10 => self.param_10,
            51 => self.param_51,
            52 => self.param_52,
            53 => self.param_53,
            54 => self.param_54,
            55 => self.param_55,
            56 => self.param_56,
            57 => self.param_57,
            58 => self.param_58,
            59 => self.param_59,
            60 => self.param_60,
            _ => return None,
        };
        Some(value)
    }
}

/// `tools.lib.infos`: the whole library.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolsLibInfos {
    #[serde(rename = "slot.enabled")]
    pub slot_enabled: bool,
    /// Servers with an empty library omit the list.
    #[serde(default)]
    pub tools: Vec<ToolLibEntry>,
}

/// Fields to write into a tool library row.
///
/// Every field is optional; only the ones set are sent. `index` selects the
/// row for `tools.lib.insert` and `set tools.lib.info` and is ignored by
/// `tools.lib.add`, which appends.
///
/// # Example
///
/// ```ignore
/// let update = ToolsLibUpdate::at(3)
///     .id(12)
///     .diameter(6.0)
///     .param(51, 0.25)
///     .description("6mm flat");
/// client.set_tools_lib_info(&update);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToolsLibUpdate {
    pub index: Option<i32>,
    pub id: Option<i32>,
    pub slot: Option<i32>,
    pub tool_type: Option<i32>,
    pub diameter: Option<f64>,
    pub offset_x: Option<f64>,
    pub offset_y: Option<f64>,
    pub offset_z: Option<f64>,
    pub params: BTreeMap<u8, f64>,
    pub description: Option<String>,
}

impl ToolsLibUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Update addressing library row `index`.
    pub fn at(index: i32) -> Self {
        Self {
            index: Some(index),
            ..Self::default()
        }
    }

    pub fn id(mut self, id: i32) -> Self {
        self.id = Some(id);
        self
    }

    pub fn slot(mut self, slot: i32) -> Self {
        self.slot = Some(slot);
        self
    }

    pub fn tool_type(mut self, tool_type: ToolType) -> Self {
        self.tool_type = Some(tool_type.code());
        self
    }

    pub fn diameter(mut self, diameter: f64) -> Self {
        self.diameter = Some(diameter);
        self
    }

    pub fn offsets(mut self, x: f64, y: f64, z: f64) -> Self {
        self.offset_x = Some(x);
        self.offset_y = Some(y);
        self.offset_z = Some(z);
        self
    }

    pub fn param(mut self, number: u8, value: f64) -> Self {
        self.params.insert(number, value);
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Append the set fields to `request`.
    ///
    /// # Errors
    ///
    /// Fails on a non-finite numeric field or an unknown parameter number.
    pub(crate) fn write_fields(&self, mut request: Request) -> Result<Request, ClientError> {
        request = request
            .with_opt("id", self.id)
            .with_opt("slot", self.slot)
            .with_opt("type", self.tool_type);

        let floats = [
            ("diameter", self.diameter),
            ("offset.x", self.offset_x),
            ("offset.y", self.offset_y),
            ("offset.z", self.offset_z),
        ];
        for (key, value) in floats {
            if let Some(value) = value {
                request = request.with_float(key, value)?;
            }
        }

        for (number, value) in &self.params {
            if !TOOL_PARAM_NUMBERS.contains(number) {
                return Err(ClientError::invalid(format!("unknown tool parameter {}", number)));
            }
            let key = format!("param.{}", number);
            request = request.with(&key, finite(&key, *value)?);
        }

        Ok(request.with_opt("description", self.description.clone()))
    }

    /// Like [`write_fields`](Self::write_fields), with `index` required first.
    pub(crate) fn write_indexed(&self, request: Request) -> Result<Request, ClientError> {
        let index = self
            .index
            .ok_or_else(|| ClientError::invalid("tool index is required"))?;
        self.write_fields(request.with("index", index))
    }
}
