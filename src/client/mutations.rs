//! `set` requests: change server-side state, answered with a boolean.

use serde_json::Value;

use crate::error::ClientError;
use crate::models::{OverrideName, ToolsLibUpdate, UnitsMode, VmGeometryInfo, WorkOrderDraft};
use crate::protocol::{finite, Request};

use super::commands::work_order_request;
use super::CncApiClient;

/// Axis addressed by `set program.position`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PositionAxis {
    X,
    Y,
    Z,
    A,
    B,
    C,
}

impl PositionAxis {
    pub fn key(self) -> &'static str {
        match self {
            PositionAxis::X => "x",
            PositionAxis::Y => "y",
            PositionAxis::Z => "z",
            PositionAxis::A => "a",
            PositionAxis::B => "b",
            PositionAxis::C => "c",
        }
    }
}

impl CncApiClient {
    /// Write a block of CNC parameters starting at `address`.
    ///
    /// At least one of `values` and `descriptions` must be given, neither
    /// may be empty, and when both are given their lengths must match.
    pub fn set_cnc_parameters(
        &mut self,
        address: u32,
        values: Option<&[f64]>,
        descriptions: Option<&[String]>,
    ) -> bool {
        let request = cnc_parameters_request(address, values, descriptions);
        self.command(request)
    }

    /// Change the units mode and/or the UI language.
    ///
    /// The locale name is trimmed and must not be blank; at least one of
    /// the two must be given.
    pub fn set_localization(
        &mut self,
        units_mode: Option<UnitsMode>,
        locale_name: Option<&str>,
    ) -> bool {
        let request = localization_request(units_mode, locale_name);
        self.command(request)
    }

    /// Set the percentage of one override channel.
    pub fn set_override(&mut self, name: OverrideName, value: i32) -> bool {
        let request = Request::mutation("override")
            .with("name", name.as_str())
            .with("value", value);
        self.command(Ok(request))
    }

    /// Set the program (work) position of one axis.
    pub fn set_program_position(&mut self, axis: PositionAxis, value: f64) -> bool {
        let request = finite(axis.key(), value).map(|value| {
            let mut data = serde_json::Map::new();
            data.insert(axis.key().to_string(), Value::Number(value));
            Request::mutation("program.position").with("data", data)
        });
        self.command(request)
    }

    /// Overwrite fields of the tool at `info.index`, which is required.
    pub fn set_tools_lib_info(&mut self, info: &ToolsLibUpdate) -> bool {
        let request = info.write_indexed(Request::mutation("tools.lib.info"));
        self.command(request)
    }

    /// Update virtual machine scene elements. The list must not be empty.
    pub fn set_vm_geometry_info(&mut self, values: &[VmGeometryInfo]) -> bool {
        let request = vm_geometry_request(values);
        self.command(request)
    }

    /// Edit a work order. State and priority must be in range.
    pub fn set_work_order_data(&mut self, order_code: &str, data: Option<&WorkOrderDraft>) -> bool {
        let request = work_order_request(
            Request::mutation("work.order.data"),
            order_code,
            data,
            WorkOrderDraft::for_set,
        );
        self.command(request)
    }
}

fn cnc_parameters_request(
    address: u32,
    values: Option<&[f64]>,
    descriptions: Option<&[String]>,
) -> Result<Request, ClientError> {
    if values.is_none() && descriptions.is_none() {
        return Err(ClientError::invalid("values or descriptions are required"));
    }
    if values.is_some_and(<[f64]>::is_empty) || descriptions.is_some_and(<[String]>::is_empty) {
        return Err(ClientError::invalid("parameter lists must not be empty"));
    }
    if let (Some(v), Some(d)) = (values, descriptions) {
        if v.len() != d.len() {
            return Err(ClientError::invalid(format!(
                "{} values but {} descriptions",
                v.len(),
                d.len()
            )));
        }
    }

    let mut request = Request::mutation("cnc.parameters").with("address", address);
    if let Some(values) = values {
        let numbers = values
            .iter()
            .map(|v| finite("values", *v).map(Value::Number))
            .collect::<Result<Vec<_>, _>>()?;
        request = request.with("values", numbers);
    }
    if let Some(descriptions) = descriptions {
        request = request.with("descriptions", descriptions.to_vec());
    }
    Ok(request)
}

fn localization_request(
    units_mode: Option<UnitsMode>,
    locale_name: Option<&str>,
) -> Result<Request, ClientError> {
    if units_mode.is_none() && locale_name.is_none() {
        return Err(ClientError::invalid("units mode or locale name is required"));
    }
    if let Some(UnitsMode::Unknown(code)) = units_mode {
        return Err(ClientError::invalid(format!("unknown units mode {}", code)));
    }
    let locale_name = match locale_name.map(str::trim) {
        Some("") => return Err(ClientError::invalid("locale name must not be blank")),
        other => other,
    };

    // The server reads this one key with an underscore.
    Ok(Request::mutation("localization")
        .with_opt("units_mode", units_mode.map(UnitsMode::code))
        .with_opt("locale.name", locale_name))
}

fn vm_geometry_request(values: &[VmGeometryInfo]) -> Result<Request, ClientError> {
    if values.is_empty() {
        return Err(ClientError::invalid("at least one geometry element is required"));
    }
    for item in values {
        for (field, value) in [
            ("x", item.x),
            ("y", item.y),
            ("z", item.z),
            ("scale", item.scale),
            ("edges.angle", item.edges_angle),
        ] {
            finite(field, value)?;
        }
    }
    let data = serde_json::to_value(values)?;
    Ok(Request::mutation("vm.geometry.info").with("data", data))
}
