//! Batched refresh of the snapshots a machine status view needs together.
//!
//! [`InfoContext::refresh`] issues `axes.info`, `cnc.info`, `compile.info`
//! and `enabled.commands` in that order and keeps the newest result of
//! each. The four queries are not atomic: the machine may change state
//! between them.

use crate::client::CncApiClient;
use crate::decode::Snapshot;
use crate::models::{AxesInfo, CncInfo, CompileInfo, EnabledCommands};

// =============================================================================
// Service Trait for Dependency Injection
// =============================================================================

/// The queries an [`InfoContext`] needs.
///
/// Implemented by [`CncApiClient`]; tests substitute their own source.
pub trait InfoSource {
    fn is_connected(&self) -> bool;
    fn get_axes_info(&mut self) -> Snapshot<AxesInfo>;
    fn get_cnc_info(&mut self) -> Snapshot<CncInfo>;
    fn get_compile_info(&mut self) -> Snapshot<CompileInfo>;
    fn get_enabled_commands(&mut self) -> Snapshot<EnabledCommands>;
}

impl InfoSource for CncApiClient {
    fn is_connected(&self) -> bool {
        CncApiClient::is_connected(self)
    }

    fn get_axes_info(&mut self) -> Snapshot<AxesInfo> {
        CncApiClient::get_axes_info(self)
    }

    fn get_cnc_info(&mut self) -> Snapshot<CncInfo> {
        CncApiClient::get_cnc_info(self)
    }

    fn get_compile_info(&mut self) -> Snapshot<CompileInfo> {
        CncApiClient::get_compile_info(self)
    }

    fn get_enabled_commands(&mut self) -> Snapshot<EnabledCommands> {
        CncApiClient::get_enabled_commands(self)
    }
}

/// Latest axes, machine, compiler and capability snapshots.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InfoContext {
    axes_info: Snapshot<AxesInfo>,
    cnc_info: Snapshot<CncInfo>,
    compile_info: Snapshot<CompileInfo>,
    enabled_commands: Snapshot<EnabledCommands>,
}

impl InfoContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Re-query all four snapshots.
    ///
    /// Returns `false` and clears every snapshot when `source` is not
    /// connected. A query that fails while connected stores its empty
    /// snapshot; it does not keep the previous value.
    pub fn refresh<S: InfoSource + ?Sized>(&mut self, source: &mut S) -> bool {
        if !source.is_connected() {
            *self = Self::default();
            return false;
        }
        self.axes_info = source.get_axes_info();
        self.cnc_info = source.get_cnc_info();
        self.compile_info = source.get_compile_info();
        self.enabled_commands = source.get_enabled_commands();
        true
    }

    pub fn axes_info(&self) -> &Snapshot<AxesInfo> {
        &self.axes_info
    }

    pub fn cnc_info(&self) -> &Snapshot<CncInfo> {
        &self.cnc_info
    }

    pub fn compile_info(&self) -> &Snapshot<CompileInfo> {
        &self.compile_info
    }

    pub fn enabled_commands(&self) -> &Snapshot<EnabledCommands> {
        &self.enabled_commands
    }
}
