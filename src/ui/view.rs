// Copyright 2026 Daniel Pelikan
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Screen view backed by the tray's shared state.

use std::sync::Arc;
use tracing::{debug, info};

use crate::device::Device;
use crate::state::AppState;
use crate::view::{DeviceListView, Notice, ScreenView};

/// Writes screen updates into [`AppState`] for the tray to render.
pub struct TrayView {
    state: Arc<AppState>,
}

impl TrayView {
    pub fn new(state: Arc<AppState>) -> Self {
        Self { state }
    }
}

impl ScreenView for TrayView {
    fn set_switch(&mut self, on: bool) {
        self.state.set_switch(on);
    }

    fn show_notice(&mut self, notice: Notice) {
        info!("Notice: {}", notice);
        self.state.set_notice(notice);
    }
}

impl DeviceListView for TrayView {
    fn bind(&mut self, devices: &[Device]) {
        debug!("Binding {} rows", devices.len());
        self.state.set_rows(devices.to_vec());
    }

    fn item_inserted(&mut self, index: usize, device: &Device) {
        self.state.insert_row(index, device.clone());
    }
}
