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

//! Display state shared with the tray thread.

use chrono::{DateTime, Local};
use parking_lot::RwLock;
use std::sync::Arc;

use crate::device::Device;
use crate::feed::ListMode;
use crate::readiness::Readiness;
use crate::view::Notice;

/// What the tray shows. Written by the screen's view, read by the tray.
#[derive(Debug)]
pub struct AppState {
    /// Position of the Bluetooth switch.
    pub switch_on: RwLock<bool>,

    /// Last readiness verdict.
    pub readiness: RwLock<Option<Readiness>>,

    /// Whether a discovery scan is running.
    pub scanning: RwLock<bool>,

    /// Which list the rows come from.
    pub list_mode: RwLock<ListMode>,

    /// Rows on display.
    pub rows: RwLock<Vec<Device>>,

    /// Most recent notice and when it was shown.
    pub last_notice: RwLock<Option<(Notice, DateTime<Local>)>>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            switch_on: RwLock::new(false),
            readiness: RwLock::new(None),
            scanning: RwLock::new(false),
            list_mode: RwLock::new(ListMode::Discovered),
            rows: RwLock::new(Vec::new()),
            last_notice: RwLock::new(None),
        }
    }
}

impl AppState {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set_switch(&self, on: bool) {
        *self.switch_on.write() = on;
    }

    pub fn is_switch_on(&self) -> bool {
        *self.switch_on.read()
    }

    pub fn set_readiness(&self, readiness: Option<Readiness>) {
        *self.readiness.write() = readiness;
    }

    pub fn get_readiness(&self) -> Option<Readiness> {
        *self.readiness.read()
    }

    pub fn set_scanning(&self, scanning: bool) {
        *self.scanning.write() = scanning;
    }

    pub fn is_scanning(&self) -> bool {
        *self.scanning.read()
    }

    /// One-line status for the tray header and tooltip.
    pub fn status_text(&self) -> String {
        match self.get_readiness() {
            Some(Readiness::Ready) if self.is_scanning() => "● Scanning".to_string(),
            Some(Readiness::Ready) => "● Ready".to_string(),
            Some(readiness) => format!("○ {}", readiness.as_str()),
            None => "◐ Starting...".to_string(),
        }
    }

    pub fn set_list_mode(&self, mode: ListMode) {
        *self.list_mode.write() = mode;
    }

    pub fn get_list_mode(&self) -> ListMode {
        *self.list_mode.read()
    }

    pub fn set_rows(&self, rows: Vec<Device>) {
        *self.rows.write() = rows;
    }

    /// Insert a single row. Out-of-range indices append.
    pub fn insert_row(&self, index: usize, device: Device) {
        let mut rows = self.rows.write();
        let index = index.min(rows.len());
        rows.insert(index, device);
    }

    pub fn get_rows(&self) -> Vec<Device> {
        self.rows.read().clone()
    }

    pub fn set_notice(&self, notice: Notice) {
        *self.last_notice.write() = Some((notice, Local::now()));
    }

    pub fn get_notice(&self) -> Option<(Notice, DateTime<Local>)> {
        *self.last_notice.read()
    }
}
