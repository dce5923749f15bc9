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

//! Discovery feed: the list of found devices and the paired view.

use tracing::debug;

use crate::device::Device;

/// Which list is on display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListMode {
    Discovered,
    Paired,
}

/// Owns the discovered devices and the currently displayed list.
#[derive(Debug)]
pub struct DiscoveryFeed {
    discovered: Vec<Device>,
    paired: Vec<Device>,
    mode: ListMode,
    dedupe_by_address: bool,
}

impl DiscoveryFeed {
    pub fn new(dedupe_by_address: bool) -> Self {
        Self {
            discovered: Vec::new(),
            paired: Vec::new(),
            mode: ListMode::Discovered,
            dedupe_by_address,
        }
    }

    /// Append a found device.
    ///
    /// Returns the index it was inserted at when the discovered list is on
    /// display, `None` otherwise (paired view, or a suppressed duplicate).
    pub fn on_device_found(&mut self, device: Device) -> Option<usize> {
        if self.dedupe_by_address && self.discovered.iter().any(|d| d.address == device.address) {
            debug!("Ignoring repeated device {}", device.address);
            return None;
        }

        let index = self.discovered.len();
        self.discovered.push(device);

        match self.mode {
            ListMode::Discovered => Some(index),
            ListMode::Paired => None,
        }
    }

    /// Replace the display with the bonded set.
    pub fn show_paired(&mut self, bonded: Vec<Device>) -> &[Device] {
        self.paired = bonded;
        self.mode = ListMode::Paired;
        &self.paired
    }

    /// Put the discovered list back on display.
    pub fn show_discovered(&mut self) -> &[Device] {
        self.mode = ListMode::Discovered;
        &self.discovered
    }

    /// The list currently on display.
    pub fn displayed(&self) -> &[Device] {
        match self.mode {
            ListMode::Discovered => &self.discovered,
            ListMode::Paired => &self.paired,
        }
    }

    /// Everything found since the screen was created, whatever is on display.
    pub fn discovered(&self) -> &[Device] {
        &self.discovered
    }

    pub fn mode(&self) -> ListMode {
        self.mode
    }
}
