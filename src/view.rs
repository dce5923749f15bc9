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

//! View contracts the screen renders through.

use crate::device::Device;

/// Short, one-shot messages shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    NotSupported,
    PermissionRequired,
    LocationServicesRequired,
    RadioOn,
    RadioRequired,
}

impl Notice {
    pub fn as_str(&self) -> &'static str {
        match self {
            Notice::NotSupported => "Bluetooth not supported",
            Notice::PermissionRequired => {
                "Location permission is required to scan for Bluetooth devices"
            }
            Notice::LocationServicesRequired => {
                "Location services must be turned on to scan for Bluetooth devices"
            }
            Notice::RadioOn => "Bluetooth is on",
            Notice::RadioRequired => "Bluetooth must be on",
        }
    }
}

impl std::fmt::Display for Notice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Passive, index-addressed device list.
pub trait DeviceListView {
    /// Replace every row.
    fn bind(&mut self, devices: &[Device]);

    /// One row was inserted at `index`.
    fn item_inserted(&mut self, index: usize, device: &Device);
}

/// The rest of the screen: the radio switch and notices.
pub trait ScreenView {
    fn set_switch(&mut self, on: bool);

    fn show_notice(&mut self, notice: Notice);
}
