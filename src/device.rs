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

//! Device records shown in the list.

/// Label used when a device does not advertise a name.
pub const UNNAMED_DEVICE: &str = "Unknown device";

/// A Bluetooth device as reported by discovery or the bonded set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Device {
    /// Advertised name, if any.
    pub name: Option<String>,
    /// Hardware address, e.g. `AA:BB:CC:DD:EE:FF`.
    pub address: String,
}

impl Device {
    pub fn new(name: Option<String>, address: impl Into<String>) -> Self {
        Self {
            name,
            address: address.into(),
        }
    }

    pub fn named(name: impl Into<String>, address: impl Into<String>) -> Self {
        Self::new(Some(name.into()), address)
    }

    /// Name to render, falling back to `placeholder`.
    ///
    /// An empty advertised name counts as missing.
    pub fn display_name<'a>(&'a self, placeholder: &'a str) -> &'a str {
        match self.name.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => placeholder,
        }
    }
}
