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

//! Bluetooth pairing screen: toggle the radio, scan for nearby devices and
//! list paired ones, once permission and location services allow it.

pub mod config;
pub mod device;
pub mod events;
pub mod feed;
pub mod platform;
pub mod readiness;
pub mod screen;
pub mod state;
pub mod ui;
pub mod view;

pub use device::Device;
pub use events::{PlatformEvent, Reaction};
pub use readiness::Readiness;
pub use screen::Screen;
