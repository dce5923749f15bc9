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

//! Platform collaborators: Bluetooth adapter, permissions and location services.
//!
//! Requests never block. Their results arrive later as a
//! [`Reaction`](crate::events::Reaction) on the channel handed to each
//! implementation.

pub mod bluez;
pub mod desktop;

use anyhow::Result;
use std::fmt;

use crate::device::Device;
use crate::events::EventKind;

pub use bluez::BluezBluetooth;
pub use desktop::{DesktopSettings, Prompt};

/// Bluetooth adapter service.
#[allow(async_fn_in_trait)]
pub trait BluetoothService {
    /// Whether this machine has an adapter at all.
    fn is_present(&self) -> bool;

    /// Whether the radio is powered.
    async fn is_enabled(&self) -> Result<bool>;

    /// Ask for the radio to be powered on or off.
    ///
    /// Answered with `Reaction::RadioRequestResult`.
    fn request_radio(&self, enable: bool);

    /// Start a time-bounded scan. Found devices are published as
    /// `DeviceFound` events, followed by `ScanFinished` when the scan ends.
    fn start_discovery(&self) -> Result<()>;

    /// Devices currently bonded with this adapter.
    async fn bonded_devices(&self) -> Result<Vec<Device>>;

    /// Forward one class of notifications to the screen until the
    /// returned guard is dropped.
    fn subscribe(&self, kind: EventKind) -> Result<Subscription>;
}

/// Runtime permission subsystem.
pub trait PermissionService {
    fn is_location_granted(&self) -> bool;

    /// Answered with `Reaction::PermissionResult`.
    fn request_location(&self);
}

/// Location services and their settings screen.
pub trait LocationService {
    fn services_enabled(&self) -> bool;

    /// Answered with `Reaction::SettingsResult`.
    fn open_settings(&self);
}

/// The collaborators a screen runs against.
pub trait Platform {
    type Bluetooth: BluetoothService;
    type Permissions: PermissionService;
    type Location: LocationService;

    fn bluetooth(&self) -> &Self::Bluetooth;
    fn permissions(&self) -> &Self::Permissions;
    fn location(&self) -> &Self::Location;
}

/// A registered listener. Dropping it unregisters the listener, exactly once.
pub struct Subscription {
    kind: EventKind,
    release: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    pub fn new(kind: EventKind, release: impl FnOnce() + Send + 'static) -> Self {
        Self {
            kind,
            release: Some(Box::new(release)),
        }
    }

    pub fn kind(&self) -> EventKind {
        self.kind
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("kind", &self.kind)
            .field("active", &self.release.is_some())
            .finish()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

/// Production platform: BlueZ plus desktop prompts.
pub struct LinuxPlatform {
    bluetooth: BluezBluetooth,
    settings: DesktopSettings,
}

impl LinuxPlatform {
    pub fn new(bluetooth: BluezBluetooth, settings: DesktopSettings) -> Self {
        Self {
            bluetooth,
            settings,
        }
    }
}

impl Platform for LinuxPlatform {
    type Bluetooth = BluezBluetooth;
    type Permissions = DesktopSettings;
    type Location = DesktopSettings;

    fn bluetooth(&self) -> &BluezBluetooth {
        &self.bluetooth
    }

    fn permissions(&self) -> &DesktopSettings {
        &self.settings
    }

    fn location(&self) -> &DesktopSettings {
        &self.settings
    }
}
