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

//! Events and request results delivered to the screen.

use tokio::sync::mpsc;

use crate::device::Device;

/// Power state of the Bluetooth radio.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RadioState {
    On,
    Off,
}

impl From<bool> for RadioState {
    fn from(powered: bool) -> Self {
        if powered {
            RadioState::On
        } else {
            RadioState::Off
        }
    }
}

/// Notifications published by the Bluetooth service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlatformEvent {
    /// The radio was powered on or off.
    RadioStateChanged(RadioState),
    /// A scan reported a device.
    DeviceFound(Device),
    /// A scan ran out of time or was stopped by the adapter.
    ScanFinished,
}

impl PlatformEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            PlatformEvent::RadioStateChanged(_) => EventKind::RadioState,
            PlatformEvent::DeviceFound(_) | PlatformEvent::ScanFinished => EventKind::Discovery,
        }
    }
}

/// Class of platform notification a subscription listens to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    RadioState,
    /// Found devices and the end of a scan.
    Discovery,
}

/// Result of a permission request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grant {
    Granted,
    Denied,
}

/// Result of a request the user can confirm or back out of.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Confirmed,
    Cancelled,
}

/// Everything the screen reacts to asynchronously.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reaction {
    /// A subscribed platform notification.
    Platform(PlatformEvent),
    /// Answer to a location permission request.
    PermissionResult(Grant),
    /// The user came back from the location settings prompt.
    SettingsResult(Outcome),
    /// Answer to a request to power the radio on or off.
    RadioRequestResult(Outcome),
}

pub type ReactionSender = mpsc::UnboundedSender<Reaction>;
pub type ReactionReceiver = mpsc::UnboundedReceiver<Reaction>;

/// Create the channel platform collaborators use to reach the screen.
pub fn reaction_channel() -> (ReactionSender, ReactionReceiver) {
    mpsc::unbounded_channel()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_kind() {
        assert_eq!(
            PlatformEvent::RadioStateChanged(RadioState::On).kind(),
            EventKind::RadioState
        );
        assert_eq!(
            PlatformEvent::DeviceFound(Device::named("a", "00:00:00:00:00:01")).kind(),
            EventKind::Discovery
        );
        assert_eq!(PlatformEvent::ScanFinished.kind(), EventKind::Discovery);
    }

    #[test]
    fn test_radio_state_from_powered() {
        assert_eq!(RadioState::from(true), RadioState::On);
        assert_eq!(RadioState::from(false), RadioState::Off);
    }
}
