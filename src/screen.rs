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

//! The pairing screen: readiness sequencing and reactions to platform results.

use anyhow::Result;
use tracing::{debug, info, warn};

use crate::device::Device;
use crate::events::{EventKind, Grant, Outcome, PlatformEvent, RadioState, Reaction};
use crate::feed::{DiscoveryFeed, ListMode};
use crate::platform::{
    BluetoothService, LocationService, PermissionService, Platform, Subscription,
};
use crate::readiness::{self, Readiness};
use crate::view::{DeviceListView, Notice, ScreenView};

/// State owned by one screen session.
///
/// Every reaction runs on the task that owns the screen, so nothing here is
/// shared or locked.
pub struct Screen<P: Platform, V> {
    platform: P,
    view: V,
    feed: DiscoveryFeed,
    readiness: Option<Readiness>,
    switch_on: bool,
    /// Switch position before the outstanding radio request.
    toggle_prior: Option<bool>,
    awaiting_permission: bool,
    awaiting_settings: bool,
    scanning: bool,
    radio_listener: Option<Subscription>,
    discovery_listener: Option<Subscription>,
}

impl<P, V> Screen<P, V>
where
    P: Platform,
    V: ScreenView + DeviceListView,
{
    pub fn new(platform: P, view: V, dedupe_by_address: bool) -> Self {
        Self {
            platform,
            view,
            feed: DiscoveryFeed::new(dedupe_by_address),
            readiness: None,
            switch_on: false,
            toggle_prior: None,
            awaiting_permission: false,
            awaiting_settings: false,
            scanning: false,
            radio_listener: None,
            discovery_listener: None,
        }
    }

    /// The screen became visible.
    pub async fn activate(&mut self) -> Result<Readiness> {
        info!("Screen activated");
        self.view.bind(self.feed.displayed());

        if self.platform.bluetooth().is_present() {
            self.listen(EventKind::RadioState)?;
        }

        self.ensure_ready().await
    }

    /// The screen is going away. Releases every listener it holds.
    pub fn deactivate(&mut self) {
        let mut released = 0;
        for listener in [self.radio_listener.take(), self.discovery_listener.take()]
            .into_iter()
            .flatten()
        {
            debug!("Releasing {:?} listener", listener.kind());
            released += 1;
        }
        self.scanning = false;
        info!("Screen deactivated, released {} listeners", released);
    }

    /// Walk the readiness checks and act on the first failing one, or start
    /// a scan when all of them hold.
    pub async fn ensure_ready(&mut self) -> Result<Readiness> {
        let readiness = readiness::check(&self.platform).await?;
        info!("Readiness: {}", readiness.as_str());

        match readiness {
            Readiness::Unsupported => {
                self.set_switch(false);
                self.view.show_notice(Notice::NotSupported);
            }
            Readiness::PermissionRequired => {
                if self.awaiting_permission {
                    debug!("Permission request already outstanding");
                } else {
                    self.awaiting_permission = true;
                    self.platform.permissions().request_location();
                }
            }
            Readiness::LocationServicesRequired => {
                if self.awaiting_settings {
                    debug!("Location settings already open");
                } else {
                    self.awaiting_settings = true;
                    self.platform.location().open_settings();
                }
            }
            Readiness::RadioOff => {
                self.set_switch(false);
                self.scanning = false;
            }
            Readiness::Ready => self.start_scan()?,
        }

        self.readiness = Some(readiness);
        Ok(readiness)
    }

    /// Dispatch one asynchronous result or notification.
    pub async fn handle(&mut self, reaction: Reaction) -> Result<()> {
        match reaction {
            Reaction::Platform(PlatformEvent::RadioStateChanged(state)) => {
                self.on_radio_state(state).await?;
            }
            Reaction::Platform(PlatformEvent::DeviceFound(device)) => {
                self.on_device_found(device);
            }
            Reaction::Platform(PlatformEvent::ScanFinished) => {
                info!("Scan finished with {} devices", self.feed.discovered().len());
                self.scanning = false;
            }
            Reaction::PermissionResult(grant) => self.on_permission_result(grant).await?,
            Reaction::SettingsResult(outcome) => self.on_settings_result(outcome).await?,
            Reaction::RadioRequestResult(outcome) => self.on_radio_request_result(outcome),
        }
        Ok(())
    }

    /// The user flipped the on-screen switch.
    ///
    /// Toggles made while a radio request is unanswered are ignored and the
    /// switch keeps showing the outstanding request.
    pub fn on_switch_toggled(&mut self, requested: bool) {
        if self.toggle_prior.is_some() {
            debug!("Radio request outstanding, ignoring toggle");
            self.view.set_switch(self.switch_on);
            return;
        }
        self.toggle_prior = Some(self.switch_on);
        info!("Requesting Bluetooth {}", if requested { "on" } else { "off" });
        self.set_switch(requested);
        self.platform.bluetooth().request_radio(requested);
    }

    /// Replace the list with the devices bonded to this adapter.
    pub async fn show_paired_devices(&mut self) -> Result<()> {
        if !self.platform.bluetooth().is_present() {
            self.view.show_notice(Notice::NotSupported);
            return Ok(());
        }

        let bonded = self.platform.bluetooth().bonded_devices().await?;
        info!("Showing {} paired devices", bonded.len());
        self.view.bind(self.feed.show_paired(bonded));
        Ok(())
    }

    pub fn readiness(&self) -> Option<Readiness> {
        self.readiness
    }

    pub fn switch_on(&self) -> bool {
        self.switch_on
    }

    pub fn is_scanning(&self) -> bool {
        self.scanning
    }

    pub fn list_mode(&self) -> ListMode {
        self.feed.mode()
    }

    /// The devices currently on display.
    pub fn displayed(&self) -> &[Device] {
        self.feed.displayed()
    }

    pub fn is_listening(&self, kind: EventKind) -> bool {
        match kind {
            EventKind::RadioState => self.radio_listener.is_some(),
            EventKind::Discovery => self.discovery_listener.is_some(),
        }
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    fn start_scan(&mut self) -> Result<()> {
        self.set_switch(true);
        self.listen(EventKind::RadioState)?;
        // Listen before starting so the first reports are not lost.
        self.listen(EventKind::Discovery)?;

        self.platform.bluetooth().start_discovery()?;
        self.scanning = true;
        self.view.bind(self.feed.show_discovered());
        Ok(())
    }

    fn listen(&mut self, kind: EventKind) -> Result<()> {
        let slot = match kind {
            EventKind::RadioState => &mut self.radio_listener,
            EventKind::Discovery => &mut self.discovery_listener,
        };
        if slot.is_none() {
            *slot = Some(self.platform.bluetooth().subscribe(kind)?);
        }
        Ok(())
    }

    fn set_switch(&mut self, on: bool) {
        self.switch_on = on;
        self.view.set_switch(on);
    }

    async fn on_radio_state(&mut self, state: RadioState) -> Result<()> {
        match state {
            RadioState::On => {
                self.ensure_ready().await?;
                self.view.show_notice(Notice::RadioOn);
            }
            RadioState::Off => {
                self.scanning = false;
                self.set_switch(false);
                self.view.show_notice(Notice::RadioRequired);
            }
        }
        Ok(())
    }

    fn on_device_found(&mut self, device: Device) {
        debug!("Device found: {}", device.address);
        if let Some(index) = self.feed.on_device_found(device) {
            if let Some(device) = self.feed.displayed().get(index) {
                self.view.item_inserted(index, device);
            }
        }
    }

    async fn on_permission_result(&mut self, grant: Grant) -> Result<()> {
        if !self.awaiting_permission {
            warn!("Unexpected permission result {:?}, ignoring", grant);
            return Ok(());
        }
        self.awaiting_permission = false;

        match grant {
            Grant::Granted => {
                self.ensure_ready().await?;
            }
            Grant::Denied => self.view.show_notice(Notice::PermissionRequired),
        }
        Ok(())
    }

    async fn on_settings_result(&mut self, outcome: Outcome) -> Result<()> {
        if !self.awaiting_settings {
            warn!("Unexpected settings result {:?}, ignoring", outcome);
            return Ok(());
        }
        self.awaiting_settings = false;
        debug!("Back from location settings: {:?}", outcome);

        // Checked once per return; never reopens the settings prompt.
        if self.platform.location().services_enabled() {
            self.ensure_ready().await?;
        } else {
            self.view.show_notice(Notice::LocationServicesRequired);
        }
        Ok(())
    }

    fn on_radio_request_result(&mut self, outcome: Outcome) {
        let Some(prior) = self.toggle_prior.take() else {
            warn!("Unexpected radio request result {:?}, ignoring", outcome);
            return;
        };

        match outcome {
            Outcome::Confirmed => debug!("Radio request confirmed"),
            Outcome::Cancelled => {
                info!("Radio request cancelled, restoring switch");
                self.set_switch(prior);
            }
        }
    }
}
