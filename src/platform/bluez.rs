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

//! BlueZ-backed Bluetooth service.

use anyhow::{anyhow, Result};
use bluer::{Adapter, AdapterEvent, AdapterProperty, Session};
use futures::{pin_mut, StreamExt};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use super::{BluetoothService, Subscription};
use crate::config::BluetoothConfig;
use crate::device::Device;
use crate::events::{EventKind, Outcome, PlatformEvent, RadioState, Reaction, ReactionSender};

/// Capacity of the internal notification bus.
const EVENT_BUS_CAPACITY: usize = 64;

/// Bluetooth service over a BlueZ adapter.
///
/// Platform notifications are published on a broadcast bus; each
/// [`Subscription`] forwards one kind of them to the screen.
pub struct BluezBluetooth {
    _session: Option<Session>,
    adapter: Option<Adapter>,
    bus: broadcast::Sender<PlatformEvent>,
    reactions: ReactionSender,
    scan_timeout: Duration,
    scan_task: Mutex<Option<JoinHandle<()>>>,
    radio_task: Option<JoinHandle<()>>,
}

impl BluezBluetooth {
    /// Connect to BlueZ and pick the configured (or default) adapter.
    ///
    /// A missing daemon or adapter is not an error: the service reports
    /// itself as not present instead.
    pub async fn new(config: &BluetoothConfig, reactions: ReactionSender) -> Result<Self> {
        info!("Initializing Bluetooth service...");

        let (bus, _) = broadcast::channel(EVENT_BUS_CAPACITY);
        let scan_timeout = Duration::from_secs(config.scan_timeout_secs);

        let session = match Session::new().await {
            Ok(session) => session,
            Err(e) => {
                warn!("BlueZ session unavailable: {}", e);
                return Ok(Self {
                    _session: None,
                    adapter: None,
                    bus,
                    reactions,
                    scan_timeout,
                    scan_task: Mutex::new(None),
                    radio_task: None,
                });
            }
        };
        info!("BlueZ session created");

        let adapter = match Self::find_adapter(&session, config.adapter.as_deref()).await {
            Ok(adapter) => {
                info!("Using Bluetooth adapter: {}", adapter.name());
                Some(adapter)
            }
            Err(e) => {
                warn!("No Bluetooth adapter: {}", e);
                None
            }
        };

        let radio_task = adapter
            .clone()
            .map(|adapter| tokio::spawn(watch_radio(adapter, bus.clone())));

        Ok(Self {
            _session: Some(session),
            adapter,
            bus,
            reactions,
            scan_timeout,
            scan_task: Mutex::new(None),
            radio_task,
        })
    }

    async fn find_adapter(session: &Session, name: Option<&str>) -> Result<Adapter> {
        let adapter = match name {
            Some(name) => session.adapter(name)?,
            None => session.default_adapter().await?,
        };
        // Named adapters are resolved lazily; make sure this one exists.
        let address = adapter.address().await?;
        debug!("Adapter {} has address {}", adapter.name(), address);
        Ok(adapter)
    }

    fn adapter(&self) -> Result<&Adapter> {
        self.adapter
            .as_ref()
            .ok_or_else(|| anyhow!("No Bluetooth adapter available"))
    }
}

impl BluetoothService for BluezBluetooth {
    fn is_present(&self) -> bool {
        self.adapter.is_some()
    }

    async fn is_enabled(&self) -> Result<bool> {
        match &self.adapter {
            Some(adapter) => Ok(adapter.is_powered().await?),
            None => Ok(false),
        }
    }

    fn request_radio(&self, enable: bool) {
        let reactions = self.reactions.clone();
        let Some(adapter) = self.adapter.clone() else {
            let _ = reactions.send(Reaction::RadioRequestResult(Outcome::Cancelled));
            return;
        };

        tokio::spawn(async move {
            let outcome = match adapter.set_powered(enable).await {
                Ok(()) => {
                    info!("Adapter powered {}", if enable { "on" } else { "off" });
                    Outcome::Confirmed
                }
                Err(e) => {
                    warn!(
                        "Failed to power {} adapter: {}",
                        if enable { "on" } else { "off" },
                        e
                    );
                    Outcome::Cancelled
                }
            };
            if reactions.send(Reaction::RadioRequestResult(outcome)).is_err() {
                debug!("Screen closed before radio request completed");
            }
        });
    }

    fn start_discovery(&self) -> Result<()> {
        let adapter = self.adapter()?.clone();
        let bus = self.bus.clone();
        let limit = self.scan_timeout;

        let task = tokio::spawn(async move {
            if let Err(e) = scan(adapter, bus.clone(), limit).await {
                error!("Discovery failed: {}", e);
            }
            let _ = bus.send(PlatformEvent::ScanFinished);
        });

        if let Some(previous) = self.scan_task.lock().replace(task) {
            debug!("Restarting discovery");
            previous.abort();
        }
        Ok(())
    }

    async fn bonded_devices(&self) -> Result<Vec<Device>> {
        let adapter = self.adapter()?;
        let mut devices = Vec::new();

        for address in adapter.device_addresses().await? {
            let device = adapter.device(address)?;
            if device.is_paired().await? {
                let name = device.name().await.unwrap_or_default();
                devices.push(Device::new(name, address.to_string()));
            }
        }

        debug!("{} bonded devices", devices.len());
        Ok(devices)
    }

    fn subscribe(&self, kind: EventKind) -> Result<Subscription> {
        let mut events = self.bus.subscribe();
        let reactions = self.reactions.clone();

        let forwarder = tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(event) if event.kind() == kind => {
                        if reactions.send(Reaction::Platform(event)).is_err() {
                            break;
                        }
                    }
                    Ok(_) => {}
                    Err(broadcast::error::RecvError::Lagged(missed)) => {
                        warn!("{:?} listener missed {} events", kind, missed);
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });

        debug!("Registered {:?} listener", kind);
        Ok(Subscription::new(kind, move || {
            forwarder.abort();
            debug!("Unregistered {:?} listener", kind);
        }))
    }
}

impl Drop for BluezBluetooth {
    fn drop(&mut self) {
        if let Some(task) = self.scan_task.lock().take() {
            task.abort();
        }
        if let Some(task) = self.radio_task.take() {
            task.abort();
        }
    }
}

/// Publish radio power transitions until the adapter goes away.
async fn watch_radio(adapter: Adapter, bus: broadcast::Sender<PlatformEvent>) {
    let events = match adapter.events().await {
        Ok(events) => events,
        Err(e) => {
            error!("Cannot watch adapter {}: {}", adapter.name(), e);
            return;
        }
    };
    pin_mut!(events);

    while let Some(event) = events.next().await {
        if let AdapterEvent::PropertyChanged(AdapterProperty::Powered(powered)) = event {
            let state = RadioState::from(powered);
            info!("Bluetooth radio is {:?}", state);
            let _ = bus.send(PlatformEvent::RadioStateChanged(state));
        }
    }

    debug!("Adapter event stream ended");
}

/// Decides which discovery reports become found devices.
///
/// BlueZ replays every known device when discovery starts, in range or not,
/// and resolves names after the first report. Only devices with a signal
/// strength are published, each once per scan. A device without a name is
/// held back for one more in-range report so the name can arrive.
#[derive(Debug, Default)]
struct ScanTracker {
    published: HashSet<String>,
    nameless: HashSet<String>,
}

impl ScanTracker {
    fn observe(
        &mut self,
        address: &str,
        rssi: Option<i16>,
        name: Option<String>,
    ) -> Option<Device> {
        if rssi.is_none() || self.published.contains(address) {
            return None;
        }
        let named = name.as_deref().is_some_and(|name| !name.is_empty());
        if !named && self.nameless.insert(address.to_string()) {
            return None;
        }

        self.nameless.remove(address);
        self.published.insert(address.to_string());
        Some(Device::new(name, address))
    }
}

/// Run one discovery session, publishing devices that are in range.
async fn scan(
    adapter: Adapter,
    bus: broadcast::Sender<PlatformEvent>,
    limit: Duration,
) -> Result<()> {
    info!("Starting discovery for {:?}", limit);

    let events = adapter.discover_devices_with_changes().await?;
    pin_mut!(events);

    let deadline = tokio::time::sleep(limit);
    tokio::pin!(deadline);

    let mut tracker = ScanTracker::default();

    loop {
        tokio::select! {
            _ = &mut deadline => {
                info!("Discovery finished");
                break;
            }
            event = events.next() => match event {
                Some(AdapterEvent::DeviceAdded(address)) => {
                    let device = match adapter.device(address) {
                        Ok(device) => device,
                        Err(e) => {
                            warn!("Skipping device {}: {}", address, e);
                            continue;
                        }
                    };
                    let rssi = device.rssi().await.unwrap_or_default();
                    let name = device.name().await.unwrap_or_default();
                    if let Some(found) = tracker.observe(&address.to_string(), rssi, name) {
                        debug!("Found {} ({:?}, rssi {:?})", address, found.name, rssi);
                        let _ = bus.send(PlatformEvent::DeviceFound(found));
                    }
                }
                Some(_) => {}
                None => {
                    debug!("Discovery stream ended");
                    break;
                }
            }
        }
    }

    Ok(())
}
