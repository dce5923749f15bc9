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

//! System tray implementation using ksni.

use anyhow::Result;
use ksni::{
    self,
    menu::{CheckmarkItem, StandardItem},
    Handle, MenuItem, Tray, TrayService,
};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::info;

use crate::feed::ListMode;
use crate::platform::DesktopSettings;
use crate::state::AppState;

/// Actions that can be triggered from the tray menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrayAction {
    /// The Bluetooth switch was clicked.
    ToggleBluetooth,
    /// Answer to the pending permission or settings prompt.
    AnswerPrompt(bool),
    ShowPairedDevices,
    Scan,
    Quit,
}

/// System tray icon and menu.
pub struct PairingTray {
    state: Arc<AppState>,
    settings: DesktopSettings,
    unnamed_label: String,
    action_tx: mpsc::UnboundedSender<TrayAction>,
}

impl PairingTray {
    pub fn new(
        state: Arc<AppState>,
        settings: DesktopSettings,
        unnamed_label: String,
        action_tx: mpsc::UnboundedSender<TrayAction>,
    ) -> Self {
        Self {
            state,
            settings,
            unnamed_label,
            action_tx,
        }
    }

    fn send(&self, action: TrayAction) {
        let _ = self.action_tx.send(action);
    }
}

impl Tray for PairingTray {
    fn icon_name(&self) -> String {
        if self.state.is_switch_on() {
            "bluetooth-active".to_string()
        } else {
            "bluetooth-disabled".to_string()
        }
    }

    fn title(&self) -> String {
        "Bluetooth Pairing".to_string()
    }

    fn tool_tip(&self) -> ksni::ToolTip {
        let mut description = self.state.status_text();
        if let Some((notice, at)) = self.state.get_notice() {
            description.push_str(&format!("\n{} ({})", notice, at.format("%H:%M:%S")));
        }

        ksni::ToolTip {
            icon_name: String::new(),
            icon_pixmap: Vec::new(),
            title: "Bluetooth Pairing".to_string(),
            description,
        }
    }

    fn menu(&self) -> Vec<MenuItem<Self>> {
        let mut items = vec![];

        // Status header
        items.push(MenuItem::Standard(StandardItem {
            label: self.state.status_text(),
            enabled: false,
            ..Default::default()
        }));

        items.push(MenuItem::Checkmark(CheckmarkItem {
            label: "Bluetooth".to_string(),
            checked: self.state.is_switch_on(),
            activate: Box::new(|tray: &mut Self| tray.send(TrayAction::ToggleBluetooth)),
            ..Default::default()
        }));

        if let Some(prompt) = self.settings.pending() {
            items.push(MenuItem::Separator);
            items.push(MenuItem::Standard(StandardItem {
                label: prompt.question().to_string(),
                enabled: false,
                ..Default::default()
            }));
            items.push(MenuItem::Standard(StandardItem {
                label: prompt.accept_label().to_string(),
                activate: Box::new(|tray: &mut Self| tray.send(TrayAction::AnswerPrompt(true))),
                ..Default::default()
            }));
            items.push(MenuItem::Standard(StandardItem {
                label: prompt.decline_label().to_string(),
                activate: Box::new(|tray: &mut Self| tray.send(TrayAction::AnswerPrompt(false))),
                ..Default::default()
            }));
        }

        items.push(MenuItem::Separator);

        // Device rows
        let heading = match self.state.get_list_mode() {
            ListMode::Discovered => "Available devices",
            ListMode::Paired => "Paired devices",
        };
        items.push(MenuItem::Standard(StandardItem {
            label: heading.to_string(),
            enabled: false,
            ..Default::default()
        }));

        let rows = self.state.get_rows();
        if rows.is_empty() {
            items.push(MenuItem::Standard(StandardItem {
                label: "No devices".to_string(),
                enabled: false,
                ..Default::default()
            }));
        }
        for device in rows {
            items.push(MenuItem::Standard(StandardItem {
                label: format!(
                    "{}    {}",
                    device.display_name(&self.unnamed_label),
                    device.address
                ),
                ..Default::default()
            }));
        }

        items.push(MenuItem::Separator);

        items.push(MenuItem::Standard(StandardItem {
            label: "Scan for devices".to_string(),
            activate: Box::new(|tray: &mut Self| tray.send(TrayAction::Scan)),
            ..Default::default()
        }));

        items.push(MenuItem::Standard(StandardItem {
            label: "Show paired devices".to_string(),
            activate: Box::new(|tray: &mut Self| tray.send(TrayAction::ShowPairedDevices)),
            ..Default::default()
        }));

        items.push(MenuItem::Separator);

        // Quit
        items.push(MenuItem::Standard(StandardItem {
            label: "Quit".to_string(),
            activate: Box::new(|tray: &mut Self| tray.send(TrayAction::Quit)),
            ..Default::default()
        }));

        items
    }

    fn id(&self) -> String {
        "bluetooth-pairing".to_string()
    }

    fn category(&self) -> ksni::Category {
        ksni::Category::Hardware
    }
}

/// Run the system tray service.
pub fn run_tray(
    state: Arc<AppState>,
    settings: DesktopSettings,
    unnamed_label: String,
) -> Result<(mpsc::UnboundedReceiver<TrayAction>, Handle<PairingTray>)> {
    let (action_tx, action_rx) = mpsc::unbounded_channel();

    let tray = PairingTray::new(state, settings, unnamed_label, action_tx);
    let service = TrayService::new(tray);
    let handle = service.handle();

    // Spawn the tray service
    std::thread::spawn(move || {
        let _ = service.run();
    });

    info!("System tray started");

    Ok((action_rx, handle))
}
