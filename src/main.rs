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

//! Bluetooth Pairing desktop application.

use anyhow::Result;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bluetooth_pairing::config::Config;
use bluetooth_pairing::events::reaction_channel;
use bluetooth_pairing::platform::{BluezBluetooth, DesktopSettings, LinuxPlatform};
use bluetooth_pairing::screen::Screen;
use bluetooth_pairing::state::AppState;
use bluetooth_pairing::ui::{self, TrayAction, TrayView};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("bluetooth_pairing=info".parse()?),
        )
        .init();

    info!(
        "Starting Bluetooth Pairing v{}...",
        env!("CARGO_PKG_VERSION")
    );

    // Load configuration
    let config = Config::load()?;
    info!("Configuration loaded");

    let (reaction_tx, mut reaction_rx) = reaction_channel();

    let bluetooth = BluezBluetooth::new(&config.bluetooth, reaction_tx.clone()).await?;
    let settings = DesktopSettings::from_config(&config, reaction_tx);

    // Start system tray
    let state = AppState::new();
    let (mut action_rx, tray) = ui::run_tray(
        state.clone(),
        settings.clone(),
        config.list.unnamed_label.clone(),
    )?;

    let platform = LinuxPlatform::new(bluetooth, settings.clone());
    let view = TrayView::new(state.clone());
    let mut screen = Screen::new(platform, view, config.list.dedupe_by_address);

    if let Err(e) = screen.activate().await {
        error!("Failed to activate screen: {}", e);
    }
    sync_state(&screen, &state);
    tray.update(|_| {});

    info!("Ready. System tray active.");

    loop {
        tokio::select! {
            Some(reaction) = reaction_rx.recv() => {
                if let Err(e) = screen.handle(reaction).await {
                    error!("Error handling reaction: {}", e);
                }
            }
            Some(action) = action_rx.recv() => {
                match action {
                    TrayAction::ToggleBluetooth => {
                        let requested = !screen.switch_on();
                        screen.on_switch_toggled(requested);
                    }
                    TrayAction::AnswerPrompt(accept) => {
                        settings.answer(accept);
                    }
                    TrayAction::ShowPairedDevices => {
                        if let Err(e) = screen.show_paired_devices().await {
                            error!("Failed to list paired devices: {}", e);
                        }
                    }
                    TrayAction::Scan => {
                        if let Err(e) = screen.ensure_ready().await {
                            error!("Readiness check failed: {}", e);
                        }
                    }
                    TrayAction::Quit => {
                        info!("Quit requested");
                        break;
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Shutdown signal received");
                break;
            }
        }

        sync_state(&screen, &state);
        tray.update(|_| {});
    }

    screen.deactivate();

    info!("Bluetooth Pairing stopped");
    Ok(())
}

/// Copy the screen's status into the tray state.
fn sync_state(screen: &Screen<LinuxPlatform, TrayView>, state: &Arc<AppState>) {
    state.set_readiness(screen.readiness());
    state.set_scanning(screen.is_scanning());
    state.set_list_mode(screen.list_mode());
}
