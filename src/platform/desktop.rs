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

//! Desktop stand-ins for the permission dialog and the location settings screen.
//!
//! Both are answered from the tray menu: a request parks a [`Prompt`] here,
//! the tray renders it, and the user's answer is turned into a reaction.

use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::{LocationService, PermissionService};
use crate::config::Config;
use crate::events::{Grant, Outcome, Reaction, ReactionSender};

/// A question waiting for the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prompt {
    /// "Allow location access?"
    LocationPermission,
    /// "Turn on location services?"
    LocationSettings,
}

impl Prompt {
    pub fn question(&self) -> &'static str {
        match self {
            Prompt::LocationPermission => "Allow location access for Bluetooth scanning?",
            Prompt::LocationSettings => "Location services are off",
        }
    }

    pub fn accept_label(&self) -> &'static str {
        match self {
            Prompt::LocationPermission => "Allow",
            Prompt::LocationSettings => "Turn on location services",
        }
    }

    pub fn decline_label(&self) -> &'static str {
        match self {
            Prompt::LocationPermission => "Deny",
            Prompt::LocationSettings => "Cancel",
        }
    }
}

#[derive(Debug)]
struct SettingsState {
    location_granted: RwLock<bool>,
    services_enabled: RwLock<bool>,
    pending: RwLock<Option<Prompt>>,
}

/// Permission and location state shared between the screen and the tray.
#[derive(Debug, Clone)]
pub struct DesktopSettings {
    state: Arc<SettingsState>,
    reactions: ReactionSender,
}

impl DesktopSettings {
    pub fn new(location_granted: bool, services_enabled: bool, reactions: ReactionSender) -> Self {
        Self {
            state: Arc::new(SettingsState {
                location_granted: RwLock::new(location_granted),
                services_enabled: RwLock::new(services_enabled),
                pending: RwLock::new(None),
            }),
            reactions,
        }
    }

    pub fn from_config(config: &Config, reactions: ReactionSender) -> Self {
        Self::new(
            config.permissions.location_granted,
            config.location.services_enabled,
            reactions,
        )
    }

    /// The prompt currently waiting for an answer.
    pub fn pending(&self) -> Option<Prompt> {
        *self.state.pending.read()
    }

    /// Answer the pending prompt.
    pub fn answer(&self, accept: bool) {
        let Some(prompt) = self.state.pending.write().take() else {
            debug!("No prompt pending, ignoring answer");
            return;
        };

        let reaction = match prompt {
            Prompt::LocationPermission => {
                if accept {
                    *self.state.location_granted.write() = true;
                }
                info!("Location permission {}", if accept { "granted" } else { "denied" });
                Reaction::PermissionResult(if accept { Grant::Granted } else { Grant::Denied })
            }
            Prompt::LocationSettings => {
                if accept {
                    *self.state.services_enabled.write() = true;
                }
                info!(
                    "Location settings {}",
                    if accept { "confirmed" } else { "cancelled" }
                );
                Reaction::SettingsResult(if accept {
                    Outcome::Confirmed
                } else {
                    Outcome::Cancelled
                })
            }
        };

        self.send(reaction);
    }

    fn raise(&self, prompt: Prompt) {
        let mut pending = self.state.pending.write();
        if let Some(current) = *pending {
            warn!("Replacing unanswered prompt {:?} with {:?}", current, prompt);
        }
        *pending = Some(prompt);
        info!("Prompt raised: {}", prompt.question());
    }

    fn send(&self, reaction: Reaction) {
        if self.reactions.send(reaction).is_err() {
            warn!("Screen is gone, dropping prompt answer");
        }
    }
}

impl PermissionService for DesktopSettings {
    fn is_location_granted(&self) -> bool {
        *self.state.location_granted.read()
    }

    fn request_location(&self) {
        self.raise(Prompt::LocationPermission);
    }
}

impl LocationService for DesktopSettings {
    fn services_enabled(&self) -> bool {
        *self.state.services_enabled.read()
    }

    fn open_settings(&self) {
        self.raise(Prompt::LocationSettings);
    }
}
