//! Readiness and discovery flows against a scripted platform.

use anyhow::{anyhow, Result};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use bluetooth_pairing::events::{EventKind, Grant, Outcome, PlatformEvent, RadioState, Reaction};
use bluetooth_pairing::feed::ListMode;
use bluetooth_pairing::platform::{
    BluetoothService, LocationService, PermissionService, Platform, Subscription,
};
use bluetooth_pairing::readiness::{self, Readiness, ReadinessState};
use bluetooth_pairing::view::{DeviceListView, Notice, ScreenView};
use bluetooth_pairing::{Device, Screen};

type QueryLog = Rc<RefCell<Vec<&'static str>>>;

struct FakeBluetooth {
    present: Cell<bool>,
    enabled: Cell<bool>,
    bonded: RefCell<Vec<Device>>,
    radio_requests: RefCell<Vec<bool>>,
    discovery_starts: Cell<usize>,
    subscribed: RefCell<Vec<EventKind>>,
    released: Arc<AtomicUsize>,
    log: QueryLog,
}

impl BluetoothService for FakeBluetooth {
    fn is_present(&self) -> bool {
        self.log.borrow_mut().push("present");
        self.present.get()
    }

    async fn is_enabled(&self) -> Result<bool> {
        self.log.borrow_mut().push("radio");
        Ok(self.enabled.get())
    }

    fn request_radio(&self, enable: bool) {
        self.radio_requests.borrow_mut().push(enable);
    }

    fn start_discovery(&self) -> Result<()> {
        self.discovery_starts.set(self.discovery_starts.get() + 1);
        Ok(())
    }

    async fn bonded_devices(&self) -> Result<Vec<Device>> {
        if !self.present.get() {
            return Err(anyhow!("no adapter"));
        }
        Ok(self.bonded.borrow().clone())
    }

    fn subscribe(&self, kind: EventKind) -> Result<Subscription> {
        self.subscribed.borrow_mut().push(kind);
        let released = self.released.clone();
        Ok(Subscription::new(kind, move || {
            released.fetch_add(1, Ordering::SeqCst);
        }))
    }
}

struct FakePermissions {
    granted: Cell<bool>,
    requests: Cell<usize>,
    log: QueryLog,
}

impl PermissionService for FakePermissions {
    fn is_location_granted(&self) -> bool {
        self.log.borrow_mut().push("permission");
        self.granted.get()
    }

    fn request_location(&self) {
        self.requests.set(self.requests.get() + 1);
    }
}

struct FakeLocation {
    enabled: Cell<bool>,
    settings_opened: Cell<usize>,
    log: QueryLog,
}

impl LocationService for FakeLocation {
    fn services_enabled(&self) -> bool {
        self.log.borrow_mut().push("gps");
        self.enabled.get()
    }

    fn open_settings(&self) {
        self.settings_opened.set(self.settings_opened.get() + 1);
    }
}

struct FakePlatform {
    bluetooth: FakeBluetooth,
    permissions: FakePermissions,
    location: FakeLocation,
    log: QueryLog,
}

impl FakePlatform {
    fn new(present: bool, granted: bool, gps: bool, enabled: bool) -> Self {
        let log: QueryLog = Rc::new(RefCell::new(Vec::new()));
        Self {
            bluetooth: FakeBluetooth {
                present: Cell::new(present),
                enabled: Cell::new(enabled),
                bonded: RefCell::new(Vec::new()),
                radio_requests: RefCell::new(Vec::new()),
                discovery_starts: Cell::new(0),
                subscribed: RefCell::new(Vec::new()),
                released: Arc::new(AtomicUsize::new(0)),
                log: log.clone(),
            },
            permissions: FakePermissions {
                granted: Cell::new(granted),
                requests: Cell::new(0),
                log: log.clone(),
            },
            location: FakeLocation {
                enabled: Cell::new(gps),
                settings_opened: Cell::new(0),
                log: log.clone(),
            },
            log,
        }
    }

    fn ready() -> Self {
        Self::new(true, true, true, true)
    }

    fn take_log(&self) -> Vec<&'static str> {
        std::mem::take(&mut *self.log.borrow_mut())
    }

    fn subscriptions(&self, kind: EventKind) -> usize {
        self.bluetooth
            .subscribed
            .borrow()
            .iter()
            .filter(|k| **k == kind)
            .count()
    }

    fn released(&self) -> usize {
        self.bluetooth.released.load(Ordering::SeqCst)
    }
}

impl Platform for FakePlatform {
    type Bluetooth = FakeBluetooth;
    type Permissions = FakePermissions;
    type Location = FakeLocation;

    fn bluetooth(&self) -> &FakeBluetooth {
        &self.bluetooth
    }

    fn permissions(&self) -> &FakePermissions {
        &self.permissions
    }

    fn location(&self) -> &FakeLocation {
        &self.location
    }
}

#[derive(Default)]
struct RecordingView {
    switch: Option<bool>,
    notices: Vec<Notice>,
    rows: Vec<Device>,
    binds: usize,
    insertions: Vec<usize>,
}

impl RecordingView {
    fn count(&self, notice: Notice) -> usize {
        self.notices.iter().filter(|n| **n == notice).count()
    }
}

impl ScreenView for RecordingView {
    fn set_switch(&mut self, on: bool) {
        self.switch = Some(on);
    }

    fn show_notice(&mut self, notice: Notice) {
        self.notices.push(notice);
    }
}

impl DeviceListView for RecordingView {
    fn bind(&mut self, devices: &[Device]) {
        self.binds += 1;
        self.rows = devices.to_vec();
    }

    fn item_inserted(&mut self, index: usize, device: &Device) {
        self.insertions.push(index);
        self.rows.insert(index, device.clone());
    }
}

fn screen(platform: FakePlatform) -> Screen<FakePlatform, RecordingView> {
    Screen::new(platform, RecordingView::default(), false)
}

fn device(n: u8) -> Device {
    Device::named(format!("device-{}", n), format!("AA:BB:CC:DD:EE:{:02X}", n))
}

fn found(device: Device) -> Reaction {
    Reaction::Platform(PlatformEvent::DeviceFound(device))
}

#[tokio::test]
async fn test_checks_run_in_order() {
    let platform = FakePlatform::ready();
    assert_eq!(readiness::check(&platform).await.unwrap(), Readiness::Ready);
    assert_eq!(platform.take_log(), vec!["present", "permission", "gps", "radio"]);
}

#[tokio::test]
async fn test_missing_adapter_is_unsupported_regardless() {
    for granted in [false, true] {
        for gps in [false, true] {
            let platform = FakePlatform::new(false, granted, gps, false);
            assert_eq!(readiness::check(&platform).await.unwrap(), Readiness::Unsupported);
            assert_eq!(platform.take_log(), vec!["present"]);
        }
    }
}

#[tokio::test]
async fn test_denied_permission_stops_before_gps() {
    let platform = FakePlatform::new(true, false, true, true);
    assert_eq!(
        readiness::check(&platform).await.unwrap(),
        Readiness::PermissionRequired
    );
    assert_eq!(platform.take_log(), vec!["present", "permission"]);
}

#[tokio::test]
async fn test_snapshot_agrees_with_check() {
    let platform = FakePlatform::new(true, true, false, true);
    let snapshot = ReadinessState::snapshot(&platform).await.unwrap();
    assert!(!snapshot.gps_enabled);
    assert_eq!(snapshot.verdict(), readiness::check(&platform).await.unwrap());
}

#[tokio::test]
async fn test_unsupported_screen() {
    let mut screen = screen(FakePlatform::new(false, true, true, true));

    assert_eq!(screen.activate().await.unwrap(), Readiness::Unsupported);
    assert_eq!(screen.view().count(Notice::NotSupported), 1);
    assert!(!screen.is_listening(EventKind::RadioState));
    assert_eq!(screen.platform().bluetooth.discovery_starts.get(), 0);

    screen.show_paired_devices().await.unwrap();
    assert_eq!(screen.view().count(Notice::NotSupported), 2);
}

#[tokio::test]
async fn test_ready_starts_scan_and_listens() {
    let mut screen = screen(FakePlatform::ready());

    assert_eq!(screen.activate().await.unwrap(), Readiness::Ready);
    assert!(screen.is_scanning());
    assert!(screen.switch_on());
    assert_eq!(screen.view().switch, Some(true));
    assert!(screen.is_listening(EventKind::RadioState));
    assert!(screen.is_listening(EventKind::Discovery));
    assert_eq!(screen.platform().bluetooth.discovery_starts.get(), 1);
}

#[tokio::test]
async fn test_found_devices_append_in_order() {
    let mut screen = screen(FakePlatform::ready());
    screen.activate().await.unwrap();

    for n in 0..3 {
        screen.handle(found(device(n))).await.unwrap();
    }

    assert_eq!(screen.displayed(), &[device(0), device(1), device(2)]);
    assert_eq!(screen.view().insertions, vec![0, 1, 2]);
    assert_eq!(screen.view().rows, screen.displayed());

    // Same device reported again
    screen.handle(found(device(1))).await.unwrap();
    assert_eq!(screen.displayed().len(), 4);
    assert_eq!(screen.displayed()[3], device(1));
}

#[tokio::test]
async fn test_dedupe_by_address() {
    let mut screen = Screen::new(FakePlatform::ready(), RecordingView::default(), true);
    screen.activate().await.unwrap();

    screen.handle(found(device(1))).await.unwrap();
    screen.handle(found(device(1))).await.unwrap();

    assert_eq!(screen.displayed().len(), 1);
    assert_eq!(screen.view().insertions, vec![0]);
}

#[tokio::test]
async fn test_unnamed_device_is_listed() {
    let mut screen = screen(FakePlatform::ready());
    screen.activate().await.unwrap();

    let unnamed = Device::new(None, "11:22:33:44:55:66");
    screen.handle(found(unnamed.clone())).await.unwrap();

    assert_eq!(screen.view().rows, vec![unnamed]);
    assert_eq!(
        screen.view().rows[0].display_name("(no name)"),
        "(no name)"
    );
}

#[tokio::test]
async fn test_paired_devices_replace_scan_results() {
    let platform = FakePlatform::ready();
    *platform.bluetooth.bonded.borrow_mut() = vec![device(9), device(8)];
    let mut screen = screen(platform);
    screen.activate().await.unwrap();

    screen.handle(found(device(1))).await.unwrap();
    screen.handle(found(device(2))).await.unwrap();

    screen.show_paired_devices().await.unwrap();
    assert_eq!(screen.list_mode(), ListMode::Paired);
    assert_eq!(screen.displayed(), &[device(9), device(8)]);
    assert_eq!(screen.view().rows, vec![device(9), device(8)]);

    // Scan results no longer reach the paired view.
    screen.handle(found(device(3))).await.unwrap();
    assert_eq!(screen.view().rows, vec![device(9), device(8)]);

    // A new scan brings the discovered list back.
    screen.ensure_ready().await.unwrap();
    assert_eq!(screen.list_mode(), ListMode::Discovered);
    assert_eq!(screen.view().rows, vec![device(1), device(2), device(3)]);
}

#[tokio::test]
async fn test_switch_toggle_cancelled_reverts() {
    let mut screen = screen(FakePlatform::new(true, true, true, false));
    assert_eq!(screen.activate().await.unwrap(), Readiness::RadioOff);
    assert!(!screen.switch_on());

    screen.on_switch_toggled(true);
    assert!(screen.switch_on());
    assert_eq!(*screen.platform().bluetooth.radio_requests.borrow(), vec![true]);

    screen
        .handle(Reaction::RadioRequestResult(Outcome::Cancelled))
        .await
        .unwrap();
    assert!(!screen.switch_on());
    assert_eq!(screen.view().switch, Some(false));
}

#[tokio::test]
async fn test_switch_toggle_confirmed_keeps_position() {
    let mut screen = screen(FakePlatform::ready());
    screen.activate().await.unwrap();

    screen.on_switch_toggled(false);
    screen
        .handle(Reaction::RadioRequestResult(Outcome::Confirmed))
        .await
        .unwrap();
    assert!(!screen.switch_on());

    // A result nobody asked for changes nothing.
    screen
        .handle(Reaction::RadioRequestResult(Outcome::Cancelled))
        .await
        .unwrap();
    assert!(!screen.switch_on());
}

#[tokio::test]
async fn test_toggle_while_request_outstanding_is_ignored() {
    let mut screen = screen(FakePlatform::new(true, true, true, false));
    screen.activate().await.unwrap();

    screen.on_switch_toggled(true);
    screen.on_switch_toggled(false);
    assert_eq!(*screen.platform().bluetooth.radio_requests.borrow(), vec![true]);
    assert!(screen.switch_on());
    assert_eq!(screen.view().switch, Some(true));

    screen
        .handle(Reaction::RadioRequestResult(Outcome::Confirmed))
        .await
        .unwrap();
    screen
        .handle(Reaction::RadioRequestResult(Outcome::Cancelled))
        .await
        .unwrap();

    // The radio went on, so the switch stays on.
    assert!(screen.switch_on());
    assert_eq!(screen.view().switch, Some(true));

    // Once answered, toggles reach the radio again.
    screen.on_switch_toggled(false);
    assert_eq!(
        *screen.platform().bluetooth.radio_requests.borrow(),
        vec![true, false]
    );
    screen
        .handle(Reaction::RadioRequestResult(Outcome::Cancelled))
        .await
        .unwrap();
    assert!(screen.switch_on());
}

#[tokio::test]
async fn test_scan_finished_clears_scanning() {
    let mut screen = screen(FakePlatform::ready());
    screen.activate().await.unwrap();
    screen.handle(found(device(1))).await.unwrap();
    assert!(screen.is_scanning());

    screen
        .handle(Reaction::Platform(PlatformEvent::ScanFinished))
        .await
        .unwrap();
    assert!(!screen.is_scanning());
    assert!(screen.is_listening(EventKind::Discovery));
    assert_eq!(screen.displayed(), &[device(1)]);

    // Scanning again restarts discovery and keeps earlier results.
    screen.ensure_ready().await.unwrap();
    assert!(screen.is_scanning());
    assert_eq!(screen.platform().bluetooth.discovery_starts.get(), 2);
    assert_eq!(screen.view().rows, vec![device(1)]);
}

#[tokio::test]
async fn test_permission_denied_is_not_retried() {
    let mut screen = screen(FakePlatform::new(true, false, true, true));
    assert_eq!(screen.activate().await.unwrap(), Readiness::PermissionRequired);
    assert_eq!(screen.platform().permissions.requests.get(), 1);

    screen
        .handle(Reaction::PermissionResult(Grant::Denied))
        .await
        .unwrap();

    assert_eq!(screen.view().count(Notice::PermissionRequired), 1);
    assert_eq!(screen.platform().permissions.requests.get(), 1);
    assert!(!screen.is_scanning());
}

#[tokio::test]
async fn test_settings_cancelled_checks_once() {
    let mut screen = screen(FakePlatform::new(true, true, false, true));
    assert_eq!(
        screen.activate().await.unwrap(),
        Readiness::LocationServicesRequired
    );
    assert_eq!(screen.platform().location.settings_opened.get(), 1);

    screen
        .handle(Reaction::SettingsResult(Outcome::Cancelled))
        .await
        .unwrap();

    assert_eq!(screen.view().count(Notice::LocationServicesRequired), 1);
    assert_eq!(screen.platform().location.settings_opened.get(), 1);
    assert!(!screen.is_scanning());
}

#[tokio::test]
async fn test_settings_cancelled_but_enabled_continues() {
    let mut screen = screen(FakePlatform::new(true, true, false, true));
    screen.activate().await.unwrap();

    screen.platform().location.enabled.set(true);
    screen
        .handle(Reaction::SettingsResult(Outcome::Cancelled))
        .await
        .unwrap();

    assert_eq!(screen.readiness(), Some(Readiness::Ready));
    assert!(screen.view().notices.is_empty());
}

#[tokio::test]
async fn test_radio_off_notice() {
    let mut screen = screen(FakePlatform::ready());
    screen.activate().await.unwrap();

    screen
        .handle(Reaction::Platform(PlatformEvent::RadioStateChanged(RadioState::Off)))
        .await
        .unwrap();

    assert_eq!(screen.view().count(Notice::RadioRequired), 1);
    assert!(!screen.switch_on());
    assert!(!screen.is_scanning());
}

#[tokio::test]
async fn test_repeated_ready_subscribes_once() {
    let mut screen = screen(FakePlatform::ready());
    screen.activate().await.unwrap();
    screen.ensure_ready().await.unwrap();
    screen
        .handle(Reaction::Platform(PlatformEvent::RadioStateChanged(RadioState::On)))
        .await
        .unwrap();

    let platform = screen.platform();
    assert_eq!(platform.bluetooth.discovery_starts.get(), 3);
    assert_eq!(platform.subscriptions(EventKind::Discovery), 1);
    assert_eq!(platform.subscriptions(EventKind::RadioState), 1);
}

#[tokio::test]
async fn test_listeners_released_exactly_once() {
    let mut screen = screen(FakePlatform::ready());
    screen.activate().await.unwrap();
    let released = screen.platform().bluetooth.released.clone();

    screen.deactivate();
    assert_eq!(released.load(Ordering::SeqCst), 2);
    assert_eq!(screen.platform().released(), 2);
    assert!(!screen.is_listening(EventKind::RadioState));

    screen.deactivate();
    drop(screen);
    assert_eq!(released.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_listeners_released_on_drop() {
    let mut screen = screen(FakePlatform::ready());
    screen.activate().await.unwrap();
    let released = screen.platform().bluetooth.released.clone();

    drop(screen);
    assert_eq!(released.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_full_readiness_walkthrough() {
    let mut screen = screen(FakePlatform::new(true, false, false, false));

    assert_eq!(screen.activate().await.unwrap(), Readiness::PermissionRequired);
    assert!(screen.is_listening(EventKind::RadioState));

    // User grants the permission.
    screen.platform().permissions.granted.set(true);
    screen
        .handle(Reaction::PermissionResult(Grant::Granted))
        .await
        .unwrap();
    assert_eq!(screen.readiness(), Some(Readiness::LocationServicesRequired));

    // User turns on location services.
    screen.platform().location.enabled.set(true);
    screen
        .handle(Reaction::SettingsResult(Outcome::Confirmed))
        .await
        .unwrap();
    assert_eq!(screen.readiness(), Some(Readiness::RadioOff));
    assert!(!screen.is_scanning());

    // User turns on the radio.
    screen.on_switch_toggled(true);
    screen.platform().bluetooth.enabled.set(true);
    screen
        .handle(Reaction::RadioRequestResult(Outcome::Confirmed))
        .await
        .unwrap();
    screen
        .handle(Reaction::Platform(PlatformEvent::RadioStateChanged(RadioState::On)))
        .await
        .unwrap();

    assert_eq!(screen.readiness(), Some(Readiness::Ready));
    assert!(screen.is_scanning());
    assert!(screen.switch_on());
    assert_eq!(screen.platform().bluetooth.discovery_starts.get(), 1);
    assert_eq!(screen.view().count(Notice::RadioOn), 1);
    assert_eq!(screen.platform().permissions.requests.get(), 1);
    assert_eq!(screen.platform().location.settings_opened.get(), 1);
}
