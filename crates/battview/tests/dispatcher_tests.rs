//! Integration tests for the dispatcher driving the controller against mock platforms

use battview::controller::{SUPPORT_ATTACHED, SUPPORT_MISSING};
use battview::{
    ControllerOptions, DevicePreset, Dispatcher, ElementId, Message, Source, platform_from_config,
};
use battview_config::{PlatformConfig, PlatformKind};
use battview_hal::{BatteryPlatform, BatteryState, MockPlatform, UNBOUNDED};
use std::sync::Arc;
use std::time::Duration;

const RENDER: Duration = Duration::from_millis(3000);
const LIVE_REGION: Duration = Duration::from_millis(1500);

/// Test environment sharing one mock between the test and the dispatcher
struct DispatcherTestEnv {
    mock: Arc<MockPlatform>,
    dispatcher: Dispatcher,
}

impl DispatcherTestEnv {
    fn new(mock: MockPlatform) -> Self {
        let mock = Arc::new(mock);
        let platform: Arc<dyn BatteryPlatform> = mock.clone();
        let dispatcher = Dispatcher::new(platform, ControllerOptions::default());
        Self { mock, dispatcher }
    }

    fn start(&mut self) {
        self.dispatcher.start(RENDER, LIVE_REGION);
    }

    /// Let spawned tasks run, then handle whatever they queued
    async fn settle(&mut self) {
        for _ in 0..10 {
            tokio::task::yield_now().await;
            self.dispatcher.drain();
        }
    }

    fn text(&self, id: ElementId) -> String {
        self.dispatcher.controller().surface().text(id)
    }

    fn source(&self) -> Source {
        self.dispatcher.controller().source()
    }
}

fn laptop_on_charger() -> BatteryState {
    BatteryState::new(0.72, true, 1800.0, UNBOUNDED)
}

#[tokio::test(start_paused = true)]
async fn test_attaches_live_battery() {
    let mut env = DispatcherTestEnv::new(MockPlatform::available(laptop_on_charger()));
    env.start();
    assert_eq!(env.source(), Source::Uninitialized);

    env.settle().await;

    assert_eq!(env.source(), Source::Live);
    assert_eq!(env.text(ElementId::SupportText), SUPPORT_ATTACHED);
    assert_eq!(env.text(ElementId::LevelText), "72%");
    assert_eq!(env.text(ElementId::StatusText), "Charging");
    assert_eq!(env.text(ElementId::TimeText), "30m");
    assert_eq!(env.text(ElementId::DemoControls), "none");
}

#[tokio::test(start_paused = true)]
async fn test_absent_platform_starts_in_demo() {
    let mut env = DispatcherTestEnv::new(MockPlatform::absent());
    env.start();

    assert_eq!(env.source(), Source::Simulated);
    assert!(env.dispatcher.controller().is_demo());
    assert_eq!(env.text(ElementId::SupportText), SUPPORT_MISSING);
    assert_eq!(env.text(ElementId::DemoControls), "block");
    assert_eq!(env.text(ElementId::DemoToggle), "checked");
    assert_eq!(env.text(ElementId::LevelText), "50%");
    assert_eq!(env.mock.handle_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_failing_platform_falls_back_to_demo() {
    let mut env = DispatcherTestEnv::new(MockPlatform::failing("denied"));
    env.start();
    env.settle().await;

    assert_eq!(env.source(), Source::Simulated);
    assert_eq!(env.text(ElementId::SupportText), SUPPORT_MISSING);
    assert_eq!(env.text(ElementId::DemoControls), "block");
    assert!(env.dispatcher.controller().live().is_none());
}

#[tokio::test(start_paused = true)]
async fn test_live_changes_are_forwarded() {
    let mut env = DispatcherTestEnv::new(MockPlatform::available(laptop_on_charger()));
    env.start();
    env.settle().await;

    env.mock.set_state(BatteryState::new(0.12, false, UNBOUNDED, 900.0));
    env.settle().await;

    assert_eq!(env.text(ElementId::LevelText), "12%");
    assert_eq!(env.text(ElementId::StatusText), "Low battery");
    assert_eq!(env.text(ElementId::TimeText), "15m");
    assert_eq!(env.text(ElementId::BatteryWrap), "lowpulse");
}

#[tokio::test(start_paused = true)]
async fn test_demo_mode_hides_live_changes() {
    let mut env = DispatcherTestEnv::new(MockPlatform::available(laptop_on_charger()));
    env.start();
    env.settle().await;

    env.dispatcher.dispatch(Message::SelectPreset(DevicePreset::Phone));
    env.mock.set_level(0.99);
    env.settle().await;

    assert_eq!(env.source(), Source::Simulated);
    assert_eq!(env.text(ElementId::LevelText), "18%");
    assert_eq!(env.text(ElementId::SimDevice), "phone");

    env.dispatcher.dispatch(Message::SetDemo(false));
    assert_eq!(env.source(), Source::Uninitialized);
    env.settle().await;

    assert_eq!(env.source(), Source::Live);
    assert_eq!(env.text(ElementId::LevelText), "99%");
}

#[tokio::test(start_paused = true)]
async fn test_stale_acquisition_is_ignored() {
    let mock = MockPlatform::available(laptop_on_charger()).with_delay(Duration::from_millis(100));
    let mut env = DispatcherTestEnv::new(mock);
    env.start();

    // Second request supersedes the first before either resolves
    env.dispatcher.dispatch(Message::Refresh);
    let pending = env.dispatcher.controller().pending_ticket();
    assert_eq!(pending, Some(2));
    env.settle().await;
    assert_eq!(env.source(), Source::Uninitialized);

    tokio::time::advance(Duration::from_millis(150)).await;
    env.settle().await;

    assert_eq!(env.source(), Source::Live);
    assert_eq!(env.dispatcher.controller().pending_ticket(), None);
    // Controller copy plus the change forwarder
    assert_eq!(env.mock.handle_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_handle_acquired_in_demo_is_kept_back() {
    let mock = MockPlatform::available(laptop_on_charger()).with_delay(Duration::from_millis(100));
    let mut env = DispatcherTestEnv::new(mock);
    env.start();
    env.dispatcher.dispatch(Message::SetDemo(true));
    env.settle().await;

    tokio::time::advance(Duration::from_millis(150)).await;
    env.settle().await;

    assert_eq!(env.source(), Source::Simulated);
    assert!(env.dispatcher.controller().live().is_some());
    assert_eq!(env.text(ElementId::SupportText), SUPPORT_ATTACHED);
    assert_eq!(env.text(ElementId::LevelText), "50%");
}

#[tokio::test(start_paused = true)]
async fn test_live_region_timer() {
    let mut env = DispatcherTestEnv::new(MockPlatform::absent());
    env.start();
    env.settle().await;
    assert_eq!(env.text(ElementId::BatteryLive), "");

    tokio::time::advance(LIVE_REGION).await;
    env.settle().await;

    assert_eq!(env.text(ElementId::BatteryLive), "50% - Normal - --:--");
}

#[tokio::test(start_paused = true)]
async fn test_render_timer_keeps_simulated_view() {
    let mut env = DispatcherTestEnv::new(MockPlatform::absent());
    env.start();
    env.dispatcher.dispatch(Message::SetLevel(30));
    assert_eq!(env.text(ElementId::LevelText), "30%");
    env.settle().await;

    tokio::time::advance(RENDER).await;
    env.settle().await;

    assert_eq!(env.text(ElementId::LevelText), "30%");
    assert_eq!(env.text(ElementId::TimeText), "3h 30m");
}

#[tokio::test(start_paused = true)]
async fn test_refresh_without_platform_shows_notice() {
    let mut env = DispatcherTestEnv::new(MockPlatform::absent());
    env.start();

    env.dispatcher.dispatch(Message::Refresh);
    assert!(env.text(ElementId::Notice).contains("not supported"));
    assert_eq!(env.dispatcher.controller().pending_ticket(), None);

    env.dispatcher.dispatch(Message::DismissNotice);
    assert_eq!(env.text(ElementId::Notice), "");
}

#[tokio::test(start_paused = true)]
async fn test_quit_through_sender() {
    let mut env = DispatcherTestEnv::new(MockPlatform::absent());
    env.start();

    env.dispatcher.sender().send(Message::Quit).unwrap();
    assert!(!env.dispatcher.next().await);
    assert!(env.dispatcher.is_quit());
    assert!(!env.dispatcher.next().await);
}

#[tokio::test(start_paused = true)]
async fn test_platform_from_config() {
    let mut config = PlatformConfig::default();

    config.kind = PlatformKind::None;
    assert!(!platform_from_config(&config).is_supported());

    config.kind = PlatformKind::Failing;
    let failing = platform_from_config(&config);
    assert!(failing.is_supported());
    assert!(failing.acquire().await.is_err());

    config.kind = PlatformKind::Mock;
    config.mock.level = 0.33;
    config.mock.charging_time = None;
    let battery = platform_from_config(&config).acquire().await.unwrap();
    assert_eq!(battery.snapshot().level, 0.33);
    assert_eq!(battery.snapshot().charging_time, UNBOUNDED);
}
