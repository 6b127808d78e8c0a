//! Message dispatcher
//!
//! Feeds the controller one message at a time and carries out the commands it
//! returns. Platform acquisition, change forwarding and the two refresh timers
//! run as tokio tasks that only talk to the controller through the channel.

use battview_config::{PlatformConfig, PlatformKind};
use battview_hal::{BatteryPlatform, BatteryState, MockPlatform, SysfsPlatform, UNBOUNDED};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::controller::{Command, ControllerOptions, Message, ViewController};

/// Build the platform named by the configuration
pub fn platform_from_config(config: &PlatformConfig) -> Arc<dyn BatteryPlatform> {
    let platform: Arc<dyn BatteryPlatform> = match config.kind {
        PlatformKind::Sysfs => Arc::new(SysfsPlatform::detect(
            &config.power_supply_dir,
            config.poll_interval(),
        )),
        PlatformKind::Mock => {
            let mock = &config.mock;
            Arc::new(MockPlatform::available(BatteryState::new(
                mock.level,
                mock.charging,
                mock.charging_time.unwrap_or(UNBOUNDED),
                mock.discharging_time.unwrap_or(UNBOUNDED),
            )))
        }
        PlatformKind::Failing => Arc::new(MockPlatform::failing("configured to fail")),
        PlatformKind::None => Arc::new(MockPlatform::absent()),
    };

    info!(
        "Using {} platform (supported: {})",
        platform.name(),
        platform.is_supported()
    );
    platform
}

/// Single consumer of controller messages
pub struct Dispatcher {
    controller: ViewController,
    platform: Arc<dyn BatteryPlatform>,
    tx: mpsc::UnboundedSender<Message>,
    rx: mpsc::UnboundedReceiver<Message>,
    watcher: Option<JoinHandle<()>>,
    timers: Vec<JoinHandle<()>>,
    quit: bool,
}

impl Dispatcher {
    pub fn new(platform: Arc<dyn BatteryPlatform>, options: ControllerOptions) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let controller = ViewController::new(platform.is_supported(), options);

        Self {
            controller,
            platform,
            tx,
            rx,
            watcher: None,
            timers: Vec::new(),
            quit: false,
        }
    }

    /// Initialize the controller and start both refresh timers.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&mut self, render_interval: Duration, live_region_interval: Duration) {
        let commands = self.controller.initialize();
        self.execute_all(commands);

        // Render ticks are not de-duplicated against live change notifications
        self.timers
            .push(spawn_ticker(self.tx.clone(), render_interval, || Message::RenderTick));
        self.timers.push(spawn_ticker(
            self.tx.clone(),
            live_region_interval,
            || Message::LiveRegionTick,
        ));
    }

    /// Sender for input sources outside the dispatcher
    pub fn sender(&self) -> mpsc::UnboundedSender<Message> {
        self.tx.clone()
    }

    /// Handle one message right away
    pub fn dispatch(&mut self, message: Message) {
        let commands = self.controller.update(message);
        self.execute_all(commands);
    }

    /// Wait for the next message and handle it. Returns `false` once quit.
    pub async fn next(&mut self) -> bool {
        if self.quit {
            return false;
        }
        match self.rx.recv().await {
            Some(message) => {
                self.dispatch(message);
                !self.quit
            }
            None => false,
        }
    }

    /// Handle every message already queued without waiting
    pub fn drain(&mut self) -> usize {
        let mut handled = 0;
        while !self.quit {
            match self.rx.try_recv() {
                Ok(message) => {
                    self.dispatch(message);
                    handled += 1;
                }
                Err(_) => break,
            }
        }
        handled
    }

    pub fn controller(&self) -> &ViewController {
        &self.controller
    }

    pub fn is_quit(&self) -> bool {
        self.quit
    }

    fn execute_all(&mut self, commands: Vec<Command>) {
        for command in commands {
            self.execute(command);
        }
    }

    fn execute(&mut self, command: Command) {
        match command {
            Command::Acquire { ticket } => {
                let request = self.platform.acquire();
                let tx = self.tx.clone();
                tokio::spawn(async move {
                    let result = request.await;
                    let _ = tx.send(Message::Acquired { ticket, result });
                });
            }
            Command::Watch(mut live) => {
                self.stop_watcher();
                let tx = self.tx.clone();
                self.watcher = Some(tokio::spawn(async move {
                    while live.changed().await.is_ok() {
                        if tx.send(Message::LiveChanged).is_err() {
                            break;
                        }
                    }
                    debug!("Live battery forwarder stopped");
                }));
            }
            Command::Unwatch => self.stop_watcher(),
            Command::Quit => {
                info!("Quit requested");
                self.quit = true;
            }
        }
    }

    fn stop_watcher(&mut self) {
        if let Some(watcher) = self.watcher.take() {
            watcher.abort();
        }
    }
}

impl Drop for Dispatcher {
    fn drop(&mut self) {
        self.stop_watcher();
        for timer in self.timers.drain(..) {
            timer.abort();
        }
    }
}

/// Send `make()` every `period`, starting one period from now
fn spawn_ticker(
    tx: mpsc::UnboundedSender<Message>,
    period: Duration,
    make: fn() -> Message,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        ticker.tick().await;

        loop {
            ticker.tick().await;
            if tx.send(make()).is_err() {
                break;
            }
        }
    })
}
