//! Polls the system for activation, new windows, and terminated
//! applications, and turns what it sees into controller events.

use std::time::Duration;

use tokio::time::{MissedTickBehavior, interval};
use tracing::{debug, trace};

use crate::actor::controller::{self, Event};
use crate::common::collections::HashSet;
use crate::sys::ax::{Attribute, System, SystemExt, pid_t};

pub struct Watcher<S: System> {
    system: S,
    events: controller::Sender<S::Element>,
    frontmost: Option<pid_t>,
    /// Window numbers already seen for the frontmost application.
    known_windows: HashSet<u32>,
    /// Every application that has been frontmost and not yet seen to exit.
    tracked: HashSet<pid_t>,
}

impl<S: System> Watcher<S> {
    pub fn new(system: S, events: controller::Sender<S::Element>) -> Self {
        Watcher {
            system,
            events,
            frontmost: None,
            known_windows: HashSet::default(),
            tracked: HashSet::default(),
        }
    }

    pub async fn run(mut self, period: Duration) {
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            if self.events.is_closed() {
                debug!("controller is gone; stopping watcher");
                break;
            }
            self.poll();
        }
    }

    pub fn poll(&mut self) {
        self.system.refresh();
        self.tracked.retain(|&pid| {
            let running = self.system.is_running(pid);
            if !running {
                debug!(pid, "application terminated");
                self.events.send(Event::AppTerminated(pid));
            }
            running
        });

        let current = self.system.frontmost_pid();
        if current != self.frontmost {
            self.frontmost = current;
            self.known_windows.clear();
            let Some(pid) = current else { return };
            debug!(pid, "application activated");
            self.tracked.insert(pid);
            // Windows that already exist are handled by the activation retry.
            let app = self.system.application(pid);
            for window in self.system.elements(&app, Attribute::Windows) {
                if let Some(number) = self.system.window_number(&window) {
                    self.known_windows.insert(number);
                }
            }
            self.events.send(Event::AppActivated(pid));
            return;
        }

        let Some(pid) = current else { return };
        let app = self.system.application(pid);
        for window in self.system.elements(&app, Attribute::Windows) {
            let Some(number) = self.system.window_number(&window) else { continue };
            if self.known_windows.insert(number) {
                trace!(pid, number, "new window");
                self.events.send(Event::WindowCreated { pid, window });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::actor;
    use crate::sys::geometry::{Point, Size};
    use crate::sys::stub::{StubElement, StubSystem};

    fn drain(rx: &mut controller::Receiver<StubElement>) -> Vec<String> {
        let mut seen = vec![];
        while let Some((_, event)) = rx.try_recv() {
            seen.push(match event {
                Event::AppActivated(pid) => format!("activated {pid}"),
                Event::WindowCreated { pid, window } => format!("created {pid}/{}", window.0),
                Event::AppTerminated(pid) => format!("terminated {pid}"),
                Event::CenterNow(_) => "center".into(),
                Event::LaunchCenter => "launch".into(),
            });
        }
        seen
    }

    #[test]
    fn reports_activation_new_windows_and_termination() {
        let stub = StubSystem::laptop();
        let system = &stub;
        let (tx, mut rx) = actor::channel();
        let mut watcher = Watcher::new(system, tx);

        system.add_window(1, 10, Point::new(0.0, 30.0), Size::new(400.0, 300.0));
        system.frontmost.set(Some(1));
        watcher.poll();
        assert_eq!(drain(&mut rx), vec!["activated 1"]);

        watcher.poll();
        assert!(drain(&mut rx).is_empty());

        system.add_window(1, 11, Point::new(0.0, 30.0), Size::new(400.0, 300.0));
        watcher.poll();
        assert_eq!(drain(&mut rx), vec!["created 1/11"]);

        system.frontmost.set(Some(2));
        watcher.poll();
        system.exited.borrow_mut().insert(1);
        watcher.poll();
        assert_eq!(drain(&mut rx), vec!["activated 2", "terminated 1"]);

        watcher.poll();
        assert!(drain(&mut rx).is_empty());
    }

    #[test]
    fn no_frontmost_application_sends_nothing() {
        let stub = StubSystem::laptop();
        let (tx, mut rx) = actor::channel();
        let mut watcher = Watcher::new(&stub, tx);
        watcher.poll();
        assert!(drain(&mut rx).is_empty());
    }
}
