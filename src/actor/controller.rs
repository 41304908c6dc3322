//! Decides when to center. The controller follows the frontmost application,
//! runs a bounded retry loop after activation, and remembers which windows it
//! has already centered so they are not moved again.

use tokio::sync::oneshot;
use tracing::{debug, info, instrument, trace, warn};

use crate::actor;
use crate::common::config::Config;
use crate::engine::selection::is_eligible;
use crate::engine::{CenterEngine, CenterError, Centered, SelectionPolicy};
use crate::model::{CenteredLedger, WindowKey};
use crate::sys::ax::{System, SystemExt, pid_t};
use crate::sys::timer::Timer;

pub type Reply = oneshot::Sender<Result<Centered, CenterError>>;

#[derive(Debug)]
pub enum Event<E> {
    AppActivated(pid_t),
    WindowCreated { pid: pid_t, window: E },
    AppTerminated(pid_t),
    /// Explicit request to center the focused window of the frontmost
    /// application, regardless of what was centered before.
    CenterNow(Option<Reply>),
    /// Start-up pass over whatever application is frontmost.
    LaunchCenter,
}

pub type Sender<E> = actor::Sender<Event<E>>;
pub type Receiver<E> = actor::Receiver<Event<E>>;

enum State {
    Detached,
    Attached { pid: pid_t, retry: Option<Retry> },
}

struct Retry {
    timer: Timer,
    attempts_left: u32,
}

#[derive(Debug, PartialEq, Eq)]
enum Attempt {
    Centered,
    /// Nothing more to do for this window, without having moved it.
    Done,
    Again,
}

pub struct Controller<S: System> {
    engine: CenterEngine<S>,
    ledger: CenteredLedger,
    config: Config,
    rx: Receiver<S::Element>,
    state: State,
}

impl<S: System> Controller<S> {
    pub fn new(engine: CenterEngine<S>, config: Config, rx: Receiver<S::Element>) -> Self {
        Controller {
            engine,
            ledger: CenteredLedger::new(config.ledger.capacity),
            config,
            rx,
            state: State::Detached,
        }
    }

    pub async fn run(mut self) {
        loop {
            let timer = match &mut self.state {
                State::Attached { retry: Some(retry), .. } => Some(&mut retry.timer),
                _ => None,
            };
            tokio::select! {
                _ = fire(timer) => self.on_retry_timer(),
                maybe = self.rx.recv() => match maybe {
                    Some((span, event)) => {
                        let _enter = span.enter();
                        self.handle_event(event);
                    }
                    None => break,
                },
            }
        }
        debug!("controller channel closed");
    }

    #[instrument(name = "controller::handle_event", skip(self, event))]
    fn handle_event(&mut self, event: Event<S::Element>) {
        match event {
            Event::AppActivated(pid) => self.on_app_activated(pid),
            Event::WindowCreated { pid, window } => self.on_window_created(pid, &window),
            Event::AppTerminated(pid) => self.on_app_terminated(pid),
            Event::CenterNow(reply) => self.on_center_now(reply),
            Event::LaunchCenter => self.on_launch_center(),
        }
    }

    fn on_app_activated(&mut self, pid: pid_t) {
        if matches!(self.state, State::Attached { pid: current, .. } if current == pid) {
            trace!(pid, "already attached");
            return;
        }
        self.attach(pid, self.config.settings.auto_center);
    }

    fn on_window_created(&mut self, pid: pid_t, window: &S::Element) {
        if !self.config.settings.auto_center {
            return;
        }
        if !matches!(self.state, State::Attached { pid: current, .. } if current == pid) {
            trace!(pid, "window created in a background application");
            return;
        }
        if !is_eligible(self.engine.system(), window) {
            trace!(pid, "ignoring ineligible new window");
            return;
        }
        let app = self.engine.system().application(pid);
        if self.center_once(pid, window, &app) == Attempt::Centered {
            self.stop_retry();
        }
    }

    fn on_app_terminated(&mut self, pid: pid_t) {
        self.engine.forget_process(pid);
        self.ledger.forget_process(pid);
        if matches!(self.state, State::Attached { pid: current, .. } if current == pid) {
            debug!(pid, "frontmost application terminated");
            self.state = State::Detached;
        }
    }

    fn on_center_now(&mut self, reply: Option<Reply>) {
        let result = self.engine.center_frontmost(SelectionPolicy::FocusedOnly);
        match &result {
            Ok(centered) => {
                info!(pid = centered.pid, strategy = %centered.strategy, "centered on request")
            }
            Err(err) if err.is_silent() => debug!("{err}"),
            Err(err) => warn!("could not center window: {err}"),
        }
        if let Some(reply) = reply {
            _ = reply.send(result);
        }
    }

    fn on_launch_center(&mut self) {
        if !self.config.settings.center_on_launch {
            return;
        }
        match self.engine.frontmost() {
            Ok((pid, _)) => self.attach(pid, true),
            Err(err) => debug!("nothing to center at launch: {err}"),
        }
    }

    fn attach(&mut self, pid: pid_t, with_retry: bool) {
        let retry = (with_retry && self.config.retry.attempts > 0).then(|| Retry {
            timer: Timer::after(self.config.retry.initial_delay()),
            attempts_left: self.config.retry.attempts,
        });
        debug!(pid, retry = retry.is_some(), "attached");
        self.state = State::Attached { pid, retry };
    }

    fn stop_retry(&mut self) {
        if let State::Attached { retry, .. } = &mut self.state {
            *retry = None;
        }
    }

    fn on_retry_timer(&mut self) {
        let State::Attached { pid, retry: Some(_) } = self.state else { return };
        let outcome = self.attempt(pid);
        let interval = self.config.retry.interval();

        let State::Attached { retry: Some(retry), .. } = &mut self.state else { return };
        retry.attempts_left = retry.attempts_left.saturating_sub(1);
        if outcome == Attempt::Again {
            if retry.attempts_left > 0 {
                retry.timer.set_next_fire(interval);
                return;
            }
            debug!(pid, "giving up after exhausting retries");
        }
        self.stop_retry();
    }

    /// One automatic attempt against the attached application.
    #[instrument(name = "controller::attempt", skip(self))]
    fn attempt(&mut self, pid: pid_t) -> Attempt {
        if self.engine.system().frontmost_pid() != Some(pid) {
            debug!("frontmost application changed; stopping");
            return Attempt::Done;
        }
        if let Err(err) = self.engine.check_permission(false) {
            warn!("{err}");
            return Attempt::Done;
        }
        let app = self.engine.system().application(pid);
        let window = match self.engine.select(&app, SelectionPolicy::FocusedOrAnyEligible) {
            Ok(window) => window,
            Err(err) => {
                trace!("{err}");
                return Attempt::Again;
            }
        };
        self.center_once(pid, &window, &app)
    }

    /// Centers `window` unless the ledger says it was centered before, and
    /// records it on success.
    fn center_once(&mut self, pid: pid_t, window: &S::Element, app: &S::Element) -> Attempt {
        let key = self.engine.system().window_number(window).map(|number| WindowKey::new(pid, number));
        if key.is_none() {
            debug!(pid, "window has no number; it will not be remembered");
        }
        if let Some(key) = key
            && self.ledger.contains(&key)
        {
            trace!(?key, "window was already centered");
            return Attempt::Done;
        }
        match self.engine.center_window(window, pid, Some(app)) {
            Ok(_) => {
                if let Some(key) = key {
                    self.ledger.record(key);
                }
                Attempt::Centered
            }
            Err(err) if err.is_retryable() => {
                trace!("{err}");
                Attempt::Again
            }
            Err(err) => {
                debug!("{err}");
                Attempt::Done
            }
        }
    }
}

async fn fire(timer: Option<&mut Timer>) {
    match timer {
        Some(timer) => timer.await,
        None => std::future::pending().await,
    }
}
