use tracing::{debug, info, instrument, warn};

use super::CenterError;
use super::placement::{centered_origin, constrained_origin};
use super::resolver::{Resolution, Resolver};
use super::selection::{SelectionPolicy, is_app_fullscreen, is_fullscreen, select_window};
use crate::sys::ax::{Attribute, System, SystemExt, Value, pid_t};
use crate::sys::geometry::{Point, Rect, SameAs, Size};
use crate::sys::screen::{CoordinateSpace, Display, ScreenId};

/// Positions closer than this are considered unchanged by the nudge step.
const NUDGE_EPSILON: f64 = 0.5;

/// Which write finally moved the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum WriteStrategy {
    Direct,
    AfterNudge,
    Frame,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Centered {
    pub pid: pid_t,
    pub display: Option<ScreenId>,
    pub space: CoordinateSpace,
    /// The position written, in the window's native coordinates.
    pub origin: Point,
    pub strategy: WriteStrategy,
}

pub struct CenterEngine<S: System> {
    system: S,
    resolver: Resolver,
}

impl<S: System> CenterEngine<S> {
    pub fn new(system: S) -> Self { CenterEngine { system, resolver: Resolver::new() } }

    pub fn system(&self) -> &S { &self.system }

    pub fn resolver(&self) -> &Resolver { &self.resolver }

    /// Drops per-process state once a process has terminated.
    pub fn forget_process(&mut self, pid: pid_t) { self.resolver.forget(pid); }

    pub fn check_permission(&self, prompt: bool) -> Result<(), CenterError> {
        if self.system.is_trusted(prompt) {
            Ok(())
        } else {
            Err(CenterError::PermissionMissing)
        }
    }

    pub fn frontmost(&self) -> Result<(pid_t, S::Element), CenterError> {
        let pid = self.system.frontmost_pid().ok_or(CenterError::NoFrontmostApplication)?;
        Ok((pid, self.system.application(pid)))
    }

    pub fn select(&self, app: &S::Element, policy: SelectionPolicy) -> Result<S::Element, CenterError> {
        select_window(&self.system, app, policy).ok_or(CenterError::NoWindow)
    }

    /// Centers a window of the frontmost application. This is the path for
    /// explicit requests and does not consult any de-duplication state.
    #[instrument(name = "engine::center_frontmost", skip(self))]
    pub fn center_frontmost(&mut self, policy: SelectionPolicy) -> Result<Centered, CenterError> {
        self.check_permission(false)?;
        let (pid, app) = self.frontmost()?;
        let window = self.select(&app, policy)?;
        self.center_window(&window, pid, Some(&app))
    }

    /// Runs the full protocol for one window: full-screen checks, frame read,
    /// resolution, then the staged writes.
    ///
    /// Passing `app` also skips the window when the whole application is in
    /// full screen.
    #[instrument(name = "engine::center_window", skip(self, window, app))]
    pub fn center_window(
        &mut self,
        window: &S::Element,
        pid: pid_t,
        app: Option<&S::Element>,
    ) -> Result<Centered, CenterError> {
        let displays = self.system.displays();
        if let Some(app) = app
            && is_app_fullscreen(&self.system, app, &displays)
        {
            debug!("application is full screen");
            return Err(CenterError::Fullscreen);
        }
        if is_fullscreen(&self.system, window, &displays) {
            debug!("window is full screen");
            return Err(CenterError::Fullscreen);
        }

        let raw = self
            .system
            .point(window, Attribute::Position)
            .ok_or(CenterError::UnableToReadFrame)?;
        let size = self
            .system
            .size(window, Attribute::Size)
            .ok_or(CenterError::UnableToReadFrame)?;
        let resolution = self
            .resolve(window, pid, &displays, raw, size)
            .ok_or(CenterError::UnableToReadFrame)?;

        let usable = resolution.display.usable_frame();
        let target = centered_frame(size, usable, &resolution);
        let native = resolution.to_native(target);
        debug!(?raw, ?size, ?usable, ?native, space = %resolution.space, "computed target");

        let centered = |strategy| Centered {
            pid,
            display: resolution.display.id,
            space: resolution.space,
            origin: native,
            strategy,
        };

        if self.write_position(window, native) {
            info!(?native, "centered window");
            return Ok(centered(WriteStrategy::Direct));
        }

        let current = resolution.frame;
        let nudged = constrained_origin(current.origin, size, usable);
        if !nudged.same_as(current.origin, NUDGE_EPSILON) {
            let nudge = resolution.to_native(Rect::new(nudged, size));
            let accepted = self.write_position(window, nudge);
            debug!(?nudge, accepted, "nudged window into usable area");
        }
        if self.write_position(window, native) {
            info!(?native, "centered window after nudge");
            return Ok(centered(WriteStrategy::AfterNudge));
        }

        if self.system.set(window, Attribute::Frame, Value::Rect(Rect::new(native, size))) {
            info!(?native, "centered window through frame attribute");
            return Ok(centered(WriteStrategy::Frame));
        }

        warn!(?native, "window rejected every position write");
        Err(CenterError::UnableToWritePosition)
    }

    fn resolve(
        &mut self,
        window: &S::Element,
        pid: pid_t,
        displays: &[Display],
        raw: Point,
        size: Size,
    ) -> Option<Resolution> {
        if let Some(number) = self.system.window_number(window)
            && let Some(observed) = self.system.window_bounds(number, pid)
            && let Some(resolution) =
                self.resolver.resolve_observed(displays, raw, size, observed, Some(pid))
        {
            return Some(resolution);
        }
        self.resolver.resolve(displays, raw, size, Some(pid))
    }

    fn write_position(&self, window: &S::Element, origin: Point) -> bool {
        self.system.set(window, Attribute::Position, Value::Point(origin))
    }
}

/// The centered window rectangle in canonical coordinates. Centering runs in
/// top-left space so an oversized window is pinned below the top of the
/// usable area.
fn centered_frame(size: Size, usable: Rect, resolution: &Resolution) -> Rect {
    let converter = resolution.converter;
    let origin = centered_origin(size, converter.convert_rect(usable));
    converter.convert_rect(Rect::new(origin, size))
}
