//! Which window of an application gets centered.

use tracing::{debug, trace};

use crate::sys::ax::{Attribute, Role, Subrole, System, SystemExt};
use crate::sys::geometry::{Rect, SameAs};
use crate::sys::screen::{CoordinateConverter, CoordinateSpace, Display};

/// Origins and sizes within this many points of a display's frame count as
/// matching it.
const FULLSCREEN_TOLERANCE: f64 = 2.0;
/// A window covering at least this fraction of a display, with a matching
/// origin, counts as full screen.
const FULLSCREEN_COVERAGE: f64 = 0.98;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionPolicy {
    /// Only the application's focused window.
    FocusedOnly,
    /// The focused window if eligible, otherwise the largest eligible window.
    FocusedOrAnyEligible,
}

/// Whether a window is a standard main window that may be centered
/// automatically.
pub fn is_eligible<S: System + ?Sized>(system: &S, window: &S::Element) -> bool {
    if system.role(window) == Some(Role::Unknown) {
        trace!("rejecting window with unknown role");
        return false;
    }
    if system.flag(window, Attribute::Minimized) == Some(true) {
        trace!("rejecting minimized window");
        return false;
    }
    if system.flag(window, Attribute::Modal) == Some(true) {
        trace!("rejecting modal window");
        return false;
    }
    match system.subrole(window) {
        None | Some(Subrole::Standard) => true,
        Some(Subrole::Dialog | Subrole::SystemDialog | Subrole::FloatingWindow) => false,
        Some(Subrole::Other(subrole)) => {
            trace!(%subrole, "rejecting window with unrecognized subrole");
            false
        }
    }
}

pub fn select_window<S: System + ?Sized>(
    system: &S,
    app: &S::Element,
    policy: SelectionPolicy,
) -> Option<S::Element> {
    let focused = system.element(app, Attribute::FocusedWindow);
    match policy {
        SelectionPolicy::FocusedOnly => focused,
        SelectionPolicy::FocusedOrAnyEligible => {
            if let Some(focused) = focused
                && is_eligible(system, &focused)
            {
                return Some(focused);
            }
            let largest = system
                .elements(app, Attribute::Windows)
                .into_iter()
                .filter(|w| is_eligible(system, w))
                .map(|w| {
                    let area = system.size(&w, Attribute::Size).map_or(0.0, |s| s.area());
                    (w, area)
                })
                .fold(None::<(S::Element, f64)>, |best, (w, area)| match best {
                    Some((_, best_area)) if best_area >= area => best,
                    _ => Some((w, area)),
                });
            if largest.is_some() {
                debug!("no eligible focused window; falling back to largest eligible window");
            }
            largest.map(|(w, _)| w)
        }
    }
}

/// Whether `frame` covers `display` the way a full-screen window does.
pub fn covers_display(frame: &Rect, display: &Display) -> bool {
    let target = &display.frame;
    if !frame.origin.same_as(target.origin, FULLSCREEN_TOLERANCE) {
        return false;
    }
    frame.size.same_as(target.size, FULLSCREEN_TOLERANCE)
        || frame.area() >= target.area() * FULLSCREEN_COVERAGE
}

/// Combines the full-screen flag with a geometric check. The raw position's
/// coordinate space is unknown at this point, so every display and space is
/// tried.
pub fn is_fullscreen<S: System + ?Sized>(
    system: &S,
    window: &S::Element,
    displays: &[Display],
) -> bool {
    if system.flag(window, Attribute::FullScreen) == Some(true) {
        return true;
    }
    let (Some(raw), Some(size)) = (
        system.point(window, Attribute::Position),
        system.size(window, Attribute::Size),
    ) else {
        return false;
    };
    let Some(converter) = CoordinateConverter::from_displays(displays) else {
        return false;
    };
    displays.iter().any(|display| {
        CoordinateSpace::ALL.iter().any(|space| {
            covers_display(&space.to_canonical(raw, size, display, converter), display)
        })
    })
}

/// Whether the application as a whole is in full screen: either it says so,
/// or its focused or main window is.
pub fn is_app_fullscreen<S: System + ?Sized>(
    system: &S,
    app: &S::Element,
    displays: &[Display],
) -> bool {
    if system.flag(app, Attribute::FullScreen) == Some(true) {
        return true;
    }
    [Attribute::FocusedWindow, Attribute::MainWindow]
        .into_iter()
        .filter_map(|attr| system.element(app, attr))
        .any(|window| is_fullscreen(system, &window, displays))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sys::ax::Value;
    use crate::sys::geometry::{Point, Size};
    use crate::sys::stub::{StubElement, StubSystem};

    const PID: i32 = 42;

    fn system_with_window() -> (StubSystem, StubElement) {
        let system = StubSystem::laptop();
        let window = system.add_window(PID, 1, Point::new(100.0, 100.0), Size::new(800.0, 600.0));
        (system, window)
    }

    fn set_subrole(system: &StubSystem, window: StubElement, subrole: &str) {
        system.set_attr(window, Attribute::Subrole, Value::String(subrole.into()));
    }

    #[test]
    fn standard_window_is_eligible() {
        let (system, window) = system_with_window();
        assert!(is_eligible(&system, &window));
    }

    #[test]
    fn dialogs_and_panels_are_not_eligible() {
        let (system, window) = system_with_window();
        for subrole in ["AXDialog", "AXSystemDialog", "AXFloatingWindow", "AXSomethingNew"] {
            set_subrole(&system, window, subrole);
            assert!(!is_eligible(&system, &window), "{subrole}");
        }
    }

    #[test]
    fn missing_subrole_is_eligible() {
        let (system, window) = system_with_window();
        system.clear_attr(window, Attribute::Subrole);
        assert!(is_eligible(&system, &window));
    }

    #[test]
    fn minimized_and_modal_windows_are_never_eligible() {
        let (system, window) = system_with_window();
        system.set_attr(window, Attribute::Minimized, Value::Bool(true));
        assert!(!is_eligible(&system, &window));

        system.set_attr(window, Attribute::Minimized, Value::Bool(false));
        system.set_attr(window, Attribute::Modal, Value::Bool(true));
        assert!(!is_eligible(&system, &window));

        system.clear_attr(window, Attribute::Subrole);
        assert!(!is_eligible(&system, &window));
    }

    #[test]
    fn unknown_role_is_not_eligible() {
        let (system, window) = system_with_window();
        system.set_attr(window, Attribute::Role, Value::String("AXUnknown".into()));
        assert!(!is_eligible(&system, &window));
    }

    #[test]
    fn focused_only_returns_focused_window_even_if_ineligible() {
        let (system, window) = system_with_window();
        let app = StubSystem::app_element(PID);
        assert_eq!(select_window(&system, &app, SelectionPolicy::FocusedOnly), None);

        system.focus(PID, window);
        set_subrole(&system, window, "AXDialog");
        assert_eq!(
            select_window(&system, &app, SelectionPolicy::FocusedOnly),
            Some(window)
        );
    }

    #[test]
    fn falls_back_to_largest_eligible_window() {
        let (system, small) = system_with_window();
        let large = system.add_window(PID, 2, Point::new(0.0, 0.0), Size::new(1200.0, 800.0));
        let dialog = system.add_window(PID, 3, Point::new(0.0, 0.0), Size::new(1400.0, 850.0));
        set_subrole(&system, dialog, "AXDialog");
        let app = StubSystem::app_element(PID);

        system.focus(PID, dialog);
        assert_eq!(
            select_window(&system, &app, SelectionPolicy::FocusedOrAnyEligible),
            Some(large)
        );

        system.focus(PID, small);
        assert_eq!(
            select_window(&system, &app, SelectionPolicy::FocusedOrAnyEligible),
            Some(small)
        );
    }

    #[test]
    fn fullscreen_flag_wins() {
        let (system, window) = system_with_window();
        let displays = system.displays.borrow().clone();
        assert!(!is_fullscreen(&system, &window, &displays));
        system.set_attr(window, Attribute::FullScreen, Value::Bool(true));
        assert!(is_fullscreen(&system, &window, &displays));
    }

    #[test]
    fn window_filling_a_display_is_fullscreen() {
        let system = StubSystem::laptop();
        let displays = system.displays.borrow().clone();
        let exact = system.add_window(PID, 1, Point::new(0.0, 0.0), Size::new(1440.0, 900.0));
        assert!(is_fullscreen(&system, &exact, &displays));

        // Origin matches and covers 98% of the display.
        let nearly = system.add_window(PID, 2, Point::new(1.0, 0.0), Size::new(1430.0, 890.0));
        assert!(is_fullscreen(&system, &nearly, &displays));

        let maximized = system.add_window(PID, 3, Point::new(0.0, 25.0), Size::new(1440.0, 875.0));
        assert!(!is_fullscreen(&system, &maximized, &displays));
    }

    #[test]
    fn fullscreen_on_secondary_display_is_found_in_any_space() {
        // The external display is too small for a primary-sized match.
        let system = StubSystem::new(vec![
            Display::new(
                None,
                Rect::from_xywh(0.0, 0.0, 1440.0, 900.0),
                Rect::from_xywh(0.0, 0.0, 1440.0, 875.0),
            ),
            Display::new(
                None,
                Rect::from_xywh(1440.0, -180.0, 1280.0, 720.0),
                Rect::from_xywh(1440.0, -180.0, 1280.0, 695.0),
            ),
        ]);
        let displays = system.displays.borrow().clone();
        let converter = CoordinateConverter::from_displays(&displays).unwrap();
        let size = Size::new(1280.0, 720.0);
        let hits = |raw: Point| -> Vec<(usize, CoordinateSpace)> {
            let mut hits = vec![];
            for (i, display) in displays.iter().enumerate() {
                for space in CoordinateSpace::ALL {
                    let frame = space.to_canonical(raw, size, display, converter);
                    if covers_display(&frame, display) {
                        hits.push((i, space));
                    }
                }
            }
            hits
        };

        let local = system.add_window(PID, 1, Point::new(0.0, 0.0), size);
        assert_eq!(hits(Point::new(0.0, 0.0)), vec![
            (1, CoordinateSpace::LocalBottomLeft),
            (1, CoordinateSpace::LocalTopLeft),
        ]);
        assert!(is_fullscreen(&system, &local, &displays));

        let global = system.add_window(PID, 2, Point::new(1440.0, 360.0), size);
        assert_eq!(hits(Point::new(1440.0, 360.0)), vec![(1, CoordinateSpace::GlobalTopLeft)]);
        assert!(is_fullscreen(&system, &global, &displays));

        let elsewhere = system.add_window(PID, 3, Point::new(1440.0, 0.0), size);
        assert!(hits(Point::new(1440.0, 0.0)).is_empty());
        assert!(!is_fullscreen(&system, &elsewhere, &displays));
    }

    #[test]
    fn app_fullscreen_checks_focused_and_main_windows() {
        let system = StubSystem::laptop();
        let displays = system.displays.borrow().clone();
        let app = StubSystem::app_element(PID);
        let window = system.add_window(PID, 1, Point::new(0.0, 0.0), Size::new(1440.0, 900.0));
        assert!(!is_app_fullscreen(&system, &app, &displays));

        system.set_attr(app, Attribute::MainWindow, Value::Element(window));
        assert!(is_app_fullscreen(&system, &app, &displays));
    }
}
