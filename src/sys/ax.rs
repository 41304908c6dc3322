//! The accessibility surface the engine talks to.
//!
//! Everything the engine needs from the operating system goes through
//! [`System`], so the geometry and selection logic can run against a stub.

use std::str::FromStr;

use crate::sys::geometry::{Point, Rect, Size};
use crate::sys::screen::Display;

#[allow(non_camel_case_types)]
pub type pid_t = i32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
pub enum Attribute {
    Position,
    Size,
    Role,
    Subrole,
    Minimized,
    Modal,
    FullScreen,
    FocusedWindow,
    MainWindow,
    Windows,
    WindowNumber,
    Frame,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Value<E> {
    Point(Point),
    Size(Size),
    Rect(Rect),
    Bool(bool),
    Number(i64),
    String(String),
    Element(E),
    Elements(Vec<E>),
}

#[derive(Debug, Clone, PartialEq, Eq, strum::EnumString, strum::AsRefStr)]
pub enum Role {
    #[strum(serialize = "AXWindow")]
    Window,
    #[strum(serialize = "AXUnknown")]
    Unknown,
    #[strum(default)]
    Other(String),
}

#[derive(Debug, Clone, PartialEq, Eq, strum::EnumString, strum::AsRefStr)]
pub enum Subrole {
    #[strum(serialize = "AXStandardWindow")]
    Standard,
    #[strum(serialize = "AXDialog")]
    Dialog,
    #[strum(serialize = "AXSystemDialog")]
    SystemDialog,
    #[strum(serialize = "AXFloatingWindow")]
    FloatingWindow,
    #[strum(default)]
    Other(String),
}

/// Host operating system services, modeled as the handful of calls the
/// engine needs.
///
/// Elements are opaque, non-owning handles. Callers must not hold on to one
/// past the attempt it was fetched for.
pub trait System {
    type Element: Clone;

    /// Whether automation (accessibility) is authorized for this process.
    fn is_trusted(&self, prompt: bool) -> bool;

    fn frontmost_pid(&self) -> Option<pid_t>;

    /// Whether the process is still running.
    fn is_running(&self, pid: pid_t) -> bool;

    fn application(&self, pid: pid_t) -> Self::Element;

    fn get(&self, element: &Self::Element, attribute: Attribute) -> Option<Value<Self::Element>>;

    fn set(&self, element: &Self::Element, attribute: Attribute, value: Value<Self::Element>)
    -> bool;

    /// Displays in canonical coordinates, enumerated fresh on every call.
    fn displays(&self) -> Vec<Display>;

    /// Window bounds from the window server, in canonical coordinates.
    /// Returns `None` when unavailable, unauthorized, or when the window is
    /// not owned by `owner`.
    fn window_bounds(&self, _window_number: u32, _owner: pid_t) -> Option<Rect> { None }

    /// Lets the host process deliver pending notifications so the next
    /// reads see current state.
    fn refresh(&self) {}
}

/// Typed accessors over [`System::get`].
pub trait SystemExt: System {
    fn point(&self, element: &Self::Element, attribute: Attribute) -> Option<Point> {
        match self.get(element, attribute)? {
            Value::Point(p) => Some(p),
            _ => None,
        }
    }

    fn size(&self, element: &Self::Element, attribute: Attribute) -> Option<Size> {
        match self.get(element, attribute)? {
            Value::Size(s) => Some(s),
            _ => None,
        }
    }

    fn flag(&self, element: &Self::Element, attribute: Attribute) -> Option<bool> {
        match self.get(element, attribute)? {
            Value::Bool(b) => Some(b),
            _ => None,
        }
    }

    fn string(&self, element: &Self::Element, attribute: Attribute) -> Option<String> {
        match self.get(element, attribute)? {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    fn element(&self, element: &Self::Element, attribute: Attribute) -> Option<Self::Element> {
        match self.get(element, attribute)? {
            Value::Element(e) => Some(e),
            _ => None,
        }
    }

    fn elements(&self, element: &Self::Element, attribute: Attribute) -> Vec<Self::Element> {
        match self.get(element, attribute) {
            Some(Value::Elements(list)) => list,
            _ => vec![],
        }
    }

    fn role(&self, window: &Self::Element) -> Option<Role> {
        self.string(window, Attribute::Role).and_then(|s| Role::from_str(&s).ok())
    }

    fn subrole(&self, window: &Self::Element) -> Option<Subrole> {
        self.string(window, Attribute::Subrole).and_then(|s| Subrole::from_str(&s).ok())
    }

    fn window_number(&self, window: &Self::Element) -> Option<u32> {
        match self.get(window, Attribute::WindowNumber)? {
            Value::Number(n) => u32::try_from(n).ok(),
            _ => None,
        }
    }
}

impl<S: System + ?Sized> SystemExt for S {}

impl<S: System + ?Sized> System for &S {
    type Element = S::Element;

    fn is_trusted(&self, prompt: bool) -> bool { (**self).is_trusted(prompt) }

    fn frontmost_pid(&self) -> Option<pid_t> { (**self).frontmost_pid() }

    fn is_running(&self, pid: pid_t) -> bool { (**self).is_running(pid) }

    fn application(&self, pid: pid_t) -> Self::Element { (**self).application(pid) }

    fn get(&self, element: &Self::Element, attribute: Attribute) -> Option<Value<Self::Element>> {
        (**self).get(element, attribute)
    }

    fn set(
        &self,
        element: &Self::Element,
        attribute: Attribute,
        value: Value<Self::Element>,
    ) -> bool {
        (**self).set(element, attribute, value)
    }

    fn displays(&self) -> Vec<Display> { (**self).displays() }

    fn window_bounds(&self, window_number: u32, owner: pid_t) -> Option<Rect> {
        (**self).window_bounds(window_number, owner)
    }

    fn refresh(&self) { (**self).refresh() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roles_parse_known_and_unknown_names() {
        assert_eq!(Role::from_str("AXWindow").unwrap(), Role::Window);
        assert_eq!(Role::from_str("AXUnknown").unwrap(), Role::Unknown);
        assert_eq!(
            Role::from_str("AXSheet").unwrap(),
            Role::Other("AXSheet".to_string())
        );
    }

    #[test]
    fn subroles_parse_known_and_unknown_names() {
        assert_eq!(Subrole::from_str("AXStandardWindow").unwrap(), Subrole::Standard);
        assert_eq!(Subrole::from_str("AXSystemDialog").unwrap(), Subrole::SystemDialog);
        assert_eq!(Subrole::from_str("AXFloatingWindow").unwrap(), Subrole::FloatingWindow);
        assert_eq!(
            Subrole::from_str("AXTextField").unwrap(),
            Subrole::Other("AXTextField".to_string())
        );
        assert_eq!(Subrole::Dialog.as_ref(), "AXDialog");
    }
}
