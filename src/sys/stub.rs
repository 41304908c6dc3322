//! Scripted in-memory [`System`] used by tests.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;

use crate::common::collections::{HashMap, HashSet};
use crate::sys::ax::{Attribute, Role, Subrole, System, Value, pid_t};
use crate::sys::geometry::{Point, Rect, Size};
use crate::sys::screen::{Display, ScreenId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StubElement(pub u32);

const APP_BASE: u32 = 1_000_000;

pub struct StubSystem {
    pub trusted: Cell<bool>,
    pub frontmost: Cell<Option<pid_t>>,
    pub displays: RefCell<Vec<Display>>,
    pub exited: RefCell<HashSet<pid_t>>,
    attrs: RefCell<HashMap<(StubElement, Attribute), Value<StubElement>>>,
    write_script: RefCell<HashMap<Attribute, VecDeque<bool>>>,
    writes: RefCell<Vec<(StubElement, Attribute, Value<StubElement>)>>,
    reads: RefCell<Vec<(StubElement, Attribute)>>,
    bounds: RefCell<HashMap<u32, (pid_t, Rect)>>,
}

impl StubSystem {
    pub fn new(displays: Vec<Display>) -> Self {
        StubSystem {
            trusted: Cell::new(true),
            frontmost: Cell::new(None),
            displays: RefCell::new(displays),
            exited: RefCell::new(HashSet::default()),
            attrs: RefCell::new(HashMap::default()),
            write_script: RefCell::new(HashMap::default()),
            writes: RefCell::new(vec![]),
            reads: RefCell::new(vec![]),
            bounds: RefCell::new(HashMap::default()),
        }
    }

    /// A single 1440x900 display with a 25pt menu bar on top.
    pub fn laptop() -> Self {
        StubSystem::new(vec![Display::new(
            Some(ScreenId::new(1)),
            Rect::from_xywh(0.0, 0.0, 1440.0, 900.0),
            Rect::from_xywh(0.0, 0.0, 1440.0, 875.0),
        )])
    }

    pub fn app_element(pid: pid_t) -> StubElement { StubElement(APP_BASE + pid as u32) }

    pub fn set_attr(&self, element: StubElement, attribute: Attribute, value: Value<StubElement>) {
        self.attrs.borrow_mut().insert((element, attribute), value);
    }

    pub fn clear_attr(&self, element: StubElement, attribute: Attribute) {
        self.attrs.borrow_mut().remove(&(element, attribute));
    }

    /// Registers a standard window with the given raw position and size and
    /// attaches it to the application's window list.
    pub fn add_window(&self, pid: pid_t, id: u32, position: Point, size: Size) -> StubElement {
        let window = StubElement(id);
        self.set_attr(window, Attribute::Role, Value::String(Role::Window.as_ref().into()));
        self.set_attr(
            window,
            Attribute::Subrole,
            Value::String(Subrole::Standard.as_ref().into()),
        );
        self.set_attr(window, Attribute::Position, Value::Point(position));
        self.set_attr(window, Attribute::Size, Value::Size(size));
        self.set_attr(window, Attribute::WindowNumber, Value::Number(id as i64));

        let app = Self::app_element(pid);
        let mut windows = match self.attrs.borrow().get(&(app, Attribute::Windows)) {
            Some(Value::Elements(list)) => list.clone(),
            _ => vec![],
        };
        windows.push(window);
        self.set_attr(app, Attribute::Windows, Value::Elements(windows));
        window
    }

    pub fn focus(&self, pid: pid_t, window: StubElement) {
        self.set_attr(Self::app_element(pid), Attribute::FocusedWindow, Value::Element(window));
    }

    pub fn set_window_bounds(&self, window_number: u32, owner: pid_t, bounds: Rect) {
        self.bounds.borrow_mut().insert(window_number, (owner, bounds));
    }

    /// Queues results for the next writes of `attribute`. Unscripted writes
    /// succeed.
    pub fn script_writes(&self, attribute: Attribute, results: &[bool]) {
        self.write_script
            .borrow_mut()
            .entry(attribute)
            .or_default()
            .extend(results.iter().copied());
    }

    pub fn writes_of(&self, attribute: Attribute) -> Vec<Value<StubElement>> {
        self.writes
            .borrow()
            .iter()
            .filter(|(_, attr, _)| *attr == attribute)
            .map(|(_, _, value)| value.clone())
            .collect()
    }

    pub fn reads_of(&self, attribute: Attribute) -> usize {
        self.reads.borrow().iter().filter(|(_, attr)| *attr == attribute).count()
    }

    pub fn position(&self, window: StubElement) -> Option<Point> {
        match self.attrs.borrow().get(&(window, Attribute::Position)) {
            Some(Value::Point(p)) => Some(*p),
            _ => None,
        }
    }
}

impl System for StubSystem {
    type Element = StubElement;

    fn is_trusted(&self, _prompt: bool) -> bool { self.trusted.get() }

    fn frontmost_pid(&self) -> Option<pid_t> { self.frontmost.get() }

    fn is_running(&self, pid: pid_t) -> bool { !self.exited.borrow().contains(&pid) }

    fn application(&self, pid: pid_t) -> StubElement { Self::app_element(pid) }

    fn get(&self, element: &StubElement, attribute: Attribute) -> Option<Value<StubElement>> {
        self.reads.borrow_mut().push((*element, attribute));
        self.attrs.borrow().get(&(*element, attribute)).cloned()
    }

    fn set(&self, element: &StubElement, attribute: Attribute, value: Value<StubElement>) -> bool {
        self.writes.borrow_mut().push((*element, attribute, value.clone()));
        let accepted = self
            .write_script
            .borrow_mut()
            .get_mut(&attribute)
            .and_then(|queue| queue.pop_front())
            .unwrap_or(true);
        if !accepted {
            return false;
        }
        match value {
            Value::Rect(rect) => {
                self.set_attr(*element, Attribute::Position, Value::Point(rect.origin));
                self.set_attr(*element, Attribute::Size, Value::Size(rect.size));
            }
            other => self.set_attr(*element, attribute, other),
        }
        true
    }

    fn displays(&self) -> Vec<Display> { self.displays.borrow().clone() }

    fn window_bounds(&self, window_number: u32, owner: pid_t) -> Option<Rect> {
        match self.bounds.borrow().get(&window_number) {
            Some(&(pid, rect)) if pid == owner => Some(rect),
            _ => None,
        }
    }
}
