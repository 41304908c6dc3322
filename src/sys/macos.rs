//! The live [`System`]: the accessibility API for windows, AppKit for
//! applications and screens, and the window server for authoritative bounds.

use std::ffi::CStr;
use std::ptr::{self, NonNull};

use objc2::rc::Retained;
use objc2::runtime::AnyObject;
use objc2_app_kit::{NSRunningApplication, NSScreen, NSWorkspace};
use objc2_application_services::{
    AXError, AXIsProcessTrustedWithOptions, AXUIElement, AXValue, AXValueType,
    kAXFocusedWindowAttribute, kAXMainWindowAttribute, kAXMinimizedAttribute, kAXModalAttribute,
    kAXPositionAttribute, kAXRoleAttribute, kAXSizeAttribute, kAXSubroleAttribute,
    kAXTrustedCheckOptionPrompt, kAXWindowsAttribute,
};
use objc2_core_foundation::{
    CFArray, CFBoolean, CFDictionary, CFRetained, CFRunLoop, CFString, CFType, CGPoint, CGRect,
    CGSize, kCFRunLoopDefaultMode,
};
use objc2_core_graphics::{
    CGRectMakeWithDictionaryRepresentation, CGWindowID, CGWindowListCopyWindowInfo,
    CGWindowListOption,
};
use objc2_foundation::{MainThreadMarker, NSArray, NSDictionary, NSNumber, NSString, ns_string};
use tracing::{trace, warn};

use crate::sys::ax::{Attribute, System, Value, pid_t};
use crate::sys::geometry::{Point, Rect, Size};
use crate::sys::screen::{CoordinateConverter, Display, ScreenId};

// Private attributes with no public constant.
const AX_FULL_SCREEN: &CStr = c"AXFullScreen";
const AX_FRAME: &CStr = c"AXFrame";

unsafe extern "C" {
    fn _AXUIElementGetWindow(element: &AXUIElement, window: &mut CGWindowID) -> AXError;
}

pub struct Actual {
    mtm: MainThreadMarker,
}

impl Actual {
    pub fn new(mtm: MainThreadMarker) -> Self { Actual { mtm } }
}

/// `None` for attributes that are not read through `AXUIElementCopyAttributeValue`.
fn attribute_name(attribute: Attribute) -> Option<CFRetained<CFString>> {
    let name = match attribute {
        Attribute::Position => kAXPositionAttribute,
        Attribute::Size => kAXSizeAttribute,
        Attribute::Role => kAXRoleAttribute,
        Attribute::Subrole => kAXSubroleAttribute,
        Attribute::Minimized => kAXMinimizedAttribute,
        Attribute::Modal => kAXModalAttribute,
        Attribute::FullScreen => AX_FULL_SCREEN,
        Attribute::FocusedWindow => kAXFocusedWindowAttribute,
        Attribute::MainWindow => kAXMainWindowAttribute,
        Attribute::Windows => kAXWindowsAttribute,
        Attribute::Frame => AX_FRAME,
        Attribute::WindowNumber => return None,
    };
    Some(CFString::from_str(&name.to_string_lossy()))
}

fn copy_value(element: &AXUIElement, attribute: Attribute) -> Option<CFRetained<CFType>> {
    let name = attribute_name(attribute)?;
    let mut value: *const CFType = ptr::null();
    let err = unsafe { element.copy_attribute_value(&name, NonNull::from(&mut value)) };
    if err != AXError::Success {
        trace!(%attribute, ?err, "attribute read failed");
        return None;
    }
    NonNull::new(value.cast_mut()).map(|value| unsafe { CFRetained::from_raw(value) })
}

fn unpack<T: Default>(value: &CFType, kind: AXValueType) -> Option<T> {
    let value = value.downcast_ref::<AXValue>()?;
    let mut out = T::default();
    unsafe { value.value(kind, NonNull::from(&mut out).cast()) }.then_some(out)
}

fn pack<T>(value: &T, kind: AXValueType) -> Option<CFRetained<AXValue>> {
    unsafe { AXValue::new(kind, NonNull::from(value).cast()) }
}

fn to_rect(rect: CGRect) -> Rect {
    Rect::from_xywh(rect.origin.x, rect.origin.y, rect.size.width, rect.size.height)
}

fn to_cg_rect(rect: Rect) -> CGRect {
    CGRect::new(
        CGPoint::new(rect.origin.x, rect.origin.y),
        CGSize::new(rect.size.width, rect.size.height),
    )
}

fn screen_number(screen: &NSScreen) -> Option<ScreenId> {
    let description = screen.deviceDescription();
    let number = description.objectForKey(ns_string!("NSScreenNumber"))?;
    match number.downcast::<NSNumber>() {
        Ok(number) => Some(ScreenId::new(number.as_u32())),
        Err(other) => {
            warn!(name = ?screen.localizedName(), ?other, "screen has no NSScreenNumber");
            None
        }
    }
}

impl System for Actual {
    type Element = CFRetained<AXUIElement>;

    fn is_trusted(&self, prompt: bool) -> bool {
        let key = unsafe { kAXTrustedCheckOptionPrompt };
        let options = CFDictionary::from_slices(&[key], &[CFBoolean::new(prompt)]);
        unsafe { AXIsProcessTrustedWithOptions(Some(options.as_opaque())) }
    }

    fn frontmost_pid(&self) -> Option<pid_t> {
        NSWorkspace::sharedWorkspace()
            .frontmostApplication()
            .map(|app| app.processIdentifier())
    }

    fn is_running(&self, pid: pid_t) -> bool {
        NSRunningApplication::runningApplicationWithProcessIdentifier(pid)
            .is_some_and(|app| !app.isTerminated())
    }

    fn application(&self, pid: pid_t) -> Self::Element {
        unsafe { AXUIElement::new_application(pid) }
    }

    fn get(&self, element: &Self::Element, attribute: Attribute) -> Option<Value<Self::Element>> {
        if attribute == Attribute::WindowNumber {
            let mut number: CGWindowID = 0;
            let err = unsafe { _AXUIElementGetWindow(element, &mut number) };
            return (err == AXError::Success).then_some(Value::Number(number.into()));
        }
        let value = copy_value(element, attribute)?;
        match attribute {
            Attribute::Position => unpack::<CGPoint>(&value, AXValueType::CGPoint)
                .map(|p| Value::Point(Point::new(p.x, p.y))),
            Attribute::Size => unpack::<CGSize>(&value, AXValueType::CGSize)
                .map(|s| Value::Size(Size::new(s.width, s.height))),
            Attribute::Frame => {
                unpack::<CGRect>(&value, AXValueType::CGRect).map(|r| Value::Rect(to_rect(r)))
            }
            Attribute::Role | Attribute::Subrole => {
                value.downcast_ref::<CFString>().map(|s| Value::String(s.to_string()))
            }
            Attribute::Minimized | Attribute::Modal | Attribute::FullScreen => {
                value.downcast_ref::<CFBoolean>().map(|b| Value::Bool(b.as_bool()))
            }
            Attribute::FocusedWindow | Attribute::MainWindow => {
                value.downcast::<AXUIElement>().ok().map(Value::Element)
            }
            Attribute::Windows => {
                let array = value.downcast::<CFArray>().ok()?;
                let array: CFRetained<CFArray<CFType>> =
                    unsafe { CFRetained::cast_unchecked(array) };
                let windows = array
                    .iter()
                    .filter_map(|item| item.downcast::<AXUIElement>().ok())
                    .collect();
                Some(Value::Elements(windows))
            }
            Attribute::WindowNumber => None,
        }
    }

    fn set(
        &self,
        element: &Self::Element,
        attribute: Attribute,
        value: Value<Self::Element>,
    ) -> bool {
        let Some(name) = attribute_name(attribute) else {
            warn!(%attribute, "attribute is read-only");
            return false;
        };
        let err = match value {
            Value::Point(p) => {
                let Some(value) = pack(&CGPoint::new(p.x, p.y), AXValueType::CGPoint) else {
                    return false;
                };
                unsafe { element.set_attribute_value(&name, &value) }
            }
            Value::Size(s) => {
                let Some(value) = pack(&CGSize::new(s.width, s.height), AXValueType::CGSize) else {
                    return false;
                };
                unsafe { element.set_attribute_value(&name, &value) }
            }
            Value::Rect(r) => {
                let Some(value) = pack(&to_cg_rect(r), AXValueType::CGRect) else {
                    return false;
                };
                unsafe { element.set_attribute_value(&name, &value) }
            }
            Value::Bool(b) => unsafe { element.set_attribute_value(&name, CFBoolean::new(b)) },
            other => {
                warn!(%attribute, ?other, "unsupported attribute write");
                return false;
            }
        };
        if err != AXError::Success {
            trace!(%attribute, ?err, "attribute write rejected");
        }
        err == AXError::Success
    }

    fn displays(&self) -> Vec<Display> {
        NSScreen::screens(self.mtm)
            .iter()
            .map(|screen| {
                Display::new(
                    screen_number(&screen),
                    to_rect(screen.frame()),
                    to_rect(screen.visibleFrame()),
                )
            })
            .collect()
    }

    fn window_bounds(&self, window_number: u32, owner: pid_t) -> Option<Rect> {
        let list =
            CGWindowListCopyWindowInfo(CGWindowListOption::OptionIncludingWindow, window_number)?;
        // CFArray of CFDictionary is toll-free bridged to NSArray of NSDictionary.
        let list: &NSArray<NSDictionary<NSString, AnyObject>> =
            unsafe { CFRetained::as_ptr(&list).cast().as_ref() };
        let converter = CoordinateConverter::from_displays(&self.displays())?;
        list.iter().find_map(|info| {
            let number = |key: &NSString| info.objectForKey(key)?.downcast::<NSNumber>().ok();
            let id = number(ns_string!("kCGWindowNumber"))?;
            let pid = number(ns_string!("kCGWindowOwnerPID"))?;
            if id.as_u32() != window_number || pid.as_i32() != owner {
                return None;
            }
            let bounds = info.objectForKey(ns_string!("kCGWindowBounds"))?;
            let bounds: &CFDictionary = unsafe { &*Retained::as_ptr(&bounds).cast() };
            let mut rect = CGRect::default();
            let ok = unsafe { CGRectMakeWithDictionaryRepresentation(Some(bounds), &mut rect) };
            // The window server reports top-left coordinates.
            ok.then(|| converter.convert_rect(to_rect(rect)))
        })
    }

    fn refresh(&self) {
        // NSWorkspace only updates the frontmost application from the main run loop.
        CFRunLoop::run_in_mode(unsafe { kCFRunLoopDefaultMode }, 0.0, false);
    }
}
