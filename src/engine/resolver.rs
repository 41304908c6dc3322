//! Works out which display a window is on and which coordinate space its
//! raw position is expressed in.
//!
//! The accessibility layer reports a window position without saying what it
//! is relative to. Every (display, space) pair is tried and scored by how
//! much of the reinterpreted window lands on that display.

use tracing::{debug, trace};

use crate::common::collections::HashMap;
use crate::sys::ax::pid_t;
use crate::sys::geometry::{Point, Rect, Size};
use crate::sys::screen::{CoordinateConverter, CoordinateSpace, Display};

/// Overlaps (in square points) closer than this are treated as equal.
pub const OVERLAP_TOLERANCE: f64 = 0.5;
/// Squared distances closer than this are treated as equal.
pub const DISTANCE_TOLERANCE: f64 = 0.5;
/// Added to the overlap of the candidate matching the cached answer.
pub const CACHE_BONUS: f64 = 1.0;
/// At or below this overlap a window is considered to be off every display.
pub const NEGLIGIBLE_OVERLAP: f64 = 1.0;
/// Edge deltas closer than this are treated as equal.
const EDGE_TOLERANCE: f64 = 0.5;

#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub display: Display,
    pub space: CoordinateSpace,
    /// The window's rectangle in canonical coordinates.
    pub frame: Rect,
    pub converter: CoordinateConverter,
}

impl Resolution {
    /// Converts a canonical rectangle into the window's native position.
    pub fn to_native(&self, rect: Rect) -> Point {
        self.space.from_canonical(rect, &self.display, self.converter)
    }
}

#[derive(Debug, Clone, PartialEq)]
struct CachedResolution {
    display: Display,
    space: CoordinateSpace,
}

/// Last confident answer per process.
#[derive(Debug, Default)]
pub struct ResolutionCache(HashMap<pid_t, CachedResolution>);

impl ResolutionCache {
    fn get(&self, pid: pid_t) -> Option<&CachedResolution> { self.0.get(&pid) }

    fn insert(&mut self, pid: pid_t, display: &Display, space: CoordinateSpace) {
        self.0.insert(pid, CachedResolution { display: display.clone(), space });
    }

    pub fn forget(&mut self, pid: pid_t) { self.0.remove(&pid); }

    pub fn contains(&self, pid: pid_t) -> bool { self.0.contains_key(&pid) }

    pub fn len(&self) -> usize { self.0.len() }

    pub fn is_empty(&self) -> bool { self.0.is_empty() }
}

#[derive(Debug, Clone, Copy)]
struct Candidate {
    display: usize,
    space: CoordinateSpace,
    frame: Rect,
    overlap: f64,
    adjusted: f64,
    distance: f64,
}

impl Candidate {
    fn beats(&self, best: &Candidate) -> bool {
        if self.overlap <= NEGLIGIBLE_OVERLAP && best.overlap <= NEGLIGIBLE_OVERLAP {
            return self.distance < best.distance - DISTANCE_TOLERANCE;
        }
        if self.adjusted > best.adjusted + OVERLAP_TOLERANCE {
            return true;
        }
        if self.adjusted < best.adjusted - OVERLAP_TOLERANCE {
            return false;
        }
        if self.distance < best.distance - DISTANCE_TOLERANCE {
            return true;
        }
        if self.distance > best.distance + DISTANCE_TOLERANCE {
            return false;
        }
        self.space.is_top_left() && !best.space.is_top_left()
    }
}

#[derive(Debug, Default)]
pub struct Resolver {
    cache: ResolutionCache,
}

impl Resolver {
    pub fn new() -> Self { Self::default() }

    pub fn cache(&self) -> &ResolutionCache { &self.cache }

    /// Drops the cached answer for a process that has gone away.
    pub fn forget(&mut self, pid: pid_t) { self.cache.forget(pid); }

    /// Scores every display and coordinate space for the raw position.
    /// Returns `None` only when there are no displays.
    pub fn resolve(
        &mut self,
        displays: &[Display],
        raw: Point,
        size: Size,
        pid: Option<pid_t>,
    ) -> Option<Resolution> {
        let converter = CoordinateConverter::from_displays(displays)?;
        let cached = pid.and_then(|pid| self.cache.get(pid)).cloned();

        let mut best: Option<Candidate> = None;
        for (idx, display) in displays.iter().enumerate() {
            for space in CoordinateSpace::ALL {
                let frame = space.to_canonical(raw, size, display, converter);
                let overlap = frame.intersection_area(&display.frame);
                let distance = if overlap > 0.0 {
                    0.0
                } else {
                    display.frame.distance_sq_to(frame.mid())
                };
                let is_cached = cached
                    .as_ref()
                    .is_some_and(|c| c.space == space && c.display.is_same_display(display));
                let adjusted = if is_cached { overlap + CACHE_BONUS } else { overlap };
                let candidate = Candidate {
                    display: idx,
                    space,
                    frame,
                    overlap,
                    adjusted,
                    distance,
                };
                trace!(?candidate, "scored");
                if best.as_ref().is_none_or(|b| candidate.beats(b)) {
                    best = Some(candidate);
                }
            }
        }
        let best = best?;

        if best.overlap <= NEGLIGIBLE_OVERLAP {
            if let Some(cached) = cached
                && let Some(display) = displays.iter().find(|d| d.is_same_display(&cached.display))
            {
                debug!(?pid, space = %cached.space, "window is off-screen; reusing cached resolution");
                return Some(Resolution {
                    frame: cached.space.to_canonical(raw, size, display, converter),
                    display: display.clone(),
                    space: cached.space,
                    converter,
                });
            }
        } else if let Some(pid) = pid {
            self.cache.insert(pid, &displays[best.display], best.space);
        }

        debug!(
            ?pid,
            display = best.display,
            space = %best.space,
            overlap = best.overlap,
            "resolved window position"
        );
        Some(Resolution {
            display: displays[best.display].clone(),
            space: best.space,
            frame: best.frame,
            converter,
        })
    }

    /// Resolves against bounds observed directly from the window server.
    ///
    /// The display is the one with the largest intersection with `observed`,
    /// and the space is the one whose reinterpretation of `raw` is
    /// numerically closest to `observed`. Returns `None` when `observed` is on
    /// no display, so the caller can fall back to [`Resolver::resolve`].
    pub fn resolve_observed(
        &mut self,
        displays: &[Display],
        raw: Point,
        size: Size,
        observed: Rect,
        pid: Option<pid_t>,
    ) -> Option<Resolution> {
        let converter = CoordinateConverter::from_displays(displays)?;
        let (display, overlap) = displays
            .iter()
            .map(|d| (d, observed.intersection_area(&d.frame)))
            .fold(None::<(&Display, f64)>, |best, (d, area)| match best {
                Some((_, best_area)) if best_area >= area => best,
                _ => Some((d, area)),
            })?;
        if overlap <= 0.0 {
            debug!(?observed, "observed bounds are on no display");
            return None;
        }

        let mut best: Option<(CoordinateSpace, Rect, f64)> = None;
        for space in CoordinateSpace::ALL {
            let frame = space.to_canonical(raw, size, display, converter);
            let delta = frame.edge_delta(&observed);
            let better = match best {
                None => true,
                Some((best_space, _, best_delta)) => {
                    delta < best_delta - EDGE_TOLERANCE
                        || (delta <= best_delta + EDGE_TOLERANCE
                            && space.is_top_left()
                            && !best_space.is_top_left())
                }
            };
            if better {
                best = Some((space, frame, delta));
            }
        }
        let (space, frame, delta) = best?;

        if let Some(pid) = pid {
            self.cache.insert(pid, display, space);
        }
        debug!(?pid, space = %space, delta, "resolved against window server bounds");
        Some(Resolution {
            display: display.clone(),
            space,
            frame,
            converter,
        })
    }
}
