//! Monitor topology
//!
//! An unordered collection of monitor rectangles describing the current
//! multi-display layout. The collection is rebuilt from the platform's screen
//! enumeration whenever the display geometry changes; duplicate geometries
//! (mirrored outputs) are collapsed to one logical monitor.

use super::Rect;

/// One logical rectangular display region.
///
/// `num` is a positional index, stable only within one topology build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Monitor {
    pub num: usize,
    pub rect: Rect,
}

/// The full set of monitors describing the current layout.
///
/// Monitors are stored in an index-addressed vector rather than a linked
/// chain; reconciliation on rebuild happens by positional index so a rebuild
/// with unchanged input touches nothing.
#[derive(Debug, Default)]
pub struct Topology {
    monitors: Vec<Monitor>,
}

impl Topology {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild the topology from a platform screen enumeration.
    ///
    /// Duplicate rectangles are dropped (exact-equality filter, first
    /// occurrence wins). Existing monitors are updated in place only when
    /// their geometry differs, extra screens are appended, and surplus
    /// monitors past the new count are removed.
    pub fn rebuild(&mut self, screens: &[Rect]) {
        let mut unique: Vec<Rect> = Vec::with_capacity(screens.len());
        for rect in screens {
            if rect.w > 0 && rect.h > 0 && !unique.contains(rect) {
                unique.push(*rect);
            }
        }

        for (i, rect) in unique.iter().enumerate() {
            match self.monitors.get_mut(i) {
                Some(mon) => {
                    if mon.rect != *rect {
                        mon.num = i;
                        mon.rect = *rect;
                        tracing::debug!(
                            "monitor {} now {}x{}+{}+{}",
                            i,
                            rect.w,
                            rect.h,
                            rect.x,
                            rect.y
                        );
                    }
                }
                None => {
                    self.monitors.push(Monitor { num: i, rect: *rect });
                    tracing::debug!(
                        "monitor {} added: {}x{}+{}+{}",
                        i,
                        rect.w,
                        rect.h,
                        rect.x,
                        rect.y
                    );
                }
            }
        }

        if unique.len() < self.monitors.len() {
            tracing::debug!("removing {} monitor(s)", self.monitors.len() - unique.len());
            self.monitors.truncate(unique.len());
        }
    }

    /// The monitor whose rectangle has the largest overlap with the query
    /// rectangle. The first monitor reaching the maximum wins ties; zero
    /// overlap everywhere yields `None`.
    pub fn locate(&self, x: i32, y: i32, w: i32, h: i32) -> Option<&Monitor> {
        let mut best: Option<&Monitor> = None;
        let mut area = 0;
        for mon in &self.monitors {
            let a = mon.rect.intersect_area(x, y, w, h);
            if a > area {
                area = a;
                best = Some(mon);
            }
        }
        best
    }

    /// The monitor containing a single pixel.
    pub fn monitor_at(&self, x: i32, y: i32) -> Option<&Monitor> {
        self.locate(x, y, 1, 1)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Monitor> {
        self.monitors.iter()
    }

    pub fn len(&self) -> usize {
        self.monitors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.monitors.is_empty()
    }
}
