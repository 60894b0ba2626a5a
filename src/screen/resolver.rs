//! Edge-crossing resolution
//!
//! Decides, for each raw motion sample, whether the pointer has just exited a
//! monitor edge, which monitor it should continue on, and where exactly it
//! should land there. Works directly on the topology; the only side effect
//! (warping the pointer) is left to the caller.

use super::{Direction, Monitor, Topology};

/// Per-sample motion resolver.
///
/// Wrap flags allow the pointer to cross the outermost topology edges to the
/// far side; snap flags allow crossing inner hard edges, with landing
/// coordinates nudged at least `snap_offset` pixels inside the destination
/// monitor. The snap policy is the symmetric one: a snap that would fire
/// while snapping on the crossing axis is disabled turns the edge hard again
/// unless the warp clearly outruns the raw motion.
#[derive(Debug, Clone)]
pub struct Resolver {
    pub wrap_x: bool,
    pub wrap_y: bool,
    pub snap_x: bool,
    pub snap_y: bool,
    pub snap_offset: i32,
}

impl Default for Resolver {
    fn default() -> Self {
        Self {
            wrap_x: true,
            wrap_y: true,
            snap_x: true,
            snap_y: true,
            snap_offset: 10,
        }
    }
}

impl Resolver {
    /// Find the monitor the pointer should continue on when leaving `origin`
    /// in `dir`, with the pointer at `coord` on the perpendicular axis.
    ///
    /// A flush-adjacent monitor (edge coordinates equal, positive
    /// perpendicular overlap) decides the crossing: it is the destination
    /// when `coord` lies strictly inside its span, and a hard boundary
    /// otherwise, since exiting past a flush neighbor's corner is ambiguous
    /// and no warp should happen there. Without a flush neighbor the topology wraps
    /// around to the monitor furthest in the opposite direction, if wrapping
    /// is enabled on that axis.
    pub fn find_neighbor<'t>(
        &self,
        topology: &'t Topology,
        dir: Direction,
        origin: &Monitor,
        coord: i32,
    ) -> Option<&'t Monitor> {
        let o = origin.rect;

        let flush = topology.iter().find(|m| match dir {
            Direction::Above => m.rect.bottom() == o.y && m.rect.intersect_x(o.x, o.w) > 0,
            Direction::Below => m.rect.y == o.bottom() && m.rect.intersect_x(o.x, o.w) > 0,
            Direction::LeftOf => m.rect.right() == o.x && m.rect.intersect_y(o.y, o.h) > 0,
            Direction::RightOf => m.rect.x == o.right() && m.rect.intersect_y(o.y, o.h) > 0,
        });

        if let Some(m) = flush {
            let inside = if dir.is_vertical() {
                m.rect.x < coord && coord < m.rect.right() - 1
            } else {
                m.rect.y < coord && coord < m.rect.bottom() - 1
            };
            return if inside { Some(m) } else { None };
        }

        let wrap = if dir.is_vertical() { self.wrap_y } else { self.wrap_x };
        if !wrap {
            return None;
        }

        // Wrap around: furthest monitor in the opposite direction among those
        // overlapping the origin's perpendicular span. May be the origin
        // itself on a single-monitor topology.
        let mut best: Option<&Monitor> = None;
        for m in topology.iter() {
            let overlaps = if dir.is_vertical() {
                m.rect.intersect_x(o.x, o.w) > 0
            } else {
                m.rect.intersect_y(o.y, o.h) > 0
            };
            if !overlaps {
                continue;
            }
            let better = match (dir, best) {
                (_, None) => true,
                (Direction::Above, Some(b)) => m.rect.y >= b.rect.y,
                (Direction::Below, Some(b)) => m.rect.y <= b.rect.y,
                (Direction::LeftOf, Some(b)) => m.rect.x >= b.rect.x,
                (Direction::RightOf, Some(b)) => m.rect.x <= b.rect.x,
            };
            if better {
                best = Some(m);
            }
        }
        best
    }

    /// Resolve one motion sample `(x, y)` against the previous one
    /// `(px, py)`.
    ///
    /// Returns the corrected position to record as the new pointer state; the
    /// caller warps only when it differs from `(x, y)`. `None` means the
    /// sample was dropped entirely (no monitor matched, or the symmetric
    /// snap policy turned the crossing into a hard edge) and the previous
    /// pointer state stays as it was.
    pub fn resolve(
        &self,
        topology: &Topology,
        x: i32,
        y: i32,
        px: i32,
        py: i32,
    ) -> Option<(i32, i32)> {
        // Judge the exit edge against the monitor the motion started on, so
        // both a pointer clamped at an outer edge and one that just crossed a
        // flush boundary by a pixel are attributed to the monitor being left.
        let origin = topology
            .monitor_at(px, py)
            .or_else(|| topology.monitor_at(x, y))?;
        let o = origin.rect;

        let dx = x - px;
        let dy = y - py;
        let mut nx = x;
        let mut ny = y;
        let mut dest: Option<&Monitor> = None;

        // Only one edge is considered per sample, top to bottom to left to
        // right. The pointer counts as "on" an edge when it sits on the
        // outermost pixel row/column or exactly one pixel past it.
        if dy < 0 && (y == o.y || y == o.y - 1) {
            if self.wrap_y || self.snap_y {
                if let Some(m) = self.find_neighbor(topology, Direction::Above, origin, x) {
                    ny = m.rect.bottom() - 2;
                    dest = Some(m);
                }
            }
        } else if dy > 0 && (y == o.bottom() - 1 || y == o.bottom()) {
            if self.wrap_y || self.snap_y {
                if let Some(m) = self.find_neighbor(topology, Direction::Below, origin, x) {
                    ny = m.rect.y + 1;
                    dest = Some(m);
                }
            }
        } else if dx < 0 && (x == o.x || x == o.x - 1) {
            if self.wrap_x || self.snap_x {
                if let Some(m) = self.find_neighbor(topology, Direction::LeftOf, origin, y) {
                    nx = m.rect.right() - 2;
                    dest = Some(m);
                }
            }
        } else if dx > 0 && (x == o.right() - 1 || x == o.right()) {
            if self.wrap_x || self.snap_x {
                if let Some(m) = self.find_neighbor(topology, Direction::RightOf, origin, y) {
                    nx = m.rect.x + 1;
                    dest = Some(m);
                }
            }
        }

        if nx != x || ny != y {
            let m = dest?;
            let mr = m.rect;
            // Snap the untouched axis so the pointer does not land dead on a
            // hard inner edge of the destination.
            if m.num != origin.num && ny != y {
                let sx = self.snap(nx, mr.x, mr.w);
                if sx != nx && !self.snap_y && (ny - y).abs() <= dy.abs() {
                    return None;
                }
                nx = sx;
            }
            if m.num != origin.num && nx != x {
                let sy = self.snap(ny, mr.y, mr.h);
                if sy != ny && !self.snap_x && (nx - x).abs() <= dx.abs() {
                    return None;
                }
                ny = sy;
            }
        }

        Some((nx, ny))
    }

    /// Clamp a coordinate at least `snap_offset` pixels inside the span
    /// `[pos, pos + size)`.
    fn snap(&self, coord: i32, pos: i32, size: i32) -> i32 {
        let off = self.snap_offset.max(0).min(size / 2);
        coord.clamp(pos + off, pos + size - off)
    }
}
