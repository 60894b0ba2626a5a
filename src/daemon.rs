//! Event loop and dispatch
//!
//! Single-threaded: one thread owns the topology, the pointer state, and the
//! backend connection. Each iteration drains one event, dispatches it, and
//! re-checks the shutdown flag so a signal arriving during the blocking wait
//! exits promptly without processing a stale event.

use std::sync::atomic::{AtomicBool, Ordering};

use crate::backend::{BackendResult, DisplayBackend, Event};
use crate::config::Settings;
use crate::screen::{Resolver, Topology};

static SHUTDOWN: AtomicBool = AtomicBool::new(false);

/// Request a clean exit; safe to call from a signal handler.
pub fn request_shutdown() {
    SHUTDOWN.store(true, Ordering::SeqCst);
}

/// The daemon context: configuration, topology, pointer state, and the
/// display server connection.
pub struct Daemon<B: DisplayBackend> {
    backend: B,
    resolver: Resolver,
    topology: Topology,
    px: i32,
    py: i32,
    shutdown: &'static AtomicBool,
}

impl<B: DisplayBackend> Daemon<B> {
    pub fn new(backend: B, settings: &Settings) -> Self {
        Self::with_shutdown(backend, settings, &SHUTDOWN)
    }

    /// Construct with an explicit shutdown flag. Used by tests; the default
    /// constructor wires in the process-wide flag the signal handlers set.
    pub fn with_shutdown(
        backend: B,
        settings: &Settings,
        shutdown: &'static AtomicBool,
    ) -> Self {
        Self {
            backend,
            resolver: Resolver {
                wrap_x: settings.wrap_x,
                wrap_y: settings.wrap_y,
                snap_x: settings.snap_x,
                snap_y: settings.snap_y,
                snap_offset: settings.snap_offset,
            },
            topology: Topology::new(),
            px: 0,
            py: 0,
            shutdown,
        }
    }

    /// Run until shutdown is requested or the backend connection fails.
    pub fn run(&mut self) -> BackendResult<()> {
        self.rebuild_topology(None)?;
        if let Some((x, y)) = self.backend.pointer_position()? {
            self.px = x;
            self.py = y;
        }

        while !self.shutdown.load(Ordering::SeqCst) {
            let event = self.backend.next_event()?;
            if self.shutdown.load(Ordering::SeqCst) {
                break;
            }
            match event {
                Some(Event::GeometryChanged { width, height }) => {
                    tracing::info!("display geometry changed: {}x{}", width, height);
                    self.rebuild_topology(Some((width, height)))?;
                }
                Some(Event::RawMotion) => self.handle_motion()?,
                None => {}
            }
        }

        tracing::info!("shutting down");
        Ok(())
    }

    /// Re-read the screen list, preferring the notification's dimensions.
    ///
    /// A single-rect enumeration comes from the backend's full-display
    /// fallback, which reports the size cached when the connection was
    /// opened; the ConfigureNotify that triggered the rebuild carries the
    /// live root size, so it overrides the fallback rectangle.
    fn rebuild_topology(&mut self, resize: Option<(i32, i32)>) -> BackendResult<()> {
        let mut screens = self.backend.screens()?;
        if let (Some((w, h)), [only]) = (resize, screens.as_mut_slice()) {
            only.w = w;
            only.h = h;
        }
        self.topology.rebuild(&screens);
        tracing::debug!("topology: {} monitor(s)", self.topology.len());
        Ok(())
    }

    /// Fetch the absolute pointer position and apply edge-crossing
    /// resolution. Every transient failure degrades to a no-op for this
    /// sample; the next motion sample supersedes it.
    fn handle_motion(&mut self) -> BackendResult<()> {
        let Some((x, y)) = self.backend.pointer_position()? else {
            return Ok(());
        };

        if let Some((nx, ny)) = self.resolver.resolve(&self.topology, x, y, self.px, self.py) {
            if (nx, ny) != (x, y) {
                tracing::debug!("warp ({}, {}) -> ({}, {})", x, y, nx, ny);
                self.backend.warp_pointer(nx, ny)?;
            }
            self.px = nx;
            self.py = ny;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::screen::Rect;
    use std::collections::VecDeque;
    use std::sync::atomic::AtomicBool;

    /// Scripted backend: an event queue plus a matching queue of pointer
    /// positions, recording every warp. Requests shutdown once the event
    /// script runs dry.
    struct MockBackend {
        screens: Vec<Rect>,
        events: VecDeque<Event>,
        positions: VecDeque<(i32, i32)>,
        warps: Vec<(i32, i32)>,
        shutdown: &'static AtomicBool,
    }

    impl MockBackend {
        fn new(screens: Vec<Rect>, shutdown: &'static AtomicBool) -> Self {
            Self {
                screens,
                events: VecDeque::new(),
                positions: VecDeque::new(),
                warps: Vec::new(),
                shutdown,
            }
        }

        /// Position answered to the daemon's startup query.
        fn starting_at(mut self, x: i32, y: i32) -> Self {
            self.positions.push_back((x, y));
            self
        }

        fn motion(mut self, x: i32, y: i32) -> Self {
            self.events.push_back(Event::RawMotion);
            self.positions.push_back((x, y));
            self
        }
    }

    impl DisplayBackend for MockBackend {
        fn screens(&mut self) -> BackendResult<Vec<Rect>> {
            Ok(self.screens.clone())
        }

        fn pointer_position(&mut self) -> BackendResult<Option<(i32, i32)>> {
            // After the script runs out, the pointer rests wherever the last
            // warp put it.
            if let Some(pos) = self.positions.pop_front() {
                Ok(Some(pos))
            } else {
                Ok(self.warps.last().copied())
            }
        }

        fn warp_pointer(&mut self, x: i32, y: i32) -> BackendResult<()> {
            self.warps.push((x, y));
            Ok(())
        }

        fn next_event(&mut self) -> BackendResult<Option<Event>> {
            match self.events.pop_front() {
                Some(event) => Ok(Some(event)),
                None => {
                    self.shutdown.store(true, Ordering::SeqCst);
                    Ok(None)
                }
            }
        }
    }

    fn flag() -> &'static AtomicBool {
        Box::leak(Box::new(AtomicBool::new(false)))
    }

    fn settings() -> Settings {
        Settings {
            wrap_x: true,
            wrap_y: true,
            snap_x: true,
            snap_y: true,
            snap_offset: 10,
        }
    }

    fn warps_of(daemon: Daemon<MockBackend>) -> Vec<(i32, i32)> {
        daemon.backend.warps
    }

    #[test]
    fn test_crossing_flush_edge_warps_exactly_once() {
        let shutdown = flag();
        let screens = vec![Rect::new(0, 0, 1920, 1080), Rect::new(1920, 0, 1920, 1080)];
        let backend = MockBackend::new(screens, shutdown)
            .starting_at(1919, 540)
            .motion(1920, 540);

        let mut daemon = Daemon::with_shutdown(backend, &settings(), shutdown);
        daemon.run().unwrap();

        assert_eq!(warps_of(daemon), vec![(1921, 540)]);
    }

    #[test]
    fn test_single_monitor_without_wrap_never_warps() {
        let shutdown = flag();
        let backend = MockBackend::new(vec![Rect::new(0, 0, 1920, 1080)], shutdown)
            .starting_at(1918, 540)
            .motion(1919, 540)
            .motion(960, 0)
            .motion(0, 540);

        let no_wrap = Settings {
            wrap_x: false,
            wrap_y: false,
            ..settings()
        };
        let mut daemon = Daemon::with_shutdown(backend, &no_wrap, shutdown);
        daemon.run().unwrap();

        assert!(warps_of(daemon).is_empty());
    }

    #[test]
    fn test_geometry_change_rebuilds_topology() {
        let shutdown = flag();
        let mut backend = MockBackend::new(vec![Rect::new(0, 0, 1920, 1080)], shutdown);
        backend
            .events
            .push_back(Event::GeometryChanged { width: 2560, height: 1440 });

        let mut daemon = Daemon::with_shutdown(backend, &settings(), shutdown);
        // The notification makes the daemon re-read the screen list.
        daemon.backend.screens = vec![Rect::new(0, 0, 2560, 1440)];
        daemon.run().unwrap();

        assert_eq!(daemon.topology.len(), 1);
        assert_eq!(
            daemon.topology.iter().next().unwrap().rect,
            Rect::new(0, 0, 2560, 1440)
        );
    }

    #[test]
    fn test_geometry_event_overrides_stale_fallback_size() {
        let shutdown = flag();
        // The backend keeps reporting the size it saw at connection time;
        // only the notification knows the root was resized.
        let mut backend = MockBackend::new(vec![Rect::new(0, 0, 1920, 1080)], shutdown);
        backend
            .events
            .push_back(Event::GeometryChanged { width: 2560, height: 1440 });

        let mut daemon = Daemon::with_shutdown(backend, &settings(), shutdown);
        daemon.run().unwrap();

        assert_eq!(daemon.topology.len(), 1);
        assert_eq!(
            daemon.topology.iter().next().unwrap().rect,
            Rect::new(0, 0, 2560, 1440)
        );
    }

    #[test]
    fn test_shutdown_flag_stops_the_loop_before_dispatch() {
        let shutdown = flag();
        let backend = MockBackend::new(vec![Rect::new(0, 0, 1920, 1080)], shutdown)
            .motion(1919, 540);

        shutdown.store(true, Ordering::SeqCst);
        let mut daemon = Daemon::with_shutdown(backend, &settings(), shutdown);
        daemon.run().unwrap();

        assert!(warps_of(daemon).is_empty());
    }
}
