//! Display server backend
//!
//! Abstracts the windowing-system collaborator behind a small trait so the
//! daemon and its tests run against either the live X11 connection or a
//! scripted stand-in.

mod x11;

pub use self::x11::X11Backend;

use thiserror::Error;

use crate::screen::Rect;

/// Errors that can occur while talking to the display server
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("Cannot connect to display server: {0}")]
    Connect(String),

    #[error("Required extension unavailable: {0}")]
    ExtensionMissing(&'static str),

    #[error("Display server connection closed")]
    ConnectionClosed,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type BackendResult<T> = Result<T, BackendError>;

/// One notification drained from the display server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// The root/display geometry changed; the screen list must be re-read.
    GeometryChanged { width: i32, height: i32 },
    /// A raw pointer-motion sample was delivered. Raw motion is relative, so
    /// the absolute position has to be queried separately.
    RawMotion,
}

/// The windowing-system operations the daemon needs.
pub trait DisplayBackend {
    /// Enumerate the current screen rectangles. May contain duplicates for
    /// mirrored outputs; backends without multi-screen enumeration report a
    /// single full-display rectangle.
    fn screens(&mut self) -> BackendResult<Vec<Rect>>;

    /// Current absolute pointer position. `Ok(None)` when the query fails
    /// transiently; the sample is then dropped.
    fn pointer_position(&mut self) -> BackendResult<Option<(i32, i32)>>;

    /// Move the pointer to an absolute position.
    fn warp_pointer(&mut self, x: i32, y: i32) -> BackendResult<()>;

    /// Block until the next notification arrives and drain exactly one.
    /// `Ok(None)` means the wait woke without an actionable event: an
    /// unknown event kind, or an interrupted wait such as a shutdown signal.
    fn next_event(&mut self) -> BackendResult<Option<Event>>;
}
