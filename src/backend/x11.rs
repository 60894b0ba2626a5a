//! X11 backend
//!
//! Raw Xlib connection handling: XInput2 raw-motion registration (ordinary
//! motion events can be swallowed by client windows), Xinerama screen
//! enumeration with a single-screen fallback, pointer query/warp, and a
//! blocking poll on the connection socket.

use std::os::raw::{c_int, c_uint};

use x11::{xinerama, xinput2, xlib};

use super::{BackendError, BackendResult, DisplayBackend, Event};
use crate::screen::Rect;

pub struct X11Backend {
    display: *mut xlib::Display,
    root: xlib::Window,
    screen: c_int,
    xi_opcode: c_int,
}

impl X11Backend {
    /// Connect to the display server and register for raw pointer motion and
    /// root-window structure changes. Fails fatally when the display cannot
    /// be opened or XInput2 is unavailable.
    pub fn open() -> BackendResult<Self> {
        let display = unsafe { xlib::XOpenDisplay(std::ptr::null()) };
        if display.is_null() {
            return Err(BackendError::Connect("cannot open display".into()));
        }

        let screen = unsafe { xlib::XDefaultScreen(display) };
        let root = unsafe { xlib::XRootWindow(display, screen) };

        let mut xi_opcode = 0;
        let mut xi_event = 0;
        let mut xi_error = 0;
        let queried = unsafe {
            xlib::XQueryExtension(
                display,
                c"XInputExtension".as_ptr(),
                &mut xi_opcode,
                &mut xi_event,
                &mut xi_error,
            )
        };
        if queried == 0 {
            unsafe { xlib::XCloseDisplay(display) };
            return Err(BackendError::ExtensionMissing("XInputExtension"));
        }

        // Raw motion from all master devices.
        let mut mask_bytes = [0u8; (xinput2::XI_LASTEVENT as usize >> 3) + 1];
        mask_bytes[(xinput2::XI_RawMotion >> 3) as usize] |=
            1u8 << (xinput2::XI_RawMotion & 7);
        let mut mask = xinput2::XIEventMask {
            deviceid: xinput2::XIAllMasterDevices,
            mask_len: mask_bytes.len() as c_int,
            mask: mask_bytes.as_mut_ptr(),
        };
        unsafe { xinput2::XISelectEvents(display, root, &mut mask, 1) };

        // Geometry-change notifications for the root window.
        let mut attrs: xlib::XSetWindowAttributes = unsafe { std::mem::zeroed() };
        attrs.event_mask = xlib::StructureNotifyMask;
        unsafe {
            xlib::XChangeWindowAttributes(display, root, xlib::CWEventMask, &mut attrs);
            xlib::XFlush(display);
        }

        tracing::debug!("connected to X, xi_opcode={}", xi_opcode);

        Ok(Self {
            display,
            root,
            screen,
            xi_opcode,
        })
    }

    /// Map one X event onto the daemon's event type.
    ///
    /// ConfigureNotify for windows other than the root, generic events from
    /// other extensions, and any other event kind are dropped.
    unsafe fn translate(&mut self, event: &mut xlib::XEvent) -> Option<Event> {
        match event.get_type() {
            xlib::ConfigureNotify => {
                let ev = event.configure;
                if ev.window != self.root {
                    return None;
                }
                Some(Event::GeometryChanged {
                    width: ev.width,
                    height: ev.height,
                })
            }
            xlib::GenericEvent => {
                let cookie = &mut event.generic_event_cookie;
                if cookie.extension != self.xi_opcode {
                    return None;
                }
                if xlib::XGetEventData(self.display, cookie) == 0 {
                    return None;
                }
                let raw_motion = cookie.evtype == xinput2::XI_RawMotion;
                xlib::XFreeEventData(self.display, cookie);
                raw_motion.then_some(Event::RawMotion)
            }
            _ => None,
        }
    }
}

impl DisplayBackend for X11Backend {
    fn screens(&mut self) -> BackendResult<Vec<Rect>> {
        unsafe {
            if xinerama::XineramaIsActive(self.display) != 0 {
                let mut count = 0;
                let info = xinerama::XineramaQueryScreens(self.display, &mut count);
                if !info.is_null() {
                    let rects = std::slice::from_raw_parts(info, count as usize)
                        .iter()
                        .map(|s| {
                            Rect::new(
                                s.x_org as i32,
                                s.y_org as i32,
                                s.width as i32,
                                s.height as i32,
                            )
                        })
                        .collect();
                    xlib::XFree(info as *mut _);
                    return Ok(rects);
                }
            }

            Ok(vec![Rect::new(
                0,
                0,
                xlib::XDisplayWidth(self.display, self.screen),
                xlib::XDisplayHeight(self.display, self.screen),
            )])
        }
    }

    fn pointer_position(&mut self) -> BackendResult<Option<(i32, i32)>> {
        let mut root_ret: xlib::Window = 0;
        let mut child_ret: xlib::Window = 0;
        let (mut root_x, mut root_y): (c_int, c_int) = (0, 0);
        let (mut win_x, mut win_y): (c_int, c_int) = (0, 0);
        let mut mask: c_uint = 0;

        let found = unsafe {
            xlib::XQueryPointer(
                self.display,
                self.root,
                &mut root_ret,
                &mut child_ret,
                &mut root_x,
                &mut root_y,
                &mut win_x,
                &mut win_y,
                &mut mask,
            )
        };
        if found == 0 {
            return Ok(None);
        }
        Ok(Some((root_x, root_y)))
    }

    fn warp_pointer(&mut self, x: i32, y: i32) -> BackendResult<()> {
        unsafe {
            xlib::XWarpPointer(self.display, 0, self.root, 0, 0, 0, 0, x, y);
            xlib::XFlush(self.display);
        }
        Ok(())
    }

    fn next_event(&mut self) -> BackendResult<Option<Event>> {
        unsafe {
            if xlib::XPending(self.display) == 0 {
                let mut pfd = libc::pollfd {
                    fd: xlib::XConnectionNumber(self.display),
                    events: libc::POLLIN,
                    revents: 0,
                };
                let ready = libc::poll(&mut pfd, 1, -1);
                if ready < 0 {
                    let err = std::io::Error::last_os_error();
                    // A signal interrupted the wait; let the loop re-check
                    // its shutdown flag.
                    if err.raw_os_error() == Some(libc::EINTR) {
                        return Ok(None);
                    }
                    return Err(BackendError::Io(err));
                }
                if pfd.revents & (libc::POLLERR | libc::POLLHUP) != 0 {
                    return Err(BackendError::ConnectionClosed);
                }
                if xlib::XPending(self.display) == 0 {
                    return Ok(None);
                }
            }

            let mut event: xlib::XEvent = std::mem::zeroed();
            xlib::XNextEvent(self.display, &mut event);
            Ok(self.translate(&mut event))
        }
    }
}

impl Drop for X11Backend {
    fn drop(&mut self) {
        unsafe {
            xlib::XCloseDisplay(self.display);
        }
    }
}
