//! Process-wide bookkeeping shared by every overlay window.
//!
//! One registry owns the windowing backend, the window-class reference count,
//! and the window-name counter. It is handed to each `OverlayWindow` at
//! construction instead of living in globals. It uses `Rc`/`Cell` and is
//! therefore confined to the thread that drives the overlays.

use std::cell::Cell;
use std::rc::Rc;

use super::WindowingBackend;
use crate::error::BackendError;

pub struct OverlayRegistry<W: WindowingBackend> {
    backend: W,
    live_windows: Cell<usize>,
    next_name: Cell<u32>,
}

impl<W: WindowingBackend> OverlayRegistry<W> {
    pub fn new(backend: W) -> Rc<Self> {
        Rc::new(Self {
            backend,
            live_windows: Cell::new(0),
            next_name: Cell::new(0),
        })
    }

    pub fn backend(&self) -> &W {
        &self.backend
    }

    /// Number of overlay windows currently holding the window class.
    pub fn live_windows(&self) -> usize {
        self.live_windows.get()
    }

    /// Returns a window name that has never been handed out before.
    ///
    /// The counter only grows, so a name is not reused even after its window
    /// is destroyed.
    pub fn next_window_name(&self) -> String {
        let n = self.next_name.get();
        self.next_name.set(n + 1);
        format!("WNCLS_OVLW_{:03}", n)
    }

    /// Takes a reference on the window class, registering it on first use.
    pub fn acquire_class(&self) -> Result<(), BackendError> {
        if self.live_windows.get() == 0 {
            self.backend.class_init()?;
        }
        self.live_windows.set(self.live_windows.get() + 1);
        Ok(())
    }

    /// Drops a reference on the window class, unregistering it with the last one.
    pub fn release_class(&self) {
        match self.live_windows.get() {
            0 => {}
            1 => {
                self.live_windows.set(0);
                self.backend.class_uninit();
            }
            n => self.live_windows.set(n - 1),
        }
    }
}
