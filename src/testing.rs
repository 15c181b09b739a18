//! In-memory backends for unit tests.
//!
//! Each fake hands out an `Rc` to its state so a test can flip failure
//! switches and read counters while the fake itself is owned by the code
//! under test.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::capture::CaptureBackend;
use crate::error::BackendError;
use crate::frame::{FrameBuffer, TargetRect};
use crate::overlay::{NativeOverlay, WindowingBackend};
use crate::source::{WindowEnumerator, WindowInfo};

pub struct FakeCaptureState {
    /// What the "screen" shows. Copied out on every successful read.
    pub scene: RefCell<FrameBuffer>,
    pub fail: Cell<bool>,
    pub frames: Cell<u32>,
    pub releases: Cell<u32>,
}

pub struct FakeCapture {
    state: Rc<FakeCaptureState>,
    width: u32,
    height: u32,
}

impl FakeCapture {
    pub fn new(width: u32, height: u32) -> (Self, Rc<FakeCaptureState>) {
        let state = Rc::new(FakeCaptureState {
            scene: RefCell::new(FrameBuffer::new(width, height)),
            fail: Cell::new(false),
            frames: Cell::new(0),
            releases: Cell::new(0),
        });
        let capture = Self {
            state: Rc::clone(&state),
            width,
            height,
        };
        (capture, state)
    }
}

impl CaptureBackend for FakeCapture {
    fn height(&self) -> u32 {
        self.height
    }

    fn width(&self) -> u32 {
        self.width
    }

    fn get_frame(&mut self, dest: &mut [u8]) -> Result<(), BackendError> {
        if self.state.fail.get() {
            return Err(BackendError::Status {
                operation: "capture_get_frame",
                status: -1,
            });
        }
        dest.copy_from_slice(self.state.scene.borrow().as_bytes());
        self.state.frames.set(self.state.frames.get() + 1);
        Ok(())
    }
}

impl Drop for FakeCapture {
    fn drop(&mut self) {
        self.state.releases.set(self.state.releases.get() + 1);
    }
}

#[derive(Default)]
pub struct FakeWindowingState {
    pub fail_class_init: Cell<bool>,
    pub fail_create: Cell<bool>,
    pub fail_set_position: Cell<bool>,
    pub fail_set_size: Cell<bool>,
    pub fail_update: Cell<bool>,
    pub class_inits: Cell<u32>,
    pub class_uninits: Cell<u32>,
    pub created: RefCell<Vec<String>>,
    pub releases: Cell<u32>,
    pub polls: Cell<u32>,
    /// Last image presented by any window.
    pub presented: RefCell<Option<Vec<u8>>>,
    /// Geometry last applied natively, as `(x, y, width, height)`.
    pub native_geometry: Cell<(i32, i32, i32, i32)>,
    pub display: Cell<(i32, i32)>,
}

pub struct FakeWindowing {
    state: Rc<FakeWindowingState>,
}

impl FakeWindowing {
    pub fn new() -> (Self, Rc<FakeWindowingState>) {
        let state = Rc::new(FakeWindowingState::default());
        state.display.set((1920, 1080));
        (
            Self {
                state: Rc::clone(&state),
            },
            state,
        )
    }
}

fn fake_status(operation: &'static str) -> BackendError {
    BackendError::Status {
        operation,
        status: 1,
    }
}

impl WindowingBackend for FakeWindowing {
    type Window = FakeOverlay;

    fn class_init(&self) -> Result<(), BackendError> {
        if self.state.fail_class_init.get() {
            return Err(fake_status("class_init"));
        }
        self.state.class_inits.set(self.state.class_inits.get() + 1);
        Ok(())
    }

    fn class_uninit(&self) {
        self.state.class_uninits.set(self.state.class_uninits.get() + 1);
    }

    fn create(
        &self,
        name: &str,
        x: i32,
        y: i32,
        width: i32,
        height: i32,
    ) -> Result<FakeOverlay, BackendError> {
        if self.state.fail_create.get() {
            return Err(fake_status("create_window"));
        }
        self.state.created.borrow_mut().push(name.to_string());
        self.state.native_geometry.set((x, y, width, height));
        Ok(FakeOverlay {
            state: Rc::clone(&self.state),
            x,
            y,
            width,
            height,
        })
    }
}

pub struct FakeOverlay {
    state: Rc<FakeWindowingState>,
    x: i32,
    y: i32,
    width: i32,
    height: i32,
}

impl NativeOverlay for FakeOverlay {
    fn update(
        &mut self,
        src: &[u8],
        width: u32,
        height: u32,
        channels: usize,
    ) -> Result<(), BackendError> {
        if self.state.fail_update.get() {
            return Err(fake_status("update"));
        }
        assert_eq!(src.len(), width as usize * height as usize * channels);
        *self.state.presented.borrow_mut() = Some(src.to_vec());
        Ok(())
    }

    fn set_position(&mut self, x: i32, y: i32) -> Result<(), BackendError> {
        if self.state.fail_set_position.get() {
            return Err(fake_status("set_position"));
        }
        self.x = x;
        self.y = y;
        self.state
            .native_geometry
            .set((self.x, self.y, self.width, self.height));
        Ok(())
    }

    fn set_window_size(&mut self, width: i32, height: i32) -> Result<(), BackendError> {
        if self.state.fail_set_size.get() {
            return Err(fake_status("set_window_size"));
        }
        self.width = width;
        self.height = height;
        self.state
            .native_geometry
            .set((self.x, self.y, self.width, self.height));
        Ok(())
    }

    fn position(&self) -> (i32, i32) {
        (self.x, self.y)
    }

    fn size(&self) -> (i32, i32) {
        (self.width, self.height)
    }

    fn display_size(&self) -> Result<(i32, i32), BackendError> {
        Ok(self.state.display.get())
    }

    fn poll_messages(&mut self) {
        self.state.polls.set(self.state.polls.get() + 1);
    }
}

impl Drop for FakeOverlay {
    fn drop(&mut self) {
        self.state.releases.set(self.state.releases.get() + 1);
    }
}

/// Window list that tests can edit between scans.
#[derive(Clone, Default)]
pub struct FakeWindows {
    pub windows: Rc<RefCell<Vec<WindowInfo>>>,
}

impl FakeWindows {
    pub fn set(&self, windows: &[(&str, TargetRect)]) {
        *self.windows.borrow_mut() = windows
            .iter()
            .map(|(title, rect)| WindowInfo {
                title: title.to_string(),
                rect: *rect,
            })
            .collect();
    }
}

impl WindowEnumerator for FakeWindows {
    fn top_level_windows(&self) -> Vec<WindowInfo> {
        self.windows.borrow().clone()
    }
}
