//! Transparent always-on-top overlay.
//!
//! This module provides:
//! - The native contracts (`WindowingBackend`, `NativeOverlay`)
//! - The compositing canvas (`Canvas`) and marker drawing (`outline`)
//! - Class and name bookkeeping shared by all windows (`OverlayRegistry`)
//! - The overlay window itself (`OverlayWindow`)
//! - The Win32 layered-window backend (`Win32Windowing`, Windows only)

pub mod canvas;
pub mod draw;
#[cfg(windows)]
pub mod native;
pub mod registry;

pub use canvas::Canvas;
pub use draw::outline;
#[cfg(windows)]
pub use native::Win32Windowing;
pub use registry::OverlayRegistry;

use anyhow::{bail, Context, Result};
use std::rc::Rc;

use crate::error::BackendError;
use crate::frame::{FrameView, CHANNELS};
use crate::handle::NativeHandle;

/// Process-wide part of a windowing system: the window class and the
/// factory for overlay windows.
pub trait WindowingBackend {
    type Window: NativeOverlay;

    /// Registers the overlay window class.
    fn class_init(&self) -> Result<(), BackendError>;

    /// Unregisters the overlay window class.
    fn class_uninit(&self);

    /// Creates a visible overlay window. The class must be registered.
    fn create(
        &self,
        name: &str,
        x: i32,
        y: i32,
        width: i32,
        height: i32,
    ) -> Result<Self::Window, BackendError>;
}

/// One native overlay window. Dropping it destroys the window.
pub trait NativeOverlay {
    /// Presents `src` (tightly packed BGRA, top-down) on the window.
    fn update(
        &mut self,
        src: &[u8],
        width: u32,
        height: u32,
        channels: usize,
    ) -> Result<(), BackendError>;

    fn set_position(&mut self, x: i32, y: i32) -> Result<(), BackendError>;

    fn set_window_size(&mut self, width: i32, height: i32) -> Result<(), BackendError>;

    /// Position the window currently has, as last applied natively.
    fn position(&self) -> (i32, i32);

    /// Size the window currently has, as last applied natively.
    fn size(&self) -> (i32, i32);

    /// Size of the display the window lives on.
    fn display_size(&self) -> Result<(i32, i32), BackendError>;

    /// Dispatches whatever messages are queued for the window, without blocking.
    fn poll_messages(&mut self);
}

/// Overlay window with its own compositing canvas.
///
/// Geometry is cached on the Rust side and only changes after the native
/// call that applies it has succeeded.
pub struct OverlayWindow<W: WindowingBackend> {
    registry: Rc<OverlayRegistry<W>>,
    handle: NativeHandle<W::Window>,
    name: String,
    x: i32,
    y: i32,
    width: i32,
    height: i32,
    canvas: Canvas,
}

impl<W: WindowingBackend> OverlayWindow<W> {
    /// Creates and shows an overlay covering `(x, y, width, height)` in
    /// screen coordinates.
    ///
    /// A window name is consumed even when creation fails.
    pub fn create(
        registry: &Rc<OverlayRegistry<W>>,
        x: i32,
        y: i32,
        width: i32,
        height: i32,
    ) -> Result<Self> {
        if width <= 0 || height <= 0 {
            bail!("Overlay size must be positive, got {}x{}", width, height);
        }

        registry
            .acquire_class()
            .context("Failed to register overlay window class")?;

        let name = registry.next_window_name();
        let window = match registry.backend().create(&name, x, y, width, height) {
            Ok(window) => window,
            Err(e) => {
                registry.release_class();
                return Err(e).with_context(|| format!("Failed to create overlay window {}", name));
            }
        };

        crate::log(&format!(
            "Overlay {} created: {}x{} at ({}, {})",
            name, width, height, x, y
        ));

        debug_assert_eq!(window.position(), (x, y));
        debug_assert_eq!(window.size(), (width, height));

        Ok(Self {
            registry: Rc::clone(registry),
            handle: NativeHandle::new(window),
            name,
            x,
            y,
            width,
            height,
            canvas: Canvas::new(width as u32, height as u32),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn position(&self) -> Result<(i32, i32), BackendError> {
        self.handle.get("position")?;
        Ok((self.x, self.y))
    }

    pub fn size(&self) -> Result<(i32, i32), BackendError> {
        self.handle.get("size")?;
        Ok((self.width, self.height))
    }

    pub fn display_size(&self) -> Result<(i32, i32), BackendError> {
        self.handle.get("display_size")?.display_size()
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    /// Blends `frame` onto the canvas at canvas coordinates `(x, y)`.
    /// Nothing is shown until `update`.
    pub fn append(&mut self, frame: &FrameView, x: i32, y: i32) {
        self.canvas.append(frame, x, y);
    }

    /// Resets the canvas to fully transparent.
    pub fn clear(&mut self) {
        self.canvas.clear();
    }

    /// Presents the canvas and then pumps the window's messages.
    ///
    /// Messages are pumped even when presenting fails, so a failing window
    /// still answers the system. The present result is returned.
    pub fn update(&mut self) -> Result<(), BackendError> {
        let window = self.handle.get_mut("update")?;
        let presented = window.update(
            self.canvas.as_bytes(),
            self.canvas.width(),
            self.canvas.height(),
            CHANNELS,
        );
        window.poll_messages();
        presented
    }

    pub fn set_position(&mut self, x: i32, y: i32) -> Result<(), BackendError> {
        let window = self.handle.get_mut("set_position")?;
        if (x, y) == (self.x, self.y) {
            return Ok(());
        }
        window.set_position(x, y)?;
        self.x = x;
        self.y = y;
        debug_assert_eq!(window.position(), (self.x, self.y));
        Ok(())
    }

    /// Resizes the window and its canvas. Canvas content overlapping the old
    /// top-left corner is kept.
    pub fn set_size(&mut self, width: i32, height: i32) -> Result<(), BackendError> {
        let window = self.handle.get_mut("set_size")?;
        if width <= 0 || height <= 0 {
            return Err(BackendError::InvalidArgument {
                operation: "set_size",
                detail: format!("{}x{}", width, height),
            });
        }
        if (width, height) == (self.width, self.height) {
            return Ok(());
        }
        window.set_window_size(width, height)?;
        self.width = width;
        self.height = height;
        self.canvas.resize(width as u32, height as u32);
        debug_assert_eq!(window.size(), (self.width, self.height));
        Ok(())
    }

    pub fn is_active(&self) -> bool {
        self.handle.is_active()
    }

    /// Destroys the native window and gives back the class reference.
    /// Safe to call more than once.
    pub fn destroy(&mut self) {
        if self.handle.close() {
            self.registry.release_class();
            crate::log(&format!("Overlay {} destroyed", self.name));
        }
    }
}

impl<W: WindowingBackend> Drop for OverlayWindow<W> {
    fn drop(&mut self) {
        self.destroy();
    }
}
