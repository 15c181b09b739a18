//! Win32 layered popup window used as the overlay surface.
//!
//! The window is click-through and never takes focus. Black is the color key,
//! so any canvas pixel left at zero shows the desktop underneath.

use windows::core::{w, HSTRING, PCWSTR};
use windows::Win32::Foundation::{COLORREF, HINSTANCE, HWND, LPARAM, LRESULT, WPARAM};
use windows::Win32::Graphics::Gdi::{
    GetDC, ReleaseDC, SetDIBitsToDevice, ValidateRect, BITMAPINFO, BITMAPINFOHEADER, BI_RGB,
    DIB_RGB_COLORS,
};
use windows::Win32::System::LibraryLoader::GetModuleHandleW;
use windows::Win32::UI::WindowsAndMessaging::{
    CreateWindowExW, DefWindowProcW, DestroyWindow, DispatchMessageW, GetSystemMetrics,
    LoadCursorW, PeekMessageW, RegisterClassExW, SetLayeredWindowAttributes, SetWindowPos,
    TranslateMessage, UnregisterClassW, HTTRANSPARENT, HWND_TOPMOST, IDC_ARROW, LWA_COLORKEY,
    MSG, PM_REMOVE, SM_CXSCREEN, SM_CYSCREEN, SWP_NOACTIVATE, SWP_NOMOVE, SWP_NOSIZE,
    WM_DESTROY, WM_ERASEBKGND, WM_NCHITTEST, WM_PAINT, WNDCLASSEXW,
    WS_EX_LAYERED, WS_EX_NOACTIVATE, WS_EX_TOPMOST, WS_EX_TRANSPARENT, WS_POPUP, WS_VISIBLE,
};

use super::{NativeOverlay, WindowingBackend};
use crate::error::BackendError;
use crate::frame::CHANNELS;

const CLASS_NAME: PCWSTR = w!("WNCLS_OVLW");

fn last_error(operation: &'static str) -> BackendError {
    BackendError::from_win32(operation, &windows::core::Error::from_win32())
}

unsafe extern "system" fn overlay_proc(
    hwnd: HWND,
    msg: u32,
    wparam: WPARAM,
    lparam: LPARAM,
) -> LRESULT {
    unsafe {
        match msg {
            // The canvas covers every pixel; erasing would only flicker.
            WM_ERASEBKGND => LRESULT(1),
            WM_PAINT => {
                let _ = ValidateRect(hwnd, None);
                LRESULT(0)
            }
            WM_NCHITTEST => LRESULT(HTTRANSPARENT as i32 as isize),
            WM_DESTROY => LRESULT(0),
            _ => DefWindowProcW(hwnd, msg, wparam, lparam),
        }
    }
}

pub struct Win32Windowing {
    instance: HINSTANCE,
}

impl Win32Windowing {
    pub fn new() -> Result<Self, BackendError> {
        let module = unsafe { GetModuleHandleW(None) }
            .map_err(|e| BackendError::from_win32("GetModuleHandleW", &e))?;
        Ok(Self {
            instance: module.into(),
        })
    }
}

impl WindowingBackend for Win32Windowing {
    type Window = Win32Overlay;

    fn class_init(&self) -> Result<(), BackendError> {
        unsafe {
            let cursor = LoadCursorW(None, IDC_ARROW)
                .map_err(|e| BackendError::from_win32("LoadCursorW", &e))?;
            let wc = WNDCLASSEXW {
                cbSize: std::mem::size_of::<WNDCLASSEXW>() as u32,
                lpfnWndProc: Some(overlay_proc),
                hInstance: self.instance,
                hCursor: cursor,
                lpszClassName: CLASS_NAME,
                ..Default::default()
            };
            if RegisterClassExW(&wc) == 0 {
                return Err(last_error("RegisterClassExW"));
            }
        }
        Ok(())
    }

    fn class_uninit(&self) {
        if let Err(e) = unsafe { UnregisterClassW(CLASS_NAME, self.instance) } {
            crate::log(&format!("UnregisterClassW failed: {}", e));
        }
    }

    fn create(
        &self,
        name: &str,
        x: i32,
        y: i32,
        width: i32,
        height: i32,
    ) -> Result<Win32Overlay, BackendError> {
        let title = HSTRING::from(name);
        let hwnd = unsafe {
            CreateWindowExW(
                WS_EX_TRANSPARENT | WS_EX_NOACTIVATE | WS_EX_TOPMOST | WS_EX_LAYERED,
                CLASS_NAME,
                &title,
                WS_POPUP | WS_VISIBLE,
                x,
                y,
                width,
                height,
                None,
                None,
                self.instance,
                None,
            )
        }
        .map_err(|e| BackendError::from_win32("CreateWindowExW", &e))?;

        // From here on the window is owned, so an early return destroys it.
        let overlay = Win32Overlay {
            hwnd,
            x,
            y,
            width,
            height,
        };

        unsafe {
            SetWindowPos(hwnd, HWND_TOPMOST, 0, 0, 0, 0, SWP_NOMOVE | SWP_NOSIZE)
                .map_err(|e| BackendError::from_win32("SetWindowPos(HWND_TOPMOST)", &e))?;
            SetLayeredWindowAttributes(hwnd, COLORREF(0), 0, LWA_COLORKEY)
                .map_err(|e| BackendError::from_win32("SetLayeredWindowAttributes", &e))?;
        }

        Ok(overlay)
    }
}

pub struct Win32Overlay {
    hwnd: HWND,
    x: i32,
    y: i32,
    width: i32,
    height: i32,
}

impl Win32Overlay {
    /// Moves or resizes the window and keeps it topmost, in a single call so
    /// a failure leaves the window where it was.
    fn place(&self, x: i32, y: i32, width: i32, height: i32) -> windows::core::Result<()> {
        unsafe { SetWindowPos(self.hwnd, HWND_TOPMOST, x, y, width, height, SWP_NOACTIVATE) }
    }
}

impl NativeOverlay for Win32Overlay {
    fn update(
        &mut self,
        src: &[u8],
        width: u32,
        height: u32,
        channels: usize,
    ) -> Result<(), BackendError> {
        if channels != CHANNELS || src.len() != width as usize * height as usize * channels {
            return Err(BackendError::InvalidArgument {
                operation: "update",
                detail: format!("{} bytes for {}x{}x{}", src.len(), width, height, channels),
            });
        }

        let info = BITMAPINFO {
            bmiHeader: BITMAPINFOHEADER {
                biSize: std::mem::size_of::<BITMAPINFOHEADER>() as u32,
                biWidth: width as i32,
                // Negative height: rows are stored top-down.
                biHeight: -(height as i32),
                biPlanes: 1,
                biBitCount: 32,
                biCompression: BI_RGB.0,
                ..Default::default()
            },
            ..Default::default()
        };

        unsafe {
            let hdc = GetDC(self.hwnd);
            if hdc.is_invalid() {
                return Err(BackendError::NullHandle { operation: "GetDC" });
            }
            let lines = SetDIBitsToDevice(
                hdc,
                0,
                0,
                width,
                height,
                0,
                0,
                0,
                height,
                src.as_ptr() as *const _,
                &info,
                DIB_RGB_COLORS,
            );
            let result = if lines == 0 && height > 0 {
                Err(last_error("SetDIBitsToDevice"))
            } else {
                Ok(())
            };
            let _ = ReleaseDC(self.hwnd, hdc);
            result
        }
    }

    fn set_position(&mut self, x: i32, y: i32) -> Result<(), BackendError> {
        self.place(x, y, self.width, self.height)
            .map_err(|e| BackendError::from_win32("SetWindowPos(move)", &e))?;
        self.x = x;
        self.y = y;
        Ok(())
    }

    fn set_window_size(&mut self, width: i32, height: i32) -> Result<(), BackendError> {
        self.place(self.x, self.y, width, height)
            .map_err(|e| BackendError::from_win32("SetWindowPos(size)", &e))?;
        self.width = width;
        self.height = height;
        Ok(())
    }

    fn position(&self) -> (i32, i32) {
        (self.x, self.y)
    }

    fn size(&self) -> (i32, i32) {
        (self.width, self.height)
    }

    fn display_size(&self) -> Result<(i32, i32), BackendError> {
        let (cx, cy) = unsafe { (GetSystemMetrics(SM_CXSCREEN), GetSystemMetrics(SM_CYSCREEN)) };
        if cx == 0 || cy == 0 {
            return Err(BackendError::Status {
                operation: "GetSystemMetrics",
                status: 0,
            });
        }
        Ok((cx, cy))
    }

    fn poll_messages(&mut self) {
        unsafe {
            let mut msg = MSG::default();
            while PeekMessageW(&mut msg, self.hwnd, 0, 0, PM_REMOVE).as_bool() {
                let _ = TranslateMessage(&msg);
                DispatchMessageW(&msg);
            }
        }
    }
}

impl Drop for Win32Overlay {
    fn drop(&mut self) {
        if let Err(e) = unsafe { DestroyWindow(self.hwnd) } {
            crate::log(&format!("DestroyWindow failed: {}", e));
        }
    }
}
