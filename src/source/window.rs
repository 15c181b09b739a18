//! Top-level window discovery.

use crate::frame::TargetRect;

/// A top-level window as seen at enumeration time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WindowInfo {
    pub title: String,
    /// Outer window rectangle in screen coordinates, title bar included.
    pub rect: TargetRect,
}

pub trait WindowEnumerator {
    /// Lists top-level windows in the system's enumeration order.
    fn top_level_windows(&self) -> Vec<WindowInfo>;
}

/// First window whose title contains `needle`, in enumeration order.
pub fn find_first_match<'a>(windows: &'a [WindowInfo], needle: &str) -> Option<&'a WindowInfo> {
    windows.iter().find(|w| w.title.contains(needle))
}

#[cfg(windows)]
pub use win32::Win32WindowEnumerator;

#[cfg(windows)]
mod win32 {
    use std::ffi::OsString;
    use std::os::windows::ffi::OsStringExt;

    use windows::Win32::Foundation::{BOOL, HWND, LPARAM, RECT, TRUE};
    use windows::Win32::UI::WindowsAndMessaging::{
        EnumWindows, GetWindowRect, GetWindowTextLengthW, GetWindowTextW, IsWindowVisible,
    };

    use super::{WindowEnumerator, WindowInfo};
    use crate::frame::TargetRect;

    /// Enumerates visible, titled top-level windows with `EnumWindows`.
    #[derive(Default)]
    pub struct Win32WindowEnumerator;

    unsafe extern "system" fn enum_callback(hwnd: HWND, lparam: LPARAM) -> BOOL {
        unsafe {
            let windows = &mut *(lparam.0 as *mut Vec<WindowInfo>);

            // Hidden windows cannot be on screen
            if !IsWindowVisible(hwnd).as_bool() {
                return TRUE;
            }

            let title_len = GetWindowTextLengthW(hwnd);
            if title_len <= 0 {
                return TRUE;
            }
            let mut title_buf: Vec<u16> = vec![0; (title_len + 1) as usize];
            let copied = GetWindowTextW(hwnd, &mut title_buf);
            let title = OsString::from_wide(&title_buf[..copied.max(0) as usize])
                .to_string_lossy()
                .to_string();

            let mut rect = RECT::default();
            if GetWindowRect(hwnd, &mut rect).is_err() {
                return TRUE;
            }

            windows.push(WindowInfo {
                title,
                rect: TargetRect::from_edges(rect.left, rect.top, rect.right, rect.bottom),
            });
            TRUE
        }
    }

    impl WindowEnumerator for Win32WindowEnumerator {
        fn top_level_windows(&self) -> Vec<WindowInfo> {
            let mut windows: Vec<WindowInfo> = Vec::new();
            let result = unsafe {
                EnumWindows(Some(enum_callback), LPARAM(&mut windows as *mut _ as isize))
            };
            if let Err(e) = result {
                crate::log(&format!("EnumWindows failed: {}", e));
            }
            windows
        }
    }
}
