//! Desktop Duplication capture of the primary output.
//!
//! Chain: D3D11 device -> DXGI device -> adapter -> output 0 -> duplication.
//! Frames are copied into a CPU-readable staging texture and then into the
//! caller's buffer, row by row when the GPU pads rows.

use windows::core::Interface;
use windows::Win32::Graphics::Direct3D::D3D_DRIVER_TYPE_HARDWARE;
use windows::Win32::Graphics::Direct3D11::{
    D3D11CreateDevice, ID3D11Device, ID3D11DeviceContext, ID3D11Resource, ID3D11Texture2D,
    D3D11_CPU_ACCESS_READ, D3D11_CREATE_DEVICE_BGRA_SUPPORT, D3D11_MAP_READ, D3D11_SDK_VERSION,
    D3D11_TEXTURE2D_DESC, D3D11_USAGE_STAGING,
};
use windows::Win32::Graphics::Dxgi::Common::{DXGI_FORMAT_B8G8R8A8_UNORM, DXGI_SAMPLE_DESC};
use windows::Win32::Graphics::Dxgi::{
    IDXGIAdapter1, IDXGIDevice1, IDXGIOutput, IDXGIOutput1, IDXGIOutputDuplication,
    IDXGIResource, DXGI_ERROR_WAIT_TIMEOUT, DXGI_OUTDUPL_FRAME_INFO,
};

use super::session::CaptureBackend;
use crate::error::BackendError;
use crate::frame::CHANNELS;

/// How long `AcquireNextFrame` waits for a new desktop image.
const ACQUIRE_TIMEOUT_MS: u32 = 15;

pub struct DxgiCapture {
    context: ID3D11DeviceContext,
    duplication: IDXGIOutputDuplication,
    staging: ID3D11Texture2D,
    width: u32,
    height: u32,
    // Keeps the device alive for as long as the duplication uses it.
    _device: ID3D11Device,
}

impl DxgiCapture {
    /// Opens a duplication of the primary output.
    pub fn create() -> Result<Self, BackendError> {
        let (device, context) = create_d3d11_device()?;

        let dxgi_device: IDXGIDevice1 = device
            .cast()
            .map_err(|e| BackendError::from_win32("QueryInterface(IDXGIDevice1)", &e))?;
        let adapter: IDXGIAdapter1 = unsafe { dxgi_device.GetParent() }
            .map_err(|e| BackendError::from_win32("IDXGIDevice1::GetParent", &e))?;
        let output: IDXGIOutput = unsafe { adapter.EnumOutputs(0) }
            .map_err(|e| BackendError::from_win32("IDXGIAdapter1::EnumOutputs", &e))?;
        let output1: IDXGIOutput1 = output
            .cast()
            .map_err(|e| BackendError::from_win32("QueryInterface(IDXGIOutput1)", &e))?;
        let duplication = unsafe { output1.DuplicateOutput(&device) }
            .map_err(|e| BackendError::from_win32("IDXGIOutput1::DuplicateOutput", &e))?;

        let desc = unsafe { output.GetDesc() }
            .map_err(|e| BackendError::from_win32("IDXGIOutput::GetDesc", &e))?;
        let coords = desc.DesktopCoordinates;
        let width = (coords.right - coords.left).max(0) as u32;
        let height = (coords.bottom - coords.top).max(0) as u32;

        let staging_desc = D3D11_TEXTURE2D_DESC {
            Width: width,
            Height: height,
            MipLevels: 1,
            ArraySize: 1,
            Format: DXGI_FORMAT_B8G8R8A8_UNORM,
            SampleDesc: DXGI_SAMPLE_DESC {
                Count: 1,
                Quality: 0,
            },
            Usage: D3D11_USAGE_STAGING,
            BindFlags: Default::default(),
            CPUAccessFlags: D3D11_CPU_ACCESS_READ.0 as u32,
            MiscFlags: Default::default(),
        };
        let staging = unsafe {
            let mut staging: Option<ID3D11Texture2D> = None;
            device
                .CreateTexture2D(&staging_desc, None, Some(&mut staging))
                .map_err(|e| BackendError::from_win32("ID3D11Device::CreateTexture2D", &e))?;
            staging.ok_or(BackendError::NullHandle {
                operation: "ID3D11Device::CreateTexture2D",
            })?
        };

        Ok(Self {
            context,
            duplication,
            staging,
            width,
            height,
            _device: device,
        })
    }

    /// Copies the acquired desktop image into `dest`. Called between a
    /// successful `AcquireNextFrame` and `ReleaseFrame`.
    fn copy_acquired(
        &mut self,
        resource: Option<IDXGIResource>,
        dest: &mut [u8],
    ) -> Result<(), BackendError> {
        let resource = resource.ok_or(BackendError::NullHandle {
            operation: "AcquireNextFrame",
        })?;
        let texture: ID3D11Texture2D = resource
            .cast()
            .map_err(|e| BackendError::from_win32("QueryInterface(ID3D11Texture2D)", &e))?;

        let staging: ID3D11Resource = self
            .staging
            .cast()
            .map_err(|e| BackendError::from_win32("QueryInterface(ID3D11Resource)", &e))?;
        let source: ID3D11Resource = texture
            .cast()
            .map_err(|e| BackendError::from_win32("QueryInterface(ID3D11Resource)", &e))?;

        unsafe { self.context.CopyResource(&staging, &source) };

        let mapped = unsafe {
            let mut mapped = Default::default();
            self.context
                .Map(&staging, 0, D3D11_MAP_READ, 0, Some(&mut mapped))
                .map_err(|e| BackendError::from_win32("ID3D11DeviceContext::Map", &e))?;
            mapped
        };

        let row_bytes = self.width as usize * CHANNELS;
        let pitch = mapped.RowPitch as usize;
        let mapped_len = pitch * (self.height as usize).saturating_sub(1) + row_bytes;
        let src = unsafe { std::slice::from_raw_parts(mapped.pData as *const u8, mapped_len) };

        if pitch == row_bytes {
            dest.copy_from_slice(&src[..dest.len()]);
        } else {
            for (y, dst_row) in dest.chunks_exact_mut(row_bytes).enumerate() {
                let start = y * pitch;
                dst_row.copy_from_slice(&src[start..start + row_bytes]);
            }
        }

        unsafe { self.context.Unmap(&staging, 0) };
        Ok(())
    }
}

impl CaptureBackend for DxgiCapture {
    fn height(&self) -> u32 {
        self.height
    }

    fn width(&self) -> u32 {
        self.width
    }

    fn get_frame(&mut self, dest: &mut [u8]) -> Result<(), BackendError> {
        let expected = self.width as usize * self.height as usize * CHANNELS;
        if dest.len() != expected {
            return Err(BackendError::InvalidArgument {
                operation: "capture_get_frame",
                detail: format!("buffer is {} bytes, expected {}", dest.len(), expected),
            });
        }

        let mut info = DXGI_OUTDUPL_FRAME_INFO::default();
        let mut resource: Option<IDXGIResource> = None;
        match unsafe {
            self.duplication
                .AcquireNextFrame(ACQUIRE_TIMEOUT_MS, &mut info, &mut resource)
        } {
            Ok(()) => {}
            // Desktop unchanged since the last frame; keep what we have.
            Err(e) if e.code() == DXGI_ERROR_WAIT_TIMEOUT => return Ok(()),
            Err(e) => return Err(BackendError::from_win32("AcquireNextFrame", &e)),
        }

        let result = self.copy_acquired(resource, dest);
        let _ = unsafe { self.duplication.ReleaseFrame() };
        result
    }
}

/// Creates a hardware D3D11 device with BGRA support and its immediate context.
fn create_d3d11_device() -> Result<(ID3D11Device, ID3D11DeviceContext), BackendError> {
    let mut device: Option<ID3D11Device> = None;
    let mut context: Option<ID3D11DeviceContext> = None;

    unsafe {
        D3D11CreateDevice(
            None,
            D3D_DRIVER_TYPE_HARDWARE,
            None,
            D3D11_CREATE_DEVICE_BGRA_SUPPORT,
            None,
            D3D11_SDK_VERSION,
            Some(&mut device),
            None,
            Some(&mut context),
        )
        .map_err(|e| BackendError::from_win32("D3D11CreateDevice", &e))?;
    }

    Ok((
        device.ok_or(BackendError::NullHandle {
            operation: "D3D11CreateDevice",
        })?,
        context.ok_or(BackendError::NullHandle {
            operation: "D3D11CreateDevice",
        })?,
    ))
}
