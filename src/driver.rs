// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

use crate::{
    error::{Error, Result},
    image::{PixelFormat, Rect},
};
use rga_sys::{
    rga as rga_library, rga_buffer_t, IM_INTERP_CUBIC, IM_INTERP_LINEAR, IM_INTERP_NEAREST,
    IM_STATUS_ERROR_VERSION, IM_STATUS_FAILED, IM_STATUS_ILLEGAL_PARAM, IM_STATUS_INVALID_PARAM,
    IM_STATUS_NOERROR, IM_STATUS_NOT_SUPPORTED, IM_STATUS_OUT_OF_MEMORY, IM_STATUS_SUCCESS,
    RGA_ALL,
};
use std::{
    env,
    ffi::{c_void, CStr},
    fmt,
    num::NonZeroU32,
};
use tracing::debug;

/// Library loaded by [`Rga::new`] unless `RGA_LIBRARY` names another.
pub const DEFAULT_LIBRARY: &str = "librga.so";

/// Status code reported by the RGA driver.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Status(pub i32);

impl Status {
    pub const NOERROR: Status = Status(IM_STATUS_NOERROR);
    pub const SUCCESS: Status = Status(IM_STATUS_SUCCESS);
    pub const FAILED: Status = Status(IM_STATUS_FAILED);
    pub const NOT_SUPPORTED: Status = Status(IM_STATUS_NOT_SUPPORTED);
    pub const OUT_OF_MEMORY: Status = Status(IM_STATUS_OUT_OF_MEMORY);
    pub const INVALID_PARAM: Status = Status(IM_STATUS_INVALID_PARAM);
    pub const ILLEGAL_PARAM: Status = Status(IM_STATUS_ILLEGAL_PARAM);
    pub const ERROR_VERSION: Status = Status(IM_STATUS_ERROR_VERSION);

    /// Both `SUCCESS` (returned by operations) and `NOERROR` (returned by
    /// checks) mean the call went through.
    pub fn is_ok(self) -> bool {
        self == Status::SUCCESS || self == Status::NOERROR
    }

    pub fn description(self) -> &'static str {
        match self {
            Status::NOERROR => "no error",
            Status::SUCCESS => "success",
            Status::FAILED => "failed",
            Status::NOT_SUPPORTED => "not supported",
            Status::OUT_OF_MEMORY => "out of memory",
            Status::INVALID_PARAM => "invalid parameter",
            Status::ILLEGAL_PARAM => "illegal parameter",
            Status::ERROR_VERSION => "driver version error",
            _ => "unknown status",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} ({})", self.description(), self.0)
    }
}

/// Driver-side registration of a virtual address range.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Handle(NonZeroU32);

impl Handle {
    /// Returns `None` for the driver's failure value of zero.
    pub fn new(raw: u32) -> Option<Self> {
        NonZeroU32::new(raw).map(Handle)
    }

    pub fn get(self) -> u32 {
        self.0.get()
    }
}

/// Scaling filter used by the hardware.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Interpolation {
    Nearest,
    #[default]
    Linear,
    Cubic,
}

impl Interpolation {
    pub fn to_raw(self) -> i32 {
        match self {
            Interpolation::Nearest => IM_INTERP_NEAREST,
            Interpolation::Linear => IM_INTERP_LINEAR,
            Interpolation::Cubic => IM_INTERP_CUBIC,
        }
    }
}

/// An imported buffer described with its geometry, the shape the driver's
/// check and resize calls operate on.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct WrappedBuffer {
    pub handle: Handle,
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
}

impl WrappedBuffer {
    pub fn rect(&self) -> Rect {
        Rect::full(self.width, self.height)
    }
}

/// Operations a 2D accelerator driver provides to the resize paths.
///
/// [`Rga`] implements this on top of `librga`; tests substitute their own
/// implementation to observe buffer registrations.
pub trait Driver {
    /// Registers `size` bytes at `va` for hardware access.
    ///
    /// # Safety
    ///
    /// `va` must point to at least `size` bytes that stay valid and unmoved
    /// until the returned handle is released.
    unsafe fn import_virtual(&self, va: *mut c_void, size: usize) -> Option<Handle>;

    /// Drops a registration made by [`Driver::import_virtual`].
    fn release(&self, handle: Handle) -> Status;

    /// Validates that the buffers and rectangles are jointly supported.
    fn check(
        &self,
        src: &WrappedBuffer,
        dst: &WrappedBuffer,
        src_rect: Rect,
        dst_rect: Rect,
    ) -> Status;

    /// Scales `src` into `dst`, blocking until the hardware is done.
    fn resize(&self, src: &WrappedBuffer, dst: &WrappedBuffer, interp: Interpolation) -> Status;
}

/// The Rockchip RGA driver, loaded from `librga` at runtime.
///
/// # Thread Safety
///
/// `librga` serialises submissions internally, so a single `Rga` may be
/// shared between threads.
pub struct Rga {
    lib: rga_library,
    version: Option<rga_sys::Version>,
}

impl Rga {
    /// Loads the library named by `RGA_LIBRARY`, or [`DEFAULT_LIBRARY`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::Library`] if the library cannot be loaded, or
    /// [`Error::MissingSymbol`] if it lacks part of the im2d API.
    pub fn new() -> Result<Self> {
        let path = env::var("RGA_LIBRARY").unwrap_or_else(|_| DEFAULT_LIBRARY.to_owned());
        Self::with_library(&path)
    }

    /// Loads the RGA driver from a specific library path.
    pub fn with_library(path: &str) -> Result<Self> {
        let library_error = |source| Error::Library {
            path: path.to_owned(),
            source,
        };
        let lib = unsafe { rga_library::new(path) }.map_err(library_error)?;

        // fail at load time rather than on the first call
        let symbols = [
            ("importbuffer_virtualaddr", lib.importbuffer_virtualaddr.is_ok()),
            ("releasebuffer_handle", lib.releasebuffer_handle.is_ok()),
            ("wrapbuffer_handle_t", lib.wrapbuffer_handle_t.is_ok()),
            ("imcheck_t", lib.imcheck_t.is_ok()),
            ("imresize_t", lib.imresize_t.is_ok()),
        ];
        if let Some(&(symbol, _)) = symbols.iter().find(|(_, found)| !found) {
            return Err(Error::MissingSymbol {
                path: path.to_owned(),
                symbol,
            });
        }

        let version = rga_sys::query_version(&lib);
        match version {
            Some(v) => debug!("loaded {} (RGA api {})", path, v),
            None => debug!("loaded {} (RGA api version unknown)", path),
        }
        Ok(Self { lib, version })
    }

    pub fn version(&self) -> Option<rga_sys::Version> {
        self.version
    }

    /// The driver's full information report (vendor, version, limits and
    /// supported formats).
    pub fn info(&self) -> Option<String> {
        if self.lib.querystring.is_err() {
            return None;
        }
        let raw = unsafe { self.lib.querystring(RGA_ALL) };
        if raw.is_null() {
            return None;
        }
        Some(unsafe { CStr::from_ptr(raw) }.to_string_lossy().into_owned())
    }

    /// The driver's own message for a status, when it provides one.
    pub fn strerror(&self, status: Status) -> Option<String> {
        if self.lib.imStrError_t.is_err() {
            return None;
        }
        let raw = unsafe { self.lib.imStrError_t(status.0) };
        if raw.is_null() {
            return None;
        }
        Some(unsafe { CStr::from_ptr(raw) }.to_string_lossy().into_owned())
    }

    fn wrap(&self, buf: &WrappedBuffer) -> rga_buffer_t {
        let (w, h) = (buf.width as i32, buf.height as i32);
        unsafe {
            self.lib
                .wrapbuffer_handle_t(buf.handle.get(), w, h, w, h, buf.format.to_raw())
        }
    }
}

impl Driver for Rga {
    unsafe fn import_virtual(&self, va: *mut c_void, size: usize) -> Option<Handle> {
        let size = i32::try_from(size).ok()?;
        Handle::new(self.lib.importbuffer_virtualaddr(va, size))
    }

    fn release(&self, handle: Handle) -> Status {
        Status(unsafe { self.lib.releasebuffer_handle(handle.get()) })
    }

    fn check(
        &self,
        src: &WrappedBuffer,
        dst: &WrappedBuffer,
        src_rect: Rect,
        dst_rect: Rect,
    ) -> Status {
        let src = self.wrap(src);
        let dst = self.wrap(dst);
        let status = unsafe {
            self.lib.imcheck_t(
                src,
                dst,
                rga_buffer_t::default(),
                src_rect.into(),
                dst_rect.into(),
                Rect::full(0, 0).into(),
                0,
            )
        };
        Status(status)
    }

    fn resize(&self, src: &WrappedBuffer, dst: &WrappedBuffer, interp: Interpolation) -> Status {
        let src = self.wrap(src);
        let dst = self.wrap(dst);
        // scale factors of zero derive the ratio from the buffer sizes
        let status = unsafe { self.lib.imresize_t(src, dst, 0.0, 0.0, interp.to_raw(), 1) };
        Status(status)
    }
}
