// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

//! C-callable resize entry points matching `include/rga_resize.h`.
//!
//! Every function returns `0` on success. Negative driver statuses are
//! passed through unchanged; failures detected by the shim use the
//! `RESIZE_RGA_ERR_*` codes from -100 down, which never collide with
//! driver statuses.
//!
//! The `resize_rga_init` / `resize_rga_frame` / `resize_rga_deinit` triple
//! drives a single process-wide [`ResizeSession`] held behind a mutex.
//! Rust callers should own a [`ResizeSession`] directly instead.

// Entry points take raw pointers without `unsafe` on the signature; the
// contract is documented in the header.
#![allow(clippy::not_unsafe_ptr_arg_deref)]

use crate::{
    driver::{Driver, Rga},
    error::{Error, Result, Role},
    image::{PixelFormat, Surface},
    resize::{resize, ResizeSession},
};
use libc::{c_char, c_int, c_void};
use parking_lot::{const_mutex, Mutex};
use std::{
    panic::{catch_unwind, AssertUnwindSafe},
    ptr::NonNull,
    sync::OnceLock,
};
use tracing::{debug, error};

pub const RESIZE_RGA_OK: c_int = 0;
pub const RESIZE_RGA_ERR_DRIVER: c_int = -100;
pub const RESIZE_RGA_ERR_NULL_POINTER: c_int = -101;
pub const RESIZE_RGA_ERR_INVALID_DIMENSIONS: c_int = -102;
pub const RESIZE_RGA_ERR_UNSUPPORTED_FORMAT: c_int = -103;
pub const RESIZE_RGA_ERR_IMPORT: c_int = -104;
pub const RESIZE_RGA_ERR_NOT_INITIALIZED: c_int = -105;
pub const RESIZE_RGA_ERR_LIBRARY: c_int = -106;
pub const RESIZE_RGA_ERR_INTERNAL: c_int = -107;

static RGA: OnceLock<Rga> = OnceLock::new();
static SESSION: Mutex<Option<ResizeSession<'static, Rga>>> = const_mutex(None);

/// Maps a shim error onto its C return code.
pub fn error_code(err: &Error) -> c_int {
    match err {
        Error::Driver { status, .. } if status.0 < 0 => status.0,
        Error::Driver { .. } => RESIZE_RGA_ERR_DRIVER,
        Error::NullPointer(_) => RESIZE_RGA_ERR_NULL_POINTER,
        Error::InvalidDimensions { .. } | Error::BufferTooSmall { .. } => {
            RESIZE_RGA_ERR_INVALID_DIMENSIONS
        }
        Error::UnsupportedFormat { .. } => RESIZE_RGA_ERR_UNSUPPORTED_FORMAT,
        Error::Import(_) => RESIZE_RGA_ERR_IMPORT,
        Error::NotInitialized => RESIZE_RGA_ERR_NOT_INITIALIZED,
        Error::Library { .. } | Error::MissingSymbol { .. } => RESIZE_RGA_ERR_LIBRARY,
    }
}

fn ffi_boundary<F>(f: F) -> c_int
where
    F: FnOnce() -> Result<()>,
{
    match catch_unwind(AssertUnwindSafe(f)) {
        Ok(Ok(())) => RESIZE_RGA_OK,
        Ok(Err(e)) => {
            debug!("FFI: {}", e);
            error_code(&e)
        }
        Err(_panic) => {
            error!("FFI: caught Rust panic at FFI boundary");
            RESIZE_RGA_ERR_INTERNAL
        }
    }
}

fn driver() -> Result<&'static Rga> {
    if let Some(rga) = RGA.get() {
        return Ok(rga);
    }
    let rga = Rga::new()?;
    Ok(RGA.get_or_init(|| rga))
}

/// Describes caller memory passed across the C boundary.
///
/// # Safety
///
/// `va` must satisfy the contract of [`Surface::from_raw_parts`] for the
/// computed image size and lifetime `'a`.
unsafe fn raw_surface<'a>(
    va: *mut c_void,
    width: c_int,
    height: c_int,
    format: c_int,
    role: Role,
) -> Result<Surface<'a>> {
    let ptr = NonNull::new(va.cast::<u8>()).ok_or(Error::NullPointer(role))?;
    let format = PixelFormat::from_raw(format).ok_or(Error::UnsupportedFormat { role, format })?;
    let invalid = Error::InvalidDimensions {
        role,
        width: width.max(0) as u32,
        height: height.max(0) as u32,
    };
    let (Ok(width), Ok(height)) = (u32::try_from(width), u32::try_from(height)) else {
        return Err(invalid);
    };
    let len = format.image_size(width, height).ok_or(invalid)?;
    Ok(Surface::from_raw_parts(ptr, len, width, height, format))
}

/// One-shot hardware resize.
///
/// Both buffers are registered, checked, resized with linear interpolation
/// and released before returning.
///
/// # Safety
///
/// `src_va` and `dst_va` must each point to `w * h * bytes_per_pixel` bytes
/// valid for the duration of the call.
#[no_mangle]
#[allow(clippy::too_many_arguments)]
pub extern "C" fn resize_rga(
    src_va: *mut c_void,
    src_w: c_int,
    src_h: c_int,
    src_fmt: c_int,
    dst_va: *mut c_void,
    dst_w: c_int,
    dst_h: c_int,
    dst_fmt: c_int,
) -> c_int {
    ffi_boundary(|| {
        let src = unsafe { raw_surface(src_va, src_w, src_h, src_fmt, Role::Source)? };
        let dst = unsafe { raw_surface(dst_va, dst_w, dst_h, dst_fmt, Role::Destination)? };
        resize(driver()?, src, dst)
    })
}

/// Registers a buffer pair for repeated [`resize_rga_frame`] calls.
///
/// Returns `0` without doing anything if already initialized.
///
/// # Safety
///
/// Both buffers must stay valid and unmoved until [`resize_rga_deinit`].
#[no_mangle]
#[allow(clippy::too_many_arguments)]
pub extern "C" fn resize_rga_init(
    src_va: *mut c_void,
    src_w: c_int,
    src_h: c_int,
    src_fmt: c_int,
    dst_va: *mut c_void,
    dst_w: c_int,
    dst_h: c_int,
    dst_fmt: c_int,
) -> c_int {
    ffi_boundary(|| {
        let mut guard = SESSION.lock();
        init_session(&mut *guard, driver, || {
            let src = unsafe { raw_surface(src_va, src_w, src_h, src_fmt, Role::Source)? };
            let dst = unsafe { raw_surface(dst_va, dst_w, dst_h, dst_fmt, Role::Destination)? };
            Ok((src, dst))
        })
    })
}

/// Fills `slot` with an initialized session unless it already holds one.
///
/// Neither the surfaces nor the driver are touched when already
/// initialized, matching the idempotent C contract.
fn init_session<'a, D: Driver>(
    slot: &mut Option<ResizeSession<'a, D>>,
    driver: impl FnOnce() -> Result<&'a D>,
    surfaces: impl FnOnce() -> Result<(Surface<'a>, Surface<'a>)>,
) -> Result<()> {
    if slot.as_ref().is_some_and(ResizeSession::is_initialized) {
        return Ok(());
    }
    let (src, dst) = surfaces()?;
    let mut session = ResizeSession::new(driver()?);
    session.init(src, dst)?;
    *slot = Some(session);
    Ok(())
}

/// Resizes the buffers registered by [`resize_rga_init`].
///
/// Returns `RESIZE_RGA_ERR_NOT_INITIALIZED` when no pair is registered.
#[no_mangle]
pub extern "C" fn resize_rga_frame() -> c_int {
    ffi_boundary(|| match SESSION.lock().as_mut() {
        Some(session) => session.frame(),
        None => Err(Error::NotInitialized),
    })
}

/// Releases the buffers registered by [`resize_rga_init`], if any.
#[no_mangle]
pub extern "C" fn resize_rga_deinit() {
    // the status only reports panics, of which the boundary already logs
    let _ = ffi_boundary(|| {
        let session = SESSION.lock().take();
        drop(session);
        Ok(())
    });
}

/// Static, NUL-terminated description of a return code.
#[no_mangle]
pub extern "C" fn resize_rga_strerror(code: c_int) -> *const c_char {
    let msg = match code {
        RESIZE_RGA_OK => c"success",
        RESIZE_RGA_ERR_DRIVER => c"driver operation failed",
        RESIZE_RGA_ERR_NULL_POINTER => c"null buffer address",
        RESIZE_RGA_ERR_INVALID_DIMENSIONS => c"invalid image dimensions",
        RESIZE_RGA_ERR_UNSUPPORTED_FORMAT => c"unsupported pixel format",
        RESIZE_RGA_ERR_IMPORT => c"buffer import failed",
        RESIZE_RGA_ERR_NOT_INITIALIZED => c"resize session not initialized",
        RESIZE_RGA_ERR_LIBRARY => c"RGA library could not be loaded",
        RESIZE_RGA_ERR_INTERNAL => c"internal error",
        -1 => c"driver: not supported",
        -2 => c"driver: out of memory",
        -3 => c"driver: invalid parameter",
        -4 => c"driver: illegal parameter",
        -5 => c"driver: version error",
        _ => c"unknown error",
    };
    msg.as_ptr()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        driver::{Handle, Interpolation, Status, WrappedBuffer},
        error::Operation,
        image::Rect,
    };
    use std::{cell::Cell, ffi::CStr, ptr::null_mut};

    /// Counts registrations; every check and resize succeeds.
    #[derive(Default)]
    struct CountingDriver {
        imports: Cell<u32>,
        releases: Cell<u32>,
    }

    impl Driver for CountingDriver {
        unsafe fn import_virtual(&self, _va: *mut c_void, _size: usize) -> Option<Handle> {
            self.imports.set(self.imports.get() + 1);
            Handle::new(self.imports.get())
        }

        fn release(&self, _handle: Handle) -> Status {
            self.releases.set(self.releases.get() + 1);
            Status::SUCCESS
        }

        fn check(&self, _: &WrappedBuffer, _: &WrappedBuffer, _: Rect, _: Rect) -> Status {
            Status::NOERROR
        }

        fn resize(&self, _: &WrappedBuffer, _: &WrappedBuffer, _: Interpolation) -> Status {
            Status::SUCCESS
        }
    }

    #[test]
    fn driver_statuses_pass_through() {
        let err = Error::Driver {
            op: Operation::Check,
            status: Status::INVALID_PARAM,
        };
        assert_eq!(error_code(&err), -3);

        // IM_STATUS_FAILED is 0 and must not read as success
        let err = Error::Driver {
            op: Operation::Resize,
            status: Status::FAILED,
        };
        assert_eq!(error_code(&err), RESIZE_RGA_ERR_DRIVER);
    }

    #[test]
    fn shim_errors_do_not_collide() {
        let codes = [
            error_code(&Error::NullPointer(Role::Source)),
            error_code(&Error::Import(Role::Destination)),
            error_code(&Error::NotInitialized),
            error_code(&Error::UnsupportedFormat {
                role: Role::Source,
                format: 0xa00,
            }),
        ];
        for code in codes {
            assert!(code <= RESIZE_RGA_ERR_DRIVER, "{code} overlaps driver statuses");
        }
    }

    #[test]
    fn bad_arguments_are_rejected_before_loading_driver() {
        let mut dst = vec![0u8; 4 * 4 * 4];
        let dst_va = dst.as_mut_ptr().cast();
        let bgra = PixelFormat::Bgra8888.to_raw();

        let ret = resize_rga(null_mut(), 8, 8, bgra, dst_va, 4, 4, bgra);
        assert_eq!(ret, RESIZE_RGA_ERR_NULL_POINTER);

        let ret = resize_rga(dst_va, 4, 4, 0xa00, dst_va, 4, 4, bgra);
        assert_eq!(ret, RESIZE_RGA_ERR_UNSUPPORTED_FORMAT);

        let ret = resize_rga(dst_va, -4, 4, bgra, dst_va, 4, 4, bgra);
        assert_eq!(ret, RESIZE_RGA_ERR_INVALID_DIMENSIONS);
    }

    #[test]
    fn session_entry_points_without_init() {
        resize_rga_deinit();
        assert_eq!(resize_rga_frame(), RESIZE_RGA_ERR_NOT_INITIALIZED);
        resize_rga_deinit();
    }

    #[test]
    fn repeated_init_keeps_first_pair() {
        let driver = CountingDriver::default();
        let (src, mut dst) = (vec![0u8; 8 * 8 * 4], vec![0u8; 4 * 4 * 4]);
        let bgra = PixelFormat::Bgra8888;
        let mut slot = None;

        init_session(
            &mut slot,
            || Ok(&driver),
            || {
                let src = Surface::new(&src, 8, 8, bgra);
                Ok((src, Surface::new_mut(&mut dst, 4, 4, bgra)))
            },
        )
        .unwrap();
        assert_eq!(driver.imports.get(), 2);

        // arguments of a second init are ignored, even invalid ones
        init_session(
            &mut slot,
            || panic!("driver loaded twice"),
            || Err(Error::NullPointer(Role::Source)),
        )
        .unwrap();
        assert_eq!(driver.imports.get(), 2);

        let session = slot.as_mut().unwrap();
        session.frame().unwrap();
        let (s, d) = session.buffers().unwrap();
        assert_eq!((s.width, d.width), (8, 4));

        drop(slot);
        assert_eq!(driver.releases.get(), 2);
    }

    #[test]
    fn failed_init_leaves_slot_empty() {
        let driver = CountingDriver::default();
        let src = vec![0u8; 8 * 8 * 4];
        let bgra = PixelFormat::Bgra8888;
        let mut short = vec![0u8; 4];
        let mut slot = None;

        let err = init_session(
            &mut slot,
            || Ok(&driver),
            || {
                let src = Surface::new(&src, 8, 8, bgra);
                Ok((src, Surface::new_mut(&mut short, 4, 4, bgra)))
            },
        )
        .unwrap_err();
        assert_eq!(error_code(&err), RESIZE_RGA_ERR_INVALID_DIMENSIONS);
        assert!(slot.is_none());
        assert_eq!(driver.imports.get(), 0);
    }

    #[test]
    fn strerror_describes_codes() {
        let msg = |code| unsafe { CStr::from_ptr(resize_rga_strerror(code)) };
        assert_eq!(msg(RESIZE_RGA_ERR_IMPORT).to_str(), Ok("buffer import failed"));
        assert_eq!(msg(-3).to_str(), Ok("driver: invalid parameter"));
        assert_eq!(msg(12345).to_str(), Ok("unknown error"));
    }
}
