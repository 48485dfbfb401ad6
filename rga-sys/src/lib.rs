// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

//! Low-level bindings for the Rockchip RGA im2d API (`librga`).
//!
//! The library is loaded at runtime so binaries built against these bindings
//! still start on machines without the RGA driver installed.

#![allow(non_camel_case_types)]
#![allow(non_upper_case_globals)]
#![allow(clippy::missing_safety_doc)]

use libc::{c_char, c_int, c_void};
use std::ffi::{CStr, OsStr};

pub type rga_buffer_handle_t = u32;
pub type IM_STATUS = c_int;

pub const IM_STATUS_NOERROR: IM_STATUS = 2;
pub const IM_STATUS_SUCCESS: IM_STATUS = 1;
pub const IM_STATUS_FAILED: IM_STATUS = 0;
pub const IM_STATUS_NOT_SUPPORTED: IM_STATUS = -1;
pub const IM_STATUS_OUT_OF_MEMORY: IM_STATUS = -2;
pub const IM_STATUS_INVALID_PARAM: IM_STATUS = -3;
pub const IM_STATUS_ILLEGAL_PARAM: IM_STATUS = -4;
pub const IM_STATUS_ERROR_VERSION: IM_STATUS = -5;

pub const RK_FORMAT_RGBA_8888: c_int = 0x0 << 8;
pub const RK_FORMAT_RGBX_8888: c_int = 0x1 << 8;
pub const RK_FORMAT_RGB_888: c_int = 0x2 << 8;
pub const RK_FORMAT_BGRA_8888: c_int = 0x3 << 8;
pub const RK_FORMAT_BGR_888: c_int = 0x7 << 8;
pub const RK_FORMAT_BGRX_8888: c_int = 0x16 << 8;
pub const RK_FORMAT_UNKNOWN: c_int = 0x100 << 8;

pub const IM_INTERP_NEAREST: c_int = 0;
pub const IM_INTERP_LINEAR: c_int = 1;
pub const IM_INTERP_CUBIC: c_int = 2;

pub const IM_SYNC: c_int = 1 << 19;

pub const RGA_VENDOR: c_int = 0;
pub const RGA_VERSION: c_int = 1;
pub const RGA_MAX_INPUT: c_int = 2;
pub const RGA_MAX_OUTPUT: c_int = 3;
pub const RGA_BYTE_STRIDE: c_int = 4;
pub const RGA_SCALE_LIMIT: c_int = 5;
pub const RGA_INPUT_FORMAT: c_int = 6;
pub const RGA_OUTPUT_FORMAT: c_int = 7;
pub const RGA_FEATURE: c_int = 8;
pub const RGA_EXPECTED: c_int = 9;
pub const RGA_ALL: c_int = 10;

#[repr(C)]
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct im_rect {
    pub x: c_int,
    pub y: c_int,
    pub width: c_int,
    pub height: c_int,
}

#[repr(C)]
#[derive(Debug, Default, Copy, Clone)]
pub struct im_colorkey_range {
    pub max: c_int,
    pub min: c_int,
}

#[repr(C)]
#[derive(Debug, Default, Copy, Clone)]
pub struct im_nn_t {
    pub scale_r: c_int,
    pub scale_g: c_int,
    pub scale_b: c_int,
    pub offset_r: c_int,
    pub offset_g: c_int,
    pub offset_b: c_int,
}

#[repr(C)]
#[derive(Debug, Copy, Clone)]
pub struct rga_buffer_t {
    pub vir_addr: *mut c_void,
    pub phy_addr: *mut c_void,
    pub fd: c_int,
    pub width: c_int,
    pub height: c_int,
    pub wstride: c_int,
    pub hstride: c_int,
    pub format: c_int,
    pub color_space_mode: c_int,
    pub global_alpha: c_int,
    pub rd_mode: c_int,
    pub color: c_int,
    pub colorkey_range: im_colorkey_range,
    pub nn: im_nn_t,
    pub rop_code: c_int,
    pub handle: rga_buffer_handle_t,
}

impl Default for rga_buffer_t {
    fn default() -> Self {
        Self {
            vir_addr: std::ptr::null_mut(),
            phy_addr: std::ptr::null_mut(),
            fd: 0,
            width: 0,
            height: 0,
            wstride: 0,
            hstride: 0,
            format: RK_FORMAT_UNKNOWN,
            color_space_mode: 0,
            global_alpha: 0,
            rd_mode: 0,
            color: 0,
            colorkey_range: im_colorkey_range::default(),
            nn: im_nn_t::default(),
            rop_code: 0,
            handle: 0,
        }
    }
}

pub struct rga {
    __library: ::libloading::Library,
    pub importbuffer_virtualaddr: Result<
        unsafe extern "C" fn(va: *mut c_void, size: c_int) -> rga_buffer_handle_t,
        ::libloading::Error,
    >,
    pub releasebuffer_handle:
        Result<unsafe extern "C" fn(handle: rga_buffer_handle_t) -> IM_STATUS, ::libloading::Error>,
    pub wrapbuffer_handle_t: Result<
        unsafe extern "C" fn(
            handle: rga_buffer_handle_t,
            width: c_int,
            height: c_int,
            wstride: c_int,
            hstride: c_int,
            format: c_int,
        ) -> rga_buffer_t,
        ::libloading::Error,
    >,
    pub imcheck_t: Result<
        unsafe extern "C" fn(
            src: rga_buffer_t,
            dst: rga_buffer_t,
            pat: rga_buffer_t,
            src_rect: im_rect,
            dst_rect: im_rect,
            pat_rect: im_rect,
            mode_usage: c_int,
        ) -> IM_STATUS,
        ::libloading::Error,
    >,
    pub imresize_t: Result<
        unsafe extern "C" fn(
            src: rga_buffer_t,
            dst: rga_buffer_t,
            fx: f64,
            fy: f64,
            interpolation: c_int,
            sync: c_int,
        ) -> IM_STATUS,
        ::libloading::Error,
    >,
    pub querystring: Result<unsafe extern "C" fn(name: c_int) -> *const c_char, ::libloading::Error>,
    pub imStrError_t:
        Result<unsafe extern "C" fn(status: IM_STATUS) -> *const c_char, ::libloading::Error>,
}

impl rga {
    pub unsafe fn new<P>(path: P) -> Result<Self, ::libloading::Error>
    where
        P: AsRef<OsStr>,
    {
        let library = ::libloading::Library::new(path)?;
        Self::from_library(library)
    }

    pub unsafe fn from_library<L>(library: L) -> Result<Self, ::libloading::Error>
    where
        L: Into<::libloading::Library>,
    {
        let __library = library.into();
        let importbuffer_virtualaddr = __library.get(b"importbuffer_virtualaddr\0").map(|sym| *sym);
        let releasebuffer_handle = __library.get(b"releasebuffer_handle\0").map(|sym| *sym);
        let wrapbuffer_handle_t = __library.get(b"wrapbuffer_handle_t\0").map(|sym| *sym);
        let imcheck_t = __library.get(b"imcheck_t\0").map(|sym| *sym);
        let imresize_t = __library.get(b"imresize_t\0").map(|sym| *sym);
        let querystring = __library.get(b"querystring\0").map(|sym| *sym);
        let imStrError_t = __library.get(b"imStrError_t\0").map(|sym| *sym);
        Ok(rga {
            __library,
            importbuffer_virtualaddr,
            releasebuffer_handle,
            wrapbuffer_handle_t,
            imcheck_t,
            imresize_t,
            querystring,
            imStrError_t,
        })
    }

    pub unsafe fn importbuffer_virtualaddr(
        &self,
        va: *mut c_void,
        size: c_int,
    ) -> rga_buffer_handle_t {
        (self
            .importbuffer_virtualaddr
            .as_ref()
            .expect("Expected function, got error."))(va, size)
    }

    pub unsafe fn releasebuffer_handle(&self, handle: rga_buffer_handle_t) -> IM_STATUS {
        (self
            .releasebuffer_handle
            .as_ref()
            .expect("Expected function, got error."))(handle)
    }

    pub unsafe fn wrapbuffer_handle_t(
        &self,
        handle: rga_buffer_handle_t,
        width: c_int,
        height: c_int,
        wstride: c_int,
        hstride: c_int,
        format: c_int,
    ) -> rga_buffer_t {
        (self
            .wrapbuffer_handle_t
            .as_ref()
            .expect("Expected function, got error."))(
            handle, width, height, wstride, hstride, format,
        )
    }

    #[allow(clippy::too_many_arguments)]
    pub unsafe fn imcheck_t(
        &self,
        src: rga_buffer_t,
        dst: rga_buffer_t,
        pat: rga_buffer_t,
        src_rect: im_rect,
        dst_rect: im_rect,
        pat_rect: im_rect,
        mode_usage: c_int,
    ) -> IM_STATUS {
        (self.imcheck_t.as_ref().expect("Expected function, got error."))(
            src, dst, pat, src_rect, dst_rect, pat_rect, mode_usage,
        )
    }

    pub unsafe fn imresize_t(
        &self,
        src: rga_buffer_t,
        dst: rga_buffer_t,
        fx: f64,
        fy: f64,
        interpolation: c_int,
        sync: c_int,
    ) -> IM_STATUS {
        (self.imresize_t.as_ref().expect("Expected function, got error."))(
            src,
            dst,
            fx,
            fy,
            interpolation,
            sync,
        )
    }

    pub unsafe fn querystring(&self, name: c_int) -> *const c_char {
        (self.querystring.as_ref().expect("Expected function, got error."))(name)
    }

    pub unsafe fn imStrError_t(&self, status: IM_STATUS) -> *const c_char {
        (self.imStrError_t.as_ref().expect("Expected function, got error."))(status)
    }
}

/// Version of the RGA userspace API as reported by `querystring`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Version {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Queries the loaded library for its API version.
///
/// Returns `None` when the library does not export `querystring` or the
/// reported string cannot be parsed.
pub fn query_version(lib: &rga) -> Option<Version> {
    if lib.querystring.is_err() {
        return None;
    }
    let raw = unsafe { lib.querystring(RGA_VERSION) };
    if raw.is_null() {
        return None;
    }
    let text = unsafe { CStr::from_ptr(raw) }.to_string_lossy();
    parse_version(&text)
}

/// Extracts the API version from a `querystring(RGA_VERSION)` report such
/// as `RGA_api version       : v1.10.1_[0]`.
pub fn parse_version(text: &str) -> Option<Version> {
    let line = text
        .lines()
        .find(|l| l.contains("api version"))
        .or_else(|| text.lines().next())?;
    let value = line.split_once(':').map_or(line, |(_, v)| v).trim();
    let value = value.trim_start_matches(|c: char| !c.is_ascii_digit());
    let end = value
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(value.len());

    let mut parts = value[..end].split('.').map(|p| p.parse::<u32>());
    let major = parts.next()?.ok()?;
    let minor = parts.next().unwrap_or(Ok(0)).ok()?;
    let patch = parts.next().unwrap_or(Ok(0)).ok()?;
    Some(Version {
        major,
        minor,
        patch,
    })
}
