// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

//! # RGA Resize
//!
//! A thin, safe layer over the Rockchip RGA 2D accelerator for scaling
//! packed RGB images in hardware. The heavy lifting happens in the vendor
//! driver (`librga`); this crate owns buffer validation, the lifetime of the
//! driver's buffer registrations, and error translation.
//!
//! ## Features
//!
//! - **One-shot resize**: register both buffers, check, resize, release.
//! - **Sessions**: register a fixed source/destination pair once and resize
//!   any number of frames through it.
//! - **Scoped handles**: every driver registration is released exactly once,
//!   on success and on every failure path.
//! - **C surface**: `resize_rga`, `resize_rga_init`, `resize_rga_frame` and
//!   `resize_rga_deinit` for existing C callers (see `include/rga_resize.h`).
//!
//! ## Example
//!
//! ```no_run
//! use rga_resize::{
//!     driver::Rga,
//!     image::{PixelFormat, Surface},
//!     resize::ResizeSession,
//! };
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let rga = Rga::new()?;
//! let src = vec![0u8; 640 * 480 * 4];
//! let mut dst = vec![0u8; 320 * 240 * 4];
//!
//! let mut session = ResizeSession::new(&rga);
//! session.init(
//!     Surface::new(&src, 640, 480, PixelFormat::Bgra8888),
//!     Surface::new_mut(&mut dst, 320, 240, PixelFormat::Bgra8888),
//! )?;
//! for _ in 0..100 {
//!     session.frame()?;
//! }
//! session.deinit();
//! # Ok(())
//! # }
//! ```
//!
//! ## Platform Requirements
//!
//! - Rockchip SoC with an RGA2 or RGA3 core (RK3566, RK3568, RK3588, ...)
//! - `librga` installed; it is loaded at runtime.
//!
//! ## Safety
//!
//! FFI calls are confined to [`driver::Rga`] and the [`ffi`] module. The safe
//! API borrows caller memory for as long as the driver holds a registration.

pub mod buffer;
pub mod driver;
pub mod error;
pub mod ffi;
pub mod image;
pub mod resize;

pub use error::{Error, Result};
