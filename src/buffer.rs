// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

use crate::{
    driver::{Driver, Handle, WrappedBuffer},
    error::{Error, Result, Role},
    image::Surface,
};
use std::marker::PhantomData;
use tracing::{debug, warn};

/// A buffer registered with the driver.
///
/// The registration is released when the `ImportedBuffer` is dropped, so
/// every exit path of a resize (success, failed check, failed resize, or a
/// failed import of the other buffer) releases exactly the handles it
/// obtained. The pixels stay borrowed for `'a`, the lifetime of the
/// registration.
pub struct ImportedBuffer<'a, D: Driver> {
    driver: &'a D,
    wrapped: WrappedBuffer,
    _pixels: PhantomData<Surface<'a>>,
}

impl<'a, D: Driver> ImportedBuffer<'a, D> {
    /// Validates `surface` and registers its pixels with `driver`.
    ///
    /// # Errors
    ///
    /// Returns a validation error for bad geometry or a short buffer, and
    /// [`Error::Import`] if the driver refuses the registration.
    pub fn import(driver: &'a D, surface: Surface<'a>, role: Role) -> Result<Self> {
        let size = surface.validate(role)?;

        // Surface::validate guarantees `size` bytes at the surface address,
        // borrowed for 'a, which outlives this registration.
        let handle = unsafe { driver.import_virtual(surface.as_ptr(), size) }
            .ok_or(Error::Import(role))?;
        debug!(
            "imported {} buffer {}x{} {} as handle {}",
            role,
            surface.width(),
            surface.height(),
            surface.format(),
            handle.get()
        );

        Ok(Self {
            driver,
            wrapped: WrappedBuffer {
                handle,
                width: surface.width(),
                height: surface.height(),
                format: surface.format(),
            },
            _pixels: PhantomData,
        })
    }

    pub fn handle(&self) -> Handle {
        self.wrapped.handle
    }

    pub fn wrapped(&self) -> &WrappedBuffer {
        &self.wrapped
    }
}

impl<D: Driver> Drop for ImportedBuffer<'_, D> {
    fn drop(&mut self) {
        let handle = self.handle();
        let status = self.driver.release(handle);
        if status.is_ok() {
            debug!("released handle {}", handle.get());
        } else {
            warn!("failed to release handle {}: {}", handle.get(), status);
        }
    }
}
