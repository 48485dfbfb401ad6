// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

use crate::{
    buffer::ImportedBuffer,
    driver::{Driver, Interpolation, WrappedBuffer},
    error::{Error, Operation, Result, Role},
    image::Surface,
};
use tracing::{debug, trace_span};

/// Resizes `src` into `dst` in hardware using linear interpolation.
///
/// Both buffers are registered with the driver for the duration of the call
/// and released before it returns, whatever the outcome.
///
/// # Errors
///
/// - Validation errors if either surface has zero or oversized dimensions
///   or a buffer shorter than its geometry requires.
/// - [`Error::Import`] if the driver refuses to register a buffer.
/// - [`Error::Driver`] with [`Operation::Check`] if the driver rejects the
///   buffer combination, or [`Operation::Resize`] if the resize fails.
pub fn resize<'a, D: Driver>(driver: &'a D, src: Surface<'a>, dst: Surface<'a>) -> Result<()> {
    resize_with(driver, src, dst, Interpolation::Linear)
}

/// Like [`resize`] with an explicit scaling filter.
pub fn resize_with<'a, D: Driver>(
    driver: &'a D,
    src: Surface<'a>,
    dst: Surface<'a>,
    interp: Interpolation,
) -> Result<()> {
    let (src, dst) = import_pair(driver, src, dst)?;
    run(driver, src.wrapped(), dst.wrapped(), interp)
}

fn import_pair<'a, D: Driver>(
    driver: &'a D,
    src: Surface<'a>,
    dst: Surface<'a>,
) -> Result<(ImportedBuffer<'a, D>, ImportedBuffer<'a, D>)> {
    // reject bad geometry before anything is registered
    src.validate(Role::Source)?;
    dst.validate(Role::Destination)?;

    let src = ImportedBuffer::import(driver, src, Role::Source)?;
    let dst = ImportedBuffer::import(driver, dst, Role::Destination)?;

    let (s, d) = (src.wrapped(), dst.wrapped());
    let status = driver.check(s, d, s.rect(), d.rect());
    if !status.is_ok() {
        debug!(
            "check rejected {}x{} {} -> {}x{} {}: {}",
            s.width, s.height, s.format, d.width, d.height, d.format, status
        );
        return Err(Error::Driver {
            op: Operation::Check,
            status,
        });
    }
    Ok((src, dst))
}

fn run<D: Driver>(
    driver: &D,
    src: &WrappedBuffer,
    dst: &WrappedBuffer,
    interp: Interpolation,
) -> Result<()> {
    let _span = trace_span!("rga_resize").entered();
    let status = driver.resize(src, dst, interp);
    if status.is_ok() {
        Ok(())
    } else {
        Err(Error::Driver {
            op: Operation::Resize,
            status,
        })
    }
}

enum State<'a, D: Driver> {
    Uninitialized,
    Initialized {
        src: ImportedBuffer<'a, D>,
        dst: ImportedBuffer<'a, D>,
    },
}

/// A source/destination pair registered once and resized repeatedly.
///
/// The session borrows both pixel buffers from [`ResizeSession::init`] until
/// it is dropped, so they cannot move or be freed while the driver holds
/// their registrations. Dropping an initialized session releases them.
///
/// ```text
/// Uninitialized --init--> Initialized --deinit--> Uninitialized
/// ```
///
/// # Example
///
/// ```no_run
/// use rga_resize::{driver::Rga, image::{Image, PixelFormat}, resize::ResizeSession};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let rga = Rga::new()?;
/// let src = Image::new(1920, 1080, PixelFormat::Bgra8888)?;
/// let mut dst = Image::new(960, 540, PixelFormat::Bgra8888)?;
///
/// let mut session = ResizeSession::new(&rga);
/// session.init(src.surface(), dst.surface_mut())?;
/// session.frame()?;
/// # Ok(())
/// # }
/// ```
pub struct ResizeSession<'a, D: Driver> {
    driver: &'a D,
    interpolation: Interpolation,
    state: State<'a, D>,
    frames: u64,
}

impl<'a, D: Driver> ResizeSession<'a, D> {
    pub fn new(driver: &'a D) -> Self {
        Self {
            driver,
            interpolation: Interpolation::Linear,
            state: State::Uninitialized,
            frames: 0,
        }
    }

    /// Sets the filter used by subsequent frames.
    pub fn with_interpolation(mut self, interp: Interpolation) -> Self {
        self.interpolation = interp;
        self
    }

    /// Registers and checks the buffer pair.
    ///
    /// Does nothing if the session is already initialized; call
    /// [`ResizeSession::deinit`] first to switch buffers. On failure the
    /// session stays uninitialized and nothing remains registered.
    pub fn init(&mut self, src: Surface<'a>, dst: Surface<'a>) -> Result<()> {
        if self.is_initialized() {
            debug!("resize session already initialized");
            return Ok(());
        }
        let (src, dst) = import_pair(self.driver, src, dst)?;
        self.state = State::Initialized { src, dst };
        self.frames = 0;
        debug!("resize session initialized");
        Ok(())
    }

    /// Resizes the current contents of the source into the destination.
    ///
    /// # Errors
    ///
    /// [`Error::NotInitialized`] before a successful `init`, or
    /// [`Error::Driver`] if the hardware resize fails.
    pub fn frame(&mut self) -> Result<()> {
        let State::Initialized { src, dst } = &self.state else {
            return Err(Error::NotInitialized);
        };
        run(self.driver, src.wrapped(), dst.wrapped(), self.interpolation)?;
        self.frames += 1;
        Ok(())
    }

    /// Releases both registrations. Does nothing if not initialized.
    pub fn deinit(&mut self) {
        if let State::Initialized { .. } =
            std::mem::replace(&mut self.state, State::Uninitialized)
        {
            debug!("resize session released after {} frames", self.frames);
        }
    }

    pub fn is_initialized(&self) -> bool {
        matches!(self.state, State::Initialized { .. })
    }

    /// Frames resized since the last successful `init`.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// The registered source and destination, when initialized.
    pub fn buffers(&self) -> Option<(&WrappedBuffer, &WrappedBuffer)> {
        match &self.state {
            State::Initialized { src, dst } => Some((src.wrapped(), dst.wrapped())),
            State::Uninitialized => None,
        }
    }
}
