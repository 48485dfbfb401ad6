// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

#![allow(dead_code)]

use rga_resize::{
    driver::{Driver, Handle, Interpolation, Status, WrappedBuffer},
    image::Rect,
};
use std::{
    cell::{Cell, RefCell},
    collections::HashMap,
    ffi::c_void,
};

/// In-memory driver that records every registration.
///
/// The check mimics the hardware limits: each side at most `max_dimension`
/// pixels and at most 16x scaling in either direction.
pub struct MockDriver {
    max_dimension: u32,
    fail_import: Cell<Option<usize>>,
    check_status: Cell<Option<Status>>,
    resize_status: Cell<Status>,
    state: RefCell<State>,
}

#[derive(Default)]
struct State {
    next_handle: u32,
    live: HashMap<u32, usize>,
    import_calls: usize,
    import_sizes: Vec<usize>,
    releases: HashMap<u32, usize>,
    checks: usize,
    resizes: usize,
    last_interpolation: Option<Interpolation>,
}

impl Default for MockDriver {
    fn default() -> Self {
        Self::with_max_dimension(8192)
    }
}

impl MockDriver {
    pub fn with_max_dimension(max_dimension: u32) -> Self {
        Self {
            max_dimension,
            fail_import: Cell::new(None),
            check_status: Cell::new(None),
            resize_status: Cell::new(Status::SUCCESS),
            state: RefCell::new(State::default()),
        }
    }

    /// Makes the `nth` import call (counting from zero) fail.
    pub fn fail_import(&self, nth: usize) {
        self.fail_import.set(Some(nth));
    }

    /// Forces the check to report `status`.
    pub fn fail_check(&self, status: Status) {
        self.check_status.set(Some(status));
    }

    pub fn fail_resize(&self, status: Status) {
        self.resize_status.set(status);
    }

    pub fn live_handles(&self) -> usize {
        self.state.borrow().live.len()
    }

    pub fn import_calls(&self) -> usize {
        self.state.borrow().import_calls
    }

    pub fn import_sizes(&self) -> Vec<usize> {
        self.state.borrow().import_sizes.clone()
    }

    pub fn release_calls(&self) -> usize {
        self.state.borrow().releases.values().sum()
    }

    /// Largest number of times any single handle was released.
    pub fn max_releases_per_handle(&self) -> usize {
        self.state.borrow().releases.values().copied().max().unwrap_or(0)
    }

    pub fn checks(&self) -> usize {
        self.state.borrow().checks
    }

    pub fn resizes(&self) -> usize {
        self.state.borrow().resizes
    }

    pub fn last_interpolation(&self) -> Option<Interpolation> {
        self.state.borrow().last_interpolation
    }

    fn registered(&self, buf: &WrappedBuffer) -> bool {
        self.state.borrow().live.contains_key(&buf.handle.get())
    }
}

fn scale_ok(from: u32, to: u32) -> bool {
    to <= from.saturating_mul(16) && from <= to.saturating_mul(16)
}

impl Driver for MockDriver {
    unsafe fn import_virtual(&self, va: *mut c_void, size: usize) -> Option<Handle> {
        let mut state = self.state.borrow_mut();
        let call = state.import_calls;
        state.import_calls += 1;
        if va.is_null() || self.fail_import.get() == Some(call) {
            return None;
        }
        state.next_handle += 1;
        let raw = state.next_handle;
        state.live.insert(raw, size);
        state.import_sizes.push(size);
        Handle::new(raw)
    }

    fn release(&self, handle: Handle) -> Status {
        let mut state = self.state.borrow_mut();
        *state.releases.entry(handle.get()).or_default() += 1;
        match state.live.remove(&handle.get()) {
            Some(_) => Status::SUCCESS,
            None => Status::INVALID_PARAM,
        }
    }

    fn check(
        &self,
        src: &WrappedBuffer,
        dst: &WrappedBuffer,
        src_rect: Rect,
        dst_rect: Rect,
    ) -> Status {
        self.state.borrow_mut().checks += 1;
        if let Some(status) = self.check_status.get() {
            return status;
        }
        if !self.registered(src) || !self.registered(dst) {
            return Status::ILLEGAL_PARAM;
        }
        if src_rect != src.rect() || dst_rect != dst.rect() {
            return Status::INVALID_PARAM;
        }
        let max = self.max_dimension;
        if [src.width, src.height, dst.width, dst.height]
            .iter()
            .any(|&d| d > max)
        {
            return Status::INVALID_PARAM;
        }
        if !scale_ok(src.width, dst.width) || !scale_ok(src.height, dst.height) {
            return Status::NOT_SUPPORTED;
        }
        Status::NOERROR
    }

    fn resize(&self, src: &WrappedBuffer, dst: &WrappedBuffer, interp: Interpolation) -> Status {
        if !self.registered(src) || !self.registered(dst) {
            return Status::ILLEGAL_PARAM;
        }
        let mut state = self.state.borrow_mut();
        state.resizes += 1;
        state.last_interpolation = Some(interp);
        self.resize_status.get()
    }
}
