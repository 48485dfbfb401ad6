// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

use crate::driver::Status;
use std::fmt;

/// Which side of a resize a buffer belongs to.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Role {
    Source,
    Destination,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Role::Source => write!(f, "source"),
            Role::Destination => write!(f, "destination"),
        }
    }
}

/// The driver call that reported a failing status.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Operation {
    Check,
    Resize,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Operation::Check => write!(f, "imcheck"),
            Operation::Resize => write!(f, "imresize"),
        }
    }
}

/// Errors returned by the resize shim.
///
/// Failures detected by the shim itself are kept apart from statuses
/// reported by the driver, which only ever appear in [`Error::Driver`].
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to load RGA library {path}: {source}")]
    Library {
        path: String,
        #[source]
        source: libloading::Error,
    },

    #[error("RGA library {path} does not export {symbol}")]
    MissingSymbol { path: String, symbol: &'static str },

    #[error("{0} buffer address is null")]
    NullPointer(Role),

    #[error("{role} image has invalid dimensions {width}x{height}")]
    InvalidDimensions { role: Role, width: u32, height: u32 },

    #[error("{role} image has unsupported pixel format {format:#x}")]
    UnsupportedFormat { role: Role, format: i32 },

    #[error("{role} buffer holds {actual} bytes but {required} are required")]
    BufferTooSmall {
        role: Role,
        required: usize,
        actual: usize,
    },

    #[error("failed to import {0} buffer")]
    Import(Role),

    #[error("resize session is not initialized")]
    NotInitialized,

    #[error("{op} failed: {status}")]
    Driver { op: Operation, status: Status },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
