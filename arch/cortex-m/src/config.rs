// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! Compile-time configuration options for the Cortex-M drivers.
//!
//! Cargo features are mirrored into the typed [`CONFIG`] object, so code
//! tests `CONFIG.trace_register_writes` instead of `cfg!` at each use site.

/// Data structure holding compile-time configuration options.
pub(crate) struct Config {
    /// Whether every register write performed by a driver is reported through
    /// `log::trace!`.
    pub(crate) trace_register_writes: bool,

    /// Number of priority bits implemented per 8-bit priority slot.
    ///
    /// Priorities live in the top bits of each slot, so with 3 bits the field
    /// occupies bits 5..=7 and priorities range over 0..=7.
    pub(crate) priority_bits: usize,
}

/// A unique instance of `Config` where compile-time configuration options are
/// defined.
pub(crate) const CONFIG: Config = Config {
    trace_register_writes: cfg!(feature = "trace_register_writes"),
    priority_bits: 3,
};
