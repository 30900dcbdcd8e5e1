// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! Generic support for Cortex-M interrupt control and the SysTick timer.
//!
//! The drivers in this crate never access memory-mapped registers directly.
//! They operate on a [`registers::RegisterFile`], which a chip crate
//! implements over MMIO and tests implement with `fake::FakeRegisterFile`
//! (enabled by the `fake` feature).
//!
//! - [`nvic::Nvic`] enables and prioritizes interrupts and system exceptions.
//! - [`systick::SysTick`] runs periodic callbacks and busy-wait delays.
//! - [`support`] masks interrupts and faults globally.

#![crate_name = "cortexm"]
#![crate_type = "rlib"]
#![no_std]

mod config;

pub mod errorcode;
#[cfg(any(test, feature = "fake"))]
pub mod fake;
pub mod nvic;
pub mod registers;
pub mod scb;
pub mod support;
pub mod systick;

pub use crate::errorcode::ErrorCode;
