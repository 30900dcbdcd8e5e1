// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! Peripheral implementation for the TI TM4C123GH6PM.
//!
//! Board setup creates the memory-mapped register file once and builds the
//! chip from it:
//!
//! ```rust,ignore
//! let registers = unsafe { tm4c123x::scs::Tm4c123RegisterFile::new() };
//! let chip = tm4c123x::chip::Tm4c123::new(&registers);
//! chip.nvic.enable_irq(tm4c123x::interrupts::UART0)?;
//! ```

#![crate_name = "tm4c123x"]
#![crate_type = "rlib"]
#![no_std]

pub mod chip;
pub mod interrupts;
pub mod scs;

mod static_ref;
