// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! In-memory register file for exercising the drivers without hardware.
//!
//! Plain registers behave as ordinary memory. The SysTick registers model the
//! parts of the hardware the drivers depend on:
//!
//! - `COUNTFLAG` is read-only to software, is cleared when the control
//!   register is read, and is cleared by any write to the current value
//!   register.
//! - Any write to the current value register sets it to zero.
//! - The counter "expires" after a programmable number of control register
//!   reads with `ENABLE` set, see [`FakeRegisterFile::expire_after`].
//!
//! [`FakeRegisterFile::peek`] and [`FakeRegisterFile::poke`] bypass all of the
//! above so tests can inspect and seed state.

use core::cell::Cell;

use tock_registers::interfaces::{Readable, Writeable};
use tock_registers::registers::InMemoryRegister;

use crate::registers::{ControlAndStatus, RegisterFile, RegisterId};

/// Enable banks on the largest ARMv7-M NVIC.
pub const ENABLE_BANKS: usize = 16;

/// Priority registers on the largest ARMv7-M NVIC.
pub const PRIORITY_REGISTERS: usize = 124;

const SYSTEM_PRIORITY_REGISTERS: usize = 3;

const COUNTFLAG: u32 = 1 << 16;

pub struct FakeRegisterFile {
    irq_enable: [InMemoryRegister<u32>; ENABLE_BANKS],
    irq_priority: [InMemoryRegister<u32>; PRIORITY_REGISTERS],
    system_priority: [InMemoryRegister<u32>; SYSTEM_PRIORITY_REGISTERS],
    system_handler_control: InMemoryRegister<u32>,
    systick_control: InMemoryRegister<u32>,
    systick_reload: InMemoryRegister<u32>,
    systick_current: InMemoryRegister<u32>,

    /// Enabled control reads left before the counter wraps, if armed.
    expires_in: Cell<Option<usize>>,
    control_reads: Cell<usize>,
    writes: Cell<usize>,
}

impl FakeRegisterFile {
    /// Create a register file with every register zeroed.
    pub fn new() -> FakeRegisterFile {
        FakeRegisterFile {
            irq_enable: core::array::from_fn(|_| InMemoryRegister::new(0)),
            irq_priority: core::array::from_fn(|_| InMemoryRegister::new(0)),
            system_priority: core::array::from_fn(|_| InMemoryRegister::new(0)),
            system_handler_control: InMemoryRegister::new(0),
            systick_control: InMemoryRegister::new(0),
            systick_reload: InMemoryRegister::new(0),
            systick_current: InMemoryRegister::new(0),
            expires_in: Cell::new(None),
            control_reads: Cell::new(0),
            writes: Cell::new(0),
        }
    }

    /// Make the counter wrap once `reads` more control register reads have
    /// happened while the counter is enabled. The read after that observes
    /// `COUNTFLAG`.
    pub fn expire_after(&self, reads: usize) {
        self.expires_in.set(Some(reads));
    }

    /// Number of reads of the SysTick control register so far.
    pub fn control_reads(&self) -> usize {
        self.control_reads.get()
    }

    /// Number of writes made through [`RegisterFile::set`] so far.
    pub fn writes(&self) -> usize {
        self.writes.get()
    }

    /// Read a register without side effects.
    pub fn peek(&self, id: RegisterId) -> u32 {
        self.register(id).get()
    }

    /// Write a register without side effects and without counting the write.
    pub fn poke(&self, id: RegisterId, value: u32) {
        self.register(id).set(value);
    }

    /// # Panics
    ///
    /// Panics if `id` names a bank or register number beyond the largest
    /// ARMv7-M NVIC.
    fn register(&self, id: RegisterId) -> &InMemoryRegister<u32> {
        match id {
            RegisterId::IrqEnable(bank) => &self.irq_enable[bank],
            RegisterId::IrqPriority(n) => &self.irq_priority[n],
            RegisterId::SystemPriority(n) => &self.system_priority[n - 1],
            RegisterId::SystemHandlerControl => &self.system_handler_control,
            RegisterId::SysTickControl => &self.systick_control,
            RegisterId::SysTickReload => &self.systick_reload,
            RegisterId::SysTickCurrent => &self.systick_current,
        }
    }

    fn read_control(&self) -> u32 {
        self.control_reads.set(self.control_reads.get() + 1);

        let control = &self.systick_control;
        if ControlAndStatus::ENABLE.is_set(control.get()) {
            match self.expires_in.get() {
                Some(0) => {
                    self.expires_in.set(None);
                    control.set(control.get() | COUNTFLAG);
                }
                Some(n) => self.expires_in.set(Some(n - 1)),
                None => {}
            }
        }

        let value = control.get();
        control.set(value & !COUNTFLAG);
        value
    }
}

impl RegisterFile for FakeRegisterFile {
    fn get(&self, id: RegisterId) -> u32 {
        match id {
            RegisterId::SysTickControl => self.read_control(),
            _ => self.register(id).get(),
        }
    }

    fn set(&self, id: RegisterId, value: u32) {
        self.writes.set(self.writes.get() + 1);
        match id {
            RegisterId::SysTickControl => {
                let flag = self.systick_control.get() & COUNTFLAG;
                self.systick_control.set((value & !COUNTFLAG) | flag);
            }
            RegisterId::SysTickCurrent => {
                self.systick_current.set(0);
                self.systick_control
                    .set(self.systick_control.get() & !COUNTFLAG);
            }
            _ => self.register(id).set(value),
        }
    }
}
