// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! Register file abstraction shared by the NVIC and SysTick drivers.
//!
//! The drivers never touch memory-mapped addresses directly. Instead they go
//! through a [`RegisterFile`], which names each 32-bit control register with a
//! [`RegisterId`]. Chips provide an implementation backed by MMIO, and tests
//! use `crate::fake::FakeRegisterFile`.
//!
//! Field accesses are type checked: a [`Register`] handle carries the bitfield
//! layout of the register it names, so a SysTick field cannot be applied to a
//! priority register.
//!
//! Layouts follow the ARMv7-M System Control Space:
//! <https://developer.arm.com/documentation/dui0553/latest/>

use core::marker::PhantomData;

use tock_registers::fields::{Field, FieldValue};
use tock_registers::{register_bitfields, LocalRegisterCopy, RegisterLongName};

use crate::config::CONFIG;

/// Width of each priority slot inside a priority register.
const PRIORITY_SLOT_BITS: usize = 8;

/// Number of priority slots packed into one 32-bit priority register.
pub const PRIORITY_SLOTS_PER_REGISTER: usize = 4;

/// Number of interrupt lines covered by one enable register.
pub const IRQS_PER_ENABLE_BANK: u32 = 32;

register_bitfields![u32,
    pub InterruptEnable [
        /// Bit n enables interrupt (32 * bank + n).
        INT             OFFSET(0)   NUMBITS(32)
    ],

    /// Four 8-bit slots, only the top 3 bits of each slot are implemented.
    pub InterruptPriority [
        /// Priority of interrupt 4n+3.
        INTD            OFFSET(29)  NUMBITS(3),
        /// Priority of interrupt 4n+2.
        INTC            OFFSET(21)  NUMBITS(3),
        /// Priority of interrupt 4n+1.
        INTB            OFFSET(13)  NUMBITS(3),
        /// Priority of interrupt 4n.
        INTA            OFFSET(5)   NUMBITS(3)
    ],

    /// Shared by SYSPRI1-3. Slot n of SYSPRIm holds the priority of exception
    /// number 4 * m + n.
    pub SystemHandlerPriority [
        PRI_N3          OFFSET(29)  NUMBITS(3),
        PRI_N2          OFFSET(21)  NUMBITS(3),
        PRI_N1          OFFSET(13)  NUMBITS(3),
        PRI_N0          OFFSET(5)   NUMBITS(3)
    ],

    pub SystemHandlerControlAndState [
        USGFAULTENA     OFFSET(18)  NUMBITS(1),
        BUSFAULTENA     OFFSET(17)  NUMBITS(1),
        MEMFAULTENA     OFFSET(16)  NUMBITS(1)
    ],

    pub ControlAndStatus [
        /// Returns 1 if timer counted to 0 since last time this was read.
        COUNTFLAG 16,

        /// Clock source is (0) precision internal oscillator / 4 or
        /// (1) the core clock.
        CLKSOURCE 2,

        /// Set to 1 to enable SysTick exception request.
        TICKINT 1,

        /// Enable the counter (1 == Enabled).
        ENABLE 0
    ],

    pub ReloadValue [
        /// Value loaded into the current value register when the counter is
        /// enabled and reaches 0.
        RELOAD          OFFSET(0)   NUMBITS(24)
    ],

    pub CurrentValue [
        /// Reads current value. Write of any value sets to 0.
        CURRENT         OFFSET(0)   NUMBITS(24)
    ]
];

/// Identifies one 32-bit register in the register file.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RegisterId {
    /// Interrupt set-enable bank (EN0 for bank 0).
    IrqEnable(usize),
    /// Interrupt priority register n (PRIn).
    IrqPriority(usize),
    /// System handler priority register n, numbered 1 to 3 (SYSPRIn).
    SystemPriority(usize),
    /// System handler control and state (SYSHNDCTRL).
    SystemHandlerControl,
    /// SysTick control and status (STCTRL).
    SysTickControl,
    /// SysTick reload value (STRELOAD).
    SysTickReload,
    /// SysTick current value (STCURRENT).
    SysTickCurrent,
}

/// A [`RegisterId`] tagged with the bitfield layout of that register.
pub struct Register<R: RegisterLongName> {
    id: RegisterId,
    associated_register: PhantomData<R>,
}

impl<R: RegisterLongName> Register<R> {
    pub const fn new(id: RegisterId) -> Register<R> {
        Register {
            id,
            associated_register: PhantomData,
        }
    }

    pub const fn id(&self) -> RegisterId {
        self.id
    }
}

impl<R: RegisterLongName> Clone for Register<R> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<R: RegisterLongName> Copy for Register<R> {}

pub const SYSTEM_HANDLER_CONTROL: Register<SystemHandlerControlAndState::Register> =
    Register::new(RegisterId::SystemHandlerControl);
pub const SYSTICK_CONTROL: Register<ControlAndStatus::Register> =
    Register::new(RegisterId::SysTickControl);
pub const SYSTICK_RELOAD: Register<ReloadValue::Register> =
    Register::new(RegisterId::SysTickReload);
pub const SYSTICK_CURRENT: Register<CurrentValue::Register> =
    Register::new(RegisterId::SysTickCurrent);

pub const fn irq_enable(bank: usize) -> Register<InterruptEnable::Register> {
    Register::new(RegisterId::IrqEnable(bank))
}

pub const fn irq_priority(n: usize) -> Register<InterruptPriority::Register> {
    Register::new(RegisterId::IrqPriority(n))
}

/// `n` is the 1-based register number, as in SYSPRI1.
pub const fn system_priority(n: usize) -> Register<SystemHandlerPriority::Register> {
    Register::new(RegisterId::SystemPriority(n))
}

/// Locate the priority field for slot `index` in a bank of packed priority
/// registers.
///
/// Returns the register number (`index / 4`) and the field within it, which
/// sits in the top `priority_bits` of the slot's byte: offset
/// `(index % 4) * 8 + 5` for the 3-bit priorities of this core.
///
/// Interrupt priorities are indexed by IRQ number. System handler priorities
/// are indexed by exception number minus 4.
pub fn priority_field<R: RegisterLongName>(index: usize) -> (usize, Field<u32, R>) {
    let register = index / PRIORITY_SLOTS_PER_REGISTER;
    let shift = (index % PRIORITY_SLOTS_PER_REGISTER) * PRIORITY_SLOT_BITS
        + (PRIORITY_SLOT_BITS - CONFIG.priority_bits);
    let mask = (1u32 << CONFIG.priority_bits) - 1;
    (register, Field::<u32, R>::new(mask, shift))
}

/// Single-bit field for `irq` within its enable bank.
///
/// Returns the bank number and the field.
pub fn enable_field(irq: u32) -> (usize, Field<u32, InterruptEnable::Register>) {
    let bank = (irq / IRQS_PER_ENABLE_BANK) as usize;
    let bit = (irq % IRQS_PER_ENABLE_BANK) as usize;
    (bank, Field::<u32, InterruptEnable::Register>::new(1, bit))
}

/// Largest priority representable in a priority field.
pub fn max_priority() -> u8 {
    ((1u32 << CONFIG.priority_bits) - 1) as u8
}

/// Storage for the NVIC, system handler, and SysTick control registers.
///
/// Implementors supply raw 32-bit access. The provided methods layer typed
/// field access on top, in the style of the `tock-registers` interfaces.
///
/// All methods take `&self`: the register file is a shared resource that the
/// hardware itself mutates, so implementations use interior mutability.
pub trait RegisterFile {
    /// Read the raw value of a register.
    fn get(&self, id: RegisterId) -> u32;

    /// Write the raw value of a register.
    fn set(&self, id: RegisterId, value: u32);

    /// Read the value of a field.
    fn read<R: RegisterLongName>(&self, reg: Register<R>, field: Field<u32, R>) -> u32 {
        field.read(self.get(reg.id()))
    }

    /// Check whether any bit of a field is set.
    fn is_set<R: RegisterLongName>(&self, reg: Register<R>, field: Field<u32, R>) -> bool {
        field.is_set(self.get(reg.id()))
    }

    /// Read the whole register into a local copy for inspecting several
    /// fields from a single access.
    fn extract<R: RegisterLongName>(&self, reg: Register<R>) -> LocalRegisterCopy<u32, R> {
        LocalRegisterCopy::new(self.get(reg.id()))
    }

    /// Overwrite the register. Fields not named in `value` become zero.
    fn write<R: RegisterLongName>(&self, reg: Register<R>, value: FieldValue<u32, R>) {
        store(self, reg.id(), value.modify(0));
    }

    /// Read-modify-write, changing only the fields named in `value`.
    fn modify<R: RegisterLongName>(&self, reg: Register<R>, value: FieldValue<u32, R>) {
        let current = self.get(reg.id());
        store(self, reg.id(), value.modify(current));
    }
}

fn store<F: RegisterFile + ?Sized>(registers: &F, id: RegisterId, value: u32) {
    if CONFIG.trace_register_writes {
        log::trace!("{:?} <= {:#010x}", id, value);
    }
    registers.set(id, value);
}
