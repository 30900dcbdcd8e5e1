// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! System Control Space registers of the TM4C123GH6PM.
//!
//! Only the registers used by the NVIC and SysTick drivers are mapped: EN0-EN4,
//! DIS0-DIS4, PRI0-PRI34, SYSPRI1-3, SYSHNDCTRL, and the SysTick control,
//! reload, and current value registers.
//!
//! The drivers treat ENn as a plain read/write register. In hardware, writing
//! a 0 to ENn has no effect and interrupts are disabled through DISn, so writes
//! to an enable bank are split into a set-enable and a clear-enable write.
//!
//! TM4C123GH6PM datasheet, section 3.5 "System Control Block Registers":
//! <https://www.ti.com/lit/ds/symlink/tm4c123gh6pm.pdf>

use cortexm::registers::{
    ControlAndStatus, CurrentValue, InterruptEnable, InterruptPriority, RegisterFile, RegisterId,
    ReloadValue, SystemHandlerControlAndState, SystemHandlerPriority,
};
use tock_registers::interfaces::{Readable, Writeable};
use tock_registers::register_structs;
use tock_registers::registers::ReadWrite;

use crate::static_ref::StaticRef;

/// Interrupt enable banks, EN0-EN4.
pub const ENABLE_BANKS: usize = 5;

/// Interrupt priority registers, PRI0-PRI34.
pub const PRIORITY_REGISTERS: usize = 35;

register_structs! {
    NvicRegisters {
        /// Interrupt 0-138 Set Enable
        (0x000 => en: [ReadWrite<u32, InterruptEnable::Register>; ENABLE_BANKS]),

        (0x014 => _reserved0),

        /// Interrupt 0-138 Clear Enable
        (0x080 => dis: [ReadWrite<u32, InterruptEnable::Register>; ENABLE_BANKS]),

        (0x094 => _reserved1),

        /// Interrupt 0-138 Priority
        (0x300 => pri: [ReadWrite<u32, InterruptPriority::Register>; PRIORITY_REGISTERS]),

        (0x38c => @END),
    }
}

register_structs! {
    SystemHandlerRegisters {
        /// System Handler Priority 1-3
        (0x00 => syspri: [ReadWrite<u32, SystemHandlerPriority::Register>; 3]),

        /// System Handler Control and State
        (0x0c => syshndctrl: ReadWrite<u32, SystemHandlerControlAndState::Register>),

        (0x10 => @END),
    }
}

register_structs! {
    SysTickRegisters {
        /// SysTick Control and Status
        (0x0 => stctrl: ReadWrite<u32, ControlAndStatus::Register>),

        /// SysTick Reload Value
        (0x4 => streload: ReadWrite<u32, ReloadValue::Register>),

        /// SysTick Current Value
        (0x8 => stcurrent: ReadWrite<u32, CurrentValue::Register>),

        (0xc => @END),
    }
}

const NVIC_BASE: StaticRef<NvicRegisters> =
    unsafe { StaticRef::new(0xe000_e100 as *const NvicRegisters) };

const SYSTEM_HANDLER_BASE: StaticRef<SystemHandlerRegisters> =
    unsafe { StaticRef::new(0xe000_ed18 as *const SystemHandlerRegisters) };

const SYSTICK_BASE: StaticRef<SysTickRegisters> =
    unsafe { StaticRef::new(0xe000_e010 as *const SysTickRegisters) };

/// The memory-mapped register file.
pub struct Tm4c123RegisterFile {
    nvic: StaticRef<NvicRegisters>,
    system_handler: StaticRef<SystemHandlerRegisters>,
    systick: StaticRef<SysTickRegisters>,
}

impl Tm4c123RegisterFile {
    /// Marked unsafe because the register file aliases hardware state. Only
    /// chip or board setup code should create one, and only once.
    pub const unsafe fn new() -> Tm4c123RegisterFile {
        Tm4c123RegisterFile {
            nvic: NVIC_BASE,
            system_handler: SYSTEM_HANDLER_BASE,
            systick: SYSTICK_BASE,
        }
    }
}

impl RegisterFile for Tm4c123RegisterFile {
    /// # Panics
    ///
    /// Panics if `id` names an enable bank or priority register the chip does
    /// not implement. The drivers validate IRQ numbers before getting here.
    fn get(&self, id: RegisterId) -> u32 {
        match id {
            RegisterId::IrqEnable(bank) => self.nvic.en[bank].get(),
            RegisterId::IrqPriority(n) => self.nvic.pri[n].get(),
            RegisterId::SystemPriority(n) => self.system_handler.syspri[n - 1].get(),
            RegisterId::SystemHandlerControl => self.system_handler.syshndctrl.get(),
            RegisterId::SysTickControl => self.systick.stctrl.get(),
            RegisterId::SysTickReload => self.systick.streload.get(),
            RegisterId::SysTickCurrent => self.systick.stcurrent.get(),
        }
    }

    fn set(&self, id: RegisterId, value: u32) {
        match id {
            RegisterId::IrqEnable(bank) => {
                let (set, clear) = split_enable_write(self.nvic.en[bank].get(), value);
                self.nvic.en[bank].set(set);
                self.nvic.dis[bank].set(clear);
            }
            RegisterId::IrqPriority(n) => self.nvic.pri[n].set(value),
            RegisterId::SystemPriority(n) => self.system_handler.syspri[n - 1].set(value),
            RegisterId::SystemHandlerControl => self.system_handler.syshndctrl.set(value),
            RegisterId::SysTickControl => self.systick.stctrl.set(value),
            RegisterId::SysTickReload => self.systick.streload.set(value),
            RegisterId::SysTickCurrent => self.systick.stcurrent.set(value),
        }
    }
}

/// Turn a plain write of `value` to an enable bank currently reading
/// `enabled` into the bits to write to ENn and to DISn.
///
/// Zero bits are ignored by both registers, so unchanged lines are left out
/// of each write.
fn split_enable_write(enabled: u32, value: u32) -> (u32, u32) {
    (value & !enabled, enabled & !value)
}
