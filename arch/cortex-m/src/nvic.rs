// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! Cortex-M NVIC
//!
//! Enables, disables, and prioritizes peripheral interrupts, and configures
//! the priorities and enables of the system exceptions held in the SCB.
//!
//! Interrupt enables cover the first enable bank only (IRQ 0 to 31). Priority
//! registers pack four interrupts each, with 3 implemented priority bits at
//! the top of every 8-bit slot:
//! <https://developer.arm.com/docs/100165/0201/nested-vectored-interrupt-controller/nvic-programmers-model/table-of-nvic-registers>
//!
//! All operations are immediate read-modify-write transformations of the
//! register file and are idempotent. Invalid identifiers are reported as
//! errors and leave every register untouched.

use crate::errorcode::ErrorCode;
use crate::registers::{
    self, InterruptPriority, RegisterFile, SystemHandlerPriority, IRQS_PER_ENABLE_BANK,
    SYSTEM_HANDLER_CONTROL,
};
use crate::scb::ExceptionKind;

/// Interrupt controller driver over a register file.
///
/// Holds no state of its own. Create one per chip with the number of
/// interrupt lines the chip implements.
pub struct Nvic<'a, F: RegisterFile> {
    registers: &'a F,
    num_irqs: u32,
}

impl<'a, F: RegisterFile> Nvic<'a, F> {
    /// `num_irqs` bounds the IRQ numbers accepted by the priority
    /// operations. Enable operations are further limited to bank 0.
    pub const fn new(registers: &'a F, num_irqs: u32) -> Nvic<'a, F> {
        Nvic {
            registers,
            num_irqs,
        }
    }

    /// Enable the interrupt
    pub fn enable_irq(&self, irq: u32) -> Result<(), ErrorCode> {
        let (bank, field) = registers::enable_field(self.check_enable_line(irq)?);
        self.registers
            .modify(registers::irq_enable(bank), field.val(1));
        Ok(())
    }

    /// Disable the interrupt
    pub fn disable_irq(&self, irq: u32) -> Result<(), ErrorCode> {
        let (bank, field) = registers::enable_field(self.check_enable_line(irq)?);
        self.registers
            .modify(registers::irq_enable(bank), field.val(0));
        Ok(())
    }

    pub fn is_irq_enabled(&self, irq: u32) -> Result<bool, ErrorCode> {
        let (bank, field) = registers::enable_field(self.check_enable_line(irq)?);
        Ok(self.registers.is_set(registers::irq_enable(bank), field))
    }

    /// Set the priority of an interrupt. Only the low 3 bits of `priority`
    /// are kept, 0 being the most urgent.
    pub fn set_irq_priority(&self, irq: u32, priority: u8) -> Result<(), ErrorCode> {
        let irq = self.check_priority_line(irq)?;
        let (register, field) = registers::priority_field::<InterruptPriority::Register>(irq);
        self.registers.modify(
            registers::irq_priority(register),
            field.val(truncate_priority(priority)),
        );
        Ok(())
    }

    pub fn irq_priority(&self, irq: u32) -> Result<u8, ErrorCode> {
        let irq = self.check_priority_line(irq)?;
        let (register, field) = registers::priority_field::<InterruptPriority::Register>(irq);
        Ok(self
            .registers
            .read(registers::irq_priority(register), field) as u8)
    }

    /// Set the priority of a system exception.
    ///
    /// Reset, NMI, and HardFault have fixed priorities and return
    /// `NOSUPPORT`.
    pub fn set_exception_priority(
        &self,
        kind: ExceptionKind,
        priority: u8,
    ) -> Result<(), ErrorCode> {
        let (register, field) =
            registers::priority_field::<SystemHandlerPriority::Register>(kind.priority_index()?);
        // SYSPRI registers are numbered from 1.
        self.registers.modify(
            registers::system_priority(register + 1),
            field.val(truncate_priority(priority)),
        );
        Ok(())
    }

    pub fn exception_priority(&self, kind: ExceptionKind) -> Result<u8, ErrorCode> {
        let (register, field) =
            registers::priority_field::<SystemHandlerPriority::Register>(kind.priority_index()?);
        Ok(self
            .registers
            .read(registers::system_priority(register + 1), field) as u8)
    }

    /// Enable a MemManage, BusFault, or UsageFault exception. Other kinds
    /// cannot be masked and return `NOSUPPORT`.
    pub fn enable_exception(&self, kind: ExceptionKind) -> Result<(), ErrorCode> {
        let field = kind.enable_field().ok_or(ErrorCode::NOSUPPORT)?;
        self.registers.modify(SYSTEM_HANDLER_CONTROL, field.val(1));
        Ok(())
    }

    pub fn disable_exception(&self, kind: ExceptionKind) -> Result<(), ErrorCode> {
        let field = kind.enable_field().ok_or(ErrorCode::NOSUPPORT)?;
        self.registers.modify(SYSTEM_HANDLER_CONTROL, field.val(0));
        Ok(())
    }

    pub fn is_exception_enabled(&self, kind: ExceptionKind) -> Result<bool, ErrorCode> {
        let field = kind.enable_field().ok_or(ErrorCode::NOSUPPORT)?;
        Ok(self.registers.is_set(SYSTEM_HANDLER_CONTROL, field))
    }

    fn check_enable_line(&self, irq: u32) -> Result<u32, ErrorCode> {
        if irq < IRQS_PER_ENABLE_BANK && irq < self.num_irqs {
            Ok(irq)
        } else {
            log::warn!("nvic: irq {} outside enable bank 0", irq);
            Err(ErrorCode::INVAL)
        }
    }

    fn check_priority_line(&self, irq: u32) -> Result<usize, ErrorCode> {
        if irq < self.num_irqs {
            Ok(irq as usize)
        } else {
            log::warn!("nvic: irq {} has no priority register", irq);
            Err(ErrorCode::INVAL)
        }
    }
}

fn truncate_priority(priority: u8) -> u32 {
    let max = registers::max_priority();
    if priority > max {
        log::warn!(
            "nvic: priority {} truncated to {}",
            priority,
            priority & max
        );
    }
    u32::from(priority & max)
}
