// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! Peripheral bundle for the TM4C123GH6PM core peripherals.

use cortexm::nvic::Nvic;
use cortexm::registers::RegisterFile;
use cortexm::scb::ExceptionKind;
use cortexm::systick::{SysTick, SysTickClient};
use cortexm::ErrorCode;

use crate::scs::{Tm4c123RegisterFile, PRIORITY_REGISTERS};

/// Core clock after reset, from the 16 MHz precision internal oscillator.
pub const CORE_CLOCK_HZ: u32 = 16_000_000;

/// SysTick counts per millisecond at [`CORE_CLOCK_HZ`].
pub const TICKS_PER_MS: u32 = CORE_CLOCK_HZ / 1000;

/// Interrupt lines implemented by the NVIC, IRQ 0 to 138.
pub const NUM_IRQS: u32 = 139;

const _: () = assert!(NUM_IRQS as usize <= PRIORITY_REGISTERS * 4);

pub struct Tm4c123<'a, F: RegisterFile = Tm4c123RegisterFile> {
    pub nvic: Nvic<'a, F>,
    pub systick: SysTick<'a, F>,
}

impl<'a, F: RegisterFile> Tm4c123<'a, F> {
    pub const fn new(registers: &'a F) -> Tm4c123<'a, F> {
        Tm4c123 {
            nvic: Nvic::new(registers, NUM_IRQS),
            systick: SysTick::new(registers, CORE_CLOCK_HZ),
        }
    }

    /// Start the SysTick exception firing every `period_ms` milliseconds at
    /// `priority`, calling `client` from [`Tm4c123::handle_systick`].
    ///
    /// A period the counter cannot represent is rejected before any register
    /// or the client slot is touched.
    pub fn start_periodic_ticks(
        &self,
        period_ms: u32,
        priority: u8,
        client: &'a dyn SysTickClient,
    ) -> Result<(), ErrorCode> {
        let result = self.arm_systick(period_ms, priority, client);
        if let Err(error) = result {
            log::warn!(
                "tm4c123: {}ms systick period rejected: {:?}",
                period_ms,
                error
            );
        }
        result
    }

    /// Body of the SysTick exception handler.
    pub fn handle_systick(&self) {
        self.systick.dispatch();
    }

    fn arm_systick(
        &self,
        period_ms: u32,
        priority: u8,
        client: &'a dyn SysTickClient,
    ) -> Result<(), ErrorCode> {
        self.systick.reload_value(period_ms)?;
        self.nvic
            .set_exception_priority(ExceptionKind::SysTick, priority)?;
        self.systick.set_callback(Some(client));
        self.systick.init(period_ms)
    }
}
