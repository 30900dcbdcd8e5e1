// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! ARM Cortex-M SysTick peripheral.
//!
//! A 24-bit down counter clocked from the core clock. The driver supports two
//! modes:
//!
//! - periodic: [`SysTick::init`] arms the counter with interrupt generation,
//!   and the chip's SysTick handler calls [`SysTick::dispatch`], which invokes
//!   the registered [`SysTickClient`];
//! - polled: [`SysTick::busy_wait`] reprograms the counter without interrupt
//!   generation and spins on `COUNTFLAG`.
//!
//! Both modes share the one hardware counter, so a busy-wait ends any
//! periodic session. Call `init` again to resume periodic ticks.
//!
//! Documented in the Cortex-M4 Devices Generic User Guide, Chapter 4.4.

use core::cell::Cell;

use crate::errorcode::ErrorCode;
use crate::registers::{
    ControlAndStatus, CurrentValue, RegisterFile, ReloadValue, SYSTICK_CONTROL, SYSTICK_CURRENT,
    SYSTICK_RELOAD,
};
use crate::support;

/// Largest value the 24-bit reload register holds.
pub const MAX_RELOAD: u32 = 0x00ff_ffff;

/// Receives SysTick expirations.
///
/// `tick` runs in interrupt context. It must be short and must not call
/// [`SysTick::busy_wait`], which would reprogram the timer and spin with the
/// SysTick exception active.
pub trait SysTickClient {
    fn tick(&self);
}

impl<F: Fn()> SysTickClient for F {
    fn tick(&self) {
        self()
    }
}

/// Timer state, as read back from the control and reload registers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimerState {
    /// Never configured, or reset with [`SysTick::deinit`].
    Uninitialized,
    /// Configured but not counting.
    Stopped,
    /// Counting with interrupt generation.
    Running,
    /// Counting without interrupt generation, as left by
    /// [`SysTick::busy_wait`].
    Polling,
}

pub struct SysTick<'a, F: RegisterFile> {
    registers: &'a F,
    ticks_per_ms: u32,
    client: Cell<Option<&'a dyn SysTickClient>>,
}

impl<'a, F: RegisterFile> SysTick<'a, F> {
    /// Create a driver for a SysTick clocked at `clock_hz`.
    ///
    /// The counter is always run from the core clock, so this is the core
    /// clock frequency.
    pub const fn new(registers: &'a F, clock_hz: u32) -> SysTick<'a, F> {
        SysTick {
            registers,
            ticks_per_ms: clock_hz / 1000,
            client: Cell::new(None),
        }
    }

    pub fn ticks_per_ms(&self) -> u32 {
        self.ticks_per_ms
    }

    /// Reload value for a period of `duration_ms` milliseconds,
    /// `ticks_per_ms * duration_ms - 1`.
    ///
    /// Returns `INVAL` for a zero-length period and `SIZE` for a period that
    /// does not fit the 24-bit reload register.
    pub fn reload_value(&self, duration_ms: u32) -> Result<u32, ErrorCode> {
        let ticks = self
            .ticks_per_ms
            .checked_mul(duration_ms)
            .ok_or(ErrorCode::SIZE)?;
        match ticks.checked_sub(1) {
            // A reload of zero never fires.
            None | Some(0) => Err(ErrorCode::INVAL),
            Some(reload) if reload > MAX_RELOAD => Err(ErrorCode::SIZE),
            Some(reload) => Ok(reload),
        }
    }

    /// Configure a `duration_ms` period and start counting with interrupt
    /// generation.
    ///
    /// On error no register is modified.
    pub fn init(&self, duration_ms: u32) -> Result<(), ErrorCode> {
        let reload = self.reload_value(duration_ms)?;
        self.configure(reload, true);
        log::debug!("systick: {}ms period, reload {}", duration_ms, reload);
        Ok(())
    }

    /// Resume counting. Reload and current values are left as they are.
    ///
    /// Returns `OFF` if the timer has not been configured.
    pub fn start(&self) -> Result<(), ErrorCode> {
        if self.state() == TimerState::Uninitialized {
            return Err(ErrorCode::OFF);
        }
        self.registers
            .modify(SYSTICK_CONTROL, ControlAndStatus::ENABLE::SET);
        Ok(())
    }

    /// Stop counting. The counter keeps its current and reload values.
    pub fn stop(&self) {
        self.registers
            .modify(SYSTICK_CONTROL, ControlAndStatus::ENABLE::CLEAR);
    }

    /// Replace the client invoked by [`SysTick::dispatch`], or clear it with
    /// `None`.
    ///
    /// The slot is written with interrupts masked so the SysTick handler
    /// never observes a partially written client.
    pub fn set_callback(&self, client: Option<&'a dyn SysTickClient>) {
        support::atomic(|| self.client.set(client));
    }

    pub fn has_client(&self) -> bool {
        self.client.get().is_some()
    }

    /// SysTick exception entry point.
    ///
    /// Call from the chip's SysTick handler. Invokes the registered client
    /// once, or does nothing if there is none.
    pub fn dispatch(&self) {
        if let Some(client) = self.client.get() {
            client.tick();
        }
    }

    /// Block for `delay_ms` milliseconds by polling `COUNTFLAG`.
    ///
    /// Reprograms the counter without interrupt generation, which ends any
    /// periodic session; the timer is left in [`TimerState::Polling`]. There
    /// is no timeout. Do not call from a SysTick client.
    pub fn busy_wait(&self, delay_ms: u32) -> Result<(), ErrorCode> {
        let reload = self.reload_value(delay_ms)?;
        self.configure(reload, false);

        while !self
            .registers
            .is_set(SYSTICK_CONTROL, ControlAndStatus::COUNTFLAG)
        {
            core::hint::spin_loop();
        }
        Ok(())
    }

    /// Disable the counter and clear the reload and current values.
    pub fn deinit(&self) {
        self.registers
            .write(SYSTICK_CONTROL, ControlAndStatus::ENABLE::CLEAR);
        self.registers
            .write(SYSTICK_RELOAD, ReloadValue::RELOAD.val(0));
        self.registers
            .write(SYSTICK_CURRENT, CurrentValue::CURRENT.val(0));
    }

    pub fn state(&self) -> TimerState {
        let control = self.registers.extract(SYSTICK_CONTROL);
        if control.is_set(ControlAndStatus::ENABLE) {
            if control.is_set(ControlAndStatus::TICKINT) {
                TimerState::Running
            } else {
                TimerState::Polling
            }
        } else if self.registers.read(SYSTICK_RELOAD, ReloadValue::RELOAD) == 0 {
            TimerState::Uninitialized
        } else {
            TimerState::Stopped
        }
    }

    fn configure(&self, reload: u32, with_interrupt: bool) {
        self.registers
            .write(SYSTICK_CONTROL, ControlAndStatus::ENABLE::CLEAR);

        // n.b.: 4.4.5 'hints and tips' suggests setting reload before value
        self.registers
            .write(SYSTICK_RELOAD, ReloadValue::RELOAD.val(reload));
        // Any write clears the counter and COUNTFLAG.
        self.registers
            .write(SYSTICK_CURRENT, CurrentValue::CURRENT.val(0));

        let control = ControlAndStatus::CLKSOURCE::SET + ControlAndStatus::ENABLE::SET;
        if with_interrupt {
            self.registers
                .write(SYSTICK_CONTROL, control + ControlAndStatus::TICKINT::SET);
        } else {
            self.registers.write(SYSTICK_CONTROL, control);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake::FakeRegisterFile;
    use crate::registers::RegisterId;

    const CLOCK_HZ: u32 = 16_000_000;
    const COUNTFLAG: u32 = 1 << 16;

    #[test]
    fn reload_value_conversion() {
        let fake = FakeRegisterFile::new();
        let systick = SysTick::new(&fake, CLOCK_HZ);

        assert_eq!(systick.ticks_per_ms(), 16_000);
        assert_eq!(systick.reload_value(1), Ok(15_999));
        assert_eq!(systick.reload_value(10), Ok(159_999));
        assert_eq!(systick.reload_value(1048), Ok(16_767_999));
        assert_eq!(systick.reload_value(1049), Err(ErrorCode::SIZE));
        assert_eq!(systick.reload_value(u32::MAX), Err(ErrorCode::SIZE));
        assert_eq!(systick.reload_value(0), Err(ErrorCode::INVAL));
    }

    #[test]
    fn init_configures_periodic_interrupt() {
        let fake = FakeRegisterFile::new();
        let systick = SysTick::new(&fake, CLOCK_HZ);
        fake.poke(RegisterId::SysTickCurrent, 4242);

        systick.init(10).unwrap();

        assert_eq!(fake.peek(RegisterId::SysTickReload), 159_999);
        assert_eq!(fake.peek(RegisterId::SysTickCurrent), 0);
        assert_eq!(fake.peek(RegisterId::SysTickControl), 0b111);
        assert_eq!(systick.state(), TimerState::Running);
    }

    #[test]
    fn init_rejects_bad_durations() {
        let fake = FakeRegisterFile::new();
        let systick = SysTick::new(&fake, CLOCK_HZ);

        assert_eq!(systick.init(0), Err(ErrorCode::INVAL));
        assert_eq!(systick.init(2000), Err(ErrorCode::SIZE));
        assert_eq!(fake.writes(), 0);
        assert_eq!(systick.state(), TimerState::Uninitialized);
    }

    #[test]
    fn stop_then_start_keeps_reload() {
        let fake = FakeRegisterFile::new();
        let systick = SysTick::new(&fake, CLOCK_HZ);
        systick.init(10).unwrap();

        systick.stop();
        systick.stop();
        assert_eq!(fake.peek(RegisterId::SysTickControl), 0b110);
        assert_eq!(fake.peek(RegisterId::SysTickReload), 159_999);
        assert_eq!(systick.state(), TimerState::Stopped);

        systick.start().unwrap();
        systick.start().unwrap();
        assert_eq!(fake.peek(RegisterId::SysTickControl), 0b111);
        assert_eq!(fake.peek(RegisterId::SysTickReload), 159_999);
        assert_eq!(systick.state(), TimerState::Running);
    }

    #[test]
    fn stop_keeps_current_value() {
        let fake = FakeRegisterFile::new();
        let systick = SysTick::new(&fake, CLOCK_HZ);
        systick.init(10).unwrap();
        fake.poke(RegisterId::SysTickCurrent, 1000);

        systick.stop();

        assert_eq!(fake.peek(RegisterId::SysTickCurrent), 1000);
    }

    #[test]
    fn start_requires_configuration() {
        let fake = FakeRegisterFile::new();
        let systick = SysTick::new(&fake, CLOCK_HZ);

        assert_eq!(systick.start(), Err(ErrorCode::OFF));
        assert_eq!(fake.peek(RegisterId::SysTickControl), 0);
    }

    #[test]
    fn dispatch_without_client_does_nothing() {
        let fake = FakeRegisterFile::new();
        let systick = SysTick::new(&fake, CLOCK_HZ);
        systick.init(10).unwrap();
        let writes = fake.writes();

        systick.dispatch();
        systick.dispatch();

        assert!(!systick.has_client());
        assert_eq!(fake.writes(), writes);
        assert_eq!(fake.peek(RegisterId::SysTickControl), 0b111);
    }

    #[test]
    fn dispatch_invokes_client_once_per_call() {
        let fake = FakeRegisterFile::new();
        let ticks = Cell::new(0);
        let client = || ticks.set(ticks.get() + 1);
        let systick = SysTick::new(&fake, CLOCK_HZ);

        systick.set_callback(Some(&client));
        assert!(systick.has_client());
        assert_eq!(ticks.get(), 0);

        systick.dispatch();
        assert_eq!(ticks.get(), 1);
        systick.dispatch();
        systick.dispatch();
        assert_eq!(ticks.get(), 3);
    }

    #[test]
    fn last_callback_wins() {
        let fake = FakeRegisterFile::new();
        let first = Cell::new(0);
        let second = Cell::new(0);
        let first_client = || first.set(first.get() + 1);
        let second_client = || second.set(second.get() + 1);
        let systick = SysTick::new(&fake, CLOCK_HZ);

        systick.set_callback(Some(&first_client));
        systick.set_callback(Some(&second_client));
        systick.dispatch();
        assert_eq!((first.get(), second.get()), (0, 1));

        systick.set_callback(None);
        systick.dispatch();
        assert!(!systick.has_client());
        assert_eq!((first.get(), second.get()), (0, 1));
    }

    #[test]
    fn busy_wait_returns_after_countflag() {
        let fake = FakeRegisterFile::new();
        let systick = SysTick::new(&fake, CLOCK_HZ);
        fake.expire_after(25);

        systick.busy_wait(5).unwrap();

        // 25 reads counting down, then the read that observes COUNTFLAG.
        assert_eq!(fake.control_reads(), 26);
        assert_eq!(fake.peek(RegisterId::SysTickReload), 79_999);
        assert_eq!(fake.peek(RegisterId::SysTickControl), 0b101);
        assert_eq!(systick.state(), TimerState::Polling);
    }

    #[test]
    fn busy_wait_ignores_stale_countflag() {
        let fake = FakeRegisterFile::new();
        let systick = SysTick::new(&fake, CLOCK_HZ);
        systick.init(10).unwrap();
        // A wrap from the periodic session that nobody has read yet.
        fake.poke(RegisterId::SysTickControl, COUNTFLAG | 0b111);
        fake.expire_after(3);

        systick.busy_wait(5).unwrap();

        assert_eq!(fake.control_reads(), 4);
        assert_eq!(fake.peek(RegisterId::SysTickControl) & COUNTFLAG, 0);
    }

    #[test]
    fn busy_wait_disables_interrupt_generation() {
        let fake = FakeRegisterFile::new();
        let ticks = Cell::new(0);
        let client = || ticks.set(ticks.get() + 1);
        let systick = SysTick::new(&fake, CLOCK_HZ);
        systick.set_callback(Some(&client));
        systick.init(10).unwrap();
        fake.expire_after(0);

        systick.busy_wait(1).unwrap();

        assert_eq!(fake.peek(RegisterId::SysTickControl) & 0b010, 0);
        assert_eq!(fake.peek(RegisterId::SysTickReload), 15_999);
        assert_eq!(ticks.get(), 0);
    }

    #[test]
    fn busy_wait_rejects_bad_durations() {
        let fake = FakeRegisterFile::new();
        let systick = SysTick::new(&fake, CLOCK_HZ);

        assert_eq!(systick.busy_wait(0), Err(ErrorCode::INVAL));
        assert_eq!(systick.busy_wait(5000), Err(ErrorCode::SIZE));
        assert_eq!(fake.writes(), 0);
    }

    #[test]
    fn deinit_zeroes_registers() {
        let fake = FakeRegisterFile::new();
        let systick = SysTick::new(&fake, CLOCK_HZ);

        systick.init(10).unwrap();
        fake.poke(RegisterId::SysTickCurrent, 77);
        systick.deinit();
        assert_eq!(fake.peek(RegisterId::SysTickControl), 0);
        assert_eq!(fake.peek(RegisterId::SysTickReload), 0);
        assert_eq!(fake.peek(RegisterId::SysTickCurrent), 0);
        assert_eq!(systick.state(), TimerState::Uninitialized);

        systick.init(3).unwrap();
        systick.stop();
        systick.deinit();
        assert_eq!(fake.peek(RegisterId::SysTickControl), 0);
        assert_eq!(fake.peek(RegisterId::SysTickReload), 0);
        assert_eq!(fake.peek(RegisterId::SysTickCurrent), 0);
        assert_eq!(systick.start(), Err(ErrorCode::OFF));
    }
}
