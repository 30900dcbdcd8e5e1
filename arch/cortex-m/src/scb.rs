// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! ARM System Control Block exceptions.
//!
//! The SCB holds the priorities of the configurable system exceptions in
//! SYSPRI1-3 and the enable bits of the three maskable faults in SYSHNDCTRL.
//! <https://developer.arm.com/documentation/dui0553/latest/>

use tock_registers::fields::Field;

use crate::errorcode::ErrorCode;
use crate::registers::SystemHandlerControlAndState;

/// Exception number of the first exception with a priority in SYSPRI1.
const FIRST_SYSTEM_PRIORITY_EXCEPTION: u32 = 4;

/// Core system exceptions, as opposed to peripheral interrupts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExceptionKind {
    Reset,
    Nmi,
    HardFault,
    MemManage,
    BusFault,
    UsageFault,
    SVCall,
    DebugMonitor,
    PendSV,
    SysTick,
}

impl ExceptionKind {
    /// Architectural exception number (position in the vector table).
    pub const fn number(self) -> u32 {
        match self {
            ExceptionKind::Reset => 1,
            ExceptionKind::Nmi => 2,
            ExceptionKind::HardFault => 3,
            ExceptionKind::MemManage => 4,
            ExceptionKind::BusFault => 5,
            ExceptionKind::UsageFault => 6,
            ExceptionKind::SVCall => 11,
            ExceptionKind::DebugMonitor => 12,
            ExceptionKind::PendSV => 14,
            ExceptionKind::SysTick => 15,
        }
    }

    /// Reset, NMI, and HardFault have fixed priorities.
    pub const fn has_configurable_priority(self) -> bool {
        match self {
            ExceptionKind::Reset | ExceptionKind::Nmi | ExceptionKind::HardFault => false,
            _ => true,
        }
    }

    /// Whether SYSHNDCTRL has an enable bit for this exception.
    pub const fn is_maskable(self) -> bool {
        self.enable_field().is_some()
    }

    /// Slot of this exception's priority across SYSPRI1-3, counting from
    /// slot 0 of SYSPRI1.
    pub(crate) fn priority_index(self) -> Result<usize, ErrorCode> {
        if self.has_configurable_priority() {
            Ok((self.number() - FIRST_SYSTEM_PRIORITY_EXCEPTION) as usize)
        } else {
            Err(ErrorCode::NOSUPPORT)
        }
    }

    pub(crate) const fn enable_field(
        self,
    ) -> Option<Field<u32, SystemHandlerControlAndState::Register>> {
        match self {
            ExceptionKind::MemManage => Some(SystemHandlerControlAndState::MEMFAULTENA),
            ExceptionKind::BusFault => Some(SystemHandlerControlAndState::BUSFAULTENA),
            ExceptionKind::UsageFault => Some(SystemHandlerControlAndState::USGFAULTENA),
            _ => None,
        }
    }
}

/// Decode the compact exception type codes used by C board support code,
/// where 0 is Reset and 9 is SysTick.
impl TryFrom<u8> for ExceptionKind {
    type Error = ErrorCode;

    fn try_from(code: u8) -> Result<ExceptionKind, ErrorCode> {
        match code {
            0 => Ok(ExceptionKind::Reset),
            1 => Ok(ExceptionKind::Nmi),
            2 => Ok(ExceptionKind::HardFault),
            3 => Ok(ExceptionKind::MemManage),
            4 => Ok(ExceptionKind::BusFault),
            5 => Ok(ExceptionKind::UsageFault),
            6 => Ok(ExceptionKind::SVCall),
            7 => Ok(ExceptionKind::DebugMonitor),
            8 => Ok(ExceptionKind::PendSV),
            9 => Ok(ExceptionKind::SysTick),
            _ => Err(ErrorCode::INVAL),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn priority_indices_follow_exception_numbers() {
        assert_eq!(ExceptionKind::MemManage.priority_index(), Ok(0));
        assert_eq!(ExceptionKind::BusFault.priority_index(), Ok(1));
        assert_eq!(ExceptionKind::UsageFault.priority_index(), Ok(2));
        assert_eq!(ExceptionKind::SVCall.priority_index(), Ok(7));
        assert_eq!(ExceptionKind::DebugMonitor.priority_index(), Ok(8));
        assert_eq!(ExceptionKind::PendSV.priority_index(), Ok(10));
        assert_eq!(ExceptionKind::SysTick.priority_index(), Ok(11));
    }

    #[test]
    fn fixed_priority_exceptions() {
        for kind in [
            ExceptionKind::Reset,
            ExceptionKind::Nmi,
            ExceptionKind::HardFault,
        ] {
            assert!(!kind.has_configurable_priority());
            assert_eq!(kind.priority_index(), Err(ErrorCode::NOSUPPORT));
        }
    }

    #[test]
    fn only_faults_are_maskable() {
        assert!(ExceptionKind::MemManage.is_maskable());
        assert!(ExceptionKind::BusFault.is_maskable());
        assert!(ExceptionKind::UsageFault.is_maskable());
        assert!(!ExceptionKind::SVCall.is_maskable());
        assert!(!ExceptionKind::SysTick.is_maskable());
        assert!(!ExceptionKind::HardFault.is_maskable());
    }

    #[test]
    fn decode_type_codes() {
        assert_eq!(ExceptionKind::try_from(0), Ok(ExceptionKind::Reset));
        assert_eq!(ExceptionKind::try_from(3), Ok(ExceptionKind::MemManage));
        assert_eq!(ExceptionKind::try_from(9), Ok(ExceptionKind::SysTick));
        assert_eq!(ExceptionKind::try_from(10), Err(ErrorCode::INVAL));
        assert_eq!(ExceptionKind::try_from(255), Err(ErrorCode::INVAL));
    }
}
