// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! Helper functions for the Cortex-M architecture.
//!
//! Global interrupt and fault masking through PRIMASK and FAULTMASK, and a
//! critical section helper built on PRIMASK.

/// Unmask all configurable-priority exceptions (`cpsie i`).
///
/// Unsafe because it can end a critical section established by the caller.
#[cfg(any(doc, all(target_arch = "arm", target_os = "none")))]
#[inline(always)]
pub unsafe fn enable_interrupts() {
    use core::arch::asm;
    use core::sync::atomic::{compiler_fence, Ordering};
    compiler_fence(Ordering::SeqCst);
    asm!("cpsie i", options(nomem, nostack, preserves_flags));
}

/// Mask all configurable-priority exceptions (`cpsid i`).
#[cfg(any(doc, all(target_arch = "arm", target_os = "none")))]
#[inline(always)]
pub fn disable_interrupts() {
    use core::arch::asm;
    use core::sync::atomic::{compiler_fence, Ordering};
    unsafe {
        asm!("cpsid i", options(nomem, nostack, preserves_flags));
    }
    compiler_fence(Ordering::SeqCst);
}

/// Unmask all exceptions except NMI, including HardFault (`cpsie f`).
#[cfg(any(doc, all(target_arch = "arm", target_os = "none")))]
#[inline(always)]
pub unsafe fn enable_faults() {
    use core::arch::asm;
    use core::sync::atomic::{compiler_fence, Ordering};
    compiler_fence(Ordering::SeqCst);
    asm!("cpsie f", options(nomem, nostack, preserves_flags));
}

/// Mask all exceptions except NMI (`cpsid f`).
#[cfg(any(doc, all(target_arch = "arm", target_os = "none")))]
#[inline(always)]
pub fn disable_faults() {
    use core::arch::asm;
    use core::sync::atomic::{compiler_fence, Ordering};
    unsafe {
        asm!("cpsid f", options(nomem, nostack, preserves_flags));
    }
    compiler_fence(Ordering::SeqCst);
}

/// Atomic operation
///
/// Runs `f` with interrupts masked. PRIMASK is restored to its previous
/// state afterwards, so nested calls do not unmask interrupts early.
#[cfg(any(doc, all(target_arch = "arm", target_os = "none")))]
pub fn atomic<F, R>(f: F) -> R
where
    F: FnOnce() -> R,
{
    use core::arch::asm;
    use core::sync::atomic::{compiler_fence, Ordering};

    let primask: u32;
    unsafe {
        asm!("mrs {}, PRIMASK", out(reg) primask, options(nomem, nostack, preserves_flags));
        asm!("cpsid i", options(nomem, nostack, preserves_flags));
    }
    compiler_fence(Ordering::SeqCst);

    let res = f();

    compiler_fence(Ordering::SeqCst);
    // Bit 0 set means interrupts were already masked on entry.
    if primask & 1 == 0 {
        unsafe {
            asm!("cpsie i", options(nomem, nostack, preserves_flags));
        }
    }
    res
}

// Mock implementations for tests on the host.

/// Unmask interrupts (mock)
#[cfg(not(any(doc, all(target_arch = "arm", target_os = "none"))))]
pub unsafe fn enable_interrupts() {
    unimplemented!()
}

/// Mask interrupts (mock)
#[cfg(not(any(doc, all(target_arch = "arm", target_os = "none"))))]
pub fn disable_interrupts() {
    unimplemented!()
}

/// Unmask faults (mock)
#[cfg(not(any(doc, all(target_arch = "arm", target_os = "none"))))]
pub unsafe fn enable_faults() {
    unimplemented!()
}

/// Mask faults (mock)
#[cfg(not(any(doc, all(target_arch = "arm", target_os = "none"))))]
pub fn disable_faults() {
    unimplemented!()
}

/// Atomic operation (mock)
///
/// Host tests are single threaded with no interrupt context, so the closure
/// runs directly.
#[cfg(not(any(doc, all(target_arch = "arm", target_os = "none"))))]
pub fn atomic<F, R>(f: F) -> R
where
    F: FnOnce() -> R,
{
    f()
}
