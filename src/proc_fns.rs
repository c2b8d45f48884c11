// Copyright The Rusted Firmware-A Contributors.
//
// SPDX-License-Identifier: BSD-3-Clause

//! Per-processor functions which may be replaced at boot, currently just `switch_mm`.

use crate::smccc::{Conduit, Firmware, FunctionId};
use armv7_sysregs::{isb, write_contextidr, write_ttbr0};
use core::sync::atomic::{AtomicU8, Ordering};
use num_enum::{IntoPrimitive, TryFromPrimitive};

/// The routine used to switch address space.
#[derive(Copy, Clone, Debug, Eq, PartialEq, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum SwitchMm {
    /// Plain Armv7 switch.
    V7 = 0,
    /// Call `SMCCC_ARCH_WORKAROUND_1` through HVC, then switch.
    HvcWorkaround = 1,
    /// Call `SMCCC_ARCH_WORKAROUND_1` through SMC, then switch.
    SmcWorkaround = 2,
}

impl SwitchMm {
    /// Returns the variant which applies the firmware workaround through `conduit`.
    pub fn for_conduit(conduit: Conduit) -> Self {
        match conduit {
            Conduit::Hvc => Self::HvcWorkaround,
            Conduit::Smc => Self::SmcWorkaround,
        }
    }

    fn conduit(self) -> Option<Conduit> {
        match self {
            Self::V7 => None,
            Self::HvcWorkaround => Some(Conduit::Hvc),
            Self::SmcWorkaround => Some(Conduit::Smc),
        }
    }
}

/// The process-wide table of replaceable processor functions.
pub struct Processor {
    switch_mm: AtomicU8,
}

impl Processor {
    /// Creates a table using the plain Armv7 routines.
    pub const fn new() -> Self {
        Self {
            switch_mm: AtomicU8::new(SwitchMm::V7 as u8),
        }
    }

    /// Returns the routine currently used to switch address space.
    pub fn switch_mm_variant(&self) -> SwitchMm {
        SwitchMm::try_from(self.switch_mm.load(Ordering::Acquire)).unwrap_or(SwitchMm::V7)
    }

    /// Replaces the routine used to switch address space.
    pub fn set_switch_mm(&self, variant: SwitchMm) {
        self.switch_mm.store(variant.into(), Ordering::Release);
    }

    /// Switches to the address space with the given translation table base and context ID.
    ///
    /// If a firmware variant was installed, the branch predictor is hardened through `firmware`
    /// first so that no predictions trained by the previous address space survive the switch.
    ///
    /// # Safety
    ///
    /// `pgd_phys` must be the physical address of a valid first-level translation table which maps
    /// the currently executing code, and `context_id` must hold an ASID which is not in use by any
    /// other address space with live TLB entries.
    pub unsafe fn switch_mm(&self, firmware: &impl Firmware, pgd_phys: u32, context_id: u32) {
        if let Some(conduit) = self.switch_mm_variant().conduit() {
            firmware.call(conduit, FunctionId::SMCCC_ARCH_WORKAROUND_1, [0; 3]);
        }
        // SAFETY: Our caller guarantees that the context ID and translation table are valid.
        unsafe {
            cpu_v7_switch_mm(pgd_phys, context_id);
        }
    }
}

impl Default for Processor {
    fn default() -> Self {
        Self::new()
    }
}

/// Sets the context ID and then the translation table base, each followed by a barrier.
///
/// # Safety
///
/// See [`Processor::switch_mm`].
unsafe fn cpu_v7_switch_mm(pgd_phys: u32, context_id: u32) {
    // SAFETY: Our caller guarantees that the ASID is free, and it is set before the new
    // translation table so no walk sees the new table with the old ASID.
    unsafe {
        write_contextidr(context_id);
    }
    isb();
    // SAFETY: Our caller guarantees that the translation table is valid.
    unsafe {
        write_ttbr0(pgd_phys);
    }
    isb();
}
