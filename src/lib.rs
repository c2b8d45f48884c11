// Copyright The Rusted Firmware-A Contributors.
//
// SPDX-License-Identifier: BSD-3-Clause

//! Spectre v2 (CVE-2017-5715) branch predictor hardening for Armv7-A kernels.
//!
//! On bring-up of each core the kernel calls `check_bugs`, which on the first core picks how the
//! branch predictor is to be invalidated:
//!
//! - by firmware, with `SMCCC_ARCH_WORKAROUND_1`, if PSCI firmware implementing SMCCC 1.1 offers it;
//! - otherwise with BPIALL or ICIALLU, depending on the part found in MIDR.
//!
//! The kernel then calls `harden_branch_predictor` on paths where a less trusted context may have
//! trained the predictor, and `switch_mm` to switch address space.

#![cfg_attr(not(test), no_std)]

pub mod bugs;
pub mod config;
pub mod cpu;
#[cfg(test)]
mod fake;
pub mod logger;
pub mod proc_fns;
pub mod psci;
pub mod smccc;
pub mod smp;

#[cfg(all(target_arch = "arm", not(test)))]
pub use self::system::*;

#[cfg(all(target_arch = "arm", not(test)))]
mod system {
    use crate::{
        bugs::{BranchPredictorHardening, MitigationStrategy},
        config::HardeningConfig,
        proc_fns::Processor,
        psci::{Psci, PsciOps},
        smccc::{Conduit, SmcccFirmware},
    };

    static PSCI: Psci<SmcccFirmware> = Psci::new(SmcccFirmware);
    static PROCESSOR: Processor = Processor::new();
    static BP_HARDENING: BranchPredictorHardening<'static, SmcccFirmware> =
        BranchPredictorHardening::new(HardeningConfig::from_build(), &PSCI, &PROCESSOR);

    /// Probes PSCI firmware over the conduit named by the device tree or ACPI tables.
    ///
    /// Must be called on the boot core before the first call to [`check_bugs`] for firmware
    /// workarounds to be considered.
    pub fn probe_firmware(conduit: Option<Conduit>) -> PsciOps {
        PSCI.probe(conduit)
    }

    /// Checks the calling core for Spectre v2 and installs a mitigation, if none is installed yet.
    pub fn check_bugs() -> Option<MitigationStrategy> {
        BP_HARDENING.check_bugs()
    }

    /// Returns the installed mitigation.
    pub fn mitigation() -> MitigationStrategy {
        BP_HARDENING.strategy()
    }

    /// Invalidates the branch predictor of the calling core with the installed mitigation.
    #[inline]
    pub fn harden_branch_predictor() {
        BP_HARDENING.harden_branch_predictor();
    }

    /// Hardens the branch predictor if a user fault at `fault_address` hit a kernel address.
    pub fn harden_user_fault(fault_address: usize, task_size: usize) {
        BP_HARDENING.harden_user_fault(fault_address, task_size);
    }

    /// Switches to the address space with the given translation table base and context ID.
    ///
    /// # Safety
    ///
    /// See [`Processor::switch_mm`].
    pub unsafe fn switch_mm(pgd_phys: u32, context_id: u32) {
        // SAFETY: Our caller upholds the requirements of `Processor::switch_mm`.
        unsafe {
            PROCESSOR.switch_mm(PSCI.firmware(), pgd_phys, context_id);
        }
    }
}
