// Copyright The Rusted Firmware-A Contributors.
//
// SPDX-License-Identifier: BSD-3-Clause

//! Spectre v2 (CVE-2017-5715) branch predictor hardening.
//!
//! Each core calls [`BranchPredictorHardening::check_bugs`] while it is brought up. The first call
//! picks a [`MitigationStrategy`] for the system and publishes it; later calls see the published
//! strategy and return immediately. [`BranchPredictorHardening::harden_branch_predictor`] is then
//! called whenever the kernel is about to return to a context which may have been attacked.

use crate::{
    config::HardeningConfig,
    cpu::{CpuOps, PredictorInvalidation, find_cpu_ops},
    proc_fns::{Processor, SwitchMm},
    psci::Psci,
    smccc::{Conduit, Firmware, FunctionId},
    smp::CoresImpl,
};
use armv7_sysregs::{Actlr, invalidate_bpiall, invalidate_iciallu, read_actlr, read_midr};
use core::fmt::{self, Display, Formatter};
use log::{debug, error, info};
use percore::Cores;
use spin::Once;

/// Logged when firmware left the branch predictor invalidation control disabled.
pub const IBE_NOT_SET: &str =
    "Spectre v2: firmware did not set auxiliary control register IBE bit, system vulnerable";

/// How the branch predictor is hardened before returning to a less trusted context.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum MitigationStrategy {
    /// No mitigation is available.
    None,
    /// Invalidate all branch predictors with BPIALL.
    Bpiall,
    /// Invalidate the instruction cache, and with it the BTB, with ICIALLU.
    Iciallu,
    /// Ask firmware to do it, with `SMCCC_ARCH_WORKAROUND_1` through the given conduit.
    Firmware(Conduit),
}

impl MitigationStrategy {
    /// Returns the name logged for the strategy, or `None` for [`MitigationStrategy::None`].
    pub fn method(self) -> Option<&'static str> {
        match self {
            Self::None => None,
            Self::Bpiall => Some("BPIALL"),
            Self::Iciallu => Some("ICIALLU"),
            Self::Firmware(Conduit::Hvc) => Some("hypervisor"),
            Self::Firmware(Conduit::Smc) => Some("firmware PSCI"),
        }
    }

    /// Performs the mitigation on the calling core.
    fn apply(self, firmware: &impl Firmware) {
        match self {
            Self::None => {}
            Self::Bpiall => invalidate_bpiall(),
            Self::Iciallu => invalidate_iciallu(),
            Self::Firmware(conduit) => {
                // The workaround returns nothing useful.
                firmware.call(conduit, FunctionId::SMCCC_ARCH_WORKAROUND_1, [0; 3]);
            }
        }
    }
}

impl From<PredictorInvalidation> for MitigationStrategy {
    fn from(invalidation: PredictorInvalidation) -> Self {
        match invalidation {
            PredictorInvalidation::Bpiall => Self::Bpiall,
            PredictorInvalidation::Iciallu => Self::Iciallu,
        }
    }
}

impl Display for MitigationStrategy {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.write_str(self.method().unwrap_or("no"))
    }
}

/// The system-wide branch predictor hardening state.
pub struct BranchPredictorHardening<'a, F: Firmware> {
    config: HardeningConfig,
    psci: &'a Psci<F>,
    processor: &'a Processor,
    /// Only ever holds a strategy other than `MitigationStrategy::None`.
    strategy: Once<MitigationStrategy>,
}

impl<'a, F: Firmware> BranchPredictorHardening<'a, F> {
    /// Creates the hardening state, with no strategy installed yet.
    ///
    /// Firmware workarounds are discovered through `psci`, which should have been probed before
    /// the first core is brought up, and installing one replaces `processor`'s `switch_mm`.
    pub const fn new(config: HardeningConfig, psci: &'a Psci<F>, processor: &'a Processor) -> Self {
        Self {
            config,
            psci,
            processor,
            strategy: Once::new(),
        }
    }

    /// Returns the installed strategy.
    pub fn strategy(&self) -> MitigationStrategy {
        self.strategy
            .get()
            .copied()
            .unwrap_or(MitigationStrategy::None)
    }

    /// Per-core bring-up hook.
    ///
    /// Checks that firmware enabled branch predictor invalidation on parts which have a control
    /// for it, then calls [`Self::init`].
    pub fn check_bugs(&self) -> Option<MitigationStrategy> {
        if !self.config.harden_branch_predictor {
            return None;
        }
        if let Some(ibe) = find_cpu_ops(read_midr()).and_then(CpuOps::ibe) {
            self.check_auxcr_set(ibe, IBE_NOT_SET);
        }
        self.init()
    }

    /// Picks and installs the mitigation strategy, unless one is already installed.
    ///
    /// A firmware workaround takes precedence over invalidation by the kernel, because it must
    /// also be applied on every address space switch. Returns the strategy if this call installed
    /// it; `None` if one was already installed or none is available.
    pub fn init(&self) -> Option<MitigationStrategy> {
        if !self.config.harden_branch_predictor || self.strategy.is_completed() {
            return None;
        }

        let midr = read_midr();
        let mut strategy = match find_cpu_ops(midr) {
            Some(ops) => {
                debug!("CPU: Spectre v2: {} needs {:?}", ops.name(), ops.invalidation());
                ops.invalidation().into()
            }
            None => MitigationStrategy::None,
        };

        if self.config.psci
            && let Some(conduit) = self.firmware_workaround()
        {
            strategy = MitigationStrategy::Firmware(conduit);
            self.processor.set_switch_mm(SwitchMm::for_conduit(conduit));
        }

        if strategy == MitigationStrategy::None {
            debug!("CPU: Spectre v2: no workaround for MIDR {midr:#x}");
            return None;
        }

        let mut installed = false;
        self.strategy.call_once(|| {
            installed = true;
            strategy
        });
        if !installed {
            // Another core got there first.
            return None;
        }
        info!("CPU: Spectre v2: using {strategy} workaround");
        Some(strategy)
    }

    /// Returns the conduit through which firmware offers `SMCCC_ARCH_WORKAROUND_1`, if it does.
    fn firmware_workaround(&self) -> Option<Conduit> {
        let conduit = self.psci.ops().conduit?;
        match self
            .psci
            .arch_features(FunctionId::SMCCC_ARCH_WORKAROUND_1)
        {
            Ok(_) => Some(conduit),
            Err(e) => {
                debug!("CPU: Spectre v2: no firmware workaround over {conduit}: {e}");
                None
            }
        }
    }

    /// Hardens the branch predictor of the calling core with the installed strategy, if any.
    #[inline]
    pub fn harden_branch_predictor(&self) {
        if let Some(strategy) = self.strategy.get() {
            strategy.apply(self.psci.firmware());
        }
    }

    /// Hardens the branch predictor after user space faulted on `fault_address`, if that is a
    /// kernel address.
    ///
    /// Such a fault is a likely attempt to train the predictor against the kernel, so the
    /// predictor is flushed before the fault is reported. `task_size` is the first kernel address,
    /// so a fault exactly on it counts.
    pub fn harden_user_fault(&self, fault_address: usize, task_size: usize) {
        if fault_address >= task_size {
            self.harden_branch_predictor();
        }
    }

    /// Logs `msg` if any of the bits in `mask` are clear in ACTLR.
    ///
    /// This is purely diagnostic, as the kernel cannot write ACTLR itself.
    pub fn check_auxcr_set(&self, mask: Actlr, msg: &str) {
        if !self.config.harden_branch_predictor {
            return;
        }
        if !read_actlr().contains(mask) {
            error!("CPU{}: {msg}", CoresImpl::core_index());
        }
    }
}
