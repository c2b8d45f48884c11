// Copyright The Rusted Firmware-A Contributors.
//
// SPDX-License-Identifier: BSD-3-Clause

//! Fake firmware and shared test state for unit tests.

use crate::{
    logger::{self, LockedWriter},
    smccc::{Conduit, Firmware, FunctionId, SmcccError, Version},
};
use armv7_sysregs::fake::SYSREGS;
use std::sync::{Mutex, MutexGuard, Once, PoisonError};

/// Fake PSCI firmware which answers version and feature queries from its fields, and records every
/// call made to it.
#[derive(Debug)]
pub struct FakeFirmware {
    /// Value returned by `PSCI_VERSION`.
    pub psci_version: u32,
    /// Value returned by `PSCI_FEATURES`.
    pub psci_features: u32,
    /// Value returned by `SMCCC_VERSION`.
    pub smccc_version: u32,
    /// Value returned by `SMCCC_ARCH_FEATURES(SMCCC_ARCH_WORKAROUND_1)`.
    pub workaround_1: i32,
    calls: Mutex<Vec<(Conduit, FunctionId)>>,
}

impl FakeFirmware {
    /// PSCI 1.1 and SMCCC 1.1 firmware whose answer to `SMCCC_ARCH_FEATURES` for
    /// `SMCCC_ARCH_WORKAROUND_1` is `result`.
    pub fn with_workaround_1(result: i32) -> Self {
        Self {
            workaround_1: result,
            ..Self::default()
        }
    }

    /// Returns the calls made so far, in order.
    pub fn calls(&self) -> Vec<(Conduit, FunctionId)> {
        self.calls.lock().unwrap().clone()
    }

    /// Returns the number of calls made so far.
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl Default for FakeFirmware {
    fn default() -> Self {
        Self {
            psci_version: Version::V1_1.bits(),
            psci_features: 0,
            smccc_version: Version::V1_1.bits(),
            workaround_1: SmcccError::NotSupported.into(),
            calls: Mutex::new(Vec::new()),
        }
    }
}

impl Firmware for FakeFirmware {
    fn call(&self, conduit: Conduit, function: FunctionId, args: [u32; 3]) -> [u32; 4] {
        self.calls.lock().unwrap().push((conduit, function));
        let r0 = match function {
            FunctionId::PSCI_VERSION => self.psci_version,
            FunctionId::PSCI_FEATURES => self.psci_features,
            FunctionId::SMCCC_VERSION => self.smccc_version,
            FunctionId::SMCCC_ARCH_FEATURES if args[0] == FunctionId::SMCCC_ARCH_WORKAROUND_1.0 => {
                self.workaround_1 as u32
            }
            FunctionId::SMCCC_ARCH_WORKAROUND_1 => 0,
            _ => SmcccError::NotSupported.code(),
        };
        [r0, 0, 0, 0]
    }
}

/// Log output of tests which hold [`exclusive_sysregs`].
pub static LOG: LockedWriter<String> = LockedWriter::new(String::new());

static SERIAL: Mutex<()> = Mutex::new(());
static LOGGER: Once = Once::new();

/// Serialises tests which use the fake system registers or check log output.
///
/// Resets the fake system registers and clears [`LOG`] before returning.
pub fn exclusive_sysregs() -> MutexGuard<'static, ()> {
    // A failed test must not fail every test after it.
    let guard = SERIAL.lock().unwrap_or_else(PoisonError::into_inner);
    LOGGER.call_once(|| {
        logger::init(&LOG).unwrap();
    });
    SYSREGS.clear_poison();
    SYSREGS
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .reset();
    LOG.lock().clear();
    guard
}

/// Returns and clears everything logged since the last call.
pub fn take_logs() -> String {
    core::mem::take(&mut *LOG.lock())
}
