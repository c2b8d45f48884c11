// Copyright The Rusted Firmware-A Contributors.
//
// SPDX-License-Identifier: BSD-3-Clause

//! Discovery of the firmware interface: which conduit reaches PSCI, and which SMCCC version it
//! implements.

use crate::smccc::{Conduit, Firmware, FunctionId, SmcccError, Version, decode_result};
use log::{debug, info};
use spin::Once;

/// What the platform firmware offers, as far as Spectre v2 hardening is concerned.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct PsciOps {
    /// How to reach firmware, or `None` if there is no PSCI firmware.
    pub conduit: Option<Conduit>,
    /// The negotiated SMCCC version; either 1.0 or 1.1.
    pub smccc_version: Version,
}

impl PsciOps {
    /// No firmware interface.
    pub const NONE: Self = Self {
        conduit: None,
        smccc_version: Version::V1_0,
    };
}

/// The PSCI firmware interface, reached through some [`Firmware`] implementation.
pub struct Psci<F: Firmware> {
    firmware: F,
    ops: Once<PsciOps>,
}

impl<F: Firmware> Psci<F> {
    /// Creates a new, not yet probed, PSCI interface.
    pub const fn new(firmware: F) -> Self {
        Self {
            firmware,
            ops: Once::new(),
        }
    }

    /// Returns the underlying firmware call implementation.
    pub fn firmware(&self) -> &F {
        &self.firmware
    }

    /// Returns what [`Psci::probe`] found, or [`PsciOps::NONE`] if it has not run yet.
    pub fn ops(&self) -> PsciOps {
        self.ops.get().copied().unwrap_or(PsciOps::NONE)
    }

    /// Negotiates the PSCI and SMCCC versions over the given conduit, as found in the device tree
    /// or ACPI tables, and publishes the result.
    ///
    /// Only the first call does anything; later calls return what it published.
    pub fn probe(&self, conduit: Option<Conduit>) -> PsciOps {
        *self.ops.call_once(|| {
            let Some(conduit) = conduit else {
                debug!("PSCI: no conduit, firmware workarounds unavailable");
                return PsciOps::NONE;
            };
            PsciOps {
                conduit: Some(conduit),
                smccc_version: self.negotiate_smccc_version(conduit),
            }
        })
    }

    fn negotiate_smccc_version(&self, conduit: Conduit) -> Version {
        let Ok(psci_version) = self.call(conduit, FunctionId::PSCI_VERSION, 0) else {
            return Version::V1_0;
        };
        let psci_version = Version::from_bits(psci_version);
        info!("PSCIv{psci_version} detected in firmware.");

        // PSCI_FEATURES only exists from PSCI 1.0 onwards.
        if psci_version < Version::V1_0 {
            return Version::V1_0;
        }
        if self
            .call(conduit, FunctionId::PSCI_FEATURES, FunctionId::SMCCC_VERSION.0)
            .is_err()
        {
            return Version::V1_0;
        }

        match self.call(conduit, FunctionId::SMCCC_VERSION, 0) {
            Ok(version) if Version::from_bits(version) >= Version::V1_1 => {
                info!("SMC Calling Convention v1.1");
                Version::V1_1
            }
            _ => Version::V1_0,
        }
    }

    /// Asks firmware whether it implements `function`, through the published conduit.
    ///
    /// Requires SMCCC 1.1; with 1.0 or no conduit this returns [`SmcccError::NotSupported`]
    /// without calling firmware.
    pub fn arch_features(&self, function: FunctionId) -> Result<u32, SmcccError> {
        let ops = self.ops();
        match ops.conduit {
            Some(conduit) if ops.smccc_version != Version::V1_0 => {
                self.call(conduit, FunctionId::SMCCC_ARCH_FEATURES, function.0)
            }
            _ => Err(SmcccError::NotSupported),
        }
    }

    fn call(&self, conduit: Conduit, function: FunctionId, arg: u32) -> Result<u32, SmcccError> {
        let [r0, ..] = self.firmware.call(conduit, function, [arg, 0, 0]);
        decode_result(r0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake::FakeFirmware;

    #[test]
    fn no_conduit() {
        let psci = Psci::new(FakeFirmware::default());
        assert_eq!(psci.probe(None), PsciOps::NONE);
        assert_eq!(psci.firmware().call_count(), 0);
        assert_eq!(
            psci.arch_features(FunctionId::SMCCC_ARCH_WORKAROUND_1),
            Err(SmcccError::NotSupported)
        );
        assert_eq!(psci.firmware().call_count(), 0);
    }

    #[test]
    fn ops_before_probe() {
        let psci = Psci::new(FakeFirmware::with_workaround_1(0));
        assert_eq!(psci.ops(), PsciOps::NONE);
    }

    #[test]
    fn smccc_1_1() {
        let psci = Psci::new(FakeFirmware::with_workaround_1(0));
        let ops = psci.probe(Some(Conduit::Smc));
        assert_eq!(
            ops,
            PsciOps {
                conduit: Some(Conduit::Smc),
                smccc_version: Version::V1_1,
            }
        );
        assert_eq!(psci.ops(), ops);
        assert_eq!(
            psci.firmware().calls(),
            [
                (Conduit::Smc, FunctionId::PSCI_VERSION),
                (Conduit::Smc, FunctionId::PSCI_FEATURES),
                (Conduit::Smc, FunctionId::SMCCC_VERSION),
            ]
        );
    }

    #[test]
    fn later_smccc_versions_clamp_to_1_1() {
        let mut firmware = FakeFirmware::with_workaround_1(0);
        firmware.smccc_version = Version::new(1, 5).bits();
        let psci = Psci::new(firmware);
        assert_eq!(psci.probe(Some(Conduit::Hvc)).smccc_version, Version::V1_1);
    }

    #[test]
    fn psci_0_2_has_no_features_call() {
        let mut firmware = FakeFirmware::with_workaround_1(0);
        firmware.psci_version = Version::new(0, 2).bits();
        let psci = Psci::new(firmware);
        assert_eq!(psci.probe(Some(Conduit::Smc)).smccc_version, Version::V1_0);
        assert_eq!(
            psci.firmware().calls(),
            [(Conduit::Smc, FunctionId::PSCI_VERSION)]
        );
    }

    #[test]
    fn smccc_version_not_supported() {
        let mut firmware = FakeFirmware::with_workaround_1(0);
        firmware.smccc_version = SmcccError::NotSupported.code();
        let psci = Psci::new(firmware);
        assert_eq!(psci.probe(Some(Conduit::Smc)).smccc_version, Version::V1_0);
        assert_eq!(
            psci.arch_features(FunctionId::SMCCC_ARCH_WORKAROUND_1),
            Err(SmcccError::NotSupported)
        );
        // No SMCCC_ARCH_FEATURES call was made for SMCCC 1.0.
        assert_eq!(psci.firmware().call_count(), 3);
    }

    #[test]
    fn probe_is_published_once() {
        let psci = Psci::new(FakeFirmware::with_workaround_1(0));
        let first = psci.probe(Some(Conduit::Hvc));
        let calls = psci.firmware().call_count();
        assert_eq!(psci.probe(Some(Conduit::Smc)), first);
        assert_eq!(psci.probe(None), first);
        assert_eq!(psci.firmware().call_count(), calls);
    }

    #[test]
    fn arch_features_uses_published_conduit() {
        let psci = Psci::new(FakeFirmware::with_workaround_1(1));
        psci.probe(Some(Conduit::Hvc));
        assert_eq!(
            psci.arch_features(FunctionId::SMCCC_ARCH_WORKAROUND_1),
            Ok(1)
        );
        assert_eq!(
            psci.firmware().calls().last(),
            Some(&(Conduit::Hvc, FunctionId::SMCCC_ARCH_FEATURES))
        );
    }
}
