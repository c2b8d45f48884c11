// Copyright The Rusted Firmware-A Contributors.
//
// SPDX-License-Identifier: BSD-3-Clause

//! Build-time configuration.

/// True if the build is configured with debug assertions on.
pub const DEBUG: bool = cfg!(debug_assertions);

/// Which parts of branch predictor hardening are available in this build.
///
/// This is the capability object handed to [`crate::bugs::BranchPredictorHardening`]: with
/// hardening disabled, no strategy is ever derived and every operation is a no-op.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct HardeningConfig {
    /// Whether branch predictor hardening is enabled at all.
    pub harden_branch_predictor: bool,
    /// Whether firmware workarounds through PSCI conduits may be used.
    pub psci: bool,
}

impl HardeningConfig {
    /// Everything enabled.
    pub const ENABLED: Self = Self {
        harden_branch_predictor: true,
        psci: true,
    };

    /// Hardening disabled.
    pub const DISABLED: Self = Self {
        harden_branch_predictor: false,
        psci: false,
    };

    /// Returns the configuration selected at build time.
    ///
    /// The `harden_branch_predictor` and `psci` cargo features give the defaults. The
    /// `HARDEN_BRANCH_PREDICTOR` environment variable, if set at build time to "y" or "n",
    /// overrides the first of them.
    pub const fn from_build() -> Self {
        let harden_branch_predictor = match option_env!("HARDEN_BRANCH_PREDICTOR") {
            Some(value) => parse_bool(value, cfg!(feature = "harden_branch_predictor")),
            None => cfg!(feature = "harden_branch_predictor"),
        };
        Self {
            harden_branch_predictor,
            psci: harden_branch_predictor && cfg!(feature = "psci"),
        }
    }
}

impl Default for HardeningConfig {
    fn default() -> Self {
        Self::from_build()
    }
}

/// Parses a kconfig-style boolean, returning `default` for anything unrecognised.
const fn parse_bool(value: &str, default: bool) -> bool {
    match value.as_bytes() {
        b"y" | b"1" => true,
        b"n" | b"0" => false,
        _ => default,
    }
}
