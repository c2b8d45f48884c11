// Copyright The Rusted Firmware-A Contributors.
//
// SPDX-License-Identifier: BSD-3-Clause

//! Known CPU parts which are vulnerable to Spectre v2, and how to harden each of them.

mod brahma;
mod cortex_a;

use armv7_sysregs::{Actlr, Midr};
pub use brahma::BrahmaB15;
pub use cortex_a::{CortexA8, CortexA9, CortexA12, CortexA15, CortexA17, CortexA73, CortexA75};

/// The instruction sequence which invalidates a part's branch predictor.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum PredictorInvalidation {
    /// BPIALL: invalidate all branch predictors.
    Bpiall,
    /// ICIALLU: invalidate the whole instruction cache, which also invalidates the BTB on parts
    /// that need this.
    Iciallu,
}

/// The `Cpu` trait captures the Spectre v2 related properties of a CPU part.
pub trait Cpu {
    /// Human readable name of the part, for logs.
    const NAME: &'static str;

    /// Main ID register value, only the 'Implementer' and 'PartNum' fields are used for identifying
    /// the `Cpu` implementation.
    const MIDR: Midr;

    /// How to invalidate the branch predictor on this part.
    const INVALIDATION: PredictorInvalidation;

    /// ACTLR bits which firmware must have set for [`Self::INVALIDATION`] to reach the branch
    /// predictor, if the part has such a control.
    const IBE: Option<Actlr> = None;
}

/// Structure for storing the MIDR value and hardening properties of a CPU part.
#[derive(Debug)]
pub struct CpuOps {
    midr: Midr,
    name: &'static str,
    invalidation: PredictorInvalidation,
    ibe: Option<Actlr>,
}

impl CpuOps {
    /// Only use Implementer and PartNum fields.
    pub const MIDR_MASK: Midr = Midr::from_bits_retain(0xff00_fff0);

    /// Check if the instance has an MIDR with matching Implementer and PartNum fields.
    fn has_matching_midr(&self, midr: Midr) -> bool {
        self.midr == midr & Self::MIDR_MASK
    }

    /// Create [CpuOps] from [Cpu] implementation.
    pub const fn from_cpu<T: Cpu>() -> Self {
        Self {
            midr: T::MIDR.intersection(Self::MIDR_MASK),
            name: T::NAME,
            invalidation: T::INVALIDATION,
            ibe: T::IBE,
        }
    }

    /// Returns the name of the part.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns how to invalidate the branch predictor of the part.
    pub fn invalidation(&self) -> PredictorInvalidation {
        self.invalidation
    }

    /// Returns the ACTLR bits firmware must set for the invalidation to work, if any.
    pub fn ibe(&self) -> Option<Actlr> {
        self.ibe
    }
}

/// Calculates the count of specified Cpu types.
macro_rules! cpu_ops_count {
    ($cpu:ty) => { 1 };
    ($cpu:ty, $($cpus:ty),+) => {
        $crate::cpu::cpu_ops_count!($cpu) + $crate::cpu::cpu_ops_count!($($cpus),+)
    };
}
pub(crate) use cpu_ops_count;

/// Declares the CPU_OPS array.
macro_rules! define_cpu_ops {
    ($($cpus:ty),+) => {
        /// All parts known to need branch predictor hardening.
        pub static CPU_OPS : [$crate::cpu::CpuOps; $crate::cpu::cpu_ops_count!($($cpus),+)] = [
            $($crate::cpu::CpuOps::from_cpu::<$cpus>()),*,
        ];
    }
}
pub(crate) use define_cpu_ops;

crate::cpu::define_cpu_ops!(
    CortexA8, CortexA9, CortexA12, CortexA17, CortexA73, CortexA75, CortexA15, BrahmaB15
);

/// Looks up the `CpuOps` entry for the part with the given MIDR.
///
/// Returns `None` for parts which are not known to be vulnerable.
pub fn find_cpu_ops(midr: Midr) -> Option<&'static CpuOps> {
    CPU_OPS.iter().find(|ops| ops.has_matching_midr(midr))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bpiall_parts() {
        for midr in [
            0x410f_c080, // Cortex-A8 r0p0
            0x413f_c082, // Cortex-A8 r3p2
            0x412f_c091, // Cortex-A9 r2p1
            0x410f_c0d1, // Cortex-A12 r0p1
            0x410f_c0e0, // Cortex-A17 r0p0
            0x411f_d090, // Cortex-A73 r1p0
            0x412f_d0a0, // Cortex-A75 r2p0
        ] {
            let ops = find_cpu_ops(Midr::from_bits_retain(midr)).unwrap();
            assert_eq!(ops.invalidation(), PredictorInvalidation::Bpiall, "{midr:#x}");
        }
    }

    #[test]
    fn iciallu_parts() {
        for midr in [
            0x412f_c0f4, // Cortex-A15 r2p4
            0x420f_00f0, // Brahma-B15 r0p0
            0x421f_00f2, // Brahma-B15 r1p2
        ] {
            let ops = find_cpu_ops(Midr::from_bits_retain(midr)).unwrap();
            assert_eq!(ops.invalidation(), PredictorInvalidation::Iciallu, "{midr:#x}");
        }
    }

    #[test]
    fn unknown_parts() {
        for midr in [
            0x0000_0000,
            0x410f_c070, // Cortex-A7
            0x410f_c050, // Cortex-A5
            0x410f_d080, // Cortex-A72
            0x420f_c0f0, // Cortex-A15 part number with the Broadcom implementer
            0x510f_00f0, // Brahma-B15 part number with another implementer
        ] {
            assert!(find_cpu_ops(Midr::from_bits_retain(midr)).is_none(), "{midr:#x}");
        }
    }

    #[test]
    fn auxiliary_control_bits_differ_per_family() {
        let ibe = |midr| find_cpu_ops(Midr::from_bits_retain(midr)).unwrap().ibe();
        assert_eq!(ibe(0x410f_c080), Some(Actlr::A8_IBE));
        assert_eq!(ibe(0x410f_c0f0), Some(Actlr::A15_IBE));
        assert_eq!(ibe(0x420f_00f0), Some(Actlr::A15_IBE));
        assert_eq!(ibe(0x410f_c090), None);
        assert_eq!(ibe(0x410f_d0a0), None);
        assert_ne!(Actlr::A8_IBE, Actlr::A15_IBE);
    }

    #[test]
    fn names() {
        let names: Vec<_> = CPU_OPS.iter().map(CpuOps::name).collect();
        assert_eq!(
            names,
            [
                "Cortex-A8",
                "Cortex-A9",
                "Cortex-A12",
                "Cortex-A17",
                "Cortex-A73",
                "Cortex-A75",
                "Cortex-A15",
                "Brahma-B15"
            ]
        );
    }
}
