// Copyright The Rusted Firmware-A Contributors.
//
// SPDX-License-Identifier: BSD-3-Clause

use super::{Cpu, PredictorInvalidation};
use armv7_sysregs::{Actlr, Midr};

/// Arm Cortex-A8.
pub struct CortexA8;

impl Cpu for CortexA8 {
    const NAME: &'static str = "Cortex-A8";
    const MIDR: Midr = Midr::from_bits_retain(0x410F_C080);
    const INVALIDATION: PredictorInvalidation = PredictorInvalidation::Bpiall;
    const IBE: Option<Actlr> = Some(Actlr::A8_IBE);
}

/// Arm Cortex-A9.
pub struct CortexA9;

impl Cpu for CortexA9 {
    const NAME: &'static str = "Cortex-A9";
    const MIDR: Midr = Midr::from_bits_retain(0x410F_C090);
    const INVALIDATION: PredictorInvalidation = PredictorInvalidation::Bpiall;
}

/// Arm Cortex-A12.
pub struct CortexA12;

impl Cpu for CortexA12 {
    const NAME: &'static str = "Cortex-A12";
    const MIDR: Midr = Midr::from_bits_retain(0x410F_C0D0);
    const INVALIDATION: PredictorInvalidation = PredictorInvalidation::Bpiall;
}

/// Arm Cortex-A15.
pub struct CortexA15;

impl Cpu for CortexA15 {
    const NAME: &'static str = "Cortex-A15";
    const MIDR: Midr = Midr::from_bits_retain(0x410F_C0F0);
    const INVALIDATION: PredictorInvalidation = PredictorInvalidation::Iciallu;
    const IBE: Option<Actlr> = Some(Actlr::A15_IBE);
}

/// Arm Cortex-A17.
pub struct CortexA17;

impl Cpu for CortexA17 {
    const NAME: &'static str = "Cortex-A17";
    const MIDR: Midr = Midr::from_bits_retain(0x410F_C0E0);
    const INVALIDATION: PredictorInvalidation = PredictorInvalidation::Bpiall;
}

/// Arm Cortex-A73, when running AArch32 kernels.
pub struct CortexA73;

impl Cpu for CortexA73 {
    const NAME: &'static str = "Cortex-A73";
    const MIDR: Midr = Midr::from_bits_retain(0x410F_D090);
    const INVALIDATION: PredictorInvalidation = PredictorInvalidation::Bpiall;
}

/// Arm Cortex-A75, when running AArch32 kernels.
pub struct CortexA75;

impl Cpu for CortexA75 {
    const NAME: &'static str = "Cortex-A75";
    const MIDR: Midr = Midr::from_bits_retain(0x410F_D0A0);
    const INVALIDATION: PredictorInvalidation = PredictorInvalidation::Bpiall;
}
