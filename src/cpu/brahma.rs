// Copyright The Rusted Firmware-A Contributors.
//
// SPDX-License-Identifier: BSD-3-Clause

use super::{Cpu, PredictorInvalidation};
use armv7_sysregs::{Actlr, Midr};

/// Broadcom Brahma-B15.
///
/// Shares the Cortex-A15 branch predictor design, including the ACTLR control.
pub struct BrahmaB15;

impl Cpu for BrahmaB15 {
    const NAME: &'static str = "Brahma-B15";
    const MIDR: Midr = Midr::from_bits_retain(0x420F_00F0);
    const INVALIDATION: PredictorInvalidation = PredictorInvalidation::Iciallu;
    const IBE: Option<Actlr> = Some(Actlr::A15_IBE);
}
