// Copyright The Rusted Firmware-A Contributors.
//
// SPDX-License-Identifier: BSD-3-Clause

//! Fake implementations of system register getters and setters for unit tests.

use crate::{Actlr, Midr, Mpidr};
use std::sync::Mutex;

/// Generates a public function named `read_$sysreg` to read the fake system register `$sysreg` of
/// type `$type`.
#[macro_export]
macro_rules! read_sysreg {
    ($sysreg:ident, $type:ty, safe, [$($encoding:tt)*], $fake_sysregs:expr) => {
        $crate::_paste::paste! {
            #[doc = "Returns the value of the `"]
            #[doc = stringify!($sysreg)]
            #[doc = "` system register."]
            pub fn [< read_ $sysreg >]() -> $type {
                let mut sysregs = $fake_sysregs.lock().unwrap();
                sysregs.reads += 1;
                sysregs.$sysreg
            }
        }
    };
    ($sysreg:ident, $type:ty : $bitflags_type:ty, safe, [$($encoding:tt)*], $fake_sysregs:expr) => {
        $crate::_paste::paste! {
            #[doc = "Returns the value of the `"]
            #[doc = stringify!($sysreg)]
            #[doc = "` system register."]
            pub fn [< read_ $sysreg >]() -> $bitflags_type {
                let mut sysregs = $fake_sysregs.lock().unwrap();
                sysregs.reads += 1;
                sysregs.$sysreg
            }
        }
    };
}

/// Generates a public function named `write_$sysreg` to write to the fake system register `$sysreg`
/// of type `$type`.
#[macro_export]
macro_rules! write_sysreg {
    (
        $(#[$attributes:meta])*
        $sysreg:ident, $type:ty, [$($encoding:tt)*], $fake_sysregs:expr
    ) => {
        $crate::_paste::paste! {
            #[doc = "Writes `value` to the `"]
            #[doc = stringify!($sysreg)]
            #[doc = "` system register."]
            $(#[$attributes])*
            pub unsafe fn [< write_ $sysreg >](value: $type) {
                let mut sysregs = $fake_sysregs.lock().unwrap();
                sysregs.writes += 1;
                sysregs.$sysreg = value;
            }
        }
    };
}

/// Values of fake system registers.
pub static SYSREGS: Mutex<SystemRegisters> = Mutex::new(SystemRegisters::new());

/// A set of fake system registers, plus counters of the accesses made to them.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SystemRegisters {
    /// Fake value for the MIDR register.
    pub midr: Midr,
    /// Fake value for the MPIDR register.
    pub mpidr: Mpidr,
    /// Fake value for the ACTLR register.
    pub actlr: Actlr,
    /// Fake value for the TTBR0 register.
    pub ttbr0: u32,
    /// Fake value for the CONTEXTIDR register.
    pub contextidr: u32,
    /// Number of register reads made.
    pub reads: usize,
    /// Number of register writes made, not counting cache and predictor maintenance.
    pub writes: usize,
    /// Number of BPIALL operations performed.
    pub bpiall_count: usize,
    /// Number of ICIALLU operations performed.
    pub iciallu_count: usize,
    /// Number of ISB barriers executed.
    pub isb_count: usize,
}

impl SystemRegisters {
    const fn new() -> Self {
        Self {
            midr: Midr::from_bits_retain(0),
            mpidr: Mpidr::empty(),
            actlr: Actlr::empty(),
            ttbr0: 0,
            contextidr: 0,
            reads: 0,
            writes: 0,
            bpiall_count: 0,
            iciallu_count: 0,
            isb_count: 0,
        }
    }

    /// Resets the fake system registers to their initial state.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Returns whether any register or cache maintenance operation has been performed since the
    /// last reset.
    pub fn touched(&self) -> bool {
        self.reads != 0
            || self.writes != 0
            || self.bpiall_count != 0
            || self.iciallu_count != 0
            || self.isb_count != 0
    }
}

/// Records a BPIALL operation.
pub fn invalidate_bpiall() {
    SYSREGS.lock().unwrap().bpiall_count += 1;
}

/// Records an ICIALLU operation.
pub fn invalidate_iciallu() {
    SYSREGS.lock().unwrap().iciallu_count += 1;
}

/// Records an ISB.
pub fn isb() {
    SYSREGS.lock().unwrap().isb_count += 1;
}
