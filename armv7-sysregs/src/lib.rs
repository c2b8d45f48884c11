// Copyright The Rusted Firmware-A Contributors.
//
// SPDX-License-Identifier: BSD-3-Clause

//! Access to Armv7-A CP15 system registers.
//!
//! Every register is accessed with `mrc`/`mcr` on coprocessor 15 at PL1. With the `fakes` feature
//! (or in this crate's own unit tests) the accessors instead read and write the values held in
//! [`fake::SYSREGS`], so that code using them can be tested on the host.

#![cfg_attr(not(any(test, feature = "fakes")), no_std)]

#[cfg(not(any(test, feature = "fakes")))]
mod aarch32;
#[cfg(any(test, feature = "fakes"))]
pub mod fake;

#[cfg(not(any(test, feature = "fakes")))]
pub use aarch32::{invalidate_bpiall, invalidate_iciallu, isb};
#[cfg(any(test, feature = "fakes"))]
pub use fake::{invalidate_bpiall, invalidate_iciallu, isb};

#[doc(hidden)]
pub use paste as _paste;

use bitflags::bitflags;
use core::{
    fmt::{self, Debug, Formatter},
    ops::BitAnd,
};

/// MIDR (Main ID Register) value.
#[derive(Clone, Copy, Default, Eq, PartialEq)]
#[repr(transparent)]
pub struct Midr(u32);

impl Midr {
    /// Position of the lowest bit in the Implementer field.
    pub const IMPLEMENTER_SHIFT: u32 = 24;
    /// Mask for the Implementer field, before shifting.
    pub const IMPLEMENTER_MASK: u32 = 0xff;
    /// Position of the lowest bit in the PartNum field.
    pub const PART_NUM_SHIFT: u32 = 4;
    /// Mask for the PartNum field, before shifting.
    pub const PART_NUM_MASK: u32 = 0xfff;

    /// Creates a `Midr` from its raw register value.
    pub const fn from_bits_retain(bits: u32) -> Self {
        Self(bits)
    }

    /// Returns the raw register value.
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Returns the Implementer field, e.g. `0x41` for Arm and `0x42` for Broadcom.
    pub const fn implementer(self) -> u8 {
        ((self.0 >> Self::IMPLEMENTER_SHIFT) & Self::IMPLEMENTER_MASK) as u8
    }

    /// Returns the PartNum field.
    pub const fn part_num(self) -> u16 {
        ((self.0 >> Self::PART_NUM_SHIFT) & Self::PART_NUM_MASK) as u16
    }

    /// Returns the intersection of the two values, usable in constant expressions.
    pub const fn intersection(self, other: Self) -> Self {
        Self(self.0 & other.0)
    }
}

impl BitAnd for Midr {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        self.intersection(rhs)
    }
}

impl Debug for Midr {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "Midr({:#010x})", self.0)
    }
}

impl fmt::LowerHex for Midr {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        fmt::LowerHex::fmt(&self.0, f)
    }
}

bitflags! {
    /// MPIDR (Multiprocessor Affinity Register) value.
    #[derive(Clone, Copy, Debug, Eq, PartialEq)]
    #[repr(transparent)]
    pub struct Mpidr: u32 {
        /// U
        const U = 1 << 30;
        /// Set when the register uses the Multiprocessing Extensions format.
        const M = 1 << 31;
    }
}

impl Mpidr {
    /// Position of the lowest bit in the Aff0 field.
    pub const AFF0_SHIFT: u8 = 0;
    /// Position of the lowest bit in the Aff1 field.
    pub const AFF1_SHIFT: u8 = 8;

    /// Returns the value of the Aff0 field.
    pub fn aff0(self) -> u8 {
        (self.bits() >> Self::AFF0_SHIFT) as u8
    }

    /// Returns the value of the Aff1 field.
    pub fn aff1(self) -> u8 {
        (self.bits() >> Self::AFF1_SHIFT) as u8
    }
}

bitflags! {
    /// ACTLR (Auxiliary Control Register) value.
    ///
    /// The layout is implementation defined, so the same bit can mean different things on
    /// different cores. Only the bits needed for branch predictor maintenance are named here.
    #[derive(Clone, Copy, Debug, Eq, PartialEq)]
    #[repr(transparent)]
    pub struct Actlr: u32 {
        /// Cortex-A15 and Brahma-B15: enable invalidates of the BTB by ICIALLU.
        const A15_IBE = 1 << 0;
        /// Cortex-A8: invalidate BTB enable, without which BPIALL is a no-op.
        const A8_IBE = 1 << 6;
    }
}

read_sysreg!(midr, u32: Midr, safe, [0, c0, c0, 0], fake::SYSREGS);
read_sysreg!(mpidr, u32: Mpidr, safe, [0, c0, c0, 5], fake::SYSREGS);
read_sysreg!(actlr, u32: Actlr, safe, [0, c1, c0, 1], fake::SYSREGS);
write_sysreg! {
    /// # Safety
    ///
    /// The value must be the physical address of a valid first-level translation table, combined
    /// with walk attributes appropriate for the system, and the caller must ensure that the
    /// matching CONTEXTIDR has been set first.
    ttbr0, u32, [0, c2, c0, 0], fake::SYSREGS
}
write_sysreg! {
    /// # Safety
    ///
    /// The ASID must not be in use by another address space with live TLB entries.
    contextidr, u32, [0, c13, c0, 1], fake::SYSREGS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn midr_fields() {
        // Cortex-A15 r2p4.
        let midr = Midr::from_bits_retain(0x412f_c0f4);
        assert_eq!(midr.implementer(), 0x41);
        assert_eq!(midr.part_num(), 0xc0f);
        assert_eq!(format!("{midr:?}"), "Midr(0x412fc0f4)");
    }

    #[test]
    fn mpidr_affinity() {
        let mpidr = Mpidr::from_bits_retain(0x8001_0203);
        assert!(mpidr.contains(Mpidr::M));
        assert_eq!(mpidr.aff0(), 3);
        assert_eq!(mpidr.aff1(), 2);
    }

    #[test]
    fn debug_actlr() {
        assert_eq!(format!("{:?}", Actlr::empty()), "Actlr(0x0)");
        assert_eq!(
            format!("{:?}", Actlr::A8_IBE | Actlr::A15_IBE),
            "Actlr(A15_IBE | A8_IBE)"
        );
    }

    #[test]
    fn fake_accessors() {
        let mut regs = fake::SYSREGS.lock().unwrap();
        regs.reset();
        regs.actlr = Actlr::A8_IBE;
        drop(regs);

        assert_eq!(read_actlr(), Actlr::A8_IBE);
        invalidate_bpiall();
        // SAFETY: Fake registers only.
        unsafe {
            write_contextidr(42);
        }

        let regs = fake::SYSREGS.lock().unwrap();
        assert_eq!(regs.reads, 1);
        assert_eq!(regs.writes, 1);
        assert_eq!(regs.bpiall_count, 1);
        assert_eq!(regs.contextidr, 42);
    }
}
