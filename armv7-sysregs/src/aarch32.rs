// Copyright The Rusted Firmware-A Contributors.
//
// SPDX-License-Identifier: BSD-3-Clause

use core::arch::asm;

/// Generates a public function named `read_$sysreg` to read the CP15 register with the given
/// `[opc1, CRn, CRm, opc2]` encoding as a value of type `$type`.
///
/// `safe` should only be specified for system registers which are indeed safe to read.
#[macro_export]
macro_rules! read_sysreg {
    ($sysreg:ident, $type:ty, safe, [$opc1:literal, $crn:ident, $crm:ident, $opc2:literal] $(, $fake_sysregs:expr)?) => {
        $crate::_paste::paste! {
            #[doc = "Returns the value of the `"]
            #[doc = stringify!($sysreg)]
            #[doc = "` system register."]
            #[inline(always)]
            pub fn [< read_ $sysreg >]() -> $type {
                let value;
                // SAFETY: The macro call site's author (i.e. see below) has determined that it is
                // always safe to read the given `$sysreg.`
                unsafe {
                    core::arch::asm!(
                        concat!(
                            "mrc p15, ", stringify!($opc1), ", {value}, ",
                            stringify!($crn), ", ", stringify!($crm), ", ", stringify!($opc2)
                        ),
                        options(nomem, nostack, preserves_flags),
                        value = out(reg) value,
                    );
                }
                value
            }
        }
    };
    ($sysreg:ident, $type:ty : $bitflags_type:ty, safe, [$opc1:literal, $crn:ident, $crm:ident, $opc2:literal] $(, $fake_sysregs:expr)?) => {
        $crate::_paste::paste! {
            #[doc = "Returns the value of the `"]
            #[doc = stringify!($sysreg)]
            #[doc = "` system register."]
            #[inline(always)]
            pub fn [< read_ $sysreg >]() -> $bitflags_type {
                let value: $type;
                // SAFETY: The macro call site's author (i.e. see below) has determined that it is
                // always safe to read the given `$sysreg.`
                unsafe {
                    core::arch::asm!(
                        concat!(
                            "mrc p15, ", stringify!($opc1), ", {value}, ",
                            stringify!($crn), ", ", stringify!($crm), ", ", stringify!($opc2)
                        ),
                        options(nomem, nostack, preserves_flags),
                        value = out(reg) value,
                    );
                }
                <$bitflags_type>::from_bits_retain(value)
            }
        }
    };
}

/// Generates a public function named `write_$sysreg` to write a value of type `$type` to the CP15
/// register with the given `[opc1, CRn, CRm, opc2]` encoding.
///
/// Writes are always `unsafe`: the registers this is used for change translation state.
#[macro_export]
macro_rules! write_sysreg {
    (
        $(#[$attributes:meta])*
        $sysreg:ident, $type:ty, [$opc1:literal, $crn:ident, $crm:ident, $opc2:literal] $(, $fake_sysregs:expr)?
    ) => {
        $crate::_paste::paste! {
            #[doc = "Writes `value` to the `"]
            #[doc = stringify!($sysreg)]
            #[doc = "` system register."]
            $(#[$attributes])*
            #[inline(always)]
            pub unsafe fn [< write_ $sysreg >](value: $type) {
                // SAFETY: The caller promises that it is safe to write `value` to the given
                // `$sysreg`.
                unsafe {
                    core::arch::asm!(
                        concat!(
                            "mcr p15, ", stringify!($opc1), ", {value}, ",
                            stringify!($crn), ", ", stringify!($crm), ", ", stringify!($opc2)
                        ),
                        options(nostack, preserves_flags),
                        value = in(reg) value,
                    );
                }
            }
        }
    };
}

/// Invalidates all branch predictors on this core (BPIALL).
#[inline(always)]
pub fn invalidate_bpiall() {
    // SAFETY: Invalidating the branch predictor only affects performance, never correctness.
    unsafe {
        asm!(
            "mcr p15, 0, {zero}, c7, c5, 6",
            options(nomem, nostack, preserves_flags),
            zero = in(reg) 0u32,
        );
    }
}

/// Invalidates the whole instruction cache to PoU on this core (ICIALLU).
///
/// On cores with ACTLR.IBE set this also invalidates the BTB.
#[inline(always)]
pub fn invalidate_iciallu() {
    // SAFETY: Invalidating the instruction cache only affects performance, never correctness.
    unsafe {
        asm!(
            "mcr p15, 0, {zero}, c7, c5, 0",
            options(nomem, nostack, preserves_flags),
            zero = in(reg) 0u32,
        );
    }
}

/// Instruction synchronisation barrier.
#[inline(always)]
pub fn isb() {
    // SAFETY: A barrier has no side effects beyond ordering.
    unsafe {
        asm!("isb", options(nostack, preserves_flags));
    }
}
