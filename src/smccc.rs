// Copyright The Rusted Firmware-A Contributors.
//
// SPDX-License-Identifier: BSD-3-Clause

//! Types and helpers related to the SMC Calling Convention.

use core::fmt::{self, Debug, Display, Formatter};
use num_enum::FromPrimitive;

const FAST_CALL: u32 = 0x8000_0000;
const OEN_MASK: u32 = 0x3f00_0000;
const OEN_SHIFT: u8 = 24;

/// Owning Entity Number (OEN)
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct OwningEntityNumber(pub u8);

impl OwningEntityNumber {
    /// Arm Architecture calls.
    pub const ARM_ARCHITECTURE: Self = Self(0);
    /// Standard Secure Service calls, including PSCI.
    pub const STANDARD_SECURE: Self = Self(4);
}

/// An SMCCC function ID.
#[derive(Copy, Clone, Eq, PartialEq)]
#[repr(transparent)]
pub struct FunctionId(pub u32);

impl FunctionId {
    /// `SMCCC_VERSION`
    pub const SMCCC_VERSION: Self = Self::fast32(OwningEntityNumber::ARM_ARCHITECTURE, 0x0000);
    /// `SMCCC_ARCH_FEATURES`
    pub const SMCCC_ARCH_FEATURES: Self =
        Self::fast32(OwningEntityNumber::ARM_ARCHITECTURE, 0x0001);
    /// `SMCCC_ARCH_WORKAROUND_1`: mitigation for CVE-2017-5715 on the calling PE.
    pub const SMCCC_ARCH_WORKAROUND_1: Self =
        Self::fast32(OwningEntityNumber::ARM_ARCHITECTURE, 0x8000);
    /// `PSCI_VERSION`
    pub const PSCI_VERSION: Self = Self::fast32(OwningEntityNumber::STANDARD_SECURE, 0x0000);
    /// `PSCI_FEATURES`
    pub const PSCI_FEATURES: Self = Self::fast32(OwningEntityNumber::STANDARD_SECURE, 0x000a);

    /// Creates the ID of an SMC32/HVC32 fast call.
    pub const fn fast32(oen: OwningEntityNumber, number: u16) -> Self {
        Self(FAST_CALL | (((oen.0 as u32) << OEN_SHIFT) & OEN_MASK) | (number as u32))
    }

    /// Returns the Owning Entity Number of the function ID.
    pub fn oen(self) -> OwningEntityNumber {
        OwningEntityNumber(((self.0 & OEN_MASK) >> OEN_SHIFT) as u8)
    }

    /// Returns the lower 16 bits of the function ID.
    pub fn number(self) -> u16 {
        self.0 as u16
    }
}

impl Display for FunctionId {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{:#010x}", self.0)
    }
}

impl Debug for FunctionId {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{:#010x} (OEN {})", self.0, self.oen().0)
    }
}

/// A negative return code from an SMCCC call.
#[derive(Copy, Clone, Debug, Eq, PartialEq, FromPrimitive)]
#[repr(i32)]
pub enum SmcccError {
    /// The call is not supported by the implementation.
    NotSupported = -1,
    /// The call is deemed not required by the implementation.
    NotRequired = -2,
    /// One of the call parameters has a non-supported value.
    InvalidParameter = -3,
    /// Some other negative value.
    #[num_enum(catch_all)]
    Unknown(i32) = i32::MIN,
}

impl SmcccError {
    /// Returns the raw value placed in r0 for this error.
    pub fn code(self) -> u32 {
        i32::from(self) as u32
    }
}

impl From<SmcccError> for i32 {
    fn from(error: SmcccError) -> Self {
        match error {
            SmcccError::NotSupported => -1,
            SmcccError::NotRequired => -2,
            SmcccError::InvalidParameter => -3,
            SmcccError::Unknown(code) => code,
        }
    }
}

impl Display for SmcccError {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            Self::NotSupported => write!(f, "not supported"),
            Self::NotRequired => write!(f, "not required"),
            Self::InvalidParameter => write!(f, "invalid parameter"),
            Self::Unknown(code) => write!(f, "unknown error {code}"),
        }
    }
}

/// Interprets the r0 value returned by an SMCCC call, where any negative value is an error.
pub fn decode_result(r0: u32) -> Result<u32, SmcccError> {
    let value = r0 as i32;
    if value < 0 {
        Err(SmcccError::from(value))
    } else {
        Ok(r0)
    }
}

/// A version number as returned by `SMCCC_VERSION` or `PSCI_VERSION`.
#[derive(Copy, Clone, Debug, Eq, Ord, PartialEq, PartialOrd)]
pub struct Version {
    /// The major version, bits [30:16].
    pub major: u16,
    /// The minor version, bits [15:0].
    pub minor: u16,
}

impl Version {
    /// Version 1.0, also assumed when firmware does not implement `SMCCC_VERSION`.
    pub const V1_0: Self = Self::new(1, 0);
    /// Version 1.1, the first to provide `SMCCC_ARCH_FEATURES`.
    pub const V1_1: Self = Self::new(1, 1);

    /// Creates a version from its components.
    pub const fn new(major: u16, minor: u16) -> Self {
        Self { major, minor }
    }

    /// Decodes a version from the non-negative value returned in r0.
    pub const fn from_bits(bits: u32) -> Self {
        Self {
            major: ((bits >> 16) & 0x7fff) as u16,
            minor: bits as u16,
        }
    }

    /// Encodes the version as it is returned in r0.
    pub const fn bits(self) -> u32 {
        ((self.major as u32) << 16) | self.minor as u32
    }
}

impl Display for Version {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// The instruction used to reach platform firmware.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Conduit {
    /// `hvc #0`, handled by a hypervisor at PL2.
    Hvc,
    /// `smc #0`, handled by the secure monitor.
    Smc,
}

impl Display for Conduit {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            Self::Hvc => write!(f, "HVC"),
            Self::Smc => write!(f, "SMC"),
        }
    }
}

/// Something which can make SMCCC fast calls to platform firmware.
///
/// Only the SMC32/HVC32 convention with up to three arguments is needed: arguments go in r1-r3
/// and results come back in r0-r3.
pub trait Firmware {
    /// Makes the call `function` through `conduit`, returning r0-r3.
    fn call(&self, conduit: Conduit, function: FunctionId, args: [u32; 3]) -> [u32; 4];
}

/// Makes real `smc #0` and `hvc #0` calls.
#[cfg(all(target_arch = "arm", not(test)))]
pub struct SmcccFirmware;

#[cfg(all(target_arch = "arm", not(test)))]
impl Firmware for SmcccFirmware {
    fn call(&self, conduit: Conduit, function: FunctionId, args: [u32; 3]) -> [u32; 4] {
        let mut regs = [function.0, args[0], args[1], args[2]];
        match conduit {
            // SAFETY: SMCCC v1.1 calls only modify r0-r3, and the firmware we call is trusted.
            Conduit::Hvc => unsafe {
                core::arch::asm!(
                    ".arch_extension virt",
                    "hvc #0",
                    inout("r0") regs[0],
                    inout("r1") regs[1],
                    inout("r2") regs[2],
                    inout("r3") regs[3],
                    options(nostack),
                );
            },
            // SAFETY: SMCCC v1.1 calls only modify r0-r3, and the firmware we call is trusted.
            Conduit::Smc => unsafe {
                core::arch::asm!(
                    ".arch_extension sec",
                    "smc #0",
                    inout("r0") regs[0],
                    inout("r1") regs[1],
                    inout("r2") regs[2],
                    inout("r3") regs[3],
                    options(nostack),
                );
            },
        }
        regs
    }
}
