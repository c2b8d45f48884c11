// Copyright The Rusted Firmware-A Contributors.
//
// SPDX-License-Identifier: BSD-3-Clause

//! Logical numbering of the cores in the system.

use armv7_sysregs::{Mpidr, read_mpidr};
use percore::Cores;

/// Armv7-A clusters have at most four cores.
pub const CORES_PER_CLUSTER: usize = 4;

/// Returns the logical index of the core with the given MPIDR.
///
/// Cores are numbered by cluster (Aff1) and then by core within the cluster (Aff0). A uniprocessor
/// implementation without the Multiprocessing Extensions is core 0.
pub fn core_position(mpidr: Mpidr) -> usize {
    if !mpidr.contains(Mpidr::M) || mpidr.contains(Mpidr::U) {
        return 0;
    }
    usize::from(mpidr.aff1()) * CORES_PER_CLUSTER + usize::from(mpidr.aff0())
}

/// Implementation of the `Cores` trait to get the index of the current CPU core.
pub struct CoresImpl;

// SAFETY: Aff0 is below `CORES_PER_CLUSTER` on every supported part and (Aff1, Aff0) is unique per
// core, so `core_position` never returns the same index for different cores.
unsafe impl Cores for CoresImpl {
    fn core_index() -> usize {
        core_position(read_mpidr())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake::exclusive_sysregs;
    use armv7_sysregs::fake::SYSREGS;

    #[test]
    fn positions() {
        assert_eq!(core_position(Mpidr::M), 0);
        assert_eq!(core_position(Mpidr::M | Mpidr::from_bits_retain(0x0003)), 3);
        assert_eq!(core_position(Mpidr::M | Mpidr::from_bits_retain(0x0102)), 6);
    }

    #[test]
    fn uniprocessor() {
        assert_eq!(core_position(Mpidr::empty()), 0);
        assert_eq!(
            core_position(Mpidr::M | Mpidr::U | Mpidr::from_bits_retain(0x0001)),
            0
        );
    }

    #[test]
    fn current_core() {
        let _guard = exclusive_sysregs();
        SYSREGS.lock().unwrap().mpidr = Mpidr::M | Mpidr::from_bits_retain(0x0100);
        assert_eq!(CoresImpl::core_index(), 4);
    }
}
