//! Scoped denormal protection
//!
//! IIR tails decay into subnormal range on silence, which is very slow on
//! most CPUs. `DenormalGuard` switches the current thread to flush-to-zero
//! for its lifetime and restores the previous floating-point control state
//! when dropped.

/// FTZ (bit 15) | DAZ (bit 6)
#[cfg(target_arch = "x86_64")]
const MXCSR_FTZ_DAZ: u32 = 0x8040;

/// FPCR.FZ
#[cfg(target_arch = "aarch64")]
const FPCR_FZ: u64 = 1 << 24;

/// RAII flush-to-zero scope for the current thread
#[derive(Debug)]
pub struct DenormalGuard {
    #[cfg(any(target_arch = "x86_64", target_arch = "aarch64"))]
    previous: u64,
}

impl DenormalGuard {
    pub fn new() -> Self {
        #[cfg(any(target_arch = "x86_64", target_arch = "aarch64"))]
        {
            let previous = read_control();
            write_control(previous | flush_bits());
            Self { previous }
        }

        #[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
        {
            Self {}
        }
    }
}

impl Default for DenormalGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for DenormalGuard {
    fn drop(&mut self) {
        #[cfg(any(target_arch = "x86_64", target_arch = "aarch64"))]
        write_control(self.previous);
    }
}

/// Whether the current thread flushes denormals to zero
pub fn denormals_are_zero() -> bool {
    #[cfg(any(target_arch = "x86_64", target_arch = "aarch64"))]
    {
        read_control() & flush_bits() == flush_bits()
    }

    #[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
    {
        false
    }
}

#[cfg(target_arch = "x86_64")]
#[inline]
fn flush_bits() -> u64 {
    MXCSR_FTZ_DAZ as u64
}

#[cfg(target_arch = "aarch64")]
#[inline]
fn flush_bits() -> u64 {
    FPCR_FZ
}

#[cfg(target_arch = "x86_64")]
#[inline]
#[allow(deprecated)]
fn read_control() -> u64 {
    // Safety: reading MXCSR has no side effects
    unsafe { std::arch::x86_64::_mm_getcsr() as u64 }
}

#[cfg(target_arch = "x86_64")]
#[inline]
#[allow(deprecated)]
fn write_control(value: u64) {
    // Safety: only FP rounding/flush behavior of the current thread changes
    unsafe { std::arch::x86_64::_mm_setcsr(value as u32) }
}

#[cfg(target_arch = "aarch64")]
#[inline]
fn read_control() -> u64 {
    let value: u64;
    // Safety: reading FPCR has no side effects
    unsafe { std::arch::asm!("mrs {}, fpcr", out(reg) value, options(nomem, nostack)) };
    value
}

#[cfg(target_arch = "aarch64")]
#[inline]
fn write_control(value: u64) {
    // Safety: only FP flush behavior of the current thread changes
    unsafe { std::arch::asm!("msr fpcr, {}", in(reg) value, options(nomem, nostack)) };
}
