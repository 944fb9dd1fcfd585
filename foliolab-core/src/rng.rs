//! Deterministic seeded generator.
//!
//! A 31-bit linear-congruential generator: `state = (state * 1103515245 + 12345) mod 2^31`.
//! Each simulation constructs its own instance from an explicit seed; nothing is
//! shared between calls, so repeated or concurrent runs with the same seed
//! produce bit-identical draws.

use rand::RngCore;

const MULTIPLIER: u64 = 1_103_515_245;
const INCREMENT: u64 = 12_345;
const MASK: u64 = 0x7fff_ffff;
const DIVISOR: f64 = 2_147_483_647.0;

/// 31-bit LCG with uniform `f64` draws.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lcg31 {
    state: u64,
}

impl Lcg31 {
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    pub fn state(&self) -> u64 {
        self.state
    }

    /// Advance and return the new 31-bit state.
    pub fn next_state(&mut self) -> u32 {
        // Only the low 31 bits survive, so wrapping modulo 2^64 is exact.
        self.state = self
            .state
            .wrapping_mul(MULTIPLIER)
            .wrapping_add(INCREMENT)
            & MASK;
        self.state as u32
    }

    /// Next draw as `state / (2^31 - 1)`.
    pub fn next_f64(&mut self) -> f64 {
        self.next_state() as f64 / DIVISOR
    }

    /// A symmetric move in `[-half_width, half_width]`.
    pub fn symmetric(&mut self, half_width: f64) -> f64 {
        (self.next_f64() - 0.5) * 2.0 * half_width
    }
}

/// Lets callers drive `rand` distributions from the same reproducible stream.
/// The engine itself only uses `next_f64` and `symmetric`.
impl RngCore for Lcg31 {
    fn next_u32(&mut self) -> u32 {
        self.next_state()
    }

    fn next_u64(&mut self) -> u64 {
        let hi = self.next_state() as u64;
        let lo = self.next_state() as u64;
        (hi << 31) | lo
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(4) {
            let bytes = self.next_state().to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}
