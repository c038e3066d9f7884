#[derive(Clone, Copy, Debug)]
pub(crate) struct Fnv1a64(u64);

impl Fnv1a64 {
    const OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01B3;

    pub(crate) fn new_default() -> Self {
        Self(Self::OFFSET_BASIS)
    }

    pub(crate) fn write_u8(&mut self, v: u8) {
        self.write_bytes(&[v]);
    }

    pub(crate) fn write_u64(&mut self, v: u64) {
        self.write_bytes(&v.to_le_bytes());
    }

    pub(crate) fn write_bytes(&mut self, bytes: &[u8]) {
        let mut h = self.0;
        for &b in bytes {
            h ^= u64::from(b);
            h = h.wrapping_mul(Self::PRIME);
        }
        self.0 = h;
    }

    pub(crate) fn finish(self) -> u64 {
        self.0
    }
}

/// Derive a per-scenario RNG seed from a base seed and the scenario identity.
///
/// Renders running in parallel each get their own stream, and the same (seed, scenario) pair
/// always lays out identically.
pub(crate) fn scenario_seed(base: u64, scenario_id: &str) -> u64 {
    let mut h = Fnv1a64::new_default();
    h.write_u64(base);
    h.write_u8(0);
    h.write_bytes(scenario_id.as_bytes());
    h.finish()
}

pub(crate) fn mul_div255_u16(x: u16, y: u16) -> u16 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u16
}

pub(crate) fn mul_div255_u8(x: u16, y: u16) -> u8 {
    mul_div255_u16(x, y) as u8
}

/// Convert decibels to linear amplitude.
pub(crate) fn db_to_amplitude(db: f32) -> f32 {
    10f32.powf(db / 20.0)
}

/// Convert linear amplitude to decibels; silence maps to negative infinity.
pub(crate) fn amplitude_to_db(amp: f32) -> f32 {
    if amp <= 0.0 {
        return f32::NEG_INFINITY;
    }
    20.0 * amp.log10()
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
