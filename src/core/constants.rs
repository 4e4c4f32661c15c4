//! Mathematical constants used by the phase and evolution code.

/// Constants shared across the simulator
pub mod nlq_constants {
    /// 1/φ (φ the golden ratio), the fractional increment used to disperse seed phases.
    pub const PHI_INV: f64 = 0.618_033_988_749_895;
    /// Used for phase angles (`e^(iθ)`)
    pub const PI: f64 = std::f64::consts::PI;
    /// Full turn.
    pub const TAU: f64 = std::f64::consts::TAU;
    /// Weights or energies below this are treated as zero.
    pub const WEIGHT_TOLERANCE: f64 = 1e-12;
}
