//! Color space conversion and splat color packing.
//!
//! All sampling and splat building happens in **linear RGB**. Convert to or
//! from sRGB only at system boundaries (e.g. vertex colors read from OBJ
//! files, which are conventionally sRGB-encoded).
//!
//! Splat artifacts store view-independent color as the DC coefficient of a
//! spherical-harmonics expansion, so the serializer packs each linear
//! channel c as `(c - 0.5) / SH_C0` into the `f_dc_*` fields.

/// The degree-0 spherical harmonics basis constant Y₀⁰.
pub const SH_C0: f32 = 0.282_094_79;

/// Pack a linear [0, 1] color channel into an SH DC coefficient.
pub fn pack_sh_dc(c: f32) -> f32 {
    (c - 0.5) / SH_C0
}

/// Unpack an SH DC coefficient back into a linear color channel.
///
/// Does not clamp: values outside [0, 1] are preserved so round-trips are
/// exact; clamping is the reader's decision.
pub fn unpack_sh_dc(dc: f32) -> f32 {
    dc * SH_C0 + 0.5
}

/// Convert an sRGB-encoded channel (0.0-1.0) to linear (0.0-1.0).
///
/// Uses the official sRGB transfer function with breakpoint at 0.04045,
/// not the gamma 2.2 approximation.
pub fn srgb_to_linear(cs: f32) -> f32 {
    if cs <= 0.04045 {
        cs / 12.92
    } else {
        ((cs + 0.055) / 1.055).powf(2.4)
    }
}

/// Convert a linear channel (0.0-1.0) to sRGB encoding (0.0-1.0).
pub fn linear_to_srgb(x: f32) -> f32 {
    let x = x.clamp(0.0, 1.0);
    if x <= 0.0031308 {
        12.92 * x
    } else {
        1.055 * x.powf(1.0 / 2.4) - 0.055
    }
}
