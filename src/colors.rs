//! Packed ARGB8888 colors.
//!
//! The framebuffer stores one `u32` per pixel in `0xAARRGGBB` order, which is
//! what SDL's `ARGB8888` streaming texture expects.

/// Fallback for the scene background.
pub const BACKGROUND: u32 = 0xFFA5BDFF;
/// Color of the floor quad.
pub const FLOOR: u32 = 0xFFEEEEEE;
/// Surface color of loaded models.
pub const MODEL: u32 = 0xFFA08A7A;
/// Surface color of clip plane objects.
pub const PLANE: u32 = 0xFF38382F;
/// Controller ray.
pub const RAY: u32 = 0xFFFFFFFF;

/// Splits a packed color into RGB components in [0.0, 1.0].
#[inline]
pub fn unpack_color(color: u32) -> (f32, f32, f32) {
    let r = ((color >> 16) & 0xFF) as f32 / 255.0;
    let g = ((color >> 8) & 0xFF) as f32 / 255.0;
    let b = (color & 0xFF) as f32 / 255.0;
    (r, g, b)
}

/// Packs RGBA components in [0.0, 1.0] into a color. Values are clamped.
#[inline]
pub fn pack_color(r: f32, g: f32, b: f32, a: f32) -> u32 {
    let to_byte = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u32;
    (to_byte(a) << 24) | (to_byte(r) << 16) | (to_byte(g) << 8) | to_byte(b)
}

/// Scales the RGB channels by `intensity`, then adds `emissive`.
#[inline]
pub fn shade(color: u32, intensity: f32, emissive: (f32, f32, f32)) -> u32 {
    let (r, g, b) = unpack_color(color);
    pack_color(
        r * intensity + emissive.0,
        g * intensity + emissive.1,
        b * intensity + emissive.2,
        1.0,
    )
}

/// Parses `#rrggbb`, `rrggbb` or `0xrrggbb` into an opaque color.
pub fn parse_hex(text: &str) -> Option<u32> {
    let digits = text
        .trim()
        .trim_start_matches('#')
        .trim_start_matches("0x")
        .trim_start_matches("0X");
    if digits.len() != 6 {
        return None;
    }
    u32::from_str_radix(digits, 16).ok().map(|rgb| 0xFF00_0000 | rgb)
}

/// RGBA bytes for image export.
#[inline]
pub fn to_rgba(color: u32) -> [u8; 4] {
    [
        ((color >> 16) & 0xFF) as u8,
        ((color >> 8) & 0xFF) as u8,
        (color & 0xFF) as u8,
        ((color >> 24) & 0xFF) as u8,
    ]
}
