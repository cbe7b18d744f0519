use palette::{FromColor, Hsl, Srgb};

/// A color packed as `0x00RRGGBB`, the format the display side consumes.
pub type PackedColor = u32;

// Level 0 is off.
pub const BRIGHTEST_LEVEL: u8 = 5;

pub fn pack(color: Srgb<u8>) -> PackedColor {
    ((color.red as u32) << 16) | ((color.green as u32) << 8) | color.blue as u32
}

pub fn unpack(packed: PackedColor) -> Srgb<u8> {
    Srgb::new(
        ((packed >> 16) & 0xFF) as u8,
        ((packed >> 8) & 0xFF) as u8,
        (packed & 0xFF) as u8,
    )
}

/// The tail fades one level per pixel and stays at 0 once it runs out of levels.
pub fn level_for_tail_index(j: usize) -> u8 {
    (BRIGHTEST_LEVEL as usize).saturating_sub(j + 1) as u8
}

pub fn scale_to_level(color: PackedColor, level: u8) -> PackedColor {
    let level = level.min(BRIGHTEST_LEVEL);
    if level == BRIGHTEST_LEVEL {
        return color;
    }

    let factor = level as f32 / BRIGHTEST_LEVEL as f32;
    let rgb = unpack(color).into_format::<f32>();
    let scaled = Srgb::new(rgb.red * factor, rgb.green * factor, rgb.blue * factor);
    pack(scaled.into_format())
}

pub fn apply_master_brightness(color: PackedColor, percent: u8) -> PackedColor {
    if percent >= 100 || color == 0 {
        return color;
    }

    let mut hsl: Hsl = Hsl::from_color(unpack(color).into_format::<f32>());
    hsl.lightness = (hsl.lightness * percent as f32 / 100.0).min(1.0);
    let rgb: Srgb<f32> = Srgb::from_color(hsl);
    pack(rgb.into_format())
}
