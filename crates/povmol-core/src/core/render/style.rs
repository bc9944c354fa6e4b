use super::primitives::{Color, Texture};
use phf::phf_map;

/// Color used for elements missing from [`ATOM_COLORS`].
pub const FALLBACK_COLOR: Color = [0.0, 1.0, 1.0];
/// Radius used for elements missing from [`ATOM_RADII`].
pub const FALLBACK_RADIUS: f64 = 0.5;

const ATOM_PHONG: f64 = 0.9;
const STICK_PHONG: f64 = 0.3;
const ATOM_REFLECTION: f64 = 0.1;

/// Color identifier for label text, resolved by `colors.inc`.
pub const TEXT_COLOR: &str = "Gold";
pub const TEXT_FONT: &str = "timrom.ttf";

/// Per-element sphere colors. Keys are the symbols as they appear in the
/// structure file, which is why the hydroxyl and polar-hydrogen pseudo
/// elements used by some generators are listed as well.
pub static ATOM_COLORS: phf::Map<&'static str, Color> = phf_map! {
    "C" => [0.4, 0.4, 0.4],
    "H" => [1.0, 1.0, 1.0],
    "N" => [0.0, 0.0, 1.0],
    "O" => [1.0, 0.0, 0.0],
    "P" => [1.0, 0.5, 0.0],
    "S" => [0.6, 0.8, 0.2],
    "OH" => [1.0, 0.0, 0.0],
    "HH" => [1.0, 1.0, 1.0],
    "Cr" => [0.0, 1.0, 0.0],
};

/// Per-element sphere radii in scene units.
pub static ATOM_RADII: phf::Map<&'static str, f64> = phf_map! {
    "C" => 1.0,
    "H" => 0.65,
    "HH" => 0.65,
    "N" => 0.9,
    "O" => 1.0,
    "S" => 1.2,
    "OH" => 1.0,
    "P" => 1.25,
    "Cr" => 1.0,
};

pub fn is_known_element(element: &str) -> bool {
    ATOM_COLORS.contains_key(element)
}

pub fn element_color(element: &str) -> Color {
    ATOM_COLORS.get(element).copied().unwrap_or(FALLBACK_COLOR)
}

pub fn element_radius(element: &str) -> f64 {
    ATOM_RADII.get(element).copied().unwrap_or(FALLBACK_RADIUS)
}

/// Texture for an atom sphere in the space-filling model.
pub fn atom_texture(element: &str) -> Texture {
    Texture::rgb(element_color(element), ATOM_PHONG, ATOM_REFLECTION)
}

/// Texture for one half of a bond cylinder in the ball-and-stick model.
pub fn stick_texture(element: &str) -> Texture {
    Texture::rgb(element_color(element), STICK_PHONG, ATOM_REFLECTION)
}

pub fn text_texture() -> Texture {
    Texture::named(TEXT_COLOR, 0.6, 0.4)
}
