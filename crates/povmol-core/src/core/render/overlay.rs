//! Geometry for the overlays drawn on top of the atom spheres: camera-facing
//! text labels and bi-colored bond sticks.

use super::primitives::{Primitive, TextTransform};
use super::style;
use crate::core::utils::geometry::{direction, facing_angles, midpoint};
use nalgebra::{Point3, Vector3};

/// Distance from the atom center to the label anchor, in atom radii.
const LABEL_DISTANCE_FACTOR: f64 = 1.2;
/// Per-character correction for left-aligned glyphs (x, y).
const LETTER_OFFSET: (f64, f64) = (0.15, 0.13);
/// Shift along z that pushes the engraved text out of the atom surface.
const EMBOSS: f64 = -0.15;
const TEXT_SCALE: f64 = 0.35;
const TEXT_THICKNESS: f64 = 1.0;

/// What an atom label shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LabelKind {
    /// The element symbol.
    Element,
    /// The atom's index in the molecule.
    Index,
}

/// Builds a label that sits on the camera-facing side of an atom.
///
/// The text is anchored on the line from the atom center to the camera, just
/// outside the sphere, rotated to face the camera and clipped by a sphere of
/// the atom's own extent so only the visible face shows it.
pub fn atom_label(
    center: &Point3<f64>,
    radius: f64,
    text: &str,
    camera_location: &Point3<f64>,
) -> Primitive {
    // A camera sitting inside the atom has no defined facing; fall back to -z,
    // where the stock cameras look from.
    let towards_camera = direction(center, camera_location).unwrap_or(-Vector3::z());
    let chars = text.chars().count() as f64;
    let letter_offset = Vector3::new(LETTER_OFFSET.0 * chars, LETTER_OFFSET.1 * chars, 0.0);
    let anchor = center + towards_camera * (radius * LABEL_DISTANCE_FACTOR) - letter_offset;

    let (x_angle, y_angle) = facing_angles(center, camera_location);
    let glyphs = Primitive::Text {
        font: style::TEXT_FONT.to_string(),
        text: text.to_string(),
        thickness: TEXT_THICKNESS,
        transform: TextTransform {
            scale: TEXT_SCALE,
            rotate: Vector3::new(-x_angle, y_angle, 0.0),
            translate: anchor.coords,
        },
        texture: style::text_texture(),
    };
    let clip = Primitive::sphere(*center, radius, style::text_texture());

    Primitive::Intersection {
        members: vec![clip, glyphs],
        translate: Some(Vector3::new(0.0, 0.0, EMBOSS)),
    }
}

/// Two half-cylinders joining `a` and `b` at their midpoint, each colored by
/// the element at its end.
pub fn bond_sticks(
    a: &Point3<f64>,
    a_element: &str,
    b: &Point3<f64>,
    b_element: &str,
    radius: f64,
) -> [Primitive; 2] {
    let mid = midpoint(a, b);
    [
        Primitive::cylinder(*a, mid, radius, style::stick_texture(a_element)),
        Primitive::cylinder(mid, *b, radius, style::stick_texture(b_element)),
    ]
}
