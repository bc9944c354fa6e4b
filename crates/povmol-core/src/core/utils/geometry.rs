use nalgebra::{Point3, Rotation3, Unit, Vector3};

/// Smallest axis length accepted by [`rotation_about_axis`].
pub const AXIS_EPSILON: f64 = 1e-12;

/// Unweighted arithmetic mean of a set of positions.
///
/// Every position counts equally, so this is a geometric centroid and not a
/// mass-weighted center of mass.
///
/// # Return
///
/// Returns `None` when `positions` is empty.
pub fn centroid<'a, I>(positions: I) -> Option<Point3<f64>>
where
    I: IntoIterator<Item = &'a Point3<f64>>,
{
    let (sum, count) = positions
        .into_iter()
        .fold((Vector3::zeros(), 0usize), |(sum, count), p| {
            (sum + p.coords, count + 1)
        });
    if count == 0 {
        None
    } else {
        Some(Point3::from(sum / count as f64))
    }
}

/// Rotation by `theta` radians about `axis`, right-handed.
///
/// The axis does not have to be normalized. The result equals the matrix
/// exponential `exp(theta * [k]x)` of the cross-product generator of the unit
/// axis `k`, which nalgebra evaluates in closed form (Rodrigues' formula).
///
/// # Return
///
/// Returns `None` for an axis shorter than [`AXIS_EPSILON`] or containing
/// non-finite components.
pub fn rotation_about_axis(axis: &Vector3<f64>, theta: f64) -> Option<Rotation3<f64>> {
    if !axis.iter().all(|c| c.is_finite()) {
        return None;
    }
    Unit::try_new(*axis, AXIS_EPSILON).map(|unit| Rotation3::from_axis_angle(&unit, theta))
}

/// Rotates `point` about `pivot`.
pub fn rotate_about(point: &Point3<f64>, pivot: &Point3<f64>, rotation: &Rotation3<f64>) -> Point3<f64> {
    pivot + rotation * (point - pivot)
}

/// Angles (degrees) that turn text lying in the xy-plane towards `viewer`.
///
/// Returns `(x_angle, y_angle)`, measured with `atan2` on the coordinate
/// differences `subject - viewer` against the z difference.
pub fn facing_angles(subject: &Point3<f64>, viewer: &Point3<f64>) -> (f64, f64) {
    let d = subject - viewer;
    let y_angle = d.x.atan2(d.z).to_degrees();
    let x_angle = d.y.atan2(d.z).to_degrees();
    (x_angle, y_angle)
}

/// Unit vector pointing from `from` towards `to`, if the points are distinct.
pub fn direction(from: &Point3<f64>, to: &Point3<f64>) -> Option<Vector3<f64>> {
    (to - from).try_normalize(f64::EPSILON)
}

pub fn midpoint(a: &Point3<f64>, b: &Point3<f64>) -> Point3<f64> {
    nalgebra::center(a, b)
}
