/// Rescale and recenter a freshly loaded mesh into the unit frame
use nalgebra::{Point3, Vector3};
use tracing::{debug, warn};

use crate::geometry::{centroid, BoundingBox};

/// Outcome of [`normalize`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Normalization {
    /// Uniform factor applied to every axis.
    pub scale: f64,
    /// Centroid after recentering; the origin up to rounding.
    pub center: Point3<f32>,
    /// The bounding box had no extent (or there were no vertices), so the
    /// scale was pinned to 1.
    pub degenerate: bool,
}

/// Normalize `vertices` in place.
///
/// The bounding box is mapped so that its longest side spans `[-1, 1]`, every
/// axis sharing the same factor, and the mesh is then shifted so that its
/// centroid sits at the origin. The returned center is recomputed from the
/// shifted vertices rather than assumed to be zero.
///
/// The range and remap are computed in `f64`, so any finite input lands
/// inside `[-1, 1]` even when its extent overflows `f32`.
pub fn normalize(vertices: &mut [Point3<f32>]) -> Normalization {
    let Some(bounds) = BoundingBox::from_points(vertices) else {
        warn!("Normalizing an empty mesh; nothing to do");
        return Normalization {
            scale: 1.0,
            center: Point3::origin(),
            degenerate: true,
        };
    };

    let min = bounds.min.cast::<f64>();
    let max_range = (bounds.max.cast::<f64>() - min).max();
    let degenerate = !(max_range > 0.0 && max_range.is_finite());
    let scale = if degenerate { 1.0 } else { 2.0 / max_range };
    if degenerate {
        warn!(
            "Degenerate mesh: bounding box range {:?}, using unit scale",
            bounds.range()
        );
    }

    let unit = Vector3::repeat(1.0);
    for vertex in vertices.iter_mut() {
        let remapped = (vertex.cast::<f64>() - min) * scale - unit;
        *vertex = Point3::from(remapped.cast::<f32>());
    }

    let mut center = centroid(vertices).unwrap_or_else(Point3::origin);
    for vertex in vertices.iter_mut() {
        *vertex -= center.coords;
    }
    center = centroid(vertices).unwrap_or_else(Point3::origin);

    debug!(
        "Normalized {} vertices: scale {}, residual center {:?}",
        vertices.len(),
        scale,
        center
    );

    Normalization {
        scale,
        center,
        degenerate,
    }
}
