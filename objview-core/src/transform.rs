/// Rotation bookkeeping and transformation matrices
use nalgebra::{Matrix4, Point3, Unit, Vector3};

/// Accumulated absolute rotation per axis (in degrees)
///
/// Each call to [`RotationState::advance`] treats its angle as the absolute
/// target for the given axis and returns only the increment needed to get
/// there, so a slider that reports absolute angles can be fed straight in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotationState {
    angles: Vector3<f32>,
}

impl RotationState {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self {
            angles: Vector3::new(x, y, z),
        }
    }

    pub fn zero() -> Self {
        Self {
            angles: Vector3::zeros(),
        }
    }

    /// Current accumulated angles as an `(x, y, z)` vector
    pub fn angles(&self) -> Vector3<f32> {
        self.angles
    }

    /// Angle already applied along `axis`
    pub fn along(&self, axis: &Unit<Vector3<f32>>) -> f32 {
        self.angles.dot(axis.as_ref())
    }

    /// Increment needed to reach `target` degrees along `axis`
    pub fn delta_to(&self, target: f32, axis: &Unit<Vector3<f32>>) -> f32 {
        target - self.along(axis)
    }

    /// Fold `target` into the accumulator and return the increment applied
    pub fn advance(&mut self, target: f32, axis: &Unit<Vector3<f32>>) -> f32 {
        let diff = self.delta_to(target, axis);
        self.angles += axis.into_inner() * diff;
        diff
    }

    pub fn reset(&mut self) {
        self.angles = Vector3::zeros();
    }
}

impl Default for RotationState {
    fn default() -> Self {
        Self::zero()
    }
}

/// Transform builder for 3D transformations
pub struct Transform;

impl Transform {
    /// Right-handed rotation of `degrees` about `axis`
    pub fn rotation_about(degrees: f32, axis: &Unit<Vector3<f32>>) -> Matrix4<f32> {
        Matrix4::from_axis_angle(axis, degrees.to_radians())
    }

    /// Rotation of `degrees` about `axis` through `pivot`
    pub fn rotation_around(
        degrees: f32,
        axis: &Unit<Vector3<f32>>,
        pivot: &Point3<f32>,
    ) -> Matrix4<f32> {
        let to_origin = Self::translation_matrix(&-pivot.coords);
        let back = Self::translation_matrix(&pivot.coords);
        back * Self::rotation_about(degrees, axis) * to_origin
    }

    /// Create a translation matrix
    pub fn translation_matrix(offset: &Vector3<f32>) -> Matrix4<f32> {
        Matrix4::new_translation(offset)
    }
}
