/// Pending transform deltas and their conversion to a single affine matrix
use nalgebra::{Matrix4, Vector3};
use tracing::debug;

use crate::error::{TransformError, TransformResult};
use crate::geometry::Axis;

/// Translation, rotation and uniform scale collected since the last apply
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransformParameters {
    /// Model-space offset per axis
    pub translation: Vector3<f32>,
    /// Rotation per axis, in degrees
    pub rotation_degrees: Vector3<f32>,
    /// Uniform scale factor, always > 0
    pub scale: f32,
}

impl TransformParameters {
    pub fn identity() -> Self {
        Self {
            translation: Vector3::zeros(),
            rotation_degrees: Vector3::zeros(),
            scale: 1.0,
        }
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::identity()
    }

    /// Compose scale, then rotation about X, Y and Z, then translation
    pub fn to_matrix(&self) -> Matrix4<f32> {
        let radians = self.rotation_degrees.map(f32::to_radians);
        Transform::translation_matrix(&self.translation)
            * Transform::rotation_matrix(&radians)
            * Transform::scale_matrix(self.scale)
    }
}

impl Default for TransformParameters {
    fn default() -> Self {
        Self::identity()
    }
}

/// Transform builder for 3D transformations
pub struct Transform;

impl Transform {
    /// Rotation from per-axis angles in radians, applied X first, then Y, then Z
    pub fn rotation_matrix(radians: &Vector3<f32>) -> Matrix4<f32> {
        let rx = Matrix4::new_rotation(Vector3::new(radians.x, 0.0, 0.0));
        let ry = Matrix4::new_rotation(Vector3::new(0.0, radians.y, 0.0));
        let rz = Matrix4::new_rotation(Vector3::new(0.0, 0.0, radians.z));

        rz * ry * rx
    }

    pub fn translation_matrix(offset: &Vector3<f32>) -> Matrix4<f32> {
        Matrix4::new_translation(offset)
    }

    pub fn scale_matrix(factor: f32) -> Matrix4<f32> {
        Matrix4::new_scaling(factor)
    }
}

/// Collects transform deltas until [`TransformAccumulator::consume_and_reset`]
/// turns them into one matrix.
///
/// Translation and rotation deltas are summed per axis. Scale is absolute:
/// each call replaces the pending factor.
#[derive(Debug, Clone, Default)]
pub struct TransformAccumulator {
    pending: TransformParameters,
}

impl TransformAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending(&self) -> &TransformParameters {
        &self.pending
    }

    pub fn is_identity(&self) -> bool {
        self.pending.is_identity()
    }

    pub fn add_translation(&mut self, value: f32, axis: Axis) -> TransformResult<()> {
        check_finite(value, axis)?;
        self.pending.translation[axis.index()] += value;
        Ok(())
    }

    /// `value` is in degrees
    pub fn add_rotation(&mut self, value: f32, axis: Axis) -> TransformResult<()> {
        check_finite(value, axis)?;
        self.pending.rotation_degrees[axis.index()] += value;
        Ok(())
    }

    /// Replace the pending scale. Non-positive or non-finite factors are
    /// rejected and the previous factor is kept.
    pub fn set_scale(&mut self, value: f32) -> TransformResult<()> {
        if !value.is_finite() || value <= 0.0 {
            return Err(TransformError::InvalidScaleInput { value });
        }
        self.pending.scale = value;
        Ok(())
    }

    /// Build the affine matrix for everything pending, then reset to identity
    pub fn consume_and_reset(&mut self) -> Matrix4<f32> {
        let params = std::mem::take(&mut self.pending);
        debug!(
            translation = ?params.translation.as_slice(),
            rotation_degrees = ?params.rotation_degrees.as_slice(),
            scale = params.scale,
            "consuming pending transform"
        );
        params.to_matrix()
    }
}

fn check_finite(value: f32, axis: Axis) -> TransformResult<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(TransformError::NonFiniteInput { axis, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::Point3;

    #[test]
    fn test_identity_rotation() {
        let matrix = Transform::rotation_matrix(&Vector3::zeros());
        assert!((matrix - Matrix4::identity()).norm() < 1e-6);
    }

    #[test]
    fn test_translation_accumulates() {
        let mut acc = TransformAccumulator::new();
        acc.add_translation(1.0, Axis::X).unwrap();
        acc.add_translation(1.0, Axis::X).unwrap();
        acc.add_translation(-0.5, Axis::Z).unwrap();

        assert_relative_eq!(acc.pending().translation, Vector3::new(2.0, 0.0, -0.5));
    }

    #[test]
    fn test_rotation_accumulates_in_degrees() {
        let mut acc = TransformAccumulator::new();
        acc.add_rotation(45.0, Axis::Z).unwrap();
        acc.add_rotation(45.0, Axis::Z).unwrap();

        let matrix = acc.consume_and_reset();
        let p = matrix.transform_point(&Point3::new(1.0, 0.0, 0.0));
        assert_relative_eq!(p, Point3::new(0.0, 1.0, 0.0), epsilon = 1e-6);
    }

    #[test]
    fn test_right_handed_rotations() {
        let rx = TransformParameters {
            rotation_degrees: Vector3::new(90.0, 0.0, 0.0),
            ..TransformParameters::identity()
        };
        let p = rx.to_matrix().transform_point(&Point3::new(0.0, 1.0, 0.0));
        assert_relative_eq!(p, Point3::new(0.0, 0.0, 1.0), epsilon = 1e-6);

        let ry = TransformParameters {
            rotation_degrees: Vector3::new(0.0, 90.0, 0.0),
            ..TransformParameters::identity()
        };
        let p = ry.to_matrix().transform_point(&Point3::new(0.0, 0.0, 1.0));
        assert_relative_eq!(p, Point3::new(1.0, 0.0, 0.0), epsilon = 1e-6);
    }

    #[test]
    fn test_scale_replaces() {
        let mut acc = TransformAccumulator::new();
        acc.set_scale(2.0).unwrap();
        acc.set_scale(3.0).unwrap();
        assert_eq!(acc.pending().scale, 3.0);
    }

    #[test]
    fn test_invalid_scale_keeps_previous() {
        let mut acc = TransformAccumulator::new();
        acc.set_scale(2.5).unwrap();

        for value in [0.0, -3.0, f32::NAN, f32::INFINITY] {
            let err = acc.set_scale(value).unwrap_err();
            assert!(matches!(err, TransformError::InvalidScaleInput { .. }));
            assert_eq!(acc.pending().scale, 2.5);
        }
    }

    #[test]
    fn test_non_finite_delta_rejected() {
        let mut acc = TransformAccumulator::new();
        acc.add_translation(1.0, Axis::Y).unwrap();

        let err = acc.add_translation(f32::NAN, Axis::Y).unwrap_err();
        assert!(matches!(err, TransformError::NonFiniteInput { axis: Axis::Y, .. }));
        assert!(acc.add_rotation(f32::INFINITY, Axis::X).is_err());

        assert_relative_eq!(acc.pending().translation, Vector3::new(0.0, 1.0, 0.0));
        assert_relative_eq!(acc.pending().rotation_degrees, Vector3::zeros());
    }

    #[test]
    fn test_scale_applied_before_rotation_and_translation() {
        let params = TransformParameters {
            translation: Vector3::new(10.0, 0.0, 0.0),
            rotation_degrees: Vector3::new(0.0, 0.0, 90.0),
            scale: 2.0,
        };
        let p = params.to_matrix().transform_point(&Point3::new(1.0, 0.0, 0.0));
        assert_relative_eq!(p, Point3::new(10.0, 2.0, 0.0), epsilon = 1e-5);
    }

    #[test]
    fn test_consume_resets_to_identity() {
        let mut acc = TransformAccumulator::new();
        acc.add_translation(3.0, Axis::X).unwrap();
        acc.add_rotation(10.0, Axis::Y).unwrap();
        acc.set_scale(4.0).unwrap();
        assert!(!acc.is_identity());

        let matrix = acc.consume_and_reset();
        assert!(!matrix.is_identity(0.0));
        assert!(acc.is_identity());
        assert!(acc.consume_and_reset().is_identity(0.0));
    }
}
