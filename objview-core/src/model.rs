/// The live model: a loaded mesh plus the spatial state that transforms it
///
/// Every mutating call rewrites vertex positions in place. Borrowed views from
/// `Model::vertices` and `Model::faces` therefore cannot outlive the next
/// mutation; hosts that need to keep a copy take a `MeshSnapshot` and compare
/// its generation against `Model::generation`.
use std::path::Path;

use nalgebra::{Matrix4, Point3, Unit, Vector3};
use tracing::{debug, info};

use crate::error::{LoadResult, TransformError, TransformResult};
use crate::geometry::{Face, Mesh};
use crate::normalize::normalize;
use crate::obj::{self, LoadOptions, LoadReport};
use crate::transform::{RotationState, Transform};

/// An owned copy of the mesh taken at a given generation.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshSnapshot {
    pub vertices: Vec<Point3<f32>>,
    pub faces: Vec<Face>,
    pub generation: u64,
}

/// A loaded mesh and its position, rotation and bookkeeping matrix.
#[derive(Debug, Clone)]
pub struct Model {
    mesh: Mesh,
    center: Point3<f32>,
    rotation: RotationState,
    model_matrix: Matrix4<f32>,
    generation: u64,
}

impl Default for Model {
    fn default() -> Self {
        Self::new()
    }
}

fn finite(name: &'static str, values: &[f32]) -> TransformResult<()> {
    if values.iter().all(|v| v.is_finite()) {
        Ok(())
    } else {
        Err(TransformError::InvalidArgument {
            name,
            value: format!("{values:?}"),
        })
    }
}

impl Model {
    /// An empty model with no vertices.
    pub fn new() -> Self {
        Self {
            mesh: Mesh::new(),
            center: Point3::origin(),
            rotation: RotationState::zero(),
            model_matrix: Matrix4::identity(),
            generation: 0,
        }
    }

    /// Build a model from an already parsed mesh, normalizing it.
    pub fn from_mesh(mut mesh: Mesh) -> (Self, bool) {
        let normalization = normalize(&mut mesh.vertices);
        let model = Self {
            mesh,
            center: normalization.center,
            rotation: RotationState::zero(),
            model_matrix: Matrix4::identity(),
            generation: 0,
        };
        (model, normalization.degenerate)
    }

    /// Load a geometry file with default options, replacing the current mesh.
    ///
    /// # Errors
    ///
    /// Returns `FileNotFound`/`Io` if the file cannot be read and
    /// `MalformedGeometry` if a face is unusable. The current model is left
    /// untouched on any error.
    pub fn load<P: AsRef<Path>>(&mut self, path: P) -> LoadResult<LoadReport> {
        self.load_with(path, &LoadOptions::default())
    }

    /// Load a geometry file with explicit options.
    ///
    /// # Errors
    ///
    /// See [`Model::load`].
    pub fn load_with<P: AsRef<Path>>(
        &mut self,
        path: P,
        options: &LoadOptions,
    ) -> LoadResult<LoadReport> {
        let path = path.as_ref();
        let (mesh, report) = obj::load_obj(path, options)?;
        let report = self.replace(mesh, report);
        info!(
            "Loaded {}: {} vertices, {} faces",
            path.display(),
            report.vertex_count,
            report.face_count
        );
        Ok(report)
    }

    /// Load geometry from text already in memory.
    ///
    /// # Errors
    ///
    /// `MalformedGeometry` if a face is unusable; the model is unchanged.
    pub fn load_str(&mut self, input: &str, options: &LoadOptions) -> LoadResult<LoadReport> {
        let (mesh, report) = obj::parse_obj(input, options)?;
        Ok(self.replace(mesh, report))
    }

    /// Swap in a freshly parsed mesh; the new state is fully built first.
    fn replace(&mut self, mesh: Mesh, mut report: LoadReport) -> LoadReport {
        let (mut fresh, degenerate) = Self::from_mesh(mesh);
        fresh.generation = self.generation + 1;
        *self = fresh;
        report.degenerate = degenerate;
        report
    }

    pub fn vertices(&self) -> &[Point3<f32>] {
        &self.mesh.vertices
    }

    pub fn faces(&self) -> &[Face] {
        &self.mesh.faces
    }

    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    pub fn vertex_count(&self) -> usize {
        self.mesh.vertex_count()
    }

    pub fn face_count(&self) -> usize {
        self.mesh.face_count()
    }

    /// The tracked centroid; moved by `set_position` and nothing else.
    pub fn center(&self) -> Point3<f32> {
        self.center
    }

    /// Absolute rotation applied per axis since the last load, in degrees.
    pub fn current_rotation(&self) -> Vector3<f32> {
        self.rotation.angles()
    }

    /// Product of every rotation applied since the last load.
    pub fn model_matrix(&self) -> &Matrix4<f32> {
        &self.model_matrix
    }

    /// Bumped by every load and every call that moves a vertex.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn snapshot(&self) -> MeshSnapshot {
        MeshSnapshot {
            vertices: self.mesh.vertices.clone(),
            faces: self.mesh.faces.clone(),
            generation: self.generation,
        }
    }

    /// Whether a snapshot still reflects the current vertex positions.
    pub fn is_current(&self, snapshot: &MeshSnapshot) -> bool {
        snapshot.generation == self.generation
    }

    fn offset_all(&mut self, delta: Vector3<f32>) {
        for vertex in &mut self.mesh.vertices {
            *vertex += delta;
        }
    }

    /// Move the mesh so that its tracked center lands on `position`.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` for a non-finite position.
    pub fn set_position(&mut self, position: Point3<f32>) -> TransformResult<()> {
        finite("position", position.coords.as_slice())?;
        let delta = position - self.center;
        if delta != Vector3::zeros() {
            self.offset_all(delta);
            self.generation += 1;
        }
        self.center = position;
        debug!("Position set to {:?} (delta {:?})", position, delta);
        Ok(())
    }

    /// Rotate about the tracked center so the angle along `axis` reaches
    /// `degrees`.
    ///
    /// The angle is an absolute target: only the difference from what has
    /// already been applied along `axis` is rotated, so repeating a call is a
    /// no-op. The axis is normalized before use.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` for a non-finite angle or a zero-length or
    /// non-finite axis.
    pub fn rotate(&mut self, degrees: f32, axis: Vector3<f32>) -> TransformResult<()> {
        finite("angle", &[degrees])?;
        finite("axis", axis.as_slice())?;
        // Bring the largest component to 1 so the norm cannot overflow or underflow
        let largest = axis.amax();
        let direction = if largest > 0.0 { axis / largest } else { axis };
        let axis = Unit::try_new(direction, f32::EPSILON).ok_or_else(|| {
            TransformError::InvalidArgument {
                name: "axis",
                value: format!("{axis:?} has no direction"),
            }
        })?;

        let diff = self.rotation.advance(degrees, &axis);
        if diff == 0.0 {
            return Ok(());
        }

        self.model_matrix *= Transform::rotation_about(diff, &axis);
        let around_center = Transform::rotation_around(diff, &axis, &self.center);
        for vertex in &mut self.mesh.vertices {
            *vertex = around_center.transform_point(vertex);
        }
        self.generation += 1;

        debug!(
            "Rotated {} degrees about {:?}, accumulated {:?}",
            diff,
            axis.into_inner(),
            self.rotation.angles()
        );
        Ok(())
    }

    /// Multiply every vertex by `factor` about the frame origin.
    ///
    /// The tracked center is left alone.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` for a non-finite factor.
    pub fn scale(&mut self, factor: f32) -> TransformResult<()> {
        finite("factor", &[factor])?;
        for vertex in &mut self.mesh.vertices {
            *vertex *= factor;
        }
        self.generation += 1;
        debug!("Scaled by {}", factor);
        Ok(())
    }

    /// Add `offset` to every vertex without moving the tracked center.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` for a non-finite offset.
    pub fn translate(&mut self, offset: Vector3<f32>) -> TransformResult<()> {
        finite("offset", offset.as_slice())?;
        self.offset_all(offset);
        self.generation += 1;
        debug!("Translated by {:?}", offset);
        Ok(())
    }
}
