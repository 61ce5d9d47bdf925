// Deny unwrap/expect in library code; tests may use them.
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

/// objview core library - mesh loading and the transform engine
///
/// This library reads `v`/`f` geometry files into an in-memory mesh,
/// normalizes it into the unit frame and applies position, rotation, scale and
/// translation edits in place. Rendering is left to the host, which reads the
/// vertex and face views back after each command.

pub mod command;
pub mod error;
pub mod geometry;
pub mod model;
pub mod normalize;
pub mod obj;
pub mod transform;

// Re-export commonly used types
pub use command::Command;
pub use error::{CommandError, LoadError, LoadResult, TransformError, TransformResult, ViewerError};
pub use geometry::{centroid, BoundingBox, Face, Mesh};
pub use model::{MeshSnapshot, Model};
pub use normalize::{normalize, Normalization};
pub use obj::{FacePolicy, LoadOptions, LoadReport};
pub use transform::{RotationState, Transform};
