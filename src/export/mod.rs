//! Model persistence module
//!
//! The fitted pipeline, its label mapping and training metadata are stored
//! together as one JSON artifact and shared read-only through
//! [`ArtifactHandle`].

mod artifact;

pub use artifact::{ArtifactHandle, ArtifactMetadata, ModelArtifact};
