//! Artifact storage infrastructure module

mod fs;

pub use fs::FsArtifactStore;
