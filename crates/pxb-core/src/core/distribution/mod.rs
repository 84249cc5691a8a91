//! sdist and wheel writers.
//!
//! Each writer streams into a temporary file inside the output directory and
//! renames it into place only once the container is complete.

mod archive;
mod sdist;
mod wheel;

pub use sdist::write_sdist;
pub use wheel::{write_prepared_metadata, write_wheel};
