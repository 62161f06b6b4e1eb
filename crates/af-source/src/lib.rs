/// Visual source modules for asciiforge (decoded image, procedural patterns).

pub mod adjust;
pub mod folder_batch;
pub mod image;
pub mod resize;

#[cfg(feature = "procedural")]
pub mod procedural;
