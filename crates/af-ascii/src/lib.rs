//! Moteur de conversion échantillons → glyphes pour asciiforge.
//!
//! Sélection par luminance (diversité gaussienne), tramage Bayer ou
//! Floyd–Steinberg, règles de couleur.

pub mod color_map;
pub mod dither;
pub mod mapper;
pub mod selector;
