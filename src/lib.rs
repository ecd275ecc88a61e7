//! # plot-paper
//!
//! Pixel-compositing back end for 2D and 3D scatter plots. Plot layers
//! place already-positioned glyphs (markers) and decals (pre-rendered
//! graphics such as density maps) onto a *paper*, which accumulates them
//! and is flushed once into a finished raster or vector image.
//!
//! It features:
//!
//! - Saturation compositing of transparent samples, with an optional boost
//!   floor that keeps faint pixels visible
//! - Single-color alpha accumulation when every layer shares one RGB
//! - Z-buffered opaque 3D rendering
//! - Order-independent 3D transparency using sortable packed sample keys
//!   and logarithmic alpha quantization for very faint point clouds
//! - Vector output with painter's-algorithm depth sorting
//!
//! ## Architecture
//!
//! A render pass runs through four stages:
//!
//! 1. **Selection**: [`selector::PaperTypeSelector`] picks the cheapest
//!    paper type that is correct for the layers' opacity and color hints
//!    and the output medium
//! 2. **Creation**: the paper type creates a paper with the surface
//!    background painted
//! 3. **Placement**: each [`paper::Drawing2D`] or [`paper::Drawing3D`]
//!    places glyphs and decals, in the paper type's fixed layer order
//! 4. **Flush**: the paper is consumed and becomes a [`paper::DataIcon`]

// Foundation types
pub mod basics;
pub mod color;
pub mod error;
pub mod rgb_image;

// Drawing and compositing primitives
pub mod compositor;
pub mod glyph;
pub mod graphics;
pub mod marker;

// Paper abstraction
pub mod paper;
pub mod paper_type;
pub mod selector;
mod raster_paper;

// Paper type families
pub mod alpha_packer;
pub mod composite_paper;
pub mod mono_paper;
pub mod over_paper;
pub mod paint_paper;
pub mod pixel_stack_paper;
pub mod sorted_paper;
pub mod zbuffer_paper;
