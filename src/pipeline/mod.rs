//! End-to-end fusion of an MSI datacube with a reference image.
//!
//! Overview
//! - Optionally detects and aligns peaks of raw pixel spectra and scatters
//!   them into a datacube.
//! - Segments the tissue on a representative image built from the most
//!   spatially coherent ion images.
//! - Rigidly registers the representative onto the reference image
//!   (coarse-to-fine, multi-start regular-step gradient descent).
//! - Warps every ion image and the tissue mask into the reference frame.
//! - Embeds ion images and reference with NMF or PCA over the warped mask and
//!   ranks the ion images by their distance to the reference.
//!
//! Modules
//! - [`params`] – configuration types used by the pipeline and CLI.
//! - `runner` – the [`FusionPipeline`] implementation.

pub mod params;
mod runner;

pub use params::FusionParams;
pub use runner::FusionPipeline;
