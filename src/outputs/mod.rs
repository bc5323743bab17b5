//! Output generation for the pipeline.
//!
//! Two kinds of output are produced:
//!
//! - [`json`]: the intermediate JSON data files written by `fetch` and read
//!   back by `render`
//! - [`map`]: the final self-contained Leaflet map document

pub mod json;
pub mod map;
