//! Model and dataset file IO
//!
//! Formats are picked from file extensions: `.json`, `.yaml`/`.yml`, and
//! `.safetensors`.

mod format;
mod model;
pub(crate) mod tensors;

pub use format::FileFormat;
pub use model::{load_network, save_network};
