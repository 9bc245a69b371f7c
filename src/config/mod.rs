//! Declarative sweep configuration
//!
//! A sweep is described by a small YAML file:
//!
//! ```yaml
//! model: models/lenet.safetensors
//! dataset: data/test.safetensors
//! grid: { start: 0.0, stop: 1.0, step: 0.1 }
//! strategies: [global_unstructured, local_unstructured, structured]
//! target: convolutional
//! output_dir: ./figures
//! ```

mod cli;
mod loader;
mod schema;

pub use cli::{parse_args, Cli, Command, FigureArgs, InfoArgs, SweepArgs, ValidateArgs};
pub use loader::{load_config, save_config};
pub use schema::{GridSpec, SweepConfig};
