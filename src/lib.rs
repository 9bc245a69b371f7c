//! # Podar
//!
//! Magnitude pruning for trained convolutional networks, and accuracy sweeps
//! over a grid of sparsity ratios.
//!
//! ## Modules
//!
//! - [`model`]: layer-sequence networks with a small inference engine
//! - [`prune`]: importance ranking, mask generation and snapshot application
//! - [`eval`]: evaluation datasets and top-1 accuracy
//! - [`sweep`]: accuracy-versus-sparsity curves per strategy
//! - [`distribution`]: weight and filter magnitude histograms
//! - [`io`]: JSON, YAML and SafeTensors model files
//! - [`config`]: YAML sweep configuration and CLI types
//! - [`cli`]: command handlers for the `podar` binary
//!
//! ## Strategies
//!
//! - **Global unstructured**: drop the lowest-magnitude weights across all
//!   eligible layers together
//! - **Local unstructured**: drop the same fraction in every layer
//! - **Structured**: drop whole convolutional filters by L1 norm

pub mod cli;
pub mod config;
pub mod distribution;
pub mod error;
pub mod eval;
pub mod io;
pub mod model;
pub mod prune;
pub mod sweep;

pub use error::{Error, Result};
