//! Static family-network renderer: deterministic layouts, curved relationship
//! lines styled by category and strength, trust-tiered nodes, SVG output with
//! PNG and PDF export.

pub mod config;
pub mod dataset;
pub mod error;
pub mod export;
pub mod fonts;
pub mod graph;
pub mod theme;
pub mod xml;

pub use error::{Error, Result};
