//! Data layer: decoding, column roles, selection and plot series.
//!
//! Architecture:
//! ```text
//!  .csv / .tsv / .txt bytes
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  loader   │  delimiter sniffing, BOM / UTF-16 recovery → Dataset
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  schema   │  header names → RoleMap (gene, pathway, correlation, p)
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  select   │  one gene → top-k negative, then top-k positive
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  series   │  label, x, marker size, colour value
//!   └──────────┘
//! ```
//!
//! [`session::Session`] ties one decoded file to its roles and runs the last
//! three stages per request; [`export`] writes the results out.

pub mod export;
pub mod loader;
pub mod model;
pub mod schema;
pub mod select;
pub mod series;
pub mod session;
