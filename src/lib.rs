//! reltab - in-memory relational tables
//!
//! A lightweight grid of string cells with row/column access, structural
//! edits, aliased slicing, projection, merge, and relational joins
//! (nested-loop, left-outer, and hash), plus CSV and JSON codecs. No external
//! database engine, no persistence beyond encode/decode.
//!
//! Tables are built by repeated [`Table::append_row`]; read-only operators
//! and derived tables never mutate their source except through an explicit
//! `&mut self`. A single table instance is meant for single-threaded use.

mod codec;
pub mod error;
pub mod join;
pub mod table;

pub use error::{Error, Result};
pub use join::{hash_join, join, left_join};
pub use table::Table;
