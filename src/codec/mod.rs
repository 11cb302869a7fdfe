//! Codec boundary: CSV and JSON representations of the row grid
//!
//! Both codecs are shape-preserving: a table travels as an ordered sequence
//! of rows, each an ordered sequence of cell strings. Decoding infers the
//! column count from the first row and rejects inconsistent widths.

mod csv;
mod json;
