//! CSV import/export for tables

use std::io::{Read, Write};

use crate::error::{Error, Result};
use crate::table::Table;

impl Table {
    /// Write the table as CSV, one line per row, no header line (columns are
    /// unnamed at this layer). Cells containing separators, quotes, or
    /// newlines get standard CSV quoting.
    pub fn to_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut wtr = csv::Writer::from_writer(writer);
        for row in self.rows() {
            wtr.write_record(row)?;
        }
        wtr.flush()?;
        Ok(())
    }

    /// Read a table from CSV. The first line fixes the column count; a
    /// source with no lines fails with [`Error::EmptySource`], and records of
    /// a different width surface the CSV reader's own error.
    pub fn from_csv<R: Read>(reader: R) -> Result<Table> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(false)
            .from_reader(reader);
        let mut rows: Vec<Vec<String>> = Vec::new();
        for record in rdr.records() {
            let record = record?;
            rows.push(record.iter().map(str::to_string).collect());
        }
        if rows.is_empty() {
            return Err(Error::EmptySource);
        }
        Table::from_rows(rows)
    }
}
