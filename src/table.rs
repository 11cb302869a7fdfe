//! Table storage, traversal operators, and the view/copy layer

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{Error, Result};

/// An in-memory relational table of string cells.
///
/// Storage is row-major: each row is an `Arc<[String]>`, so cell buffers are
/// immutable once appended and can be co-owned by a [`Table::slice`]. All
/// structural mutation (append, remove row, remove column) replaces whole row
/// handles and never edits a cell in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    rows: Vec<Arc<[String]>>,
    ncol: usize,
}

impl Table {
    /// Create an empty table with the given number of columns.
    ///
    /// A table always has at least one column; `ncol == 0` is rejected.
    pub fn new(ncol: usize) -> Result<Self> {
        if ncol == 0 {
            return Err(Error::InvalidArgument(
                "a table needs at least one column".into(),
            ));
        }
        Ok(Self {
            rows: Vec::new(),
            ncol,
        })
    }

    /// Build a table from a row grid, validating that every row has the same
    /// width as the first. An empty grid yields an empty, zero-column table
    /// (the width cannot be inferred from nothing).
    pub fn from_rows(rows: Vec<Vec<String>>) -> Result<Self> {
        let ncol = rows.first().map_or(0, Vec::len);
        let mut handles = Vec::with_capacity(rows.len());
        for row in rows {
            if row.len() != ncol {
                return Err(Error::ColumnCountMismatch {
                    expected: ncol,
                    actual: row.len(),
                });
            }
            handles.push(Arc::from(row));
        }
        Ok(Self {
            rows: handles,
            ncol,
        })
    }

    /// Number of rows
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns
    pub fn column_count(&self) -> usize {
        self.ncol
    }

    /// Iterate over rows as cell slices, in row order.
    pub fn rows(&self) -> impl Iterator<Item = &[String]> {
        self.rows.iter().map(|r| &r[..])
    }

    /// Get the cell at row `x`, column `y`.
    pub fn get(&self, x: usize, y: usize) -> Result<&str> {
        let row = self
            .rows
            .get(x)
            .ok_or_else(|| Error::row_out_of_range(x, self.rows.len()))?;
        row.get(y)
            .map(String::as_str)
            .ok_or_else(|| Error::column_out_of_range(y, self.ncol))
    }

    /// Get a copy of row `x`, independent of later table mutation.
    pub fn get_row(&self, x: usize) -> Result<Vec<String>> {
        self.rows
            .get(x)
            .map(|r| r.to_vec())
            .ok_or_else(|| Error::row_out_of_range(x, self.rows.len()))
    }

    /// Get a copy of column `y`, independent of later table mutation.
    pub fn get_column(&self, y: usize) -> Result<Vec<String>> {
        if y >= self.ncol {
            return Err(Error::column_out_of_range(y, self.ncol));
        }
        Ok(self.rows.iter().map(|r| r[y].clone()).collect())
    }

    /// Append a row at the bottom of the table.
    ///
    /// Fails if `row` does not match the table's column count; the table is
    /// left unchanged in that case.
    pub fn append_row(&mut self, row: Vec<String>) -> Result<()> {
        if row.len() != self.ncol {
            return Err(Error::ColumnCountMismatch {
                expected: self.ncol,
                actual: row.len(),
            });
        }
        self.rows.push(Arc::from(row));
        Ok(())
    }

    /// Delete row `x`, shifting subsequent rows up by one.
    pub fn remove_row(&mut self, x: usize) -> Result<()> {
        if x >= self.rows.len() {
            return Err(Error::row_out_of_range(x, self.rows.len()));
        }
        self.rows.remove(x);
        Ok(())
    }

    /// Delete column `y` from every row, shifting subsequent columns left.
    ///
    /// Removing the only remaining column is refused; a table never drops to
    /// zero columns through mutation.
    pub fn remove_column(&mut self, y: usize) -> Result<()> {
        if y >= self.ncol {
            return Err(Error::column_out_of_range(y, self.ncol));
        }
        if self.ncol == 1 {
            return Err(Error::LastColumnRemoval);
        }
        for handle in &mut self.rows {
            let row: Vec<String> = handle
                .iter()
                .enumerate()
                .filter(|&(i, _)| i != y)
                .map(|(_, v)| v.clone())
                .collect();
            *handle = Arc::from(row);
        }
        self.ncol -= 1;
        Ok(())
    }

    /// Call `f(row_index, value)` for every value in column `y`, first row to
    /// last. The first error `f` returns stops the traversal and is
    /// propagated; later rows are not visited.
    pub fn apply_column<F>(&self, y: usize, mut f: F) -> Result<()>
    where
        F: FnMut(usize, &str) -> Result<()>,
    {
        if y >= self.ncol {
            return Err(Error::column_out_of_range(y, self.ncol));
        }
        for (x, row) in self.rows.iter().enumerate() {
            f(x, &row[y])?;
        }
        Ok(())
    }

    /// Call `f(row_index, values)` for every row, where `values` holds the
    /// cells at the given column indexes in the caller's order (so a column
    /// may be repeated or reordered). Stops at the first error like
    /// [`Table::apply_column`].
    pub fn apply_columns<F>(&self, ys: &[usize], mut f: F) -> Result<()>
    where
        F: FnMut(usize, &[&str]) -> Result<()>,
    {
        if let Some(&y) = ys.iter().find(|&&y| y >= self.ncol) {
            return Err(Error::column_out_of_range(y, self.ncol));
        }
        for (x, row) in self.rows.iter().enumerate() {
            let picked: Vec<&str> = ys.iter().map(|&y| row[y].as_str()).collect();
            f(x, &picked)?;
        }
        Ok(())
    }

    /// Take a contiguous view of at most `count` rows starting at `start`.
    ///
    /// The returned table co-owns the parent's cell buffers for that range
    /// (the `Arc` handles are cloned, not the cells), so it is cheap and the
    /// cells are observably shared. Structural mutation through either table
    /// only touches that table's own row list and never alters the other.
    /// `count` past the end truncates to the available rows.
    pub fn slice(&self, start: usize, count: usize) -> Result<Table> {
        if start >= self.rows.len() {
            return Err(Error::row_out_of_range(start, self.rows.len()));
        }
        let end = (start + count).min(self.rows.len());
        Ok(Table {
            rows: self.rows[start..end].to_vec(),
            ncol: self.ncol,
        })
    }

    /// Build an independently-owned table containing, for every row, the
    /// values at columns `ys` in that order. Indexes may repeat.
    pub fn project(&self, ys: &[usize]) -> Result<Table> {
        if ys.is_empty() {
            return Err(Error::InvalidArgument(
                "projection needs at least one column".into(),
            ));
        }
        if let Some(&y) = ys.iter().find(|&&y| y >= self.ncol) {
            return Err(Error::column_out_of_range(y, self.ncol));
        }
        let mut projected = Table::new(ys.len()).expect("non-empty projection");
        for row in &self.rows {
            let picked: Vec<String> = ys.iter().map(|&y| row[y].clone()).collect();
            projected
                .append_row(picked)
                .expect("projected row width corrupted");
        }
        Ok(projected)
    }

    /// For every row of `other`, append to `self` a row of `self`'s width
    /// whose column `i` holds `other`'s value at `column_map[&i]` when mapped,
    /// and the empty string otherwise. Aligns differently-shaped tables
    /// before combining them.
    ///
    /// A mapped source index outside `other`'s columns fails up front, before
    /// any row is appended.
    pub fn merge(&mut self, other: &Table, column_map: &HashMap<usize, usize>) -> Result<()> {
        for (&dst, &src) in column_map {
            if dst < self.ncol && src >= other.ncol {
                return Err(Error::column_out_of_range(src, other.ncol));
            }
        }
        for row in &other.rows {
            let mapped: Vec<String> = (0..self.ncol)
                .map(|dst| match column_map.get(&dst) {
                    Some(&src) => row[src].clone(),
                    None => String::new(),
                })
                .collect();
            self.append_row(mapped).expect("merged row width corrupted");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    fn sample() -> Table {
        let mut dt = Table::new(3).unwrap();
        dt.append_row(vec!["a".into(), "b".into(), "c".into()]).unwrap();
        dt.append_row(vec!["e".into(), "f".into(), "g".into()]).unwrap();
        dt.append_row(vec!["f".into(), "k".into(), "x".into()]).unwrap();
        dt.append_row(vec!["g".into(), "h".into(), "l".into()]).unwrap();
        dt
    }

    fn grid(dt: &Table) -> Vec<Vec<String>> {
        dt.rows().map(|r| r.to_vec()).collect()
    }

    #[test]
    fn test_create_and_get() {
        let dt = sample();
        assert_eq!(dt.row_count(), 4);
        assert_eq!(dt.column_count(), 3);
        assert_eq!(dt.get(0, 2).unwrap(), "c");
        assert_eq!(dt.get_row(1).unwrap()[0], "e");
        assert_eq!(dt.get_column(1).unwrap(), vec!["b", "f", "k", "h"]);

        assert!(matches!(
            dt.get(9, 0),
            Err(Error::IndexOutOfRange { .. })
        ));
        assert!(matches!(
            dt.get_column(3),
            Err(Error::IndexOutOfRange { .. })
        ));
    }

    #[test]
    fn test_zero_column_table_rejected() {
        assert!(matches!(Table::new(0), Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_append_wrong_width_leaves_table_unchanged() {
        let mut dt = sample();
        let err = dt.append_row(vec!["1".into(), "2".into()]).unwrap_err();
        assert!(matches!(
            err,
            Error::ColumnCountMismatch {
                expected: 3,
                actual: 2
            }
        ));
        assert_eq!(dt.row_count(), 4);
        assert_eq!(dt.column_count(), 3);
    }

    #[test]
    fn test_get_row_is_a_defensive_copy() {
        let mut dt = sample();
        let row = dt.get_row(0).unwrap();
        dt.remove_row(0).unwrap();
        assert_eq!(row, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_remove_row_shifts_up() {
        let mut dt = sample();
        dt.remove_row(1).unwrap();
        assert_eq!(dt.row_count(), 3);
        assert_eq!(dt.get_row(1).unwrap()[0], "f");

        dt.remove_row(0).unwrap();
        assert_eq!(dt.row_count(), 2);
        assert_eq!(dt.get_row(0).unwrap()[0], "f");

        assert!(dt.remove_row(5).is_err());
        assert_eq!(dt.row_count(), 2);
    }

    #[test]
    fn test_remove_column_shifts_left() {
        let mut dt = sample();
        dt.remove_column(1).unwrap();
        assert_eq!(dt.column_count(), 2);
        assert_eq!(dt.get_row(0).unwrap(), vec!["a", "c"]);

        dt.remove_column(0).unwrap();
        assert_eq!(dt.column_count(), 1);
        assert_eq!(dt.get_column(0).unwrap(), vec!["c", "g", "x", "l"]);
    }

    #[test]
    fn test_remove_last_column_refused() {
        let mut dt = Table::new(1).unwrap();
        dt.append_row(vec!["only".into()]).unwrap();
        assert!(matches!(dt.remove_column(0), Err(Error::LastColumnRemoval)));
        assert_eq!(dt.column_count(), 1);
        assert_eq!(dt.get(0, 0).unwrap(), "only");
    }

    #[test]
    fn test_apply_column_concatenates_in_order() {
        let dt = sample();
        let mut s = String::new();
        dt.apply_column(0, |_, v| {
            s.push_str(v);
            Ok(())
        })
        .unwrap();
        assert_eq!(s, "aefg");
    }

    #[test]
    fn test_apply_column_stops_at_first_error() {
        let dt = sample();
        let mut visited = Vec::new();
        let err = dt
            .apply_column(0, |x, v| {
                visited.push(v.to_string());
                if x == 1 {
                    Err(anyhow!("stop here").into())
                } else {
                    Ok(())
                }
            })
            .unwrap_err();
        assert!(matches!(err, Error::Callback(_)));
        assert_eq!(visited, vec!["a", "e"]);
    }

    #[test]
    fn test_apply_columns_follows_caller_order() {
        let dt = sample();
        let mut pairs = Vec::new();
        dt.apply_columns(&[2, 0], |_, vs| {
            pairs.push(vs.join(","));
            Ok(())
        })
        .unwrap();
        assert_eq!(pairs, vec!["c,a", "g,e", "x,f", "l,g"]);

        assert!(dt.apply_columns(&[0, 7], |_, _| Ok(())).is_err());
    }

    #[test]
    fn test_slice_window() {
        let dt = sample();
        let s = dt.slice(1, 2).unwrap();
        assert_eq!(
            grid(&s),
            vec![vec!["e", "f", "g"], vec!["f", "k", "x"]]
        );
    }

    #[test]
    fn test_slice_truncates_past_the_end() {
        let dt = sample();
        let s = dt.slice(0, 10).unwrap();
        assert_eq!(s.row_count(), 4);
        assert_eq!(s.column_count(), 3);

        assert!(matches!(
            dt.slice(4, 1),
            Err(Error::IndexOutOfRange { .. })
        ));
    }

    #[test]
    fn test_slice_shares_cell_storage() {
        let dt = sample();
        let s = dt.slice(1, 2).unwrap();
        // Same backing cells, not copies.
        assert!(Arc::ptr_eq(&dt.rows[1], &s.rows[0]));
        assert!(Arc::ptr_eq(&dt.rows[2], &s.rows[1]));
    }

    #[test]
    fn test_slice_mutation_does_not_touch_parent() {
        let dt = sample();
        let mut s = dt.slice(1, 0).unwrap();
        assert_eq!(s.row_count(), 0);

        s.append_row(vec!["x".into(), "y".into(), "z".into()]).unwrap();
        assert_eq!(s.row_count(), 1);
        assert_eq!(dt.row_count(), 4);
        assert_eq!(dt.get_row(1).unwrap(), vec!["e", "f", "g"]);

        let mut s2 = dt.slice(0, 4).unwrap();
        s2.remove_row(0).unwrap();
        s2.remove_column(0).unwrap();
        assert_eq!(dt.row_count(), 4);
        assert_eq!(dt.column_count(), 3);
        assert_eq!(dt.get(0, 0).unwrap(), "a");
    }

    #[test]
    fn test_project_selects_columns() {
        let dt = sample();
        let p = dt.project(&[0, 2]).unwrap();
        assert_eq!(p.column_count(), 2);
        assert_eq!(
            grid(&p),
            vec![
                vec!["a", "c"],
                vec!["e", "g"],
                vec!["f", "x"],
                vec!["g", "l"]
            ]
        );
    }

    #[test]
    fn test_project_allows_repeated_columns() {
        let dt = sample();
        let p = dt.project(&[1, 1]).unwrap();
        assert_eq!(p.get_row(2).unwrap(), vec!["k", "k"]);
    }

    #[test]
    fn test_project_is_independent_of_source() {
        let mut dt = sample();
        let mut p = dt.project(&[0, 2]).unwrap();
        p.append_row(vec!["new".into(), "row".into()]).unwrap();
        dt.remove_row(0).unwrap();
        assert_eq!(p.row_count(), 5);
        assert_eq!(p.get(0, 0).unwrap(), "a");
        assert_eq!(dt.row_count(), 3);
    }

    #[test]
    fn test_project_bad_arguments() {
        let dt = sample();
        assert!(matches!(dt.project(&[]), Err(Error::InvalidArgument(_))));
        assert!(matches!(
            dt.project(&[0, 5]),
            Err(Error::IndexOutOfRange { .. })
        ));
    }

    #[test]
    fn test_merge_maps_and_pads_columns() {
        let mut dt = sample();
        let mut other = Table::new(2).unwrap();
        other.append_row(vec!["p".into(), "q".into()]).unwrap();
        other.append_row(vec!["r".into(), "s".into()]).unwrap();

        // dest column 0 <- other column 1, dest column 2 <- other column 0
        let map = HashMap::from([(0, 1), (2, 0)]);
        dt.merge(&other, &map).unwrap();

        assert_eq!(dt.row_count(), 6);
        assert_eq!(dt.get_row(4).unwrap(), vec!["q", "", "p"]);
        assert_eq!(dt.get_row(5).unwrap(), vec!["s", "", "r"]);
    }

    #[test]
    fn test_merge_rejects_bad_source_index_up_front() {
        let mut dt = sample();
        let mut other = Table::new(2).unwrap();
        other.append_row(vec!["p".into(), "q".into()]).unwrap();

        let map = HashMap::from([(0, 9)]);
        assert!(matches!(
            dt.merge(&other, &map),
            Err(Error::IndexOutOfRange { .. })
        ));
        assert_eq!(dt.row_count(), 4);
    }

    #[test]
    fn test_from_rows_validates_widths() {
        let t = Table::from_rows(vec![
            vec!["a".into(), "b".into()],
            vec!["c".into(), "d".into()],
        ])
        .unwrap();
        assert_eq!(t.row_count(), 2);
        assert_eq!(t.column_count(), 2);

        let err = Table::from_rows(vec![
            vec!["a".into(), "b".into()],
            vec!["c".into()],
        ])
        .unwrap_err();
        assert!(matches!(err, Error::ColumnCountMismatch { .. }));

        let empty = Table::from_rows(Vec::new()).unwrap();
        assert_eq!(empty.row_count(), 0);
        assert_eq!(empty.column_count(), 0);
    }
}
