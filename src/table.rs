//! A small column-ordered table of optional text cells.
//!
//! The result files carry a ragged, software-defined schema, so rows are
//! kept as `Option<String>` cells under a shared column list instead of a
//! fixed struct. `None` is the one canonical missing value; every stage
//! consumes a table and produces a new one.

use std::collections::BTreeMap;

use crate::errors::CleanError;

/// One cell: `None` is missing, everything else is the verbatim text.
pub type Cell = Option<String>;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn new(columns: Vec<String>) -> Self {
        Table {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn require_column(&self, name: &str) -> Result<usize, CleanError> {
        self.column_index(name)
            .ok_or_else(|| CleanError::MissingColumn {
                column: name.to_string(),
            })
    }

    /// Index of `name`, appending the column (and padding every existing
    /// row with a missing cell) when it is not present yet.
    pub fn ensure_column(&mut self, name: &str) -> usize {
        if let Some(i) = self.column_index(name) {
            return i;
        }
        self.columns.push(name.to_string());
        for row in &mut self.rows {
            row.push(None);
        }
        self.columns.len() - 1
    }

    /// Appends a fully derived column. `values` must be one per row.
    pub fn add_column(&mut self, name: &str, values: Vec<Cell>) {
        debug_assert_eq!(values.len(), self.rows.len());
        self.columns.push(name.to_string());
        for (row, value) in self.rows.iter_mut().zip(values) {
            row.push(value);
        }
    }

    /// New table keeping only the columns `keep` accepts, in order.
    pub fn retain_columns<F>(&self, keep: F) -> Table
    where
        F: Fn(&str) -> bool,
    {
        let kept: Vec<usize> = (0..self.columns.len())
            .filter(|&i| keep(&self.columns[i]))
            .collect();
        Table {
            columns: kept.iter().map(|&i| self.columns[i].clone()).collect(),
            rows: self
                .rows
                .iter()
                .map(|row| kept.iter().map(|&i| row[i].clone()).collect())
                .collect(),
        }
    }

    /// New table keeping only the rows `keep` accepts, in order.
    pub fn retain_rows<F>(&self, keep: F) -> Table
    where
        F: Fn(&[Cell]) -> bool,
    {
        Table {
            columns: self.columns.clone(),
            rows: self
                .rows
                .iter()
                .filter(|row| keep(row.as_slice()))
                .cloned()
                .collect(),
        }
    }

    /// Row indices grouped by the values of `key_cols`, iterated in sorted
    /// key order so grouped output is reproducible across runs.
    pub fn group_rows(&self, key_cols: &[usize]) -> BTreeMap<Vec<Cell>, Vec<usize>> {
        let mut groups: BTreeMap<Vec<Cell>, Vec<usize>> = BTreeMap::new();
        for (i, row) in self.rows.iter().enumerate() {
            let key: Vec<Cell> = key_cols.iter().map(|&c| row[c].clone()).collect();
            groups.entry(key).or_default().push(i);
        }
        groups
    }

    /// Full outer join with `right` on the named key columns.
    ///
    /// Left rows keep their order; a left row with no partner gets missing
    /// cells for the right's columns, and right rows with no partner are
    /// appended afterwards with missing cells on the left side.
    pub fn outer_join(&self, right: &Table, keys: &[&str]) -> Result<Table, CleanError> {
        let left_keys: Vec<usize> = keys
            .iter()
            .map(|k| self.require_column(k))
            .collect::<Result<_, _>>()?;
        let right_keys: Vec<usize> = keys
            .iter()
            .map(|k| right.require_column(k))
            .collect::<Result<_, _>>()?;
        let right_extra: Vec<usize> = (0..right.columns.len())
            .filter(|i| !right_keys.contains(i))
            .collect();

        let mut columns = self.columns.clone();
        columns.extend(right_extra.iter().map(|&i| right.columns[i].clone()));
        let mut out = Table::new(columns);

        let mut by_key: BTreeMap<Vec<Cell>, Vec<usize>> = BTreeMap::new();
        for (i, row) in right.rows.iter().enumerate() {
            let key: Vec<Cell> = right_keys.iter().map(|&c| row[c].clone()).collect();
            by_key.entry(key).or_default().push(i);
        }

        let mut used = vec![false; right.rows.len()];
        for row in &self.rows {
            let key: Vec<Cell> = left_keys.iter().map(|&c| row[c].clone()).collect();
            match by_key.get(&key) {
                Some(partners) => {
                    for &ri in partners {
                        used[ri] = true;
                        let mut joined = row.clone();
                        joined.extend(right_extra.iter().map(|&c| right.rows[ri][c].clone()));
                        out.rows.push(joined);
                    }
                }
                None => {
                    let mut joined = row.clone();
                    joined.extend((0..right_extra.len()).map(|_| None));
                    out.rows.push(joined);
                }
            }
        }

        for (ri, row) in right.rows.iter().enumerate() {
            if used[ri] {
                continue;
            }
            let mut joined: Vec<Cell> = vec![None; self.columns.len()];
            for (k, &c) in left_keys.iter().enumerate() {
                joined[c] = row[right_keys[k]].clone();
            }
            joined.extend(right_extra.iter().map(|&c| row[c].clone()));
            out.rows.push(joined);
        }

        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(s: &str) -> Cell {
        Some(s.to_string())
    }

    fn sample() -> Table {
        let mut t = Table::new(vec!["id".into(), "value".into()]);
        t.rows.push(vec![cell("1"), cell("a")]);
        t.rows.push(vec![cell("2"), cell("b")]);
        t
    }

    #[test]
    fn test_ensure_column_pads_existing_rows() {
        let mut t = sample();
        let idx = t.ensure_column("extra");
        assert_eq!(idx, 2);
        assert_eq!(t.rows[0].len(), 3);
        assert_eq!(t.rows[0][2], None);
        // asking again does not add a second column
        assert_eq!(t.ensure_column("extra"), 2);
        assert_eq!(t.n_cols(), 3);
    }

    #[test]
    fn test_retain_columns_keeps_order() {
        let mut t = sample();
        t.add_column("junk", vec![cell("x"), cell("y")]);
        let kept = t.retain_columns(|name| name != "junk");
        assert_eq!(kept.columns, vec!["id".to_string(), "value".to_string()]);
        assert_eq!(kept.rows[1], vec![cell("2"), cell("b")]);
    }

    #[test]
    fn test_retain_rows() {
        let t = sample();
        let kept = t.retain_rows(|row| row[0] == cell("2"));
        assert_eq!(kept.n_rows(), 1);
        assert_eq!(kept.rows[0][1], cell("b"));
    }

    #[test]
    fn test_group_rows_sorted_keys() {
        let mut t = Table::new(vec!["id".into()]);
        t.rows.push(vec![cell("2")]);
        t.rows.push(vec![cell("1")]);
        t.rows.push(vec![cell("2")]);
        let groups = t.group_rows(&[0]);
        let keys: Vec<Vec<Cell>> = groups.keys().cloned().collect();
        assert_eq!(keys, vec![vec![cell("1")], vec![cell("2")]]);
        assert_eq!(groups[&vec![cell("2")]], vec![0, 2]);
    }

    #[test]
    fn test_outer_join_matched_rows() {
        let left = sample();
        let mut right = Table::new(vec!["id".into(), "score".into()]);
        right.rows.push(vec![cell("1"), cell("10")]);
        right.rows.push(vec![cell("2"), cell("20")]);

        let joined = left.outer_join(&right, &["id"]).unwrap();
        assert_eq!(
            joined.columns,
            vec!["id".to_string(), "value".to_string(), "score".to_string()]
        );
        assert_eq!(joined.rows[0], vec![cell("1"), cell("a"), cell("10")]);
        assert_eq!(joined.rows[1], vec![cell("2"), cell("b"), cell("20")]);
    }

    #[test]
    fn test_outer_join_keeps_unmatched_sides() {
        let left = sample();
        let mut right = Table::new(vec!["id".into(), "score".into()]);
        right.rows.push(vec![cell("2"), cell("20")]);
        right.rows.push(vec![cell("3"), cell("30")]);

        let joined = left.outer_join(&right, &["id"]).unwrap();
        assert_eq!(joined.n_rows(), 3);
        // left row without a partner: missing score
        assert_eq!(joined.rows[0], vec![cell("1"), cell("a"), None]);
        // right row without a partner: appended with missing left cells
        assert_eq!(joined.rows[2], vec![cell("3"), None, cell("30")]);
    }

    #[test]
    fn test_outer_join_missing_key_column() {
        let left = sample();
        let right = Table::new(vec!["other".into()]);
        assert!(left.outer_join(&right, &["id"]).is_err());
    }
}
