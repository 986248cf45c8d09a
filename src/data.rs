use crate::error::{DagForgeError, DfResult};
use std::io::Read;
use std::path::Path;

/// Column-major table of continuous observations.
#[derive(Debug, Clone)]
pub struct DataSet {
    pub names: Vec<String>,
    cols: Vec<Vec<f64>>,
    n_rows: usize,
}

impl DataSet {
    pub fn new(names: Vec<String>, cols: Vec<Vec<f64>>) -> DfResult<Self> {
        if names.len() != cols.len() {
            return Err(DagForgeError::Validation(format!(
                "{} column names for {} columns",
                names.len(),
                cols.len()
            )));
        }
        let n_rows = cols.first().map(|c| c.len()).unwrap_or(0);
        if cols.iter().any(|c| c.len() != n_rows) {
            return Err(DagForgeError::Validation(
                "Columns have unequal lengths".to_string(),
            ));
        }
        Ok(Self { names, cols, n_rows })
    }

    pub fn from_csv_path<P: AsRef<Path>>(path: P) -> DfResult<Self> {
        let file = std::fs::File::open(path)?;
        Self::from_csv_reader(file)
    }

    /// Parses a headered CSV where every column is numeric.
    pub fn from_csv_reader<R: Read>(reader: R) -> DfResult<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let names: Vec<String> = rdr
            .headers()?
            .iter()
            .map(|h| h.to_string())
            .collect();

        let mut cols: Vec<Vec<f64>> = vec![Vec::new(); names.len()];
        for (row_idx, record) in rdr.records().enumerate() {
            let record = record?;
            if record.len() != names.len() {
                return Err(DagForgeError::Validation(format!(
                    "Row {} has {} fields, expected {}",
                    row_idx + 1,
                    record.len(),
                    names.len()
                )));
            }
            for (col, field) in record.iter().enumerate() {
                let value: f64 = field.parse().map_err(|_| {
                    DagForgeError::Validation(format!(
                        "Non-numeric value '{}' in column '{}' (row {})",
                        field,
                        names[col],
                        row_idx + 1
                    ))
                })?;
                cols[col].push(value);
            }
        }

        Self::new(names, cols)
    }

    #[inline]
    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    #[inline]
    pub fn n_cols(&self) -> usize {
        self.cols.len()
    }

    #[inline]
    pub fn column(&self, idx: usize) -> &[f64] {
        &self.cols[idx]
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    /// New dataset keeping only the given rows, in order.
    pub fn take_rows(&self, rows: &[usize]) -> Self {
        let cols = self
            .cols
            .iter()
            .map(|c| rows.iter().map(|&r| c[r]).collect())
            .collect();
        Self {
            names: self.names.clone(),
            cols,
            n_rows: rows.len(),
        }
    }

    /// Shuffled train/test split. `ratio` is the held-out fraction.
    pub fn split_holdout(&self, ratio: f64, seed: Option<u64>) -> DfResult<(DataSet, DataSet)> {
        if !(0.0..1.0).contains(&ratio) || ratio <= 0.0 {
            return Err(DagForgeError::Config(format!(
                "Holdout ratio must be in (0, 1), got {}",
                ratio
            )));
        }
        if self.n_rows < 2 {
            return Err(DagForgeError::Validation(format!(
                "Cannot split {} rows into train and test sets",
                self.n_rows
            )));
        }
        let mut rng = if let Some(s) = seed {
            fastrand::Rng::with_seed(s)
        } else {
            fastrand::Rng::new()
        };

        let mut order: Vec<usize> = (0..self.n_rows).collect();
        rng.shuffle(&mut order);

        let n_test = ((self.n_rows as f64) * ratio).round() as usize;
        let n_test = n_test.clamp(1, self.n_rows.saturating_sub(1));

        let test_rows = &order[..n_test];
        let train_rows = &order[n_test..];
        Ok((self.take_rows(train_rows), self.take_rows(test_rows)))
    }
}
