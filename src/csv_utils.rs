use std::fs::File;
use std::io::Read;
use std::path::Path;

use log::debug;

use crate::error::{Result, SplineError};

fn column_index(headers: &csv::StringRecord, column: &str) -> Result<usize> {
    headers.iter().position(|h| h == column).ok_or_else(|| {
        SplineError::InvalidParameter(format!("CSV has no column named '{}'", column))
    })
}

/// Reads a column of f64 values from a CSV file by column name, skipping invalid/missing values.
pub fn read_csv_column<P: AsRef<Path>>(path: P, column: &str) -> Result<Vec<f64>> {
    let file = File::open(path)?;
    let mut rdr = csv::Reader::from_reader(file);
    let col_index = column_index(rdr.headers()?, column)?;

    let mut values = Vec::new();
    for result in rdr.records() {
        let record = result?;
        if let Some(val) = record.get(col_index).and_then(|f| f.trim().parse::<f64>().ok()) {
            values.push(val);
        }
    }
    Ok(values)
}

/// Reads an abscissa and an ordinate column as aligned sample arrays.
///
/// Rows where either field is missing or does not parse are dropped as a whole,
/// so the two vectors always have the same length.
pub fn read_csv_columns<P: AsRef<Path>>(
    path: P,
    x_column: &str,
    y_column: &str,
) -> Result<(Vec<f64>, Vec<f64>)> {
    read_columns_from(File::open(path)?, x_column, y_column)
}

/// Same as [`read_csv_columns`] for any reader
pub fn read_columns_from<R: Read>(
    reader: R,
    x_column: &str,
    y_column: &str,
) -> Result<(Vec<f64>, Vec<f64>)> {
    let mut rdr = csv::Reader::from_reader(reader);
    let headers = rdr.headers()?.clone();
    let xi = column_index(&headers, x_column)?;
    let yi = column_index(&headers, y_column)?;

    let mut x = Vec::new();
    let mut y = Vec::new();
    let mut skipped = 0usize;
    for result in rdr.records() {
        let record = result?;
        let parse = |i: usize| record.get(i).and_then(|f| f.trim().parse::<f64>().ok());
        match (parse(xi), parse(yi)) {
            (Some(xv), Some(yv)) => {
                x.push(xv);
                y.push(yv);
            }
            _ => skipped += 1,
        }
    }

    if skipped > 0 {
        debug!("skipped {} CSV rows with missing or invalid samples", skipped);
    }
    Ok((x, y))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rows_stay_aligned() {
        let data = "t,pos,other\n0.0,1.5,a\n0.1,,b\n0.2,2.5,c\nbad,3.0,d\n0.4,4.0,e\n";
        let (x, y) = read_columns_from(data.as_bytes(), "t", "pos").unwrap();

        assert_eq!(x, vec![0.0, 0.2, 0.4]);
        assert_eq!(y, vec![1.5, 2.5, 4.0]);
    }

    #[test]
    fn test_missing_column() {
        let data = "t,pos\n0.0,1.0\n";
        let result = read_columns_from(data.as_bytes(), "t", "velocity");
        assert!(matches!(result, Err(SplineError::InvalidParameter(_))));
    }

    #[test]
    fn test_missing_file() {
        let result = read_csv_column("/nonexistent/samples.csv", "t");
        assert!(matches!(result, Err(SplineError::Io(_))));
    }
}
