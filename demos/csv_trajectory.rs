//! Fits a trajectory stored in a CSV file.
//!
//! Usage: `cargo run --example csv_trajectory -- data.csv t position`

use windowed_spline::{read_csv_columns, SplineConfig, WindowedSpline};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = std::env::args().skip(1);
    let path = args.next().unwrap_or_else(|| "data.csv".to_string());
    let x_col = args.next().unwrap_or_else(|| "t".to_string());
    let y_col = args.next().unwrap_or_else(|| "position".to_string());

    let (x, y) = read_csv_columns(&path, &x_col, &y_col)?;
    println!("Read {} samples from {}", x.len(), path);

    let curve = WindowedSpline::new(SplineConfig::default(), x, y)?.fit()?;
    let (start, end) = curve.domain();

    println!("{},{},velocity,acceleration", x_col, y_col);
    for k in 0..=200 {
        let t = start + (end - start) * k as f64 / 200.0;
        println!(
            "{},{},{},{}",
            t,
            curve.value(t)?,
            curve.derivative(t, 1)?,
            curve.derivative(t, 2)?
        );
    }

    Ok(())
}
