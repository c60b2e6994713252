//! Smooths a noisy trajectory and prints position, velocity and acceleration

use std::f64::consts::PI;
use windowed_spline::{BlendMode, SplineConfig, WindowedSpline};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Windowed Spline Example ===\n");

    // 120 frames of a damped oscillation with some measurement jitter
    let n = 120;
    let x: Vec<f64> = (0..n).map(|i| i as f64 / (n - 1) as f64).collect();
    let y: Vec<f64> = x
        .iter()
        .enumerate()
        .map(|(i, &t)| {
            let jitter = 0.01 * ((i * 7 % 11) as f64 - 5.0) / 5.0;
            (-2.0 * t).exp() * (4.0 * PI * t).sin() + jitter
        })
        .collect();

    let config = SplineConfig::new(9, 3, 5)?;
    let spline = WindowedSpline::new(config, x, y)?;
    println!(
        "{} samples, {} segments of {} samples",
        spline.len(),
        spline.segment_count(),
        spline.config().window_size
    );

    let curve = spline.fit()?;

    println!("\n{:>6} {:>10} {:>10} {:>10} {:>10}", "t", "pos", "pos(lin)", "vel", "acc");
    for k in 0..=20 {
        let t = k as f64 / 20.0;
        println!(
            "{:6.3} {:10.4} {:10.4} {:10.4} {:10.4}",
            t,
            curve.value(t)?,
            curve.value_with(t, 0, BlendMode::Linear)?,
            curve.derivative(t, 1)?,
            curve.derivative(t, 2)?,
        );
    }

    // Dense sampling as a plotting front end would do it
    let dense: Vec<f64> = (0..10_000).map(|i| i as f64 / 9_999.0).collect();
    let start = std::time::Instant::now();
    let values = curve.sample(&dense, 0)?;
    println!("\nSampled {} points in {:?}", values.len(), start.elapsed());

    Ok(())
}
