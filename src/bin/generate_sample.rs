//! Writes synthetic RLC-meter sweeps (`f;|Z|;-φ`) for trying the pipeline.
//!
//! Each file is a parallel RC element whose resistance follows an Arrhenius
//! law, one file per temperature.

use std::f64::consts::PI;
use std::path::PathBuf;

use anyhow::{Context, Result};
use rand::{rngs::StdRng, Rng, SeedableRng};

/// Boltzmann constant, eV/K.
const K_B_EV: f64 = 8.617_333e-5;

/// Parallel RC: returns (|Z|, -φ in degrees).
fn parallel_rc(f: f64, r: f64, c: f64) -> (f64, f64) {
    let omega = 2.0 * PI * f;
    let wrc = omega * r * c;
    let denom = 1.0 + wrc * wrc;
    let z_real = r / denom;
    let z_imag = -r * wrc / denom;
    let magnitude = z_real.hypot(z_imag);
    let phase_deg = z_imag.atan2(z_real).to_degrees();
    (magnitude, -phase_deg)
}

fn main() -> Result<()> {
    let out_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("sample_data"));
    std::fs::create_dir_all(&out_dir)
        .with_context(|| format!("creating {}", out_dir.display()))?;

    // Fixed seed so repeated runs write identical files.
    let mut rng = StdRng::seed_from_u64(42);

    // 20 Hz → 2 MHz, 10 points per decade, highest frequency first as the
    // instrument sweeps.
    let frequencies: Vec<f64> = (0..=50)
        .rev()
        .map(|i| 20.0 * 10f64.powf(i as f64 / 10.0))
        .collect();

    let temperatures_c = [25, 50, 75, 100, 125, 150];
    let activation_ev = 0.45;
    let r_25 = 5.0e6;
    let capacitance = 12.0e-12;

    for &t_c in &temperatures_c {
        let t_k = t_c as f64 + 273.15;
        let r = r_25 * (activation_ev / K_B_EV * (1.0 / t_k - 1.0 / 298.15)).exp();

        let path = out_dir.join(format!("T{t_c:03}.txt"));
        let mut writer = csv::WriterBuilder::new()
            .delimiter(b';')
            .has_headers(false)
            .from_path(&path)
            .with_context(|| format!("creating {}", path.display()))?;

        for &f in &frequencies {
            let (magnitude, neg_phase) = parallel_rc(f, r, capacitance);
            let magnitude = magnitude * (1.0 + rng.gen_range(-0.003_f64..0.003));
            let neg_phase = neg_phase + rng.gen_range(-0.08_f64..0.08);
            writer.write_record([
                format!("{f:.2}"),
                format!("{magnitude:.4}"),
                format!("{neg_phase:.3}"),
            ])?;
        }
        writer.flush()?;
    }

    println!(
        "Wrote {} sweeps ({} frequencies each) to {}",
        temperatures_c.len(),
        frequencies.len(),
        out_dir.display()
    );
    Ok(())
}
