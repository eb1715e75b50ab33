use std::path::PathBuf;

use anyhow::{Context, Result};

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in s.iter_mut() {
            // splitmix64
            x = x.wrapping_add(0x9E37_79B9_7F4A_7C15);
            let mut z = x;
            z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
            z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
            *slot = z ^ (z >> 31);
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = self.state[1]
            .wrapping_mul(5)
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

/// Sampling days: pre-flight baseline, in flight, and after landing (> 340).
const TIMEPOINTS: [u32; 12] = [0, 14, 30, 60, 90, 120, 180, 240, 300, 340, 370, 430];
const MISSION_DAYS: f64 = 340.0;

/// (gene, baseline expression, in-flight drift per 100 days)
const GENES: [(&str, f64, f64); 5] = [
    ("FOS", 6.2, 1.1),
    ("EGR1", 5.4, 0.8),
    ("IL6", 3.1, 0.5),
    ("TP53", 7.8, -0.3),
    ("CDKN1A", 4.6, 0.6),
];

/// (marker, baseline, in-flight rise per 100 days)
const MARKERS: [(&str, f64, f64); 3] = [
    ("8-OHdG", 4.0, 0.9),
    ("Isoprostane", 1.2, 0.35),
    ("MDA", 2.5, 0.4),
];

/// Days spent in flight by `day`, capped at the mission length and decaying after landing.
fn flight_exposure(day: u32) -> f64 {
    let day = f64::from(day);
    if day <= MISSION_DAYS {
        day / 100.0
    } else {
        (MISSION_DAYS / 100.0) * (-(day - MISSION_DAYS) / 60.0).exp()
    }
}

fn main() -> Result<()> {
    let out_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("data"));
    std::fs::create_dir_all(&out_dir)
        .with_context(|| format!("creating {}", out_dir.display()))?;

    let mut rng = SimpleRng::new(42);

    // Only the flight twin is exposed; the ground twin stays near baseline.
    let gene_path = out_dir.join("gene_expression.csv");
    let mut gene = csv::Writer::from_path(&gene_path).context("creating gene_expression.csv")?;
    gene.write_record(["Timepoint", "Twin", "Gene", "Expression"])?;
    let mut gene_rows = 0;
    for &(name, base, drift) in &GENES {
        for (twin, exposed) in [("Flight", true), ("Ground", false)] {
            for &day in &TIMEPOINTS {
                let shift = if exposed { drift * flight_exposure(day) } else { 0.0 };
                let value = base + shift + rng.gauss(0.0, 0.15);
                gene.write_record([
                    day.to_string(),
                    twin.to_string(),
                    name.to_string(),
                    format!("{value:.3}"),
                ])?;
                gene_rows += 1;
            }
        }
    }
    gene.flush()?;

    let stress_path = out_dir.join("oxidative_stress.csv");
    let mut stress = csv::Writer::from_path(&stress_path).context("creating oxidative_stress.csv")?;
    stress.write_record(["Timepoint", "Marker", "Value"])?;
    let mut stress_rows = 0;
    for &(name, base, rise) in &MARKERS {
        for &day in &TIMEPOINTS {
            let value = base + rise * flight_exposure(day) + rng.gauss(0.0, 0.05 * base);
            stress.write_record([day.to_string(), name.to_string(), format!("{value:.3}")])?;
            stress_rows += 1;
        }
    }
    stress.flush()?;

    println!(
        "Wrote {gene_rows} rows to {} and {stress_rows} rows to {}",
        gene_path.display(),
        stress_path.display()
    );
    Ok(())
}
