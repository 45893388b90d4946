use anyhow::{Context, Result};
use chrono::{Duration, NaiveDate};

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
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

    fn below(&mut self, n: u64) -> u64 {
        self.next_u64() % n
    }

    fn pick<'a>(&mut self, items: &[&'a str]) -> &'a str {
        items[self.below(items.len() as u64) as usize]
    }
}

const MODELS: &[(&str, f64)] = &[
    ("bmw x5", 1.6),
    ("ford f-150", 1.2),
    ("hyundai sonata", 0.7),
    ("chrysler 200", 0.6),
    ("toyota camry", 0.8),
    ("chevrolet silverado", 1.3),
    ("honda civic", 0.7),
    ("jeep wrangler", 1.1),
];
const CONDITIONS: &[&str] = &["new", "like new", "excellent", "good", "fair", "salvage"];
const FUELS: &[&str] = &["gas", "diesel", "hybrid"];
const TYPES: &[&str] = &["SUV", "pickup", "sedan", "truck", "coupe"];
const COLORS: &[&str] = &["white", "black", "silver", "red", "blue", ""];

const HEADER: [&str; 10] = [
    "price",
    "model_year",
    "model",
    "condition",
    "fuel",
    "odometer",
    "type",
    "paint_color",
    "date_posted",
    "days_listed",
];

fn listing(rng: &mut SimpleRng, first_day: NaiveDate) -> Vec<String> {
    let (model, premium) = MODELS[rng.below(MODELS.len() as u64) as usize];
    let age = rng.below(25) as i32;
    let model_year = 2019 - age;
    let odometer = (age as f64 * 12_000.0 * (0.6 + 0.8 * rng.next_f64())).round();
    let base = 32_000.0 * premium * 0.9_f64.powi(age) - odometer * 0.02;
    let price = (base * (0.85 + 0.3 * rng.next_f64())).max(500.0).round();
    let posted = first_day + Duration::days(rng.below(365) as i64);

    vec![
        format!("{price:.0}"),
        model_year.to_string(),
        model.to_string(),
        rng.pick(CONDITIONS).to_string(),
        rng.pick(FUELS).to_string(),
        format!("{odometer:.0}"),
        rng.pick(TYPES).to_string(),
        rng.pick(COLORS).to_string(),
        posted.format("%Y-%m-%d").to_string(),
        (rng.below(120) + 1).to_string(),
    ]
}

/// Corrupt a clean row the way scraped listings tend to be corrupted.
fn spoil(rng: &mut SimpleRng, mut row: Vec<String>) -> Vec<String> {
    match rng.below(6) {
        0 => row[0] = "call for price".into(),
        1 => row[0] = "-1".into(),
        2 => row[5] = String::new(),
        3 => row[5] = "2500000".into(),
        4 => row[1] = "1899".into(),
        _ => row[8] = "last tuesday".into(),
    }
    row
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);
    let first_day = NaiveDate::from_ymd_opt(2018, 5, 1).context("invalid start date")?;

    let output_path = "vehicles_us.csv";
    let mut writer = csv::Writer::from_path(output_path)
        .with_context(|| format!("creating {output_path}"))?;
    writer.write_record(HEADER)?;

    let mut written = 0usize;
    let mut previous: Option<Vec<String>> = None;
    for _ in 0..5000 {
        let roll = rng.below(100);
        let row = match (&previous, roll) {
            // ~3% exact duplicates of the row before
            (Some(prev), 0..=2) => prev.clone(),
            // ~7% malformed rows
            (_, 3..=9) => {
                let clean = listing(&mut rng, first_day);
                spoil(&mut rng, clean)
            }
            _ => listing(&mut rng, first_day),
        };
        writer.write_record(&row)?;
        previous = Some(row);
        written += 1;
    }
    writer.flush().context("flushing CSV writer")?;

    println!("Wrote {written} listings to {output_path}");
    Ok(())
}
