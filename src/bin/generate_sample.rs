use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{Float64Builder, Int64Array, ListBuilder};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use serde::Serialize;

/// Samples per heartbeat, matching the ECG5000 layout.
const BEAT_LEN: usize = 140;

fn gaussian(x: f64, mu: f64, sigma: f64, amplitude: f64) -> f64 {
    amplitude * (-(x - mu).powi(2) / (2.0 * sigma.powi(2))).exp()
}

/// One (mu, sigma, amplitude) wave per P, Q, R, S and T component.
type Waves = [(f64, f64, f64); 5];

const NORMAL_BEAT: Waves = [
    (25.0, 5.0, 0.6),
    (45.0, 2.0, -0.8),
    (50.0, 2.5, 3.5),
    (55.0, 2.0, -1.2),
    (95.0, 9.0, 1.0),
];

/// Wide QRS, no P wave, inverted T.
const ABNORMAL_BEAT: Waves = [
    (25.0, 5.0, 0.0),
    (42.0, 4.0, -1.5),
    (52.0, 6.0, 2.5),
    (64.0, 5.0, -2.0),
    (100.0, 10.0, -1.0),
];

fn generate_beat(waves: &Waves, jitter: f64, noise_level: f64, rng: &mut SimpleRng) -> Vec<f64> {
    let shift = rng.gauss(0.0, jitter);
    (0..BEAT_LEN)
        .map(|i| {
            let x = i as f64;
            let signal: f64 = waves
                .iter()
                .map(|&(mu, sigma, amp)| gaussian(x, mu + shift, sigma, amp))
                .sum();
            signal - 0.5 + rng.gauss(0.0, noise_level)
        })
        .collect()
}

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

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

#[derive(Serialize)]
struct SampleRecord {
    data: Vec<f64>,
    index: i64,
}

/// `count` beats, a fraction `abnormal` of them anomalous. Record ids start
/// at `first_id` so test and train ids never collide.
fn generate_set(
    count: usize,
    abnormal: f64,
    first_id: i64,
    rng: &mut SimpleRng,
) -> Vec<SampleRecord> {
    (0..count)
        .map(|i| {
            let waves = if rng.next_f64() < abnormal {
                &ABNORMAL_BEAT
            } else {
                &NORMAL_BEAT
            };
            SampleRecord {
                data: generate_beat(waves, 2.0, 0.05, rng),
                index: first_id + i as i64,
            }
        })
        .collect()
}

fn write_json(path: &Path, records: &[SampleRecord]) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("creating {}", path.display()))?;
    serde_json::to_writer(std::io::BufWriter::new(file), records)
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

fn write_parquet(path: &Path, records: &[SampleRecord]) -> Result<()> {
    let mut data_builder = ListBuilder::new(Float64Builder::new());
    for rec in records {
        data_builder.values().append_slice(&rec.data);
        data_builder.append(true);
    }
    let index_array = Int64Array::from(records.iter().map(|r| r.index).collect::<Vec<_>>());

    let schema = Arc::new(Schema::new(vec![
        Field::new(
            "data",
            DataType::List(Arc::new(Field::new("item", DataType::Float64, true))),
            false,
        ),
        Field::new("index", DataType::Int64, false),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![Arc::new(data_builder.finish()), Arc::new(index_array)],
    )
    .context("building record batch")?;

    let file = std::fs::File::create(path)
        .with_context(|| format!("creating {}", path.display()))?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}

fn main() -> Result<()> {
    let base = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("public"));
    let out_dir = base.join("data").join("ecg");
    std::fs::create_dir_all(&out_dir)
        .with_context(|| format!("creating {}", out_dir.display()))?;

    let mut rng = SimpleRng::new(42);

    // Training data is mostly normal, test data mixes in more anomalies.
    let train = generate_set(200, 0.05, 0, &mut rng);
    let test = generate_set(60, 0.3, 10_000, &mut rng);

    write_json(&out_dir.join("train_small.json"), &train)?;
    write_json(&out_dir.join("test_small.json"), &test)?;
    write_parquet(&out_dir.join("test_small.parquet"), &test)?;

    println!(
        "Wrote {} train and {} test beats ({BEAT_LEN} samples each) to {}",
        train.len(),
        test.len(),
        out_dir.display()
    );
    Ok(())
}
