use std::sync::Arc;

use arrow::array::{Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use serde::Serialize;

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

    fn pick<'a>(&mut self, items: &[&'a str]) -> &'a str {
        items[(self.next_u64() % items.len() as u64) as usize]
    }
}

/// Column layout of the public launch table, extra columns included.
#[derive(Serialize)]
struct LaunchRow {
    #[serde(rename = "Flight Number")]
    flight_number: i64,
    #[serde(rename = "Launch Site")]
    launch_site: String,
    #[serde(rename = "Mission Outcome")]
    mission_outcome: &'static str,
    #[serde(rename = "class")]
    class: i64,
    #[serde(rename = "Payload Mass (kg)")]
    payload_mass_kg: f64,
    #[serde(rename = "Booster Version")]
    booster_version: String,
    #[serde(rename = "Booster Version Category")]
    booster_version_category: String,
}

/// Booster generations in flight order: (category, launches, max payload,
/// landing success probability).
const ERAS: [(&str, usize, f64, f64); 5] = [
    ("v1.0", 5, 700.0, 0.0),
    ("v1.1", 15, 4_500.0, 0.2),
    ("FT", 24, 9_600.0, 0.65),
    ("B4", 6, 9_600.0, 0.5),
    ("B5", 6, 15_600.0, 0.9),
];

const SITES: [&str; 4] = ["CCAFS LC-40", "VAFB SLC-4E", "KSC LC-39A", "CCAFS SLC-40"];

fn main() {
    let mut rng = SimpleRng::new(42);
    let mut rows: Vec<LaunchRow> = Vec::new();

    for &(category, launches, max_payload, p_success) in &ERAS {
        for _ in 0..launches {
            let flight_number = rows.len() as i64 + 1;
            // Early flights all left from LC-40.
            let launch_site = if category == "v1.0" {
                SITES[0]
            } else {
                rng.pick(&SITES)
            };
            // Payloads in the public table are whole kilograms, 0 for unknown.
            let payload = (rng.next_f64() * max_payload).round();
            let class = i64::from(rng.next_f64() < p_success);

            rows.push(LaunchRow {
                flight_number,
                launch_site: launch_site.to_string(),
                mission_outcome: "Success",
                class,
                payload_mass_kg: payload,
                booster_version: format!("F9 {category} B{:04}", 1000 + flight_number),
                booster_version_category: category.to_string(),
            });
        }
    }

    // CSV
    let csv_path = "spacex_launch_dash.csv";
    let mut writer = csv::Writer::from_path(csv_path).expect("Failed to create CSV file");
    for row in &rows {
        writer.serialize(row).expect("Failed to write CSV row");
    }
    writer.flush().expect("Failed to flush CSV file");

    // Parquet
    let schema = Arc::new(Schema::new(vec![
        Field::new("Flight Number", DataType::Int64, false),
        Field::new("Launch Site", DataType::Utf8, false),
        Field::new("class", DataType::Int64, false),
        Field::new("Payload Mass (kg)", DataType::Float64, false),
        Field::new("Booster Version Category", DataType::Utf8, false),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(Int64Array::from_iter_values(rows.iter().map(|r| r.flight_number))),
            Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.launch_site.as_str()))),
            Arc::new(Int64Array::from_iter_values(rows.iter().map(|r| r.class))),
            Arc::new(Float64Array::from_iter_values(rows.iter().map(|r| r.payload_mass_kg))),
            Arc::new(StringArray::from_iter_values(
                rows.iter().map(|r| r.booster_version_category.as_str()),
            )),
        ],
    )
    .expect("Failed to create RecordBatch");

    let parquet_path = "spacex_launch_dash.parquet";
    let file = std::fs::File::create(parquet_path).expect("Failed to create output file");
    let mut writer = ArrowWriter::try_new(file, schema, None).expect("Failed to create writer");
    writer.write(&batch).expect("Failed to write batch");
    writer.close().expect("Failed to close writer");

    arrow::util::pretty::print_batches(&[batch.slice(0, 5)]).expect("Failed to print preview");
    println!(
        "Wrote {} launches over {} sites to {csv_path} and {parquet_path}",
        rows.len(),
        SITES.len()
    );
}
