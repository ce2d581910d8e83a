//! Triangulate a polygon stored as JSON rings (`[[[x, y], ...], ...]`, outer ring first).
//!
//! ```text
//! cargo run --release --example triangulate -- tests/fixtures/lake.json
//! ```

use std::{env, fs, process, time::Instant};

use earclip::{deviation, Earcut};
use serde::Deserialize;

#[derive(Deserialize)]
struct Rings(Vec<Vec<[f64; 2]>>);

impl Rings {
    fn flatten(&self) -> (Vec<f64>, Vec<u32>) {
        let data = self.0.iter().flatten().flatten().copied().collect();
        let mut hole_indices = Vec::with_capacity(self.0.len().saturating_sub(1));
        let mut offset = 0;
        for ring in self.0.iter().take(self.0.len().saturating_sub(1)) {
            offset += ring.len() as u32;
            hole_indices.push(offset);
        }
        (data, hole_indices)
    }
}

struct ConsoleLogger;

impl log::Log for ConsoleLogger {
    fn enabled(&self, _metadata: &log::Metadata) -> bool {
        true
    }

    fn log(&self, record: &log::Record) {
        eprintln!("[{}] {}", record.level(), record.args());
    }

    fn flush(&self) {}
}

static LOGGER: ConsoleLogger = ConsoleLogger;

fn main() {
    let _ = log::set_logger(&LOGGER);
    log::set_max_level(log::LevelFilter::Debug);

    let path = env::args()
        .nth(1)
        .unwrap_or_else(|| "./tests/fixtures/lake.json".to_string());
    let rings: Rings = match fs::read_to_string(&path)
        .map_err(|e| e.to_string())
        .and_then(|s| serde_json::from_str(&s).map_err(|e| e.to_string()))
    {
        Ok(rings) => rings,
        Err(e) => {
            eprintln!("failed to read {path}: {e}");
            process::exit(1);
        }
    };
    let (data, hole_indices) = rings.flatten();

    let mut earcut = Earcut::new();
    let mut triangles = vec![];
    let started = Instant::now();
    if let Err(e) = earcut.earcut(&data, &hole_indices, 2, &mut triangles) {
        eprintln!("invalid polygon: {e}");
        process::exit(1);
    }
    let elapsed = started.elapsed();

    println!(
        "{} vertices, {} holes -> {} triangles in {:?} (deviation {:e})",
        data.len() / 2,
        hole_indices.len(),
        triangles.len() / 3,
        elapsed,
        deviation(&data, &hole_indices, 2, &triangles)
    );
}
