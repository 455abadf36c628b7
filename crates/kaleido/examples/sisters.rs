//! Print how far sisters drift from their prototype as the distance grows.
//!
//! Usage:
//!   cargo run -p kaleido --example sisters -- [seed]
//!
//! For each distance, makes one prototype and four sisters and prints the
//! similarity (sum of squared deflection differences) of each sister.

use kaleido::prelude::*;

fn main() {
    let seed = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(2015u64);
    let params = KaleidoParams::default();
    for (i, distance) in [0.0, 5.0, 10.0, 20.0, 40.0].into_iter().enumerate() {
        let mut rng = ReplayToken::new(seed, i as u64).to_std_rng();
        let proto = match Kaleido::make(params, None, &mut rng) {
            Ok(k) => k,
            Err(e) => {
                eprintln!("make failed: {e}");
                return;
            }
        };
        let scores: Vec<String> = (0..4)
            .filter_map(|_| Kaleido::copy(&proto, distance, &mut rng).ok())
            .filter_map(|s| proto.similarity(&s).ok())
            .map(|r| format!("{r:.0}"))
            .collect();
        println!(
            "distance {distance:>4}: nv={} similarity [{}]",
            proto.vertex_count(),
            scores.join(", ")
        );
    }
}
