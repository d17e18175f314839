//! Tick timing smoke check.
//!
//! Run with: cargo bench

use std::hint::black_box;
use std::time::Instant;

use planetgrid::{
    engine::{EngineBuilder, EngineSettings},
    sink::MemorySink,
    systems::standard_rules,
    World,
};

#[cfg(test)]
mod benches {
    use super::*;

    #[test]
    fn benchmark_tick_performance() {
        let mut world = World::new(64).expect("grid");
        let mut engine = EngineBuilder::new(EngineSettings::new("bench", 1))
            .with_rules(standard_rules())
            .build();
        let mut sink = MemorySink::new();

        let ticks = 50;
        let start = Instant::now();
        for _ in 0..ticks {
            black_box(engine.step(&mut world, &mut sink).expect("tick"));
        }
        let per_tick = start.elapsed() / ticks;
        println!("64x64 grid: {per_tick:?} per tick");
        assert_eq!(sink.records().len(), ticks as usize);
    }
}
