use std::time::Instant;

use anyhow::Result;
use serde::Serialize;
use tracing::{debug, info};

use crate::{
    aggregate::{self, Aggregates},
    components::Cell,
    rng::RngManager,
    sink::{AverageRecord, AverageSink},
    systems::{CellRule, CloudThresholds, Globals, RuleContext, ThresholdRange},
    world::World,
};

const CLOUD_STREAM: &str = "clouds";

#[derive(Debug, Clone)]
pub struct EngineSettings {
    pub scenario_name: String,
    pub seed: u64,
    pub cloud_thresholds: ThresholdRange,
    /// Cover every clear glacier with a cloud right before the first tick.
    pub seed_glacier_clouds: bool,
}

impl EngineSettings {
    pub fn new(scenario_name: impl Into<String>, seed: u64) -> Self {
        Self {
            scenario_name: scenario_name.into(),
            seed,
            cloud_thresholds: ThresholdRange::default(),
            seed_glacier_clouds: true,
        }
    }
}

pub struct EngineBuilder {
    settings: EngineSettings,
    rules: Vec<Box<dyn CellRule>>,
}

impl EngineBuilder {
    pub fn new(settings: EngineSettings) -> Self {
        Self {
            settings,
            rules: Vec::new(),
        }
    }

    pub fn with_rule(mut self, rule: impl CellRule + 'static) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    pub fn with_rules(mut self, rules: impl IntoIterator<Item = Box<dyn CellRule>>) -> Self {
        self.rules.extend(rules);
        self
    }

    pub fn build(self) -> Engine {
        Engine {
            rng: RngManager::new(self.settings.seed),
            rules: self.rules,
            settings: self.settings,
            back: Vec::new(),
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct TickSummary {
    pub tick: u64,
    pub thresholds: CloudThresholds,
    pub aggregates: Aggregates,
    pub reclassified: usize,
    pub duration_ms: f64,
}

/// Advances a [`World`] one synchronous tick at a time. Next-tick cells are
/// built in a back buffer from the frozen current grid and swapped in whole.
pub struct Engine {
    rng: RngManager,
    rules: Vec<Box<dyn CellRule>>,
    settings: EngineSettings,
    back: Vec<Cell>,
}

impl Engine {
    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn rule_names(&self) -> Vec<&str> {
        self.rules.iter().map(|rule| rule.name()).collect()
    }

    /// Draws this tick's cloud thresholds and advances the world.
    pub fn step(&mut self, world: &mut World, sink: &mut dyn AverageSink) -> Result<TickSummary> {
        let thresholds = {
            let mut stream = self.rng.stream(CLOUD_STREAM);
            CloudThresholds::draw(&mut stream, self.settings.cloud_thresholds)
        };
        self.step_with(world, thresholds, sink)
    }

    /// Advances the world with caller-supplied cloud thresholds. If the sink
    /// rejects the record the world keeps its previous cells.
    pub fn step_with(
        &mut self,
        world: &mut World,
        thresholds: CloudThresholds,
        sink: &mut dyn AverageSink,
    ) -> Result<TickSummary> {
        let start = Instant::now();
        if world.tick() == 0 && self.settings.seed_glacier_clouds {
            let seeded = world.seed_glacier_clouds();
            if seeded > 0 {
                debug!(seeded, "seeded glacier clouds");
            }
        }

        let tick = world.tick() + 1;
        let globals = Globals::from(world.aggregates()?);
        let ctx = RuleContext {
            world: &*world,
            globals,
            thresholds,
        };

        self.back.clear();
        let mut reclassified = 0;
        for cell in ctx.world.cells() {
            let mut next = cell.clone();
            for rule in &self.rules {
                rule.apply(&ctx, cell, &mut next);
            }
            if next.terrain() != cell.terrain() {
                reclassified += 1;
            }
            self.back.push(next);
        }

        let aggregates = aggregate::summarize(&self.back)?;
        sink.append(&AverageRecord {
            tick,
            avg_temperature: aggregates.avg_temperature,
            avg_pollution: aggregates.avg_pollution,
        })?;
        world.swap_cells(&mut self.back);

        let summary = TickSummary {
            tick,
            thresholds,
            aggregates,
            reclassified,
            duration_ms: start.elapsed().as_secs_f64() * 1_000.0,
        };
        debug!(
            tick,
            cloud_threshold = thresholds.cloud,
            rain_threshold = thresholds.rain,
            avg_temperature = aggregates.avg_temperature,
            avg_pollution = aggregates.avg_pollution,
            reclassified,
            "tick complete"
        );
        Ok(summary)
    }

    pub fn run(&mut self, world: &mut World, ticks: u64, sink: &mut dyn AverageSink) -> Result<()> {
        self.run_with_hook(world, ticks, sink, |_, _| {})
    }

    /// Runs `ticks` ticks, calling `hook` with each summary and the grid it
    /// produced.
    pub fn run_with_hook<F>(
        &mut self,
        world: &mut World,
        ticks: u64,
        sink: &mut dyn AverageSink,
        mut hook: F,
    ) -> Result<()>
    where
        F: FnMut(&TickSummary, &World),
    {
        info!(
            scenario = %self.settings.scenario_name,
            size = world.size(),
            ticks,
            rules = ?self.rule_names(),
            "starting run"
        );
        let mut last = None;
        for _ in 0..ticks {
            let summary = self.step(world, sink)?;
            hook(&summary, world);
            last = Some(summary);
        }
        if let Some(summary) = last {
            info!(
                scenario = %self.settings.scenario_name,
                tick = summary.tick,
                avg_temperature = summary.aggregates.avg_temperature,
                avg_pollution = summary.aggregates.avg_pollution,
                "run finished"
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{CloudState, Terrain};
    use crate::sink::MemorySink;
    use crate::systems::{standard_rules, TemperatureRule};

    struct FailingSink;

    impl AverageSink for FailingSink {
        fn append(&mut self, _record: &AverageRecord) -> Result<()> {
            anyhow::bail!("disk full")
        }
    }

    fn settings() -> EngineSettings {
        EngineSettings::new("unit", 5)
    }

    #[test]
    fn step_advances_tick_and_logs_new_grid() {
        let mut world = World::new(12).unwrap();
        let mut engine = EngineBuilder::new(settings())
            .with_rules(standard_rules())
            .build();
        let mut sink = MemorySink::new();
        let summary = engine.step(&mut world, &mut sink).unwrap();

        assert_eq!(summary.tick, 1);
        assert_eq!(world.tick(), 1);
        let after = world.aggregates().unwrap();
        assert_eq!(summary.aggregates, after);
        assert_eq!(sink.records().len(), 1);
        assert_eq!(sink.records()[0].avg_temperature, after.avg_temperature);
    }

    #[test]
    fn failed_sink_leaves_world_untouched() {
        let mut world = World::new(10).unwrap();
        world.cell_mut(5, 5).unwrap().set_temperature(80.0);
        let before = world.cells().to_vec();
        let mut engine = EngineBuilder::new(EngineSettings {
            seed_glacier_clouds: false,
            ..settings()
        })
        .with_rules(standard_rules())
        .build();

        assert!(engine.step(&mut world, &mut FailingSink).is_err());
        assert_eq!(world.tick(), 0);
        assert_eq!(world.cells(), before.as_slice());
    }

    #[test]
    fn rules_run_in_registration_order() {
        let engine = EngineBuilder::new(settings())
            .with_rules(standard_rules())
            .build();
        assert_eq!(
            engine.rule_names(),
            vec!["temperature", "pollution", "wind", "clouds", "terrain", "emissions"]
        );
    }

    #[test]
    fn glaciers_are_seeded_before_first_tick() {
        let mut world = World::new(12).unwrap();
        let mut engine = EngineBuilder::new(settings())
            .with_rule(TemperatureRule::new())
            .build();
        engine
            .step_with(&mut world, CloudThresholds::new(3, 3), &mut MemorySink::new())
            .unwrap();
        for cell in world.cells() {
            if cell.terrain() == Terrain::Glacier {
                assert_eq!(cell.cloud(), CloudState::Cloud);
            }
        }
    }

    #[test]
    fn step_draws_from_configured_range() {
        let mut world = World::new(10).unwrap();
        let mut engine = EngineBuilder::new(EngineSettings {
            cloud_thresholds: ThresholdRange::new(2, 2).unwrap(),
            ..settings()
        })
        .with_rules(standard_rules())
        .build();
        let mut sink = MemorySink::new();
        for _ in 0..5 {
            let summary = engine.step(&mut world, &mut sink).unwrap();
            assert_eq!(summary.thresholds, CloudThresholds::new(2, 2));
        }
        assert!(ThresholdRange::new(3, 1).is_none());
    }

    #[test]
    fn same_seed_reproduces_run() {
        let run = || {
            let mut world = World::new(15).unwrap();
            let mut engine = EngineBuilder::new(settings())
                .with_rules(standard_rules())
                .build();
            let mut sink = MemorySink::new();
            engine.run(&mut world, 10, &mut sink).unwrap();
            (world.cells().to_vec(), sink.into_records())
        };
        assert_eq!(run(), run());
    }
}
