use std::path::PathBuf;

use planetgrid::{
    engine::EngineBuilder, scenario::ScenarioLoader, sink::MemorySink, systems::standard_rules,
};
use tempfile::tempdir;

fn fixtures() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
}

#[test]
fn loads_small_planet_fixture() {
    let scenario = ScenarioLoader::new(fixtures())
        .load("scenarios/small_planet.yaml")
        .expect("scenario should load");
    assert_eq!(scenario.name, "small_planet");
    assert_eq!(scenario.seed, 42);
    assert_eq!(scenario.grid_size, 12);
    assert_eq!(scenario.ticks(None), 30);
    assert_eq!(scenario.logging.level, "warn");

    let mut world = scenario.build_world().unwrap();
    let mut engine = EngineBuilder::new(scenario.engine_settings().unwrap())
        .with_rules(standard_rules())
        .build();
    let mut sink = MemorySink::new();
    engine
        .run(&mut world, scenario.ticks(Some(4)), &mut sink)
        .expect("run succeeds");
    assert_eq!(world.tick(), 4);
    assert_eq!(sink.records().len(), 4);
}

#[test]
fn undersized_scenario_fails_to_load() {
    let dir = tempdir().expect("tempdir");
    std::fs::write(dir.path().join("tiny.yaml"), "name: tiny\nseed: 1\ngrid_size: 8\n").unwrap();
    let err = ScenarioLoader::new(dir.path())
        .load("tiny.yaml")
        .unwrap_err();
    assert!(format!("{err:#}").contains("got 8"));
}

#[test]
fn missing_scenario_reports_path() {
    let err = ScenarioLoader::new(fixtures())
        .load("scenarios/does_not_exist.yaml")
        .unwrap_err();
    assert!(err.to_string().contains("does_not_exist.yaml"));
}
