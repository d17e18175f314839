use planetgrid::{
    world::{TerrainBands, MIN_GRID_SIZE},
    GridError, Terrain, World,
};

#[test]
fn sizes_below_minimum_are_rejected() {
    for size in 0..MIN_GRID_SIZE {
        assert_eq!(World::new(size).unwrap_err(), GridError::InvalidSize(size));
    }
}

#[test]
fn every_coordinate_has_exactly_one_cell() {
    let world = World::new(13).unwrap();
    assert_eq!(world.cells().len(), 13 * 13);
    for (idx, cell) in world.cells().iter().enumerate() {
        assert_eq!(cell.position(), (idx / 13, idx % 13));
    }
    assert_eq!(world.rows().count(), 13);
}

#[test]
fn layout_matches_band_formulas() {
    for size in [10, 17, 20, 31] {
        let world = World::new(size).unwrap();
        let bands = TerrainBands::for_size(size);
        assert_eq!(bands.sea_border, size / 7);
        assert_eq!(bands.glacier_width, size / 6);
        assert_eq!(bands.land_start, size / 5);
        assert_eq!(bands.land_end, size / 5 + size / 4);

        let last = size - 1;
        for (r, c) in [(0, 0), (0, last), (last, 0), (last, last)] {
            assert_eq!(world.cell(r, c).unwrap().terrain(), Terrain::Glacier);
        }
        let mid = size / 2;
        assert_eq!(world.cell(0, mid).unwrap().terrain(), Terrain::Sea);
        assert_eq!(world.cell(mid, last).unwrap().terrain(), Terrain::Sea);
        assert_eq!(
            world.cell(bands.land_start, bands.land_start).unwrap().terrain(),
            Terrain::Land
        );
        for cell in world.cells() {
            assert_eq!(cell.terrain(), bands.classify(size, cell.row(), cell.col()));
        }
    }
}

#[test]
fn layout_is_symmetric_across_the_diagonal() {
    let world = World::new(24).unwrap();
    for cell in world.cells() {
        let mirrored = world.cell(cell.col(), cell.row()).unwrap();
        assert_eq!(cell.terrain(), mirrored.terrain());
        assert_eq!(cell.temperature(), mirrored.temperature());
    }
}

#[test]
fn cells_start_from_terrain_defaults() {
    let world = World::new(20).unwrap();
    for cell in world.cells() {
        let defaults = cell.terrain().defaults();
        assert_eq!(cell.temperature(), defaults.temperature);
        assert_eq!(cell.pollution(), defaults.pollution);
        assert_eq!(cell.wind_speed(), defaults.wind_speed);
        assert_eq!(cell.wind_direction(), defaults.wind_direction);
        assert_eq!(cell.generated_pollution(), defaults.generated_pollution);
        assert_eq!(cell.absorbed_pollution(), defaults.absorbed_pollution);
    }
}

#[test]
fn every_terrain_appears_on_a_twenty_grid() {
    let counts = World::new(20).unwrap().terrain_counts();
    for terrain in Terrain::ALL {
        assert!(counts.get(&terrain).copied().unwrap_or(0) > 0, "{terrain:?} missing");
    }
    assert_eq!(counts.values().sum::<usize>(), 400);
}
