use crate::components::{Cell, CloudState};
use crate::world::{Side, World};

/// Mean of `attribute` over the in-bounds neighbors; zero when there are none.
pub fn neighbor_average(world: &World, cell: &Cell, attribute: impl Fn(&Cell) -> f64) -> f64 {
    let (sum, count) = world
        .neighbors(cell.row(), cell.col())
        .fold((0.0, 0usize), |(sum, count), (_, n)| (sum + attribute(n), count + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

/// Neighbors whose wind blows straight at `cell` along the shared axis.
pub fn upwind_neighbors<'a>(
    world: &'a World,
    cell: &Cell,
) -> impl Iterator<Item = (Side, &'a Cell)> + 'a {
    world
        .neighbors(cell.row(), cell.col())
        .filter(|(side, n)| n.wind_direction() == side.incoming_wind())
}

/// Sum over upwind neighbors of `cell.wind_speed * (neighbor - cell)`.
pub fn wind_influence(world: &World, cell: &Cell, attribute: impl Fn(&Cell) -> f64) -> f64 {
    let own = attribute(cell);
    upwind_neighbors(world, cell)
        .map(|(_, n)| cell.wind_speed() * (attribute(n) - own))
        .sum()
}

pub fn neighboring_clouds(world: &World, cell: &Cell) -> usize {
    world
        .neighbors(cell.row(), cell.col())
        .filter(|(_, n)| n.cloud() == CloudState::Cloud)
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::WindDirection;

    fn calm_world() -> World {
        let mut world = World::new(10).unwrap();
        for row in 0..10 {
            for col in 0..10 {
                let cell = world.cell_mut(row, col).unwrap();
                cell.set_temperature(10.0);
                cell.set_wind_direction(WindDirection::N);
            }
        }
        world
    }

    #[test]
    fn average_of_uniform_neighbors() {
        let world = calm_world();
        let cell = world.cell(5, 5).unwrap().clone();
        assert_eq!(neighbor_average(&world, &cell, Cell::temperature), 10.0);
    }

    #[test]
    fn only_aligned_wind_counts() {
        let mut world = calm_world();
        // South neighbor blowing north reaches (5, 5).
        world.cell_mut(6, 5).unwrap().set_temperature(20.0);
        // North neighbor also blows north, away from (5, 5).
        world.cell_mut(4, 5).unwrap().set_temperature(40.0);
        // West neighbor blowing east reaches (5, 5).
        let west = world.cell_mut(5, 4).unwrap();
        west.set_wind_direction(WindDirection::E);
        west.set_temperature(30.0);

        let cell = world.cell(5, 5).unwrap().clone();
        let sides: Vec<Side> = upwind_neighbors(&world, &cell).map(|(s, _)| s).collect();
        assert_eq!(sides, vec![Side::South, Side::West]);

        let speed = cell.wind_speed();
        let expected = speed * (20.0 - 10.0) + speed * (30.0 - 10.0);
        assert!((wind_influence(&world, &cell, Cell::temperature) - expected).abs() < 1e-12);
    }

    #[test]
    fn counts_cloudy_neighbors() {
        let mut world = calm_world();
        world.cell_mut(4, 5).unwrap().set_cloud(CloudState::Cloud);
        world.cell_mut(5, 6).unwrap().set_cloud(CloudState::Cloud);
        world.cell_mut(6, 5).unwrap().set_cloud(CloudState::Rain);
        let cell = world.cell(5, 5).unwrap().clone();
        assert_eq!(neighboring_clouds(&world, &cell), 2);
    }
}
