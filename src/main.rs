use autodrive::simulation::brain::NeuralNetwork;
use autodrive::simulation::car::{Car, ControlType};
use autodrive::simulation::geometry::{Point, Segment};
use autodrive::simulation::params::Params;
use autodrive::simulation::population::Population;
use log::info;
use rand::Rng;

const GENERATIONS: usize = 10;
const ROAD_HALF_WIDTH: f64 = 100.0;
const ROAD_LENGTH: f64 = 100_000.0;

/// Two parallel borders of a straight road running up from the origin.
fn straight_road() -> Vec<Segment> {
    [-ROAD_HALF_WIDTH, ROAD_HALF_WIDTH]
        .iter()
        .map(|&x| Segment::new(Point::new(x, 1000.0), Point::new(x, -ROAD_LENGTH)))
        .collect()
}

/// Slow dummy cars spread over the three lanes ahead of the start.
fn spawn_traffic<R: Rng>(params: &Params, rng: &mut R) -> Vec<Car> {
    let mut traffic_params = params.clone();
    traffic_params.car.max_speed = params.car.max_speed / 2.0;

    let lane_width = 2.0 * ROAD_HALF_WIDTH / 3.0;
    (1..=12)
        .map(|i| {
            let lane = rng.random_range(0..3) as f64;
            let x = -ROAD_HALF_WIDTH + lane_width * (lane + 0.5);
            let y = -250.0 * i as f64;
            Car::new(x, y, 0.0, ControlType::Dummy, &traffic_params, rng)
        })
        .collect()
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let params = Params::default();
    let mut rng = rand::rng();
    let mut best: Option<NeuralNetwork> = None;

    info!(
        "Training {} cars for {} generations",
        params.population_size, GENERATIONS
    );

    for generation in 0..GENERATIONS {
        let mut population = Population::spawn(
            params.population_size,
            Point::new(0.0, 0.0),
            0.0,
            straight_road(),
            &params,
            &mut rng,
        );
        population.traffic = spawn_traffic(&params, &mut rng);

        if let Some(brain) = &best {
            population.seed_brains(brain, params.mutation_amount, &mut rng)?;
        }

        while population.tick() < params.max_ticks as u64 && !population.all_damaged() {
            population.step();
        }

        if let Some(car) = population.best() {
            let crashed = population.cars.iter().filter(|c| c.is_damaged()).count();
            info!(
                "generation {}: best fitness {:.1} after {} ticks, {} of {} cars crashed",
                generation,
                car.fitness(),
                population.tick(),
                crashed,
                population.cars.len()
            );
            best = car.brain().cloned();
        }
    }

    if let Some(brain) = best {
        println!("{}", brain.to_json()?);
    }

    Ok(())
}
