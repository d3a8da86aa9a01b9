#![allow(missing_docs)]
#![allow(clippy::float_cmp)]

use autodrive::simulation::brain::NeuralNetwork;
use autodrive::simulation::car::{Car, ControlType, Key};
use autodrive::simulation::geometry::{Point, Segment, polys_intersect};
use autodrive::simulation::params::Params;
use autodrive::simulation::population::{Population, default_start};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::f64::consts::PI;

fn create_test_params() -> Params {
    let mut params = Params::default();
    params.population_size = 20;
    params.car.max_speed = 3.0;
    params
}

fn road(half_width: f64) -> Vec<Segment> {
    [-half_width, half_width]
        .iter()
        .map(|&x| Segment::new(Point::new(x, 500.0), Point::new(x, -10_000.0)))
        .collect()
}

fn traffic(params: &Params, rng: &mut StdRng) -> Vec<Car> {
    (1..=6)
        .map(|i| {
            let x = if i % 2 == 0 { -60.0 } else { 60.0 };
            Car::new(x, -150.0 * f64::from(i), 0.0, ControlType::Dummy, params, rng)
        })
        .collect()
}

fn build_population(seed: u64, params: &Params) -> Population {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut population = Population::spawn(
        params.population_size,
        Point::new(0.0, 0.0),
        0.0,
        road(150.0),
        params,
        &mut rng,
    );
    population.traffic = traffic(params, &mut rng);
    population
}

#[test]
fn test_default_start_faces_up_the_road() {
    let (start, heading) = default_start();
    assert_eq!(start, Point::new(100.0, 100.0));
    assert!((heading - PI).abs() < 1e-12);
}

#[test]
fn test_spawn_places_ai_cars_on_start() {
    let params = create_test_params();
    let population = build_population(1, &params);

    assert_eq!(population.cars.len(), 20);
    assert_eq!(population.tick(), 0);
    assert_eq!(population.borders().len(), 2);
    for car in &population.cars {
        assert_eq!(car.control_type(), ControlType::Ai);
        assert_eq!((car.x, car.y, car.angle), (0.0, 0.0, 0.0));
        assert_eq!(car.brain().unwrap().shape(), params.brain_shape());
    }
    // Every car draws its own brain.
    assert_ne!(population.cars[0].brain(), population.cars[1].brain());
}

#[test]
fn test_step_advances_tick_and_traffic() {
    let params = create_test_params();
    let mut population = build_population(2, &params);
    let start_y = population.traffic[0].y;

    for _ in 0..10 {
        population.step();
    }

    assert_eq!(population.tick(), 10);
    assert!(population.traffic[0].y < start_y);
    assert!(population.traffic.iter().all(|car| !car.is_damaged()));
}

#[test]
fn test_cars_see_traffic_from_previous_tick() {
    let params = Params::default();
    let mut rng = StdRng::seed_from_u64(3);
    let parked = Car::new(0.0, 0.0, 0.0, ControlType::Keys, &params, &mut rng);
    // Oncoming traffic, offset sideways so no body edges are collinear.
    let oncoming = Car::new(5.0, -60.0, PI, ControlType::Dummy, &params, &mut rng);
    let mut population = Population::new(vec![parked], vec![oncoming], Vec::new());

    let mut overlap_at = None;
    let mut damaged_at = None;
    for tick in 1..=100 {
        let before = population.traffic[0].polygon().clone();
        population.step();

        let car = &population.cars[0];
        if overlap_at.is_none() && polys_intersect(car.polygon(), population.traffic[0].polygon()) {
            overlap_at = Some(tick);
        }
        if car.is_damaged() {
            assert!(polys_intersect(car.polygon(), &before));
            damaged_at = Some(tick);
            break;
        }
    }

    let overlap_at = overlap_at.expect("traffic reaches the parked car");
    assert_eq!(damaged_at, Some(overlap_at + 1));
    // Traffic only collides with borders.
    assert!(!population.traffic[0].is_damaged());
}

#[test]
fn test_cars_of_a_generation_do_not_collide() {
    let params = create_test_params();
    let mut population = build_population(4, &params);
    // All cars start stacked on the same spot.
    population.step();
    assert!(population.cars.iter().all(|car| !car.is_damaged()));
}

#[test]
fn test_best_index_prefers_first_of_equals() {
    let params = create_test_params();
    let mut rng = StdRng::seed_from_u64(5);
    let mut cars: Vec<Car> = (0..4)
        .map(|i| Car::new(100.0 * f64::from(i), 0.0, 0.0, ControlType::Keys, &params, &mut rng))
        .collect();
    cars[1].controls.press(Key::Up);
    cars[2].controls.press(Key::Up);
    let mut population = Population::new(cars, Vec::new(), Vec::new());

    assert_eq!(population.best_index(), Some(0));

    for _ in 0..20 {
        population.step();
    }
    assert_eq!(population.cars[1].fitness(), population.cars[2].fitness());
    assert!(population.cars[1].fitness() > 0.0);
    assert_eq!(population.best_index(), Some(1));
    assert_eq!(population.best().unwrap().x, 100.0);
}

#[test]
fn test_empty_population() {
    let population = Population::new(Vec::new(), Vec::new(), road(100.0));
    assert_eq!(population.best_index(), None);
    assert!(population.best().is_none());
    assert_eq!(population.best_brain_json().unwrap(), None);
    assert!(population.all_damaged());
}

#[test]
fn test_best_brain_json_loads_back() {
    let params = create_test_params();
    let mut population = build_population(6, &params);
    for _ in 0..50 {
        population.step();
    }

    let json = population.best_brain_json().unwrap().expect("AI cars have brains");
    let loaded = NeuralNetwork::from_json(&json).unwrap();
    assert_eq!(loaded.shape(), params.brain_shape());
}

#[test]
fn test_all_damaged_after_spawning_on_a_wall() {
    let params = create_test_params();
    let mut rng = StdRng::seed_from_u64(7);
    let wall = vec![Segment::new(Point::new(-100.0, 0.0), Point::new(100.0, 0.0))];
    let mut population =
        Population::spawn(5, Point::new(0.0, 0.0), 0.0, wall, &params, &mut rng);

    assert!(!population.all_damaged());
    population.step();
    assert!(population.all_damaged());
}

#[test]
fn test_seed_brains_keeps_first_copy_exact() {
    let params = create_test_params();
    let mut rng = StdRng::seed_from_u64(8);
    let mut population = build_population(8, &params);
    let best = NeuralNetwork::new(&params.brain_shape(), &mut rng);

    population.seed_brains(&best, 0.1, &mut rng).unwrap();

    assert_eq!(population.cars[0].brain(), Some(&best));
    for car in &population.cars[1..] {
        let brain = car.brain().unwrap();
        assert_ne!(brain, &best);
        assert_eq!(brain.shape(), best.shape());
    }
}

#[test]
fn test_seed_brains_rejects_mismatched_brain() {
    let params = create_test_params();
    let mut rng = StdRng::seed_from_u64(9);
    let mut population = build_population(9, &params);
    let before: Vec<NeuralNetwork> = population
        .cars
        .iter()
        .map(|car| car.brain().unwrap().clone())
        .collect();

    let stored = NeuralNetwork::new(&[7, 6, 4], &mut rng);
    assert!(population.seed_brains(&stored, 0.1, &mut rng).is_err());

    for (car, brain) in population.cars.iter().zip(&before) {
        assert_eq!(car.brain(), Some(brain));
    }
}

#[test]
fn test_parallel_step_matches_sequential() {
    let params = create_test_params();
    let mut sequential = build_population(10, &params);
    let mut parallel = build_population(10, &params);
    parallel.set_parallel(true);

    for _ in 0..200 {
        sequential.step();
        parallel.step();
    }

    for (a, b) in sequential.cars.iter().zip(&parallel.cars) {
        assert_eq!((a.x, a.y, a.angle, a.speed), (b.x, b.y, b.angle, b.speed));
        assert_eq!(a.fitness(), b.fitness());
        assert_eq!(a.is_damaged(), b.is_damaged());
        assert_eq!(a.controls, b.controls);
    }
    assert_eq!(sequential.best_index(), parallel.best_index());
}

#[test]
fn test_single_ai_car_on_straight_road() {
    let params = Params::default();
    let mut rng = StdRng::seed_from_u64(11);
    let car = Car::new(0.0, 0.0, 0.0, ControlType::Ai, &params, &mut rng);
    let mut population = Population::new(vec![car], Vec::new(), road(200.0));

    let mut expected_fitness = 0.0;
    for _ in 0..100 {
        let was_damaged = population.cars[0].is_damaged();
        population.step();

        let car = &population.cars[0];
        if !was_damaged {
            expected_fitness += car.speed;
        }
        assert_eq!(car.sensor().unwrap().readings().len(), 5);
        assert!(car.sensor().unwrap().features().iter().all(|f| (0.0..=1.0).contains(f)));
    }

    let car = &population.cars[0];
    assert_eq!(car.fitness(), expected_fitness);
    if car.is_damaged() {
        assert!(
            population
                .borders()
                .iter()
                .any(|border| polys_intersect(car.polygon(), &border.as_polygon()))
        );
    }
}
