use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::collections::HashSet;
use titan::instance::{GeneratorConfig, generate_positive_instance, generate_resonance_instance};
use titan::search::{
    Goal, SearchConfig, SearchOutcome, SearchPhase, Solution, VaultBuilder, solve, split_tranches,
};

/// Every subset sum of a small sequence, by brute force.
fn brute_force_sums(sequence: &[i64]) -> HashSet<i64> {
    let n = sequence.len();
    (0u64..1 << n)
        .map(|mask| {
            (0..n)
                .filter(|i| mask & (1 << i) != 0)
                .map(|i| sequence[i])
                .sum()
        })
        .collect()
}

fn assert_solution_valid(sequence: &[i64], solution: &Solution, expected_sum: i64) {
    let indices = solution.indices();
    let unique: HashSet<_> = indices.iter().copied().collect();
    assert_eq!(unique.len(), indices.len(), "each element used at most once");
    assert!(indices.iter().all(|&i| i < sequence.len()));

    let values: Vec<i64> = indices.iter().map(|&i| sequence[i]).collect();
    assert_eq!(values, solution.elements());
    assert_eq!(values.iter().sum::<i64>(), expected_sum);
    assert_eq!(solution.sum(), expected_sum);
}

fn both_modes() -> [SearchConfig; 2] {
    [
        SearchConfig::sequential(),
        SearchConfig::default().with_workers(4).with_batch_size(8),
    ]
}

#[test]
fn test_scenario_exact_target() {
    let sequence = [3, 5, 7, 11, 13, 17, 19, 23, 29, 31];
    for config in both_modes() {
        let report = solve(&sequence, Goal::Target(50), &config).unwrap();
        assert_solution_valid(&sequence, report.solution().unwrap(), 50);
    }
}

#[test]
fn test_scenario_max_sum() {
    let sequence = [1, 2, 3, 5, 8, 13, 21, 34];
    let report = solve(&sequence, Goal::MaxSum, &SearchConfig::default()).unwrap();
    let solution = report.solution().unwrap();
    assert_eq!(solution.sum(), 87);
    assert_eq!(solution.len(), sequence.len());
}

#[test]
fn test_scenario_resonance_from_seed() {
    let config = GeneratorConfig::default().with_size(20).with_seed(42);
    let instance = generate_resonance_instance(&config);
    for search in both_modes() {
        let report = solve(&instance, Goal::Resonance, &search).unwrap();
        let solution = report.solution().expect("generator guarantees a zero-sum subset");
        assert!(!solution.is_empty());
        assert_solution_valid(&instance, solution, 0);
    }
}

#[test]
fn test_generated_instances_always_resonate() {
    for seed in 0..25 {
        let config = GeneratorConfig::default()
            .with_size(2 + (seed as usize % 14))
            .with_range(1000)
            .with_seed(seed);
        let instance = generate_resonance_instance(&config);
        let report = solve(&instance, Goal::Resonance, &SearchConfig::default()).unwrap();
        assert!(report.is_found(), "seed {} instance {:?}", seed, instance);
    }
}

#[test]
fn test_boundaries() {
    let config = SearchConfig::default();

    let report = solve(&[], Goal::Target(0), &config).unwrap();
    let solution = report.solution().unwrap();
    assert_eq!(solution.sum(), 0);
    assert_eq!(solution.len(), 0);

    let report = solve(&[], Goal::Target(-4), &config).unwrap();
    assert_eq!(report.outcome, SearchOutcome::NotFound);
}

#[test]
fn test_agrees_with_brute_force() {
    let mut rng = ChaCha8Rng::seed_from_u64(0x7174_a11);

    for round in 0..40 {
        let n = rng.random_range(0..=12);
        let sequence: Vec<i64> = (0..n).map(|_| rng.random_range(-30..=30)).collect();
        let reachable = brute_force_sums(&sequence);

        for target in [-45, -7, 0, 3, 13, 29, 60] {
            let expected = reachable.contains(&target);
            let mut answers = Vec::new();

            for config in both_modes() {
                let report = solve(&sequence, Goal::Target(target), &config).unwrap();
                match report.solution() {
                    Some(solution) => assert_solution_valid(&sequence, solution, target),
                    None => assert_eq!(report.phase, SearchPhase::Exhausted),
                }
                answers.push(report.is_found());
            }

            assert_eq!(
                answers,
                vec![expected, expected],
                "round {} sequence {:?} target {}",
                round,
                sequence,
                target
            );
        }
    }
}

#[test]
fn test_positive_instance_half_sum() {
    let config = GeneratorConfig::default()
        .with_size(24)
        .with_range(50)
        .with_seed(42);
    let sequence = generate_positive_instance(&config);
    let target = sequence.iter().sum::<i64>() / 2;

    let sequential = solve(&sequence, Goal::Target(target), &SearchConfig::sequential()).unwrap();
    let parallel = solve(&sequence, Goal::Target(target), &SearchConfig::default()).unwrap();

    assert_eq!(sequential.is_found(), parallel.is_found());
    if let Some(solution) = parallel.solution() {
        assert_solution_valid(&sequence, solution, target);
    }
}

#[test]
fn test_vault_rebuild_is_idempotent() {
    let sequence = [9, -4, 17, 3, 3, -12, 8, 25, -1, 6];
    let (left, _) = split_tranches(&sequence);
    let builder = VaultBuilder::default();

    let first = builder.build(&left).unwrap();
    let second = builder.build(&left).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.bounds(), second.bounds());
}

#[test]
fn test_statistics_are_reported() {
    let sequence: Vec<i64> = (1..=16).map(|i| i * 2).collect();
    let report = solve(&sequence, Goal::Target(1), &SearchConfig::default()).unwrap();

    assert_eq!(report.outcome, SearchOutcome::NotFound);
    let stats = &report.statistics;
    assert_eq!(stats.left_len, 8);
    assert_eq!(stats.right_len, 8);
    assert_eq!(stats.tasks_dispatched, 8);
    assert_eq!(stats.tasks_completed, 8);
    assert_eq!(stats.subsets_probed, 255);
    assert_eq!(stats.vault_subsets, 256);
    assert!(!stats.is_partially_explored());
}
