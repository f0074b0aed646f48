// tests/balance.rs
use std::cell::RefCell;
use std::rc::Rc;

use bevy_prng::WyRand;
use rand_core::SeedableRng;
use team_balance::config::{
    DEFAULT_GROUP_COUNT, DEFAULT_TOLERANCE, DETAILED_MAX_ATTEMPTS, OVERALL_MAX_ATTEMPTS,
};
use team_balance::systems::background;
use team_balance::systems::balance::{balance_quick, search, search_ext};
use team_balance::{
    CancelToken, Category, ConfigError, Dispersion, EmptyGroupPolicy, Hook, MatchResult, Mode,
    Participant, Partition, Ratings, SearchConfig, SearchOutcome, Skill, Skills, Tolerance,
};

fn rng(seed: u64) -> WyRand {
    WyRand::from_seed(seed.to_le_bytes())
}

fn player(name: &str, category: Category, overall: f64) -> Participant {
    Participant::new(name, category, Ratings::overall(overall).unwrap())
}

fn detailed(name: &str, category: Category, t: f64, c: f64, d: f64) -> Participant {
    Participant::new(name, category, Ratings::detailed(5.0, t, c, d).unwrap())
}

/// `a` category-A players rated `ra`, `b` category-B players rated `rb`.
fn split_pool(a: usize, ra: f64, b: usize, rb: f64) -> Vec<Participant> {
    let mut out: Vec<_> = (0..a).map(|i| player(&format!("a{i}"), Category::A, ra)).collect();
    out.extend((0..b).map(|i| player(&format!("b{i}"), Category::B, rb)));
    out
}

/// Records every attempt's score and how often the search finished.
#[derive(Default)]
struct Recorder {
    scores: Rc<RefCell<Vec<f64>>>,
    finished: Rc<RefCell<usize>>,
}

impl Hook for Recorder {
    fn on_attempt(&mut self, _attempt: usize, _candidate: &Partition, d: &Dispersion) {
        self.scores.borrow_mut().push(d.score());
    }
    fn on_finish(&mut self, _outcome: &SearchOutcome) {
        *self.finished.borrow_mut() += 1;
    }
}

/// Cancels its token once attempt `at` has been measured.
struct CancelAt {
    at: usize,
    token: CancelToken,
    seen: Rc<RefCell<usize>>,
}

impl Hook for CancelAt {
    fn on_attempt(&mut self, attempt: usize, _candidate: &Partition, _d: &Dispersion) {
        *self.seen.borrow_mut() += 1;
        if attempt == self.at {
            self.token.cancel();
        }
    }
}

#[test]
fn uniform_split_balances_on_first_attempt() {
    // Every 2-group partition is 2A + 2B per group: both means are 5.0.
    let players = split_pool(4, 2.0, 4, 8.0);
    let out = search(&players, 2, Tolerance::Overall(0.01), 600, &mut rng(1)).unwrap();
    match out {
        SearchOutcome::Balanced { partition, dispersion, attempts } => {
            assert_eq!(attempts, 1);
            assert_eq!(dispersion, Some(Dispersion::Overall(0.0)));
            assert!(partition.groups().iter().all(|g| g.mean(Skill::Overall) == 5.0));
        }
        other => panic!("expected balanced, got {other:?}"),
    }
}

#[test]
fn odd_split_reports_exact_best_spread() {
    // 5A@2 + 5B@8 over 2 groups always lands 3A+2B / 2A+3B: means 4.4 and 5.6.
    let players = split_pool(5, 2.0, 5, 8.0);
    let tolerance = Tolerance::Overall(0.01);
    let out = search(&players, 2, tolerance, 40, &mut rng(2)).unwrap();
    assert!(!out.is_balanced());
    assert_eq!(out.attempts(), 40);

    let d = out.dispersion().unwrap().score();
    assert!((d - 1.2).abs() < 1e-9, "spread {d}");
    match out.shortfall(&tolerance) {
        Some(Dispersion::Overall(excess)) => assert_eq!(excess, d - 0.01),
        other => panic!("unexpected shortfall {other:?}"),
    }

    let relaxed = search(&players, 2, Tolerance::Overall(1.25), 40, &mut rng(2)).unwrap();
    assert!(relaxed.is_balanced());
    assert_eq!(relaxed.attempts(), 1);
}

#[test]
fn empty_group_counts_as_zero_and_exhausts_budget() {
    let players = split_pool(1, 5.0, 1, 5.0);
    let out = search(&players, 3, Tolerance::Overall(4.0), 25, &mut rng(3)).unwrap();
    match out {
        SearchOutcome::Unbalanced { best, dispersion, attempts } => {
            assert_eq!(attempts, 25);
            assert_eq!(dispersion, Dispersion::Overall(5.0));
            assert_eq!(best.len(), 3);
            assert_eq!(best.participant_count(), 2);
        }
        other => panic!("expected unbalanced, got {other:?}"),
    }
}

#[test]
fn skipping_empty_groups_lets_the_same_pool_balance() {
    let players = split_pool(1, 5.0, 1, 5.0);
    let cfg = SearchConfig::overall(3, 0.1)
        .with_empty_groups(EmptyGroupPolicy::Skip)
        .with_seed(3);
    let out = balance_quick(&players, &cfg).unwrap();
    assert!(out.is_balanced());
    assert_eq!(out.dispersion(), Some(&Dispersion::Overall(0.0)));
}

#[test]
fn single_group_is_always_balanced() {
    let players = vec![
        player("x", Category::A, 0.5),
        player("y", Category::B, 9.5),
        player("z", Category::A, 3.0),
    ];
    for seed in 0..10 {
        let out = search(&players, 1, Tolerance::Overall(0.0), 5, &mut rng(seed)).unwrap();
        assert!(out.is_balanced());
        assert_eq!(out.attempts(), 1);
        assert_eq!(out.partition().groups()[0].len(), 3);
    }
}

#[test]
fn nobody_selected_is_trivially_balanced() {
    let out = search(&[], 2, Tolerance::Overall(0.0), 10, &mut rng(4)).unwrap();
    match out {
        SearchOutcome::Balanced { partition, dispersion, .. } => {
            assert_eq!(dispersion, None);
            assert_eq!(partition.len(), 2);
            assert!(!partition.has_members());
        }
        other => panic!("expected balanced, got {other:?}"),
    }
}

#[test]
fn invalid_configuration_is_rejected_up_front() {
    let players = split_pool(2, 5.0, 2, 5.0);
    let mut r = rng(5);

    assert_eq!(
        search(&players, 0, Tolerance::Overall(1.0), 10, &mut r).unwrap_err(),
        ConfigError::NoGroups
    );
    assert_eq!(
        search(&players, 2, Tolerance::Overall(1.0), 0, &mut r).unwrap_err(),
        ConfigError::NoAttempts
    );
    assert_eq!(
        search(&players, 2, Tolerance::Overall(-0.5), 10, &mut r).unwrap_err(),
        ConfigError::InvalidTolerance { skill: Skill::Overall, value: -0.5 }
    );
    let nan = search(
        &players,
        2,
        Tolerance::Detailed(Skills::new(1.0, f64::NAN, 1.0)),
        10,
        &mut r,
    )
    .unwrap_err();
    assert!(matches!(nan, ConfigError::InvalidTolerance { skill: Skill::Cutting, .. }));

    let mut doubled = players.clone();
    doubled.push(players[1].clone());
    assert_eq!(
        search(&doubled, 2, Tolerance::Overall(1.0), 10, &mut r).unwrap_err(),
        ConfigError::DuplicateParticipant { id: players[1].id }
    );

    let err = search(&players, 2, Tolerance::Detailed(Skills::splat(1.0)), 10, &mut r).unwrap_err();
    assert_eq!(
        err,
        ConfigError::MissingRating { name: "a0".into(), skill: Skill::Throwing }
    );
}

#[test]
fn detailed_mode_needs_all_three_within_tolerance() {
    let mut players: Vec<_> = (0..4)
        .map(|i| detailed(&format!("a{i}"), Category::A, 2.0, 4.0, 6.0))
        .collect();
    players.extend((0..4).map(|i| detailed(&format!("b{i}"), Category::B, 8.0, 6.0, 4.0)));

    let out = search(&players, 2, Tolerance::Detailed(Skills::splat(0.0)), 10, &mut rng(6)).unwrap();
    assert!(out.is_balanced());
    assert_eq!(out.dispersion(), Some(&Dispersion::Detailed(Skills::splat(0.0))));
}

#[test]
fn detailed_best_is_lowest_sum_seen() {
    // Groups are always {A, B} / {A}: sums of spreads are 6 or 10.5, never 0.
    let players = vec![
        detailed("a1", Category::A, 1.0, 1.0, 1.0),
        detailed("a2", Category::A, 2.0, 2.0, 2.0),
        detailed("b7", Category::B, 7.0, 7.0, 7.0),
    ];
    let recorder = Recorder::default();
    let scores = Rc::clone(&recorder.scores);
    let finished = Rc::clone(&recorder.finished);
    let mut hooks: Vec<Box<dyn Hook>> = vec![Box::new(recorder)];

    let cfg = SearchConfig::detailed(2, Skills::splat(0.0)).with_max_attempts(30);
    let out = search_ext(&players, &cfg, &mut rng(7), &mut hooks, None)
        .unwrap()
        .unwrap();

    let scores = scores.borrow();
    assert!(!out.is_balanced());
    assert_eq!(scores.len(), 30);
    let best = out.dispersion().unwrap().score();
    assert!(scores.iter().all(|&s| best <= s));
    assert_eq!(best, scores.iter().cloned().fold(f64::INFINITY, f64::min));
    assert_eq!(*finished.borrow(), 1);
}

#[test]
fn cancelled_before_start_returns_nothing() {
    let players = split_pool(3, 1.0, 3, 9.0);
    let token = CancelToken::new();
    token.cancel();
    let recorder = Recorder::default();
    let scores = Rc::clone(&recorder.scores);
    let finished = Rc::clone(&recorder.finished);
    let mut hooks: Vec<Box<dyn Hook>> = vec![Box::new(recorder)];

    let cfg = SearchConfig::overall(2, 0.0).with_max_attempts(100);
    let out = search_ext(&players, &cfg, &mut rng(8), &mut hooks, Some(&token)).unwrap();
    assert!(out.is_none());
    assert!(scores.borrow().is_empty());
    assert_eq!(*finished.borrow(), 0);
}

#[test]
fn cancellation_is_checked_once_per_attempt() {
    // 2 groups, 1A + 2B: spreads are never 0 with these ratings.
    let players = vec![
        player("a", Category::A, 1.0),
        player("b1", Category::B, 4.0),
        player("b2", Category::B, 9.0),
    ];
    let token = CancelToken::new();
    let seen = Rc::new(RefCell::new(0));
    let mut hooks: Vec<Box<dyn Hook>> = vec![Box::new(CancelAt {
        at: 2,
        token: token.clone(),
        seen: Rc::clone(&seen),
    })];

    let cfg = SearchConfig::overall(2, 0.0).with_max_attempts(100);
    let out = search_ext(&players, &cfg, &mut rng(9), &mut hooks, Some(&token)).unwrap();
    assert!(out.is_none());
    assert_eq!(*seen.borrow(), 3);
}

#[test]
fn seeded_config_is_reproducible() {
    let players = split_pool(6, 3.0, 5, 7.0);
    let cfg = SearchConfig::overall(3, 0.0).with_max_attempts(20).with_seed(42);
    let layout = |out: SearchOutcome| -> Vec<Vec<String>> {
        out.into_partition()
            .into_groups()
            .into_iter()
            .map(|g| g.into_members().into_iter().map(|p| p.name).collect())
            .collect()
    };
    let first = layout(balance_quick(&players, &cfg).unwrap());
    let second = layout(balance_quick(&players, &cfg).unwrap());
    assert_eq!(first, second);
}

#[test]
fn accepting_the_fallback_adopts_best_groups() {
    let players = split_pool(5, 2.0, 5, 8.0);
    let out = search(&players, 2, Tolerance::Overall(0.0), 10, &mut rng(10)).unwrap();
    let expected = out.partition().clone();
    assert!(out.shortfall(&Tolerance::Overall(0.0)).is_some());
    let adopted = out.into_partition();
    assert_eq!(adopted, expected);
    assert_eq!(adopted.participant_count(), 10);
}

#[test]
fn background_search_delivers_outcome() {
    let players = split_pool(4, 2.0, 4, 8.0);
    let handle = background::spawn(players, SearchConfig::overall(2, 0.01).with_seed(11)).unwrap();
    while !handle.is_finished() {
        std::thread::yield_now();
    }
    let out = handle.join().unwrap().unwrap();
    assert!(out.is_balanced());
}

#[test]
fn background_search_can_be_cancelled() {
    // Unreachable tolerance with a budget far beyond what runs before cancel.
    let players = split_pool(1, 5.0, 1, 5.0);
    let cfg = SearchConfig::overall(3, 0.0)
        .with_max_attempts(50_000_000)
        .with_seed(12);
    let handle = background::spawn(players, cfg).unwrap();
    handle.cancel();
    assert!(handle.token().is_cancelled());
    assert!(handle.join().unwrap().is_none());
}

#[test]
fn default_config_is_two_groups_at_point_four() {
    let cfg = SearchConfig::default();
    assert_eq!(cfg.group_count, DEFAULT_GROUP_COUNT);
    assert_eq!(cfg.group_count, 2);
    assert_eq!(cfg.tolerance, Tolerance::Overall(DEFAULT_TOLERANCE));
    assert_eq!(cfg.tolerance, Tolerance::Overall(0.4));
    assert_eq!(cfg.max_attempts, None);
    assert_eq!(cfg.empty_groups, EmptyGroupPolicy::CountAsZero);
    assert_eq!(cfg.seed, None);
    assert_eq!(cfg.mode(), Mode::Overall);
    assert_eq!(cfg.attempt_budget().unwrap().get(), 600);
}

#[test]
fn budgets_default_per_mode() {
    assert_eq!(Mode::Overall.default_max_attempts(), OVERALL_MAX_ATTEMPTS);
    assert_eq!(Mode::Detailed.default_max_attempts(), DETAILED_MAX_ATTEMPTS);
    assert_eq!(
        SearchConfig::detailed(2, Skills::splat(0.4)).attempt_budget().unwrap().get(),
        2000
    );
    assert_eq!(
        SearchConfig::overall(2, 0.4).with_max_attempts(7).attempt_budget().unwrap().get(),
        7
    );
}

#[test]
fn overall_search_gives_up_after_600_attempts() {
    // Three groups for two players: one group is always empty, spread 5.0.
    let players = split_pool(1, 5.0, 1, 5.0);
    let cfg = SearchConfig::overall(3, 0.0).with_seed(21);
    assert_eq!(cfg.max_attempts, None);

    let out = balance_quick(&players, &cfg).unwrap();
    assert!(!out.is_balanced());
    assert_eq!(out.attempts(), 600);
    assert_eq!(out.dispersion().map(Dispersion::mode), Some(Mode::Overall));
}

#[test]
fn detailed_search_gives_up_after_2000_attempts() {
    let players = vec![
        detailed("a", Category::A, 5.0, 5.0, 5.0),
        detailed("b", Category::B, 5.0, 5.0, 5.0),
    ];
    let cfg = SearchConfig::detailed(3, Skills::splat(0.0)).with_seed(22);

    let out = balance_quick(&players, &cfg).unwrap();
    assert!(!out.is_balanced());
    assert_eq!(out.attempts(), 2000);
    assert_eq!(out.dispersion(), Some(&Dispersion::Detailed(Skills::splat(5.0))));
    assert_eq!(out.dispersion().map(Dispersion::mode), Some(Mode::Detailed));
}

#[test]
fn reported_win_lands_on_the_named_group() {
    let players = split_pool(4, 2.0, 4, 8.0);
    let mut partition = search(&players, 2, Tolerance::Overall(0.01), 600, &mut rng(23))
        .unwrap()
        .into_partition();

    partition.group_mut("Group 1").unwrap().record_result(MatchResult::Win);
    for g in partition.groups_mut() {
        if g.name() == "Group 2" {
            g.record_result(MatchResult::Loss);
        }
    }

    let winners = partition.group("Group 1").unwrap();
    assert!(winners.members().iter().all(|p| p.record.wins == 1 && p.record.losses == 0));
    let losers = partition.group("Group 2").unwrap();
    assert!(losers.members().iter().all(|p| p.record.losses == 1 && p.record.wins == 0));
    assert!(partition.group("Group 3").is_none());
}
