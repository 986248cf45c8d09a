use dagforge::data::DataSet;
use dagforge::model::Dag;
use dagforge::networks::KnownNetwork;
use dagforge::operators::Operator;
use dagforge::score::{GaussianBic, HoldoutLikelihood, LocalScoreCache, Score, ValidatedScore};
use std::sync::atomic::{AtomicUsize, Ordering};

fn chain_data(n: usize, seed: u64) -> DataSet {
    KnownNetwork::Chain3.sample(n, seed).unwrap()
}

#[test]
fn test_bic_prefers_true_parent() {
    let data = chain_data(600, 21);
    let score = GaussianBic::new(data);

    let empty = Dag::new(vec!["a".into(), "b".into(), "c".into()]);
    let mut with_parent = empty.clone();
    with_parent.add_arc(0, 1).unwrap(); // true arc a -> b

    let b = 1;
    assert!(
        score.local_score(&with_parent, b) > score.local_score(&empty, b),
        "true parent should raise b's local score"
    );
}

#[test]
fn test_bic_penalizes_spurious_parent() {
    let data = chain_data(600, 22);
    let score = GaussianBic::new(data);

    let mut true_model = Dag::new(vec!["a".into(), "b".into(), "c".into()]);
    true_model.add_arc(0, 1).unwrap();

    // b is c's true parent; a adds nothing once b is in the parent set.
    let mut just_b = true_model.clone();
    just_b.add_arc(1, 2).unwrap();
    let mut b_and_a = just_b.clone();
    b_and_a.add_arc(0, 2).unwrap();

    let c = 2;
    assert!(
        score.local_score(&just_b, c) > score.local_score(&b_and_a, c),
        "BIC should penalize the redundant extra parent"
    );
}

#[test]
fn test_score_sums_local_scores() {
    let data = chain_data(300, 23);
    let score = GaussianBic::new(data);
    let dag = KnownNetwork::Chain3.dag();

    let total: f64 = (0..3).map(|n| score.local_score(&dag, n)).sum();
    assert!((score.score(&dag) - total).abs() < 1e-9);
}

#[test]
fn test_holdout_validated_path_differs_from_training_path() {
    let data = chain_data(500, 24);
    let score = HoldoutLikelihood::new(&data, 0.25, Some(5)).unwrap();
    assert_eq!(score.test().n_rows(), 125);
    assert_eq!(score.train().n_rows(), 375);

    let dag = KnownNetwork::Chain3.dag();
    let train_side = score.local_score(&dag, 1);
    let test_side = score.vlocal_score(&dag, 1);
    assert!(train_side.is_finite());
    assert!(test_side.is_finite());
    // Different row counts make equality (to the bit) implausible.
    assert!((train_side - test_side).abs() > 1e-9);
}

#[test]
fn test_holdout_from_parts_and_vscore() {
    let data = chain_data(400, 26);
    let (train, test) = data.split_holdout(0.3, Some(7)).unwrap();
    let score = HoldoutLikelihood::from_parts(train, test);

    let dag = KnownNetwork::Chain3.dag();
    let total: f64 = (0..3).map(|n| score.vlocal_score(&dag, n)).sum();
    assert!((score.vscore(&dag) - total).abs() < 1e-9);
}

/// Counts evaluations so cache refresh granularity is observable.
struct CountingScore {
    calls: AtomicUsize,
}

impl Score for CountingScore {
    fn local_score(&self, model: &Dag, node: usize) -> f64 {
        self.vlocal_score(model, node)
    }
}

impl ValidatedScore for CountingScore {
    fn vlocal_score(&self, model: &Dag, node: usize) -> f64 {
        self.calls.fetch_add(1, Ordering::SeqCst);
        model.in_degree(node) as f64 * 10.0
    }
}

#[test]
fn test_cache_refreshes_only_touched_nodes() {
    let mut model = Dag::new(vec!["a".into(), "b".into(), "c".into(), "d".into()]);
    let score = CountingScore {
        calls: AtomicUsize::new(0),
    };

    let mut cache = LocalScoreCache::new(&model);
    cache.cache_vlocal_scores(&model, &score);
    assert_eq!(score.calls.load(Ordering::SeqCst), 4);

    // Add a -> b: only b's entry may be recomputed.
    let op = Operator::AddArc {
        source: 0,
        target: 1,
        delta: 0.0,
    };
    op.apply(&mut model).unwrap();
    cache.update_vlocal_score(&model, &score, &op);
    assert_eq!(score.calls.load(Ordering::SeqCst), 5);
    assert_eq!(cache.local_score(1), 10.0);
    assert_eq!(cache.local_score(0), 0.0);
    assert_eq!(cache.local_score(2), 0.0);

    // Flip a -> b: both endpoints refresh, nothing else.
    let flip = Operator::FlipArc {
        source: 0,
        target: 1,
        delta: 0.0,
    };
    flip.apply(&mut model).unwrap();
    cache.update_vlocal_score(&model, &score, &flip);
    assert_eq!(score.calls.load(Ordering::SeqCst), 7);
    assert_eq!(cache.local_score(0), 10.0);
    assert_eq!(cache.local_score(1), 0.0);

    assert_eq!(cache.sum(), 10.0);
}
