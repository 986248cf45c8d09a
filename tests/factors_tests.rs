use dagforge::data::DataSet;
use dagforge::factors::{Cpd, KdeCpd, LinearGaussianCpd};
use dagforge::model::NodeKind;
use rstest::rstest;

fn normal(rng: &mut fastrand::Rng) -> f64 {
    let u1 = rng.f64().max(1e-12);
    let u2 = rng.f64();
    (-2.0 * u1.ln()).sqrt() * (std::f64::consts::TAU * u2).cos()
}

/// y = 1 + 2x + N(0, 0.25)
fn linear_data(n: usize, seed: u64) -> DataSet {
    let mut rng = fastrand::Rng::with_seed(seed);
    let x: Vec<f64> = (0..n).map(|_| normal(&mut rng) * 3.0).collect();
    let y: Vec<f64> = x.iter().map(|&v| 1.0 + 2.0 * v + 0.5 * normal(&mut rng)).collect();
    DataSet::new(vec!["x".into(), "y".into()], vec![x, y]).unwrap()
}

#[test]
fn test_ols_recovers_coefficients() {
    let data = linear_data(2000, 42);
    let mut cpd = LinearGaussianCpd::new("y".into(), vec!["x".into()]);
    cpd.fit(&data).unwrap();

    assert!((cpd.beta[0] - 1.0).abs() < 0.1, "intercept {}", cpd.beta[0]);
    assert!((cpd.beta[1] - 2.0).abs() < 0.1, "slope {}", cpd.beta[1]);
    assert!((cpd.variance - 0.25).abs() < 0.1, "variance {}", cpd.variance);
}

#[test]
fn test_unfitted_cpd_refuses_logl() {
    let data = linear_data(50, 1);
    let cpd = LinearGaussianCpd::new("y".into(), vec!["x".into()]);
    assert!(cpd.logl(&data).is_err());
}

#[test]
fn test_too_few_rows_rejected() {
    let data = DataSet::new(
        vec!["x".into(), "y".into()],
        vec![vec![1.0, 2.0], vec![3.0, 4.0]],
    )
    .unwrap();
    let mut cpd = LinearGaussianCpd::new("y".into(), vec!["x".into()]);
    assert!(cpd.fit(&data).is_err());
}

#[test]
fn test_kde_logl_finite_and_higher_near_data() {
    let data = linear_data(300, 7);
    let mut kde = KdeCpd::new("y".into(), vec!["x".into()]);
    kde.fit(&data).unwrap();
    assert_eq!(kde.n_train(), 300);

    let logl = kde.logl(&data).unwrap();
    assert!(logl.iter().all(|v| v.is_finite()));

    // A point far outside the training support must be far less likely.
    let near = DataSet::new(
        vec!["x".into(), "y".into()],
        vec![vec![0.0], vec![1.0]],
    )
    .unwrap();
    let far = DataSet::new(
        vec!["x".into(), "y".into()],
        vec![vec![0.0], vec![500.0]],
    )
    .unwrap();
    let l_near = kde.logl(&near).unwrap()[0];
    let l_far = kde.logl(&far).unwrap()[0];
    assert!(l_near > l_far);
}

#[test]
fn test_kde_without_evidence_is_marginal_density() {
    let data = linear_data(200, 9);
    let mut kde = KdeCpd::new("x".into(), vec![]);
    kde.fit(&data).unwrap();
    let logl = kde.logl(&data).unwrap();
    assert!(logl.iter().all(|v| v.is_finite()));
}

#[rstest]
#[case(NodeKind::LinearGaussian)]
#[case(NodeKind::Kde)]
fn test_cpd_dispatch(#[case] kind: NodeKind) {
    let data = linear_data(400, 11);
    let mut cpd = Cpd::new(kind, "y".into(), vec!["x".into()]);
    assert_eq!(cpd.kind(), kind);
    assert_eq!(cpd.variable(), "y");
    assert!(!cpd.fitted());

    cpd.fit(&data).unwrap();
    assert!(cpd.fitted());
    assert!(cpd.slogl(&data).unwrap().is_finite());
    assert!(cpd.num_params() >= 2);

    let mut rng = fastrand::Rng::with_seed(3);
    let draws = cpd.sample(50, &data, &mut rng).unwrap();
    assert_eq!(draws.len(), 50);
    assert!(draws.iter().all(|v| v.is_finite()));
}

#[test]
fn test_cpd_serde_preserves_parameters() {
    let cpd = Cpd::LinearGaussian(LinearGaussianCpd::with_params(
        "y".into(),
        vec!["x".into()],
        vec![1.0, 2.0],
        0.25,
    ));
    let json = serde_json::to_string(&cpd).unwrap();
    assert!(json.contains("linear_gaussian"));

    let restored: Cpd = serde_json::from_str(&json).unwrap();
    match restored {
        Cpd::LinearGaussian(lg) => {
            assert_eq!(lg.beta, vec![1.0, 2.0]);
            assert_eq!(lg.variance, 0.25);
        }
        _ => panic!("wrong family after round trip"),
    }
}
