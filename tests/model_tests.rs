use dagforge::error::DagForgeError;
use dagforge::model::{ArcSet, Dag, NodeKind};

fn dag3() -> Dag {
    Dag::new(vec!["a".into(), "b".into(), "c".into()])
}

#[test]
fn test_add_remove_flip() {
    let mut dag = dag3();
    dag.add_arc(0, 1).unwrap();
    dag.add_arc(1, 2).unwrap();
    assert!(dag.has_arc(0, 1));
    assert_eq!(dag.num_arcs(), 2);
    assert_eq!(dag.in_degree(2), 1);

    dag.flip_arc(0, 1).unwrap();
    assert!(dag.has_arc(1, 0));
    assert!(!dag.has_arc(0, 1));

    dag.remove_arc(1, 2).unwrap();
    assert_eq!(dag.num_arcs(), 1);
}

#[test]
fn test_cycle_rejected() {
    let mut dag = dag3();
    dag.add_arc(0, 1).unwrap();
    dag.add_arc(1, 2).unwrap();

    assert!(dag.would_close_cycle(2, 0));
    assert!(matches!(
        dag.add_arc(2, 0),
        Err(DagForgeError::Constraint(_))
    ));
    // Structure untouched after the rejected edit
    assert_eq!(dag.num_arcs(), 2);
}

#[test]
fn test_flip_cycle_detection() {
    // a -> b, a -> c, c -> b: flipping a -> b would close a cycle
    // through c, flipping c -> b would not.
    let mut dag = dag3();
    dag.add_arc(0, 1).unwrap();
    dag.add_arc(0, 2).unwrap();
    dag.add_arc(2, 1).unwrap();

    assert!(dag.flip_would_close_cycle(0, 1));
    assert!(!dag.flip_would_close_cycle(2, 1));
    assert!(dag.flip_arc(0, 1).is_err());
    dag.flip_arc(2, 1).unwrap();
    assert!(dag.has_arc(1, 2));
}

#[test]
fn test_check_blacklist() {
    let mut dag = dag3();
    dag.add_arc(0, 1).unwrap();

    let mut blacklist = ArcSet::new();
    blacklist.insert((1, 2));
    assert!(dag.check_blacklist(&blacklist).is_ok());

    blacklist.insert((0, 1));
    assert!(matches!(
        dag.check_blacklist(&blacklist),
        Err(DagForgeError::Constraint(_))
    ));
}

#[test]
fn test_force_whitelist_adds_and_flips() {
    let mut dag = dag3();
    dag.add_arc(1, 0).unwrap();

    let mut whitelist = ArcSet::new();
    whitelist.insert((0, 1)); // reversed arc exists, must be flipped
    whitelist.insert((1, 2)); // absent, must be added
    dag.force_whitelist(&whitelist).unwrap();

    assert!(dag.has_arc(0, 1));
    assert!(!dag.has_arc(1, 0));
    assert!(dag.has_arc(1, 2));
}

#[test]
fn test_force_whitelist_rejects_contradictory_pair() {
    let mut dag = dag3();
    let whitelist: ArcSet = [(0, 1), (1, 0)].into_iter().collect();
    assert!(matches!(
        dag.force_whitelist(&whitelist),
        Err(DagForgeError::Constraint(_))
    ));
    // No partial application
    assert_eq!(dag.num_arcs(), 0);
}

#[test]
fn test_node_kinds() {
    let mut dag = dag3();
    assert_eq!(dag.node_kind(0), NodeKind::LinearGaussian);

    dag.force_kind_whitelist(&[(1, NodeKind::Kde)]);
    assert_eq!(dag.node_kind(1), NodeKind::Kde);
    assert_eq!(dag.node_kind(0), NodeKind::LinearGaussian);
}

#[test]
fn test_resolve_arcs() {
    let dag = dag3();
    let resolved = dag
        .resolve_arcs(&[("a".into(), "b".into()), ("b".into(), "c".into())])
        .unwrap();
    assert!(resolved.contains(&(0, 1)));
    assert!(resolved.contains(&(1, 2)));

    assert!(dag.resolve_arcs(&[("a".into(), "z".into())]).is_err());
    assert!(dag.resolve_arcs(&[("a".into(), "a".into())]).is_err());
}

#[test]
fn test_clone_is_independent() {
    let mut dag = dag3();
    dag.add_arc(0, 1).unwrap();
    let snapshot = dag.clone();

    dag.add_arc(1, 2).unwrap();
    dag.set_node_kind(0, NodeKind::Kde);

    assert_eq!(snapshot.num_arcs(), 1);
    assert!(!snapshot.has_arc(1, 2));
    assert_eq!(snapshot.node_kind(0), NodeKind::LinearGaussian);
}

#[test]
fn test_serde_round_trip_preserves_structure() {
    let mut dag = dag3();
    dag.add_arc(0, 1).unwrap();
    dag.set_node_kind(2, NodeKind::Kde);

    let json = serde_json::to_string(&dag).unwrap();
    let restored: Dag = serde_json::from_str(&json).unwrap();

    assert!(restored.has_arc(0, 1));
    assert_eq!(restored.node_kind(2), NodeKind::Kde);
    // The name index is usable straight off deserialization.
    assert_eq!(restored.node_index("c"), Some(2));
    assert!(restored
        .resolve_arcs(&[("a".into(), "c".into())])
        .unwrap()
        .contains(&(0, 2)));
}
