use dagforge::config::ConstraintParams;
use dagforge::model::NodeKind;
use regex::Regex;

fn params(blacklist: &str, whitelist: &str, kinds: &str) -> ConstraintParams {
    ConstraintParams {
        blacklist: blacklist.to_string(),
        whitelist: whitelist.to_string(),
        kind_whitelist: kinds.to_string(),
    }
}

#[test]
fn test_parse_arc_lists() {
    let p = params("a->b, c->d", "x->y", "");
    assert_eq!(
        p.get_blacklist().unwrap(),
        vec![
            ("a".to_string(), "b".to_string()),
            ("c".to_string(), "d".to_string())
        ]
    );
    assert_eq!(
        p.get_whitelist().unwrap(),
        vec![("x".to_string(), "y".to_string())]
    );
}

#[test]
fn test_empty_lists_are_empty() {
    let p = params("", "  ", "");
    assert!(p.get_blacklist().unwrap().is_empty());
    assert!(p.get_whitelist().unwrap().is_empty());
    assert!(p.get_kind_whitelist().unwrap().is_empty());
}

#[test]
fn test_parse_kind_whitelist() {
    let p = params("", "", "a:kde, b:linear_gaussian");
    assert_eq!(
        p.get_kind_whitelist().unwrap(),
        vec![
            ("a".to_string(), NodeKind::Kde),
            ("b".to_string(), NodeKind::LinearGaussian)
        ]
    );
}

#[test]
fn test_malformed_arc_entry_is_reported() {
    let p = params("a=>b", "", "");
    let err = p.get_blacklist().unwrap_err().to_string();
    let re = Regex::new(r"--blacklist entry 'a=>b' is not 'source->target'").unwrap();
    assert!(re.is_match(&err), "unexpected message: {}", err);
}

#[test]
fn test_unknown_family_is_reported() {
    let p = params("", "", "a:gaussian_mixture");
    let err = p.get_kind_whitelist().unwrap_err().to_string();
    let re = Regex::new(r"Unknown distribution family 'gaussian_mixture'").unwrap();
    assert!(re.is_match(&err), "unexpected message: {}", err);
}
