//! Reference resolution behaviour through the public API

use conf_core::{Context, Error, ReferenceResolver, SystemProperties, Value, resolve};
use indexmap::IndexMap;
use pretty_assertions::assert_eq;

fn context(pairs: &[(&str, &str)]) -> Context {
    pairs.iter().map(|(k, v)| (*k, *v)).collect()
}

fn no_env() -> IndexMap<String, String> {
    IndexMap::new()
}

#[test]
fn test_chained_references_resolve_transitively() {
    let resolved = resolve(context(&[("a", "1"), ("b", "${a}2"), ("c", "${b}3")])).unwrap();

    assert_eq!(resolved, context(&[("a", "1"), ("b", "12"), ("c", "123")]));
}

#[test]
fn test_pure_cycle_reports_both_keys() {
    let err = resolve(context(&[("a", "${b}"), ("b", "${a}")])).unwrap_err();

    match err {
        Error::UnresolvableReference { keys } => assert_eq!(keys, vec!["a", "b"]),
        other => panic!("expected UnresolvableReference, got {other}"),
    }
}

#[test]
fn test_missing_reference_is_never_substituted_with_empty() {
    let err = resolve(context(&[("a", "${missing}")])).unwrap_err();

    assert!(matches!(
        &err,
        Error::MissingReference { reference, .. } if reference == "missing"
    ));
    assert_eq!(err.keys(), vec!["a"]);
}

#[test]
fn test_mixed_categories_resolve_independently() {
    let system: SystemProperties = [("region", "us")].into_iter().collect();
    let environment: IndexMap<String, String> =
        [("STAGE".to_string(), "prod".to_string())].into_iter().collect();
    let input = context(&[
        ("url", "http://$sys{region}.$env{STAGE}.example.com${path}"),
        ("path", "/health"),
    ]);

    let resolved = ReferenceResolver::new(&system, &environment)
        .resolve(input)
        .unwrap();

    assert_eq!(
        resolved.get("url"),
        Some(&Value::from("http://us.prod.example.com/health"))
    );
}

#[test]
fn test_system_properties_are_single_pass() {
    let system: SystemProperties = [("outer", "$sys{inner}"), ("inner", "x")]
        .into_iter()
        .collect();

    let resolved = ReferenceResolver::new(&system, &no_env())
        .resolve(context(&[("value", "$sys{outer}")]))
        .unwrap();

    assert_eq!(resolved.get("value"), Some(&Value::from("$sys{inner}")));
}

#[test]
fn test_missing_system_property_names_the_key() {
    let err = ReferenceResolver::new(&SystemProperties::new(), &no_env())
        .resolve(context(&[("carbon.home", "$sys{carbon.home}")]))
        .unwrap_err();

    assert!(matches!(
        err,
        Error::MissingProperty { ref name, ref key, .. } if name == "carbon.home" && key == "carbon.home"
    ));
}

#[test]
fn test_diamond_dependencies() {
    let resolved = resolve(context(&[
        ("root", "r"),
        ("left", "${root}-l"),
        ("right", "${root}-r"),
        ("join", "${left}+${right}"),
    ]))
    .unwrap();

    assert_eq!(resolved.get("join"), Some(&Value::from("r-l+r-r")));
}

#[test]
fn test_keys_downstream_of_cycle_are_reported() {
    let err = resolve(context(&[
        ("ok", "fine"),
        ("uses_ok", "${ok}"),
        ("a", "${b}"),
        ("b", "${a}"),
        ("tail", "${b}/${ok}"),
    ]))
    .unwrap_err();

    match err {
        Error::UnresolvableReference { keys } => assert_eq!(keys, vec!["a", "b", "tail"]),
        other => panic!("expected UnresolvableReference, got {other}"),
    }
}

#[test]
fn test_error_message_lists_keys() {
    let err = resolve(context(&[("x", "${y}"), ("y", "${x}")])).unwrap_err();
    assert_eq!(err.to_string(), "Unresolvable references in keys: x, y");
}
