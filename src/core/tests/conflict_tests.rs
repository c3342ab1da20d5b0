use std::rc::Rc;

use crate::core::parser::canonicalize;
use crate::core::{build_index, find_conflicts, MemoryRegistry, Registry};

/// Helper to wrap registries the way the controller holds them
fn foreign(registries: Vec<MemoryRegistry>) -> Vec<Rc<dyn Registry>> {
    registries
        .into_iter()
        .map(|r| Rc::new(r) as Rc<dyn Registry>)
        .collect()
}

#[test]
fn test_index_lookup_returns_names_in_first_seen_order() {
    let registry = MemoryRegistry::new("org.example")
        .with_binding("alpha", &["<Super>t"])
        .with_binding("beta", &["<Shift>x", "<super>T"])
        .with_binding("gamma", &["<Alt>F4"]);

    let index = build_index(&registry);

    // BTreeMap enumeration: alpha, beta, gamma
    assert_eq!(
        index.get(&canonicalize("<Super>t")),
        Some(&["alpha".to_string(), "beta".to_string()][..])
    );
    assert_eq!(
        index.get(&canonicalize("<Shift>X")),
        Some(&["beta".to_string()][..])
    );
    assert_eq!(index.get(&canonicalize("<Super>q")), None);
    assert_eq!(index.len(), 3);
}

#[test]
fn test_index_iterates_in_insertion_order() {
    let registry = MemoryRegistry::new("org.example")
        .with_binding("a", &["<Super>2", "<Super>1"])
        .with_binding("b", &["<Super>3"]);

    let combos: Vec<String> = build_index(&registry)
        .iter()
        .map(|(combo, _)| combo.key.clone())
        .collect();

    assert_eq!(combos, vec!["2", "1", "3"]);
}

#[test]
fn test_index_skips_non_accelerator_values() {
    let registry = MemoryRegistry::new("org.example")
        .with_binding("toggle", &["<Super>t"])
        .with_value("enabled", serde_json::json!(true))
        .with_value("label", serde_json::json!("<Super>t"))
        .with_value("mixed", serde_json::json!(["<Super>t", 3]));

    let index = build_index(&registry);
    assert_eq!(
        index.get(&canonicalize("<Super>t")),
        Some(&["toggle".to_string()][..])
    );
}

#[test]
fn test_no_conflicts_without_shared_combos() {
    let user = MemoryRegistry::new("org.example.user").with_binding("toggle", &["<Super>t"]);
    let others = foreign(vec![
        MemoryRegistry::new("org.example.shell").with_binding("overview", &["<Super>s"]),
    ]);

    assert!(find_conflicts(&user, &others).is_empty());
}

#[test]
fn test_detects_simple_conflict() {
    let user = MemoryRegistry::new("org.example.user").with_binding("toggle", &["<Super>t"]);
    let others = foreign(vec![
        MemoryRegistry::new("org.example.shell").with_binding("open-terminal", &["<Super>t"]),
    ]);

    let conflicts = find_conflicts(&user, &others);
    assert_eq!(conflicts.len(), 1);
    assert_eq!(conflicts[0].user_binding, "toggle");
    assert_eq!(conflicts[0].conflicting_bindings, vec!["open-terminal"]);
    assert_eq!(conflicts[0].schema_id(), "org.example.shell");
    assert_eq!(conflicts[0].key_combo, canonicalize("<Super>t"));
}

#[test]
fn test_conflict_across_spellings() {
    let user = MemoryRegistry::new("org.example.user").with_binding("switch", &["<Primary><Alt>Above_Tab"]);
    let others = foreign(vec![
        MemoryRegistry::new("org.example.wm").with_binding("cycle-group", &["<Alt><Control>grave"]),
    ]);

    assert_eq!(find_conflicts(&user, &others).len(), 1);
}

#[test]
fn test_one_record_per_combo_with_full_foreign_bucket() {
    let user = MemoryRegistry::new("org.example.user").with_binding("toggle", &["<Super>t"]);
    let others = foreign(vec![MemoryRegistry::new("org.example.wm")
        .with_binding("a", &["<Super>t"])
        .with_binding("b", &["<Super>T"])
        .with_binding("c", &["<Super>x"])]);

    let conflicts = find_conflicts(&user, &others);
    assert_eq!(conflicts.len(), 1);
    assert_eq!(conflicts[0].conflicting_bindings, vec!["a", "b"]);
}

#[test]
fn test_records_name_first_user_owner() {
    let user = MemoryRegistry::new("org.example.user")
        .with_binding("first", &["<Super>t"])
        .with_binding("second", &["<Super>t"]);
    let others = foreign(vec![
        MemoryRegistry::new("org.example.wm").with_binding("other", &["<Super>t"]),
    ]);

    let conflicts = find_conflicts(&user, &others);
    assert_eq!(conflicts.len(), 1);
    assert_eq!(conflicts[0].user_binding, "first");
}

#[test]
fn test_emission_order_registry_outer_combo_inner() {
    let user = MemoryRegistry::new("org.example.user")
        .with_binding("a-first", &["<Super>1"])
        .with_binding("b-second", &["<Super>2"]);
    let others = foreign(vec![
        MemoryRegistry::new("org.example.one")
            .with_binding("x", &["<Super>2"])
            .with_binding("y", &["<Super>1"]),
        MemoryRegistry::new("org.example.two").with_binding("z", &["<Super>1"]),
    ]);

    let emitted: Vec<(String, String)> = find_conflicts(&user, &others)
        .iter()
        .map(|c| (c.schema_id().to_string(), c.user_binding.clone()))
        .collect();

    assert_eq!(
        emitted,
        vec![
            ("org.example.one".to_string(), "a-first".to_string()),
            ("org.example.one".to_string(), "b-second".to_string()),
            ("org.example.two".to_string(), "a-first".to_string()),
        ]
    );
}

#[test]
fn test_unset_accelerators_never_conflict() {
    let user = MemoryRegistry::new("org.example.user")
        .with_binding("blank", &[""])
        .with_binding("none", &[]);
    let others = foreign(vec![
        MemoryRegistry::new("org.example.wm").with_binding("also-blank", &[""]),
    ]);

    assert!(find_conflicts(&user, &others).is_empty());
}

#[test]
fn test_multiple_accelerators_hit_multiple_registries() {
    let user = MemoryRegistry::new("org.example.user").with_binding("move", &["<Super>Left", "<Super>h"]);
    let others = foreign(vec![
        MemoryRegistry::new("org.example.mutter").with_binding("tile-left", &["<Super>Left"]),
        MemoryRegistry::new("org.example.shell").with_binding("hide", &["<Super>H"]),
    ]);

    let conflicts = find_conflicts(&user, &others);
    assert_eq!(conflicts.len(), 2);
    assert_eq!(conflicts[0].conflicting_bindings, vec!["tile-left"]);
    assert_eq!(conflicts[1].conflicting_bindings, vec!["hide"]);
}

#[test]
fn test_conflict_display() {
    let user = MemoryRegistry::new("org.example.user").with_binding("toggle", &["<Super>t"]);
    let others = foreign(vec![
        MemoryRegistry::new("org.example.shell").with_binding("open-terminal", &["<Super>t"]),
    ]);

    let display = find_conflicts(&user, &others)[0].to_string();
    assert!(display.contains("toggle"));
    assert!(display.contains("<Super>t"));
    assert!(display.contains("open-terminal"));
    assert!(display.contains("org.example.shell"));
}
