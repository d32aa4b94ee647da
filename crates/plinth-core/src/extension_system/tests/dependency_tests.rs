use super::{identifiers_of, in_code};
use crate::extension_system::dependency::{sort_by_dependencies, sort_extensions};

type Node = (&'static str, i64, Vec<&'static str>);

fn sort(nodes: &[Node]) -> Vec<&'static str> {
    sort_by_dependencies(
        nodes,
        |node| node.0.to_string(),
        |node| node.1,
        |node| node.2.iter().map(|d| d.to_string()).collect(),
    )
    .into_iter()
    .map(|node| node.0)
    .collect()
}

fn position(order: &[&str], id: &str) -> usize {
    order.iter().position(|o| *o == id).unwrap()
}

#[test]
fn test_independent_extensions_follow_priority() {
    let banner = "Extensions\\Module\\Banner\\Banner";
    let slider = "Extensions\\Module\\Slider\\Slider";

    let sorted = sort_extensions(&[in_code(slider, 5, &[]), in_code(banner, 0, &[])]);
    assert_eq!(identifiers_of(&sorted), vec![banner, slider]);

    let sorted = sort_extensions(&[in_code(banner, 0, &[]), in_code(slider, 5, &[])]);
    assert_eq!(identifiers_of(&sorted), vec![banner, slider]);
}

#[test]
fn test_dependency_beats_priority() {
    let banner = "Extensions\\Module\\Banner\\Banner";
    let slider = "Extensions\\Module\\Slider\\Slider";

    let sorted = sort_extensions(&[in_code(slider, 0, &[banner]), in_code(banner, 5, &[])]);
    assert_eq!(identifiers_of(&sorted), vec![banner, slider]);
}

#[test]
fn test_dependencies_always_precede_dependants() {
    // diamond plus a tail: D -> B, C -> A; E -> D
    let nodes: Vec<Node> = vec![
        ("E", -10, vec!["D"]),
        ("D", -5, vec!["B", "C"]),
        ("C", 3, vec!["A"]),
        ("B", 1, vec!["A"]),
        ("A", 9, vec![]),
        ("F", 2, vec![]),
    ];
    let order = sort(&nodes);
    assert_eq!(order.len(), nodes.len());

    for (id, _, depends) in &nodes {
        for dependency in depends {
            assert!(
                position(&order, dependency) < position(&order, id),
                "{} must run before {} in {:?}",
                dependency,
                id,
                order
            );
        }
    }
}

#[test]
fn test_ready_queue_is_resorted_after_each_pop() {
    // C only becomes ready after A, yet still jumps ahead of the waiting B
    let order = sort(&[("A", 0, vec![]), ("B", 5, vec![]), ("C", 1, vec!["A"])]);
    assert_eq!(order, vec!["A", "C", "B"]);
}

#[test]
fn test_equal_priorities_keep_insertion_order() {
    let order = sort(&[("Z", 0, vec![]), ("M", 0, vec![]), ("A", 0, vec![])]);
    assert_eq!(order, vec!["Z", "M", "A"]);
}

#[test]
fn test_cycle_is_appended_last_without_error() {
    let order = sort(&[("A", 0, vec!["B"]), ("B", 0, vec!["A"]), ("C", 10, vec![])]);
    assert_eq!(order, vec!["C", "A", "B"]);
}

#[test]
fn test_cycle_of_extensions_returns_each_once() {
    let a = "Extensions\\Module\\A\\A";
    let b = "Extensions\\Module\\B\\B";
    let sorted = sort_extensions(&[in_code(a, 0, &[b]), in_code(b, 0, &[a])]);
    assert_eq!(identifiers_of(&sorted), vec![a, b]);
}

#[test]
fn test_self_dependency_is_a_cycle() {
    let order = sort(&[("Loop", -100, vec!["Loop"]), ("Plain", 50, vec![])]);
    assert_eq!(order, vec!["Plain", "Loop"]);
}

#[test]
fn test_unknown_dependencies_are_ignored() {
    let order = sort(&[("A", 2, vec!["Missing\\Thing"]), ("B", 1, vec![])]);
    assert_eq!(order, vec!["B", "A"]);
}

#[test]
fn test_leading_separator_in_dependency_is_stripped() {
    let order = sort(&[("Ext\\Child", 0, vec!["\\Ext\\Parent"]), ("Ext\\Parent", 1, vec![])]);
    assert_eq!(order, vec!["Ext\\Parent", "Ext\\Child"]);
}

#[test]
fn test_duplicates_collapse_to_last_value_at_first_position() {
    let sorted = sort_by_dependencies(
        &[("A", 0), ("B", 0), ("A", 7)],
        |node| node.0.to_string(),
        |node| node.1,
        |_| Vec::new(),
    );
    assert_eq!(sorted, vec![("A", 7), ("B", 0)]);
}

#[test]
fn test_duplicate_dependency_entries_count_once() {
    let order = sort(&[("Child", 0, vec!["Parent", "Parent"]), ("Parent", 3, vec![])]);
    assert_eq!(order, vec!["Parent", "Child"]);
}

#[test]
fn test_empty_input() {
    assert!(sort(&[]).is_empty());
    assert!(sort_extensions(&[]).is_empty());
}
