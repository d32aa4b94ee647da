use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use log::warn;

use crate::extension_system::traits::Extension;
use crate::utils::naming::normalize_identifier;

/// Order `items` so every dependency runs before its dependants, lower
/// `priority` first among nodes that are ready at the same time.
///
/// Items sharing a key collapse into one node at the position of the first
/// occurrence, holding the last value. Dependencies on keys outside `items`
/// are ignored. Nodes caught in a cycle are appended at the end in their
/// original order.
pub fn sort_by_dependencies<T, K, P, D>(items: &[T], key: K, priority: P, depends: D) -> Vec<T>
where
    T: Clone,
    K: Fn(&T) -> String,
    P: Fn(&T) -> i64,
    D: Fn(&T) -> Vec<String>,
{
    let mut order: Vec<String> = Vec::new();
    let mut nodes: HashMap<String, &T> = HashMap::new();
    for item in items {
        let id = normalize_identifier(&key(item));
        if nodes.insert(id.clone(), item).is_none() {
            order.push(id);
        }
    }

    let priorities: HashMap<&str, i64> = order
        .iter()
        .map(|id| (id.as_str(), priority(nodes[id])))
        .collect();

    // dependency -> dependants
    let mut successors: HashMap<&str, Vec<&str>> = HashMap::new();
    let mut in_degree: HashMap<&str, usize> = order.iter().map(|id| (id.as_str(), 0)).collect();
    for id in &order {
        let mut seen = HashSet::new();
        for dependency in depends(nodes[id]) {
            let dependency = normalize_identifier(&dependency);
            let Some((known, _)) = nodes.get_key_value(&dependency) else {
                continue;
            };
            if !seen.insert(known.as_str()) {
                continue;
            }
            successors.entry(known.as_str()).or_default().push(id.as_str());
            if let Some(degree) = in_degree.get_mut(id.as_str()) {
                *degree += 1;
            }
        }
    }

    let by_priority = |queue: &mut Vec<&str>| queue.sort_by_key(|id| priorities.get(id).copied().unwrap_or_default());

    let mut queue: Vec<&str> = order
        .iter()
        .map(String::as_str)
        .filter(|id| in_degree.get(id).copied() == Some(0))
        .collect();
    by_priority(&mut queue);

    let mut sorted: Vec<&str> = Vec::with_capacity(order.len());
    while !queue.is_empty() {
        let id = queue.remove(0);
        sorted.push(id);

        if let Some(dependants) = successors.get(id) {
            for dependant in dependants {
                if let Some(degree) = in_degree.get_mut(dependant) {
                    *degree -= 1;
                    if *degree == 0 {
                        queue.push(*dependant);
                    }
                }
            }
        }
        by_priority(&mut queue);
    }

    if sorted.len() < order.len() {
        let placed: HashSet<&str> = sorted.iter().copied().collect();
        let cyclic: Vec<&str> = order
            .iter()
            .map(String::as_str)
            .filter(|id| !placed.contains(id))
            .collect();
        warn!("Dependency cycle between: {}", cyclic.join(", "));
        sorted.extend(cyclic);
    }

    sorted.into_iter().map(|id| nodes[id].clone()).collect()
}

/// [`sort_by_dependencies`] keyed on extension identifiers
pub fn sort_extensions(extensions: &[Arc<dyn Extension>]) -> Vec<Arc<dyn Extension>> {
    sort_by_dependencies(
        extensions,
        |extension| extension.identifier().to_string(),
        |extension| extension.priority(),
        |extension| extension.depends().to_vec(),
    )
}
