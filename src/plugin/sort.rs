//! Load-order sorting of the active plugin list
//!
//! Ordering edges between two active plugins `a` and `b`:
//!
//! - `a.load_after` names `b`: `b` comes first
//! - `a.requires_plugins` names `b` (and `a.load_before` does not): `b` comes first
//! - `a.load_before` names `b`: `a` comes first
//!
//! Among plugins whose predecessors are all placed, the one declared earliest
//! goes next. When nothing is ready, the earliest declared plugin that lies
//! on a cycle is placed anyway; plugins merely waiting behind a cycle keep
//! their edges.

use super::{CORE_PLUGIN, Plugin};
use log::warn;
use std::collections::{BTreeSet, HashMap};

/// Sorted names of the active plugins; `core` leads whenever it is known
pub fn sorted_plugin_names(plugins: &[&Plugin]) -> Vec<String> {
    let has_core = plugins.iter().any(|p| p.name() == CORE_PLUGIN);
    let nodes: Vec<&Plugin> = plugins
        .iter()
        .copied()
        .filter(|p| p.is_active() && p.name() != CORE_PLUGIN)
        .collect();

    let position: HashMap<&str, usize> = nodes
        .iter()
        .enumerate()
        .map(|(i, p)| (p.name(), i))
        .collect();

    let mut preds: Vec<BTreeSet<usize>> = vec![BTreeSet::new(); nodes.len()];
    for (i, plugin) in nodes.iter().enumerate() {
        for name in plugin.get_load_after() {
            if let Some(&j) = position.get(name.as_str()) {
                if j != i {
                    preds[i].insert(j);
                }
            }
        }
        for name in plugin.get_requires_plugins() {
            if plugin.get_load_before().contains(name) {
                continue;
            }
            if let Some(&j) = position.get(name.as_str()) {
                if j != i {
                    preds[i].insert(j);
                }
            }
        }
        for name in plugin.get_load_before() {
            if let Some(&j) = position.get(name.as_str()) {
                if j != i {
                    preds[j].insert(i);
                }
            }
        }
    }

    let mut placed = vec![false; nodes.len()];
    let mut sorted = Vec::with_capacity(nodes.len() + 1);
    if has_core {
        sorted.push(CORE_PLUGIN.to_string());
    }

    for _ in 0..nodes.len() {
        let ready = (0..nodes.len())
            .find(|&i| !placed[i] && preds[i].iter().all(|&j| placed[j]));
        let next = match ready {
            Some(i) => i,
            None => {
                let Some(i) = (0..nodes.len())
                    .find(|&i| !placed[i] && on_cycle(i, &preds, &placed))
                    .or_else(|| (0..nodes.len()).find(|&i| !placed[i]))
                else {
                    break;
                };
                warn!(
                    "Cyclic load-order constraints involving '{}', keeping declared order",
                    nodes[i].name()
                );
                i
            }
        };
        placed[next] = true;
        sorted.push(nodes[next].name().to_string());
    }

    sorted
}

/// Whether `start` can reach itself through unplaced predecessors
fn on_cycle(start: usize, preds: &[BTreeSet<usize>], placed: &[bool]) -> bool {
    let mut seen = vec![false; preds.len()];
    let mut stack: Vec<usize> = preds[start].iter().copied().filter(|&j| !placed[j]).collect();
    while let Some(node) = stack.pop() {
        if node == start {
            return true;
        }
        if std::mem::replace(&mut seen[node], true) {
            continue;
        }
        stack.extend(preds[node].iter().copied().filter(|&j| !placed[j]));
    }
    false
}
