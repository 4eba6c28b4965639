//! Dependency graph checks for layers and groups.
//!
//! Both documents declare a DAG through id lists (`depends_on`,
//! `depends_on_groups`). [`analyze`] runs a three-colour depth-first search
//! over the declared edges and reports the first cycle found, plus any edge
//! pointing at an id that is not part of the document.

use std::collections::HashMap;

/// Result of checking a dependency graph
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencyReport {
    /// First cycle found, as a closed path (`a -> b -> a`)
    pub cycle: Option<Vec<String>>,
    /// `(node, missing dependency)` pairs
    pub unknown: Vec<(String, String)>,
}

impl DependencyReport {
    pub fn is_clean(&self) -> bool {
        self.cycle.is_none() && self.unknown.is_empty()
    }

    /// Human-readable warnings for unknown dependency ids.
    pub fn warnings(&self) -> Vec<String> {
        self.unknown
            .iter()
            .map(|(node, dep)| format!("{} depends on unknown id '{}'", node, dep))
            .collect()
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Colour {
    White,
    Grey,
    Black,
}

/// Check a graph given as `(node id, dependency ids)` pairs.
///
/// Nodes are visited in the order given, so the reported cycle is
/// deterministic for a given document.
pub fn analyze<'a, I>(nodes: I) -> DependencyReport
where
    I: IntoIterator<Item = (&'a str, &'a [String])>,
{
    let nodes: Vec<(&str, &[String])> = nodes.into_iter().collect();
    let index: HashMap<&str, usize> = nodes
        .iter()
        .enumerate()
        .map(|(i, (id, _))| (*id, i))
        .collect();

    let mut report = DependencyReport::default();
    for (id, deps) in &nodes {
        for dep in deps.iter() {
            if !index.contains_key(dep.as_str()) {
                report.unknown.push((id.to_string(), dep.clone()));
            }
        }
    }

    let mut colours = vec![Colour::White; nodes.len()];
    let mut stack: Vec<usize> = Vec::new();
    for start in 0..nodes.len() {
        if colours[start] == Colour::White
            && let Some(cycle) = visit(start, &nodes, &index, &mut colours, &mut stack)
        {
            report.cycle = Some(cycle);
            break;
        }
    }

    report
}

fn visit(
    node: usize,
    nodes: &[(&str, &[String])],
    index: &HashMap<&str, usize>,
    colours: &mut [Colour],
    stack: &mut Vec<usize>,
) -> Option<Vec<String>> {
    colours[node] = Colour::Grey;
    stack.push(node);

    for dep in nodes[node].1 {
        let Some(&next) = index.get(dep.as_str()) else {
            continue;
        };
        match colours[next] {
            Colour::Grey => {
                // back edge: the cycle is the stack suffix starting at `next`
                let from = stack.iter().position(|&n| n == next).unwrap_or(0);
                let mut path: Vec<String> =
                    stack[from..].iter().map(|&n| nodes[n].0.to_string()).collect();
                path.push(nodes[next].0.to_string());
                return Some(path);
            }
            Colour::White => {
                if let Some(cycle) = visit(next, nodes, index, colours, stack) {
                    return Some(cycle);
                }
            }
            Colour::Black => {}
        }
    }

    stack.pop();
    colours[node] = Colour::Black;
    None
}
