//! Tree output formatting for the derivation hierarchy.
//!
//! Renders a lineage graph as a forest in the style of the `tree` command,
//! with Unicode box-drawing characters. Each root distribution starts a tree
//! and its derivatives hang beneath it.

use super::{paint, OutputConfig};
use colored::Colorize;
use lineage_core::{LineageGraph, LineageNode};
use std::collections::HashSet;

/// Tree output formatter
pub struct TreeOutput;

/// Tree branch characters
struct TreeChars {
    /// Vertical line for continuing branches (|)
    pipe: &'static str,
    /// Branch for non-last items (|-)
    branch: &'static str,
    /// Branch for last item in a level (L-)
    last: &'static str,
    /// Spacing for items under last branch
    space: &'static str,
}

impl TreeChars {
    const UNICODE: TreeChars = TreeChars {
        pipe: "\u{2502}   ",
        branch: "\u{251c}\u{2500}\u{2500} ",
        last: "\u{2514}\u{2500}\u{2500} ",
        space: "    ",
    };
}

/// Marker appended to a node that closes a derivation cycle.
const CYCLE_MARKER: &str = "\u{21bb}";

/// Indentation stops growing past this depth; deeper nodes carry their depth instead.
const MAX_INDENT_DEPTH: usize = 64;

/// A node waiting to be rendered.
struct Frame<'g> {
    node: &'g LineageNode,
    prefix: String,
    /// `None` for the top of a tree.
    is_last: Option<bool>,
    depth: usize,
}

impl TreeOutput {
    /// Render the whole graph as a derivation forest.
    ///
    /// Roots come first in node order. Nodes caught in a cycle that no root
    /// reaches are rendered as extra trees afterwards, so every node appears.
    pub fn forest(graph: &LineageGraph, config: &OutputConfig) -> String {
        let mut lines = Vec::new();
        let mut visited = HashSet::new();

        for root in graph.roots() {
            Self::render_tree(graph, root, config, &mut visited, &mut lines);
        }

        for node in graph.nodes() {
            if !visited.contains(node.id.as_str()) {
                Self::render_tree(graph, node, config, &mut visited, &mut lines);
            }
        }

        if lines.is_empty() {
            "(empty catalog)".to_string()
        } else {
            lines.join("\n")
        }
    }

    /// Render a single chain, oldest ancestor first, as a nested path.
    pub fn chain(nodes: &[&LineageNode], config: &OutputConfig) -> String {
        let chars = &TreeChars::UNICODE;
        let mut lines = Vec::with_capacity(nodes.len());

        for (depth, node) in nodes.iter().enumerate() {
            let label = Self::label(node, config);
            if depth == 0 {
                lines.push(label);
            } else {
                let indent = (depth - 1).min(MAX_INDENT_DEPTH);
                lines.push(format!(
                    "{}{}{}{}",
                    chars.space.repeat(indent),
                    chars.last,
                    label,
                    Self::depth_note(depth)
                ));
            }
        }

        lines.join("\n")
    }

    /// Depth-first walk from `root` with an explicit stack, so chain length
    /// is bounded by memory rather than by the thread's stack.
    fn render_tree<'g>(
        graph: &'g LineageGraph,
        root: &'g LineageNode,
        config: &OutputConfig,
        visited: &mut HashSet<&'g str>,
        lines: &mut Vec<String>,
    ) {
        let chars = &TreeChars::UNICODE;
        let mut stack = vec![Frame {
            node: root,
            prefix: String::new(),
            is_last: None,
            depth: 0,
        }];

        while let Some(frame) = stack.pop() {
            let connector = match frame.is_last {
                None => "",
                Some(true) => chars.last,
                Some(false) => chars.branch,
            };
            let line = format!(
                "{}{}{}{}",
                frame.prefix,
                connector,
                Self::label(frame.node, config),
                Self::depth_note(frame.depth)
            );

            if !visited.insert(frame.node.id.as_str()) {
                let marker = paint(CYCLE_MARKER, config, |s| s.red());
                lines.push(format!("{} {}", line, marker));
                continue;
            }
            lines.push(line);

            let child_prefix = match frame.is_last {
                _ if frame.depth >= MAX_INDENT_DEPTH => frame.prefix.clone(),
                None => String::new(),
                Some(true) => format!("{}{}", frame.prefix, chars.space),
                Some(false) => format!("{}{}", frame.prefix, chars.pipe),
            };

            let children = graph.children(&frame.node.id);
            let count = children.len();
            // Reversed so the first child is popped first
            for (i, child) in children.into_iter().enumerate().rev() {
                stack.push(Frame {
                    node: child,
                    prefix: child_prefix.clone(),
                    is_last: Some(i + 1 == count),
                    depth: frame.depth + 1,
                });
            }
        }
    }

    fn depth_note(depth: usize) -> String {
        if depth > MAX_INDENT_DEPTH {
            format!(" (depth {})", depth)
        } else {
            String::new()
        }
    }

    fn label(node: &LineageNode, config: &OutputConfig) -> String {
        if node.is_synthetic {
            format!(
                "{} {}",
                paint(&node.id, config, |s| s.dimmed()),
                paint("(not in catalog)", config, |s| s.dimmed().italic())
            )
        } else {
            paint(&node.id, config, |s| s.bold())
        }
    }
}
