use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use polars::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{ExplorerError, Result};
use crate::loader::require_columns;
use crate::normalize;
use crate::schema::{self, LevelColumns};

/// The two independent classification trees an establishment is filed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Hierarchy {
    /// Economic activity (NAF), 5 levels.
    Activity,
    /// Legal category (CJ), 3 levels.
    LegalCategory,
}

impl Hierarchy {
    pub const ALL: [Hierarchy; 2] = [Hierarchy::Activity, Hierarchy::LegalCategory];

    pub fn name(self) -> &'static str {
        match self {
            Self::Activity => schema::hierarchy::ACTIVITY,
            Self::LegalCategory => schema::hierarchy::LEGAL_CATEGORY,
        }
    }

    /// Level columns, coarsest first.
    pub fn levels(self) -> &'static [LevelColumns] {
        match self {
            Self::Activity => &schema::activity::LEVELS,
            Self::LegalCategory => &schema::legal::LEVELS,
        }
    }

    pub fn depth(self) -> usize {
        self.levels().len()
    }

    pub fn leaf(self) -> LevelColumns {
        self.levels()[self.depth() - 1]
    }

    /// Columns of a 1-based level.
    pub fn level(self, level: usize) -> Result<LevelColumns> {
        if level == 0 || level > self.depth() {
            return Err(ExplorerError::InvalidLevel {
                hierarchy: self.name(),
                level,
                depth: self.depth(),
            });
        }
        Ok(self.levels()[level - 1])
    }

    pub fn label_columns(self) -> impl Iterator<Item = &'static str> {
        self.levels().iter().map(|l| l.label)
    }

    pub fn code_columns(self) -> impl Iterator<Item = &'static str> {
        self.levels().iter().map(|l| l.code)
    }
}

impl fmt::Display for Hierarchy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Hierarchy {
    type Err = ExplorerError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            schema::hierarchy::ACTIVITY | "naf" => Ok(Self::Activity),
            schema::hierarchy::LEGAL_CATEGORY | "cj" => Ok(Self::LegalCategory),
            other => Err(ExplorerError::UnknownHierarchy(other.to_string())),
        }
    }
}

/// A validated classification table: a strict tree of codes, one label per
/// code, unique leaf codes.
#[derive(Debug, Clone)]
pub struct HierarchyTable {
    hierarchy: Hierarchy,
    frame: DataFrame,
    tree: HierarchyTree,
}

impl HierarchyTable {
    /// Normalize and validate a raw table with all columns as strings.
    ///
    /// Fails on missing columns, null codes or labels, duplicate leaf codes,
    /// a code filed under two parents, or a code carrying two labels.
    pub fn new(hierarchy: Hierarchy, raw: DataFrame) -> Result<Self> {
        let mut required: Vec<&str> = hierarchy.code_columns().collect();
        required.extend(hierarchy.label_columns());
        require_columns(&raw, &required)?;

        let frame = normalize::normalize_hierarchy(raw, hierarchy)?;
        check_complete(&frame, hierarchy)?;
        check_unique_leaves(&frame, hierarchy)?;
        let tree = HierarchyTree::from_frame(&frame, hierarchy)?;

        tracing::debug!(
            hierarchy = hierarchy.name(),
            rows = frame.height(),
            nodes = tree.node_count(),
            "validated hierarchy table"
        );

        Ok(Self {
            hierarchy,
            frame,
            tree,
        })
    }

    pub fn hierarchy(&self) -> Hierarchy {
        self.hierarchy
    }

    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    pub fn tree(&self) -> &HierarchyTree {
        &self.tree
    }

    /// Number of leaf entries.
    pub fn len(&self) -> usize {
        self.frame.height()
    }

    pub fn is_empty(&self) -> bool {
        self.frame.height() == 0
    }

    /// The table reduced to the columns carried into the working table: the
    /// leaf code as join key, ancestor codes and every label.
    pub(crate) fn join_columns(&self) -> Vec<Expr> {
        let mut cols: Vec<Expr> = self.hierarchy.code_columns().map(col).collect();
        cols.extend(self.hierarchy.label_columns().map(col));
        cols
    }
}

fn check_complete(frame: &DataFrame, hierarchy: Hierarchy) -> Result<()> {
    for name in hierarchy.code_columns().chain(hierarchy.label_columns()) {
        let nulls = frame.column(name)?.null_count();
        if nulls > 0 {
            return Err(ExplorerError::Validation(format!(
                "{} hierarchy column '{}' has {} missing values",
                hierarchy, name, nulls
            )));
        }
    }
    Ok(())
}

fn check_unique_leaves(frame: &DataFrame, hierarchy: Hierarchy) -> Result<()> {
    let leaves = frame.column(hierarchy.leaf().code)?.str()?;
    let mut seen: HashMap<&str, usize> = HashMap::new();
    for code in leaves.into_iter().flatten() {
        *seen.entry(code).or_insert(0) += 1;
    }
    // Report the smallest offending code so the message is stable.
    let duplicate = seen
        .into_iter()
        .filter(|(_, n)| *n > 1)
        .min_by(|a, b| a.0.cmp(b.0));
    if let Some((code, occurrences)) = duplicate {
        return Err(ExplorerError::DuplicateLeafCode {
            hierarchy: hierarchy.name(),
            code: code.to_string(),
            occurrences,
        });
    }
    Ok(())
}

/// Node payload: code and label. The level is part of the node map key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct TreeNode {
    code: String,
    label: String,
}

/// Classification tree built from the flat table; edges point parent → child.
#[derive(Debug, Clone)]
pub struct HierarchyTree {
    graph: DiGraph<TreeNode, ()>,
}

impl HierarchyTree {
    /// Build the tree, rejecting any code reached from two different parents
    /// or carrying two different labels.
    pub fn from_frame(frame: &DataFrame, hierarchy: Hierarchy) -> Result<Self> {
        let levels = hierarchy.levels();
        let codes: Vec<&StringChunked> = levels
            .iter()
            .map(|l| frame.column(l.code).and_then(|c| c.str()))
            .collect::<std::result::Result<_, _>>()?;
        let labels: Vec<&StringChunked> = levels
            .iter()
            .map(|l| frame.column(l.label).and_then(|c| c.str()))
            .collect::<std::result::Result<_, _>>()?;

        let mut graph: DiGraph<TreeNode, ()> = DiGraph::new();
        // (level, code) → NodeIndex
        let mut node_map: HashMap<(usize, String), NodeIndex> = HashMap::new();

        for row in 0..frame.height() {
            let mut parent: Option<NodeIndex> = None;
            for depth in 0..levels.len() {
                let level = depth + 1;
                let code = codes[depth].get(row).ok_or_else(|| {
                    ExplorerError::Validation(format!("{hierarchy} level {level}: null code at row {row}"))
                })?;
                let label = labels[depth].get(row).ok_or_else(|| {
                    ExplorerError::Validation(format!("{hierarchy} level {level}: null label at row {row}"))
                })?;

                let idx = match node_map.get(&(level, code.to_string())) {
                    Some(&idx) => {
                        if graph[idx].label != label {
                            return Err(ExplorerError::Validation(format!(
                                "{} level {} code '{}' has two labels: '{}' and '{}'",
                                hierarchy, level, code, graph[idx].label, label
                            )));
                        }
                        idx
                    }
                    None => {
                        let idx = graph.add_node(TreeNode {
                            code: code.to_string(),
                            label: label.to_string(),
                        });
                        node_map.insert((level, code.to_string()), idx);
                        idx
                    }
                };

                if let Some(parent_idx) = parent {
                    graph.update_edge(parent_idx, idx, ());
                    if graph.neighbors_directed(idx, Direction::Incoming).count() > 1 {
                        let mut parents: Vec<String> = graph
                            .neighbors_directed(idx, Direction::Incoming)
                            .map(|p| lineage(&graph, p))
                            .collect();
                        parents.sort();
                        return Err(ExplorerError::Validation(format!(
                            "{} level {} code '{}' has several parents: {}",
                            hierarchy,
                            level,
                            code,
                            parents.join(", ")
                        )));
                    }
                }
                parent = Some(idx);
            }
        }

        Ok(Self { graph })
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }
}

/// Codes from the root down to `idx`, joined with " > ".
fn lineage(graph: &DiGraph<TreeNode, ()>, idx: NodeIndex) -> String {
    let mut chain = Vec::new();
    let mut current = Some(idx);
    while let Some(node) = current {
        chain.push(graph[node].code.as_str());
        current = graph.neighbors_directed(node, Direction::Incoming).next();
    }
    chain.reverse();
    chain.join(" > ")
}
