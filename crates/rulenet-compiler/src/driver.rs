//! Compiler state and the `compile` entry point.

use rulenet_core::Symbol;
use serde::Serialize;

use crate::config::Config;
use crate::diagnostics::{Diagnostic, DiagnosticKind, HandleConflict, Location};
use crate::environment::Environment;
use crate::lhs::{LhsNode, LhsTree, NodeId, NodeKind, NodeOutputs};

/// State of one compilation pass over an LHS.
pub struct Compiler<'a> {
    pub(crate) tree: LhsTree,
    pub(crate) env: &'a Environment,
    pub(crate) config: &'a Config,
}

/// An LHS whose output slots are populated.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(transparent)]
pub struct CompiledTree {
    tree: LhsTree,
}

impl CompiledTree {
    pub fn tree(&self) -> &LhsTree {
        &self.tree
    }

    pub fn into_tree(self) -> LhsTree {
        self.tree
    }

    pub fn outputs(&self, id: NodeId) -> &NodeOutputs {
        &self.tree.node(id).out
    }
}

/// Analyze `tree` and generate its network tests.
///
/// Fails on the first semantic error; no partial result is returned.
pub fn compile(
    tree: LhsTree,
    env: &Environment,
    config: &Config,
) -> Result<CompiledTree, Diagnostic> {
    Compiler::new(tree, env, config).run()
}

impl<'a> Compiler<'a> {
    pub fn new(tree: LhsTree, env: &'a Environment, config: &'a Config) -> Self {
        Self { tree, env, config }
    }

    #[tracing::instrument(level = "debug", skip_all, fields(nodes = self.tree.len()))]
    pub fn run(mut self) -> Result<CompiledTree, Diagnostic> {
        self.tree.reset();

        let ces: Vec<NodeId> = self.tree.ces().collect();
        for ce in ces {
            let node = self.tree.node(ce);
            tracing::debug!(ce = node.pattern, kind = ?node.kind, "analyzing condition element");
            let kind = node.kind;
            match kind {
                NodeKind::Pattern { handle } => {
                    if let Some(handle) = handle {
                        self.check_handle(ce, handle)?;
                    }
                    self.analyze_pattern(ce)?;
                }
                NodeKind::Test => self.analyze_test(ce)?,
                _ => {}
            }
        }

        self.collapse_negated_runs();
        Ok(CompiledTree { tree: self.tree })
    }

    /// A handle with an origin was already bound by an earlier element.
    fn check_handle(&self, ce: NodeId, handle: Symbol) -> Result<(), Diagnostic> {
        let Some(origin) = self.tree.node(ce).referring else {
            return Ok(());
        };
        let conflict = match self.tree.node(origin).kind {
            NodeKind::Pattern { .. } => HandleConflict::AlreadyMatchHandle,
            _ => HandleConflict::BoundInPattern,
        };
        Err(self
            .error(DiagnosticKind::DuplicateOrIllegalMatchHandle(conflict), ce)
            .variable(self.env.name(handle)))
    }

    pub(crate) fn node(&self, id: NodeId) -> &LhsNode {
        self.tree.node(id)
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut LhsNode {
        self.tree.node_mut(id)
    }

    /// Diagnostic located at `id`'s element, field and slot.
    pub(crate) fn error(&self, kind: DiagnosticKind, id: NodeId) -> Diagnostic {
        let node = self.node(id);
        Diagnostic::at(
            kind,
            Location {
                pattern: node.pattern,
                field: (node.field > 0).then_some(node.field),
                slot: node.slot.map(|s| self.env.name(s).to_owned()),
                ..Location::default()
            },
        )
    }
}
