//! Test fixtures and rendering helpers.

use rulenet_core::Expr;

use crate::{
    CompiledTree, Config, Diagnostic, Environment, LhsBuilder, NodeId, NodeKind, compile,
};

/// A successfully compiled LHS together with the names it resolves against.
pub struct Compiled {
    pub env: Environment,
    pub tree: CompiledTree,
}

/// Compile against the builtin environment with default options.
pub fn compile_lhs(lhs: LhsBuilder) -> Compiled {
    compile_lhs_with(lhs, Environment::with_builtins(), &Config::default())
        .unwrap_or_else(|d| panic!("expected successful compile, got: {d}"))
}

pub fn compile_lhs_with(
    lhs: LhsBuilder,
    mut env: Environment,
    config: &Config,
) -> Result<Compiled, Diagnostic> {
    let tree = lhs.build(env.interner_mut());
    let tree = compile(tree, &env, config)?;
    Ok(Compiled { env, tree })
}

/// Compile expecting failure.
pub fn compile_error(lhs: LhsBuilder) -> Diagnostic {
    compile_error_with(lhs, Environment::with_builtins(), &Config::default())
}

pub fn compile_error_with(lhs: LhsBuilder, env: Environment, config: &Config) -> Diagnostic {
    match compile_lhs_with(lhs, env, config) {
        Ok(_) => panic!("expected compile error"),
        Err(d) => d,
    }
}

impl Compiled {
    pub fn ce(&self, index: u32) -> NodeId {
        self.tree
            .tree()
            .ce(index)
            .unwrap_or_else(|| panic!("no CE #{index}"))
    }

    pub fn field(&self, ce: u32, field: u32) -> NodeId {
        self.tree
            .tree()
            .field(self.ce(ce), field)
            .unwrap_or_else(|| panic!("no field #{field} in CE #{ce}"))
    }

    pub fn render(&self, expr: Option<&Expr>) -> String {
        match expr {
            Some(e) => e.display(self.env.interner()).to_string(),
            None => "-".to_owned(),
        }
    }

    pub fn network(&self, ce: u32) -> String {
        self.render(self.tree.outputs(self.ce(ce)).network_test.as_ref())
    }

    pub fn external(&self, ce: u32) -> String {
        self.render(self.tree.outputs(self.ce(ce)).external_network_test.as_ref())
    }

    pub fn local(&self, ce: u32, field: u32) -> String {
        self.render(self.tree.outputs(self.field(ce, field)).local_test.as_ref())
    }

    fn list(&self, exprs: &[Expr]) -> String {
        exprs
            .iter()
            .map(|e| self.render(Some(e)))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Every populated output slot, one per line.
    pub fn dump(&self) -> String {
        let tree = self.tree.tree();
        let mut out = String::new();
        for ce in tree.ces() {
            let node = tree.node(ce);
            out.push_str(&format!("CE #{}\n", node.pattern));
            let o = &node.out;
            for (label, expr) in [
                ("network", &o.network_test),
                ("external", &o.external_network_test),
            ] {
                if expr.is_some() {
                    out.push_str(&format!("  {label}: {}\n", self.render(expr.as_ref())));
                }
            }
            for (label, list) in [
                ("left-hash", &o.left_hash),
                ("right-hash", &o.right_hash),
                ("external-left-hash", &o.external_left_hash),
                ("external-right-hash", &o.external_right_hash),
            ] {
                if !list.is_empty() {
                    out.push_str(&format!("  {label}: {}\n", self.list(list)));
                }
            }

            let mut fields = Vec::new();
            for field in tree.fields(ce) {
                fields.push(field);
                if tree.node(field).kind == NodeKind::MultifieldSlot {
                    fields.extend(tree.subfields(field));
                }
            }
            for field in fields {
                let f = tree.node(field);
                let label = match f.segment {
                    Some(seg) => format!("#{}[{}]", f.field, seg.position),
                    None => format!("#{}", f.field),
                };
                if f.out.local_test.is_some() {
                    out.push_str(&format!(
                        "  {label} local: {}\n",
                        self.render(f.out.local_test.as_ref())
                    ));
                }
                if f.out.constant_selector.is_some() {
                    out.push_str(&format!(
                        "  {label} selector: {} = {}\n",
                        self.render(f.out.constant_selector.as_ref()),
                        self.render(f.out.constant_value.as_ref())
                    ));
                }
            }
        }
        out
    }
}
