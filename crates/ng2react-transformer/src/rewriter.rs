//! Text-preserving rewrites inside component member bodies.
//!
//! Nothing is re-printed from the AST. The visitor records splices against
//! the original text and [`Splices::render`] copies every byte between them
//! verbatim, so formatting and comments survive.
//!
//! | Source            | Output                                 |
//! |-------------------|----------------------------------------|
//! | `this.x = v`      | `setState({...state, x: v})`           |
//! | `this.x += v`     | `setState({...state, x: x + v})`       |
//! | `this.x *= a + b` | `setState({...state, x: x * (a + b)})` |
//! | `this.x = v` (*)  | `initialState.x = v`                   |
//! | `this.x`          | `x`                                    |
//! | `<T>e`            | `((e) as T)`                           |
//!
//! (*) inside the state initializer, where `setState` does not exist yet.

use swc_common::Spanned;
use swc_ecma_ast::{
    AssignExpr, AssignOp, AssignTarget, Expr, MemberExpr, MemberProp, SimpleAssignTarget,
    TsTypeAssertion,
};
use swc_ecma_visit::{Visit, VisitWith};

use crate::members::ComponentMemberModel;
use crate::script::Script;

/// Replace `start..end` with `text`. Insertions have `start == end`.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Splice {
    start: usize,
    end: usize,
    text: String,
}

/// Splices collected for one member.
#[derive(Debug, Default)]
pub struct Splices {
    splices: Vec<Splice>,
}

impl Splices {
    /// Renders `source[start..end]` with every splice inside that range applied.
    ///
    /// Splices are applied in order of position; a splice starting inside an
    /// earlier replacement is dropped.
    pub fn render(&self, source: &str, start: usize, end: usize) -> String {
        let mut inside: Vec<&Splice> = self
            .splices
            .iter()
            .filter(|splice| splice.start >= start && splice.end <= end)
            .collect();
        inside.sort_by_key(|splice| splice.start);

        let mut out = String::with_capacity(end.saturating_sub(start));
        let mut cursor = start;
        for splice in inside {
            if splice.start < cursor {
                continue;
            }
            out.push_str(source.get(cursor..splice.start).unwrap_or(""));
            out.push_str(&splice.text);
            cursor = splice.end;
        }
        out.push_str(source.get(cursor..end).unwrap_or(""));
        out
    }

    fn replace(&mut self, start: usize, end: usize, text: impl Into<String>) {
        self.splices.push(Splice {
            start,
            end,
            text: text.into(),
        });
    }

    fn insert(&mut self, at: usize, text: impl Into<String>) {
        self.replace(at, at, text);
    }
}

/// Collects splices for the nodes it visits.
pub struct Rewriter<'s, 'm> {
    script: &'s Script<'s>,
    members: &'m ComponentMemberModel<'m>,
    /// Inside the `useState` initializer.
    in_initializer: bool,
    splices: Splices,
}

impl<'s, 'm> Rewriter<'s, 'm> {
    pub fn new(script: &'s Script<'s>, members: &'m ComponentMemberModel<'m>) -> Self {
        Self {
            script,
            members,
            in_initializer: false,
            splices: Splices::default(),
        }
    }

    /// Rewrites state assignments as assignments to `initialState`.
    pub fn in_initializer(mut self) -> Self {
        self.in_initializer = true;
        self
    }

    /// Visits `node` and renders the source from `start` to `end`.
    pub fn rewrite<N: VisitWith<Self>>(mut self, node: &N, start: usize, end: usize) -> String {
        node.visit_with(&mut self);
        self.splices.render(self.script.source, start, end)
    }

    /// Visits `node` and renders its own span.
    pub fn rewrite_node<N: VisitWith<Self> + Spanned>(self, node: &N) -> String {
        let span = node.span();
        let (start, end) = (self.script.lo(span), self.script.hi(span));
        self.rewrite(node, start, end)
    }

    /// The text of the compound operator, e.g. `+` for `+=`.
    fn compound_operator(&self, assign: &AssignExpr) -> Option<String> {
        if assign.op == AssignOp::Assign {
            return None;
        }
        let between = self.script.slice(
            self.script.hi(assign.left.span()),
            self.script.lo(assign.right.span()),
        );
        let op = between.trim();
        Some(op.strip_suffix('=').unwrap_or(op).trim().to_string())
    }
}

/// Expressions that bind tighter than any binary operator.
fn is_primary(expr: &Expr) -> bool {
    matches!(
        expr,
        Expr::Ident(_)
            | Expr::Lit(_)
            | Expr::This(_)
            | Expr::Member(_)
            | Expr::Call(_)
            | Expr::Paren(_)
            | Expr::Array(_)
            | Expr::Object(_)
            | Expr::Tpl(_)
    )
}

/// The name in `this.name`.
fn this_member(member: &MemberExpr) -> Option<&str> {
    if !matches!(&*member.obj, Expr::This(_)) {
        return None;
    }
    match &member.prop {
        MemberProp::Ident(ident) => Some(ident.sym.as_ref()),
        _ => None,
    }
}

impl Visit for Rewriter<'_, '_> {
    fn visit_assign_expr(&mut self, assign: &AssignExpr) {
        let target = match &assign.left {
            AssignTarget::Simple(SimpleAssignTarget::Member(member)) => {
                this_member(member).map(|name| (member, name))
            }
            _ => None,
        };
        let Some((member, name)) = target.filter(|(_, name)| self.members.is_state(name)) else {
            assign.visit_children_with(self);
            return;
        };

        let start = self.script.lo(assign.span);
        if self.in_initializer {
            let left_end = self.script.hi(member.span);
            self.splices
                .replace(start, left_end, format!("initialState.{name}"));
            assign.right.visit_with(self);
            return;
        }

        let right_start = self.script.lo(assign.right.span());
        let state = &self.members.state_name;
        let set_state = &self.members.set_state_name;
        let (head, tail) = match self.compound_operator(assign) {
            Some(op) if is_primary(&assign.right) => {
                (format!("{set_state}({{...{state}, {name}: {name} {op} "), "})")
            }
            Some(op) => (format!("{set_state}({{...{state}, {name}: {name} {op} ("), ")})"),
            None => (format!("{set_state}({{...{state}, {name}: "), "})"),
        };
        self.splices.replace(start, right_start, head);
        assign.right.visit_with(self);
        self.splices.insert(self.script.hi(assign.span), tail);
    }

    fn visit_member_expr(&mut self, member: &MemberExpr) {
        if this_member(member).is_some() {
            if let MemberProp::Ident(prop) = &member.prop {
                self.splices.replace(
                    self.script.lo(member.obj.span()),
                    self.script.lo(prop.span),
                    "",
                );
            }
            return;
        }
        member.visit_children_with(self);
    }

    fn visit_ts_type_assertion(&mut self, assertion: &TsTypeAssertion) {
        let start = self.script.lo(assertion.span);
        let expr_start = self.script.lo(assertion.expr.span());
        let expr_end = self.script.hi(assertion.expr.span());
        let ty = self.script.text(assertion.type_ann.span());
        self.splices.replace(start, expr_start, "((");
        assertion.expr.visit_with(self);
        self.splices.insert(expr_end, format!(") as {ty})"));
    }
}
