//! Partial assignments and the per-decision undo trail.
use partial_ref::{partial, PartialRef};

use s1t_formula::{Lit, Var};

use crate::context::{AssignmentP, Context};

/// Current partial assignment.
///
/// Each variable is unassigned (`None`) or carries a boolean value. A literal
/// is true when its variable's value matches its polarity.
#[derive(Default)]
pub struct Assignment {
    assignment: Vec<Option<bool>>,
}

impl Assignment {
    /// Update structures for a new variable count.
    pub fn set_var_count(&mut self, count: usize) {
        self.assignment.resize(count, None);
    }

    /// Value of a literal under the current assignment, `None` if unassigned.
    pub fn lit_value(&self, lit: Lit) -> Option<bool> {
        self.assignment[lit.index()].map(|b| b ^ lit.is_negative())
    }

    pub fn lit_is_true(&self, lit: Lit) -> bool {
        self.assignment[lit.index()] == Some(lit.is_positive())
    }

    pub fn lit_is_false(&self, lit: Lit) -> bool {
        self.assignment[lit.index()] == Some(lit.is_negative())
    }

    /// Make a literal true.
    pub fn assign_lit(&mut self, lit: Lit) {
        self.assignment[lit.index()] = lit.is_positive().into()
    }

    /// Return a variable to the unassigned state.
    pub fn unassign_var(&mut self, var: Var) {
        self.assignment[var.index()] = None;
    }

    /// The per-variable values.
    pub fn assignment(&self) -> &[Option<bool>] {
        &self.assignment
    }

    /// Smallest unassigned variable with an index of at least `search_from`.
    pub fn next_unassigned_var(&self, search_from: usize) -> Option<Var> {
        self.assignment[search_from..]
            .iter()
            .position(|value| value.is_none())
            .map(|offset| Var::from_index(search_from + offset))
    }
}

/// Variables assigned while extending a single decision, in assignment order.
#[derive(Default)]
pub struct Trail {
    assigned: Vec<Var>,
}

impl Trail {
    /// Record a newly assigned variable.
    pub fn record(&mut self, var: Var) {
        self.assigned.push(var);
    }

    /// Recorded variables in assignment order.
    pub fn assigned(&self) -> &[Var] {
        &self.assigned
    }
}

/// Undo every assignment recorded on the trail.
///
/// Unassigning is all that is needed to undo a decision: the watchlist
/// invariant is stated relative to the current assignment, so watches stay
/// where they are.
pub fn backtrack(mut ctx: partial!(Context, mut AssignmentP), trail: &mut Trail) {
    let assignment = ctx.part_mut(AssignmentP);
    for &var in trail.assigned.iter() {
        assignment.unassign_var(var);
    }
    trail.assigned.clear();
}
