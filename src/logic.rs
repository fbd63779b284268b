use itertools::Itertools;
use varisat::Lit;

fn negate(lit: Lit) -> Lit {
    match lit.is_negative() {
        true => lit.var().positive(),
        false => lit.var().negative(),
    }
}

/// Clauses asserting that exactly one of `lits` holds.
/// With no literals at all, the result contains the empty clause and is unsatisfiable.
pub(crate) fn exactly_one(lits: Vec<Lit>) -> Vec<Vec<Lit>> {
    let mut clauses = Vec::with_capacity(lits.len() * lits.len().saturating_sub(1) / 2 + 1);

    // no two are true; (!A + !B) * (!A + !C) * ...
    clauses.extend(lits.iter()
        .tuple_combinations()
        .map(|(a, b)| vec![negate(*a), negate(*b)])
    );
    // at least one is true; A + B + C + ...
    clauses.push(lits);

    clauses
}
