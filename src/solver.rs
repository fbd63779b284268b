use std::collections::{HashMap, HashSet};
use std::ops::RangeInclusive;

use itertools::Itertools;
use petgraph::graphmap::UnGraphMap;
use unordered_pair::UnorderedPair;
use varisat::{CnfFormula, Lit, Solver, Var};

use crate::affiliation::AffiliationID;
use crate::board::Node;
use crate::location::Location;
use crate::logic::exactly_one;

/// Reasons a [`Board`](crate::Board) may fail to solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SolverFailure {
    /// The SAT solver detected a logical inconsistency, i.e. the board as stated is unsolvable.
    #[error("board has no solution")]
    Inconsistent,
    /// The SAT solver could not solve the affiliation of at least one cell or connection.
    /// This should probably never happen.
    #[error("solver model is missing an affiliation")]
    NoAffiliationFound,
}

/// Something the solver assigns an affiliation to: a cell, or the connection between two neighboring cells.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub(crate) enum Subject {
    Node(Location),
    Edge(UnorderedPair<Location>),
}

impl From<Node> for Subject {
    fn from(value: Node) -> Self {
        Self::Node(value.location)
    }
}

impl From<(Node, Node, &())> for Subject {
    fn from(value: (Node, Node, &())) -> Self {
        Self::Edge(UnorderedPair::from((value.0.location, value.1.location)))
    }
}

/// Solves the graph of a board in accordance with the rules for Numberlink.
/// Use [`Self::solve`] to attempt to find a solution.
pub(crate) struct GraphSolver<'a> {
    graph: &'a UnGraphMap<Node, ()>,
    // position of each subject in the variable space; each owns one variable per affiliation
    subjects: HashMap<Subject, usize>,
    max_affiliation: AffiliationID,
}

impl<'a> From<&'a UnGraphMap<Node, ()>> for GraphSolver<'a> {
    fn from(graph: &'a UnGraphMap<Node, ()>) -> Self {
        let max_affiliation = graph.nodes()
            .filter_map(|node| node.terminus)
            .map(|color| color.get())
            .max()
            .unwrap_or(0);

        let subjects = graph.nodes().map(Subject::from)
            .chain(graph.all_edges().map(Subject::from))
            .enumerate()
            .map(|(position, subject)| (subject, position))
            .collect();

        Self {
            graph,
            subjects,
            max_affiliation,
        }
    }
}

impl GraphSolver<'_> {
    #[inline]
    fn valid_affiliations(&self) -> RangeInclusive<AffiliationID> {
        0..=self.max_affiliation
    }

    #[inline]
    fn valid_non_null_affiliations(&self) -> RangeInclusive<AffiliationID> {
        1..=self.max_affiliation
    }

    #[inline]
    fn affiliation_var(&self, subject: impl Into<Subject>, affiliation: AffiliationID) -> Var {
        let subject: Subject = subject.into();
        // every subject comes from the graph this solver was built over
        let position = self.subjects[&subject];
        Var::from_index(position * (self.max_affiliation + 1) + affiliation)
    }

    fn solved_affiliation_of(&self, model: &HashSet<Lit>, subject: Subject, can_be_null: bool) -> Option<AffiliationID> {
        let mut candidates = if can_be_null { self.valid_affiliations() } else { self.valid_non_null_affiliations() };
        candidates.find(|aff| model.contains(&self.affiliation_var(subject, *aff).positive()))
    }

    /// Clauses for vertex V, a terminus of affiliation `aff`.
    fn terminus_clauses(&self, vertex: Node, aff: AffiliationID, assumptions: &mut Vec<Lit>, formulae: &mut Vec<CnfFormula>) {
        // the affiliation of V is the one already assigned, and no other
        assumptions.extend(self.valid_affiliations()
            .map(|maybe_aff| self.affiliation_var(vertex, maybe_aff).lit(maybe_aff == aff)));

        // exactly one incident edge has the same affiliation
        formulae.push(CnfFormula::from(exactly_one(
            self.graph.edges(vertex)
                .map(|e_triple| self.affiliation_var(e_triple, aff).positive())
                .collect_vec()
        )));

        // exactly one incident edge does *not* have affiliation 0
        formulae.push(CnfFormula::from(exactly_one(
            self.graph.edges(vertex)
                .map(|e_triple| self.affiliation_var(e_triple, 0).negative())
                .collect_vec()
        )));
    }

    /// Clauses for vertex V, which is not a terminus and so must be the middle of some path.
    fn path_clauses(&self, vertex: Node, assumptions: &mut Vec<Lit>, formulae: &mut Vec<CnfFormula>) {
        // V is affiliated...
        assumptions.push(self.affiliation_var(vertex, 0).negative());
        // with exactly one color
        formulae.push(CnfFormula::from(exactly_one(
            self.valid_non_null_affiliations()
                .map(|aff| self.affiliation_var(vertex, aff).positive())
                .collect_vec()
        )));

        let incident = self.graph.edges(vertex).map(Subject::from).collect_vec();

        for aff in self.valid_non_null_affiliations() {
            // V having affiliation A implies some incident edge has affiliation A
            formulae.push(CnfFormula::from(vec![
                std::iter::once(self.affiliation_var(vertex, aff).negative())
                    .chain(incident.iter().map(|edge| self.affiliation_var(*edge, aff).positive()))
                    .collect_vec()
            ]));

            // any incident edge E having affiliation A implies another one does too
            // i.e. !E + (every other incident edge)
            formulae.push(CnfFormula::from(incident.iter()
                .map(|this_edge| incident.iter()
                    .map(|edge| self.affiliation_var(*edge, aff).lit(edge != this_edge))
                    .collect_vec())
                .collect_vec()));

            // but no three incident edges have affiliation A
            formulae.push(CnfFormula::from(incident.iter()
                .tuple_combinations()
                .map(|(e1, e2, e3)| [e1, e2, e3].into_iter()
                    .map(|edge| self.affiliation_var(*edge, aff).negative())
                    .collect_vec())
                .collect_vec()));
        }
    }

    /// Clauses for edge E between vertices B and C.
    fn edge_clauses(&self, edge_triple: (Node, Node, &()), formulae: &mut Vec<CnfFormula>) {
        // E has exactly one affiliation, which may be 0
        formulae.push(CnfFormula::from(exactly_one(
            self.valid_affiliations()
                .map(|aff| self.affiliation_var(edge_triple, aff).positive())
                .collect_vec()
        )));

        for aff in self.valid_non_null_affiliations() {
            // A <=> BC = (!A + B)(!A + C)(A + !B + !C)
            let a = self.affiliation_var(edge_triple, aff);
            let b = self.affiliation_var(edge_triple.0, aff);
            let c = self.affiliation_var(edge_triple.1, aff);

            formulae.push(CnfFormula::from(vec![
                vec![a.negative(), b.positive()],
                vec![a.negative(), c.positive()],
                vec![a.positive(), b.negative(), c.negative()],
            ]))
        }
    }

    /// Solve the graph, returning the affiliation of every vertex and edge.
    ///
    /// # Logical setup
    /// Every vertex V has exactly one nonzero affiliation.
    /// A terminus keeps the affiliation it was given, and exactly one incident edge shares it while the rest have
    /// affiliation 0.
    /// Any other vertex has exactly two incident edges sharing its affiliation.
    ///
    /// Every edge E has exactly one affiliation, which may be 0.
    /// E has nonzero affiliation A if and only if both of its endpoints have affiliation A.
    pub(crate) fn solve(&self) -> Result<HashMap<Subject, AffiliationID>, SolverFailure> {
        let mut assumptions: Vec<Lit> = Vec::new();
        let mut formulae: Vec<CnfFormula> = Vec::new();

        for vertex in self.graph.nodes() {
            match vertex.terminus {
                Some(color) => self.terminus_clauses(vertex, color.get(), &mut assumptions, &mut formulae),
                None => self.path_clauses(vertex, &mut assumptions, &mut formulae),
            }
        }

        for edge_triple in self.graph.all_edges() {
            self.edge_clauses(edge_triple, &mut formulae);
        }

        let mut solver = Solver::new();
        formulae.iter().for_each(|formula| solver.add_formula(formula));
        solver.assume(&assumptions);
        if !solver.solve().unwrap_or(false) {
            return Err(SolverFailure::Inconsistent);
        }
        let model: HashSet<Lit> = solver.model()
            .ok_or(SolverFailure::NoAffiliationFound)?
            .into_iter()
            .collect();

        let mut solved = HashMap::with_capacity(self.subjects.len());
        for subject in self.subjects.keys() {
            let can_be_null = matches!(subject, Subject::Edge(_));
            let aff = self.solved_affiliation_of(&model, *subject, can_be_null)
                .ok_or(SolverFailure::NoAffiliationFound)?;
            solved.insert(*subject, aff);
        }

        Ok(solved)
    }
}
