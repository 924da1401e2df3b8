//! Differential inference: compare the algebraic and synthetic E∞ pages and
//! explain every algebraic class that is only torsion synthetically by an
//! inferred differential in the Adams chart.

use std::collections::{BTreeMap, HashSet};

use serde::Serialize;

use crate::constants::ALREADY_TORSION_REASON;
use crate::dataset::Dataset;
use crate::differential::Differential;
use crate::generator::Generator;
use crate::module_state::ModuleState;
use crate::projection::project;
use crate::view::{Category, Truncation, ViewParameters};

/// Why an inferred differential exists, as far as the data can tell.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Provenance {
    /// Raw differential whose target and coefficient match.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linked: Option<Differential>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl Provenance {
    pub fn is_empty(&self) -> bool {
        self.linked.is_none() && self.reason.is_none()
    }

    fn note(&self) -> String {
        match (&self.linked, &self.reason) {
            (Some(d), _) => format!(
                "explained by {} -> {} ({}, coefficient {})",
                d.from,
                d.to,
                d.page_label(),
                d.coefficient_label()
            ),
            (None, Some(reason)) => reason.clone(),
            (None, None) => "inferred from algebraic and synthetic E∞".to_string(),
        }
    }
}

/// Adams chart with split nodes and inferred differentials.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct InferredDiagram {
    pub nodes: Vec<Generator>,
    pub edges: Vec<Differential>,
    /// Keyed by `"src->tgt"`; one entry per edge, possibly empty.
    pub provenance: BTreeMap<String, Provenance>,
}

impl InferredDiagram {
    pub fn provenance_for(&self, edge: &Differential) -> Option<&Provenance> {
        self.provenance.get(&edge.key())
    }
}

/// Infer the differentials separating algebraic from synthetic E∞.
pub fn infer_differentials(dataset: &Dataset, truncation: Truncation) -> InferredDiagram {
    let algebraic = project(
        dataset,
        &ViewParameters::limit(Category::Algebraic).with_truncation(truncation),
    );
    let synthetic = project(
        dataset,
        &ViewParameters::limit(Category::Synthetic).with_truncation(truncation),
    );

    let mut diagram = InferredDiagram::default();
    let mut emitted = HashSet::new();

    for g in dataset.generators() {
        // Duplicate names share one projection entry; only emit it once.
        if !algebraic.is_alive(&g.name) || !emitted.insert(g.name.as_str()) {
            continue;
        }
        let Some(survivor) = synthetic.get(&g.name) else {
            continue;
        };

        match survivor.module {
            ModuleState::Dead => {}
            ModuleState::Free => {
                diagram
                    .nodes
                    .push(g.placed_at(g.name.clone(), g.x, survivor.filtration));
            }
            ModuleState::Torsion(t) => {
                // Leaves room for the page, t + 1.
                let t = i32::try_from(t).unwrap_or(i32::MAX).min(i32::MAX - 1);
                let src = g.placed_at(format!("{}_src", g.name), g.x, survivor.filtration);
                let tgt = g.placed_at(
                    format!("{}_tgt", g.name),
                    g.x.saturating_add(1),
                    survivor.filtration.saturating_sub(t + 1),
                );

                let provenance = trace_provenance(dataset, g, t);
                let edge = Differential::fake(
                    src.name.clone(),
                    tgt.name.clone(),
                    t,
                    t + 1,
                    provenance.note(),
                );

                diagram.provenance.insert(edge.key(), provenance);
                diagram.nodes.push(src);
                diagram.nodes.push(tgt);
                diagram.edges.push(edge);
            }
        }
    }

    diagram
}

/// Search the unfiltered registry for a differential that made `g` τ^t-torsion.
fn trace_provenance(dataset: &Dataset, g: &Generator, t: i32) -> Provenance {
    let into_g = || {
        dataset
            .differentials()
            .iter()
            .filter(|d| d.to == g.name && d.coeff == t)
    };

    let linked = into_g()
        .find(|d| d.page == t + 1)
        .or_else(|| into_g().next())
        .cloned();

    let reason = match (&linked, g.raw_module()) {
        (None, ModuleState::Torsion(_)) => Some(ALREADY_TORSION_REASON.to_string()),
        _ => None,
    };

    Provenance { linked, reason }
}
