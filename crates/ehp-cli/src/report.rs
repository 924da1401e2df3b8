//! Response shapes shared by the CLI's `--json` output and the HTTP API.

use std::collections::HashSet;

use ehp_core::{
    Dataset, Differential, InferredDiagram, IntegrityReport, ModuleState, Severity,
    StemMismatch, ViewParameters, project,
};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct AliveClass {
    pub name: String,
    pub x: i32,
    pub y: i32,
    pub filtration: i32,
    pub module: ModuleState,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProjectionReport {
    pub view: ViewParameters,
    pub seeded: usize,
    pub alive: Vec<AliveClass>,
    pub fired: Vec<Differential>,
}

/// Project `dataset` and list the alive classes in registry order.
pub fn projection_report(dataset: &Dataset, view: &ViewParameters) -> ProjectionReport {
    let state = project(dataset, view);

    let mut seen = HashSet::new();
    let mut alive = Vec::new();
    for g in dataset.generators() {
        if !seen.insert(g.name.as_str()) {
            continue;
        }
        if let Some(s) = state.get(&g.name).filter(|s| s.is_alive()) {
            alive.push(AliveClass {
                name: g.name.clone(),
                x: g.x,
                y: g.y,
                filtration: s.filtration,
                module: s.module,
            });
        }
    }

    ProjectionReport {
        view: *view,
        seeded: state.len(),
        alive,
        fired: state.fired().to_vec(),
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct VerifyReport {
    pub valid: bool,
    pub issues: Vec<String>,
    pub fatal: usize,
    pub errors: usize,
    pub warnings: usize,
    /// Absent when the integrity check already failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stem_mismatches: Option<Vec<String>>,
}

impl VerifyReport {
    pub fn new(report: &IntegrityReport, stem_mismatches: Option<&[StemMismatch]>) -> Self {
        Self {
            valid: report.is_valid(),
            issues: report.issues.iter().map(ToString::to_string).collect(),
            fatal: report.count(Severity::Fatal),
            errors: report.count(Severity::Error),
            warnings: report.count(Severity::Warning),
            stem_mismatches: stem_mismatches
                .map(|ms| ms.iter().map(ToString::to_string).collect()),
        }
    }
}

/// One line per inferred edge: `src -> tgt  E{d}  coefficient  note`.
pub fn format_inferred(diagram: &InferredDiagram) -> Vec<String> {
    diagram
        .edges
        .iter()
        .map(|edge| {
            let note = match diagram.provenance_for(edge) {
                Some(p) => match (&p.linked, &p.reason) {
                    (Some(linked), _) => format!("explained by {} -> {}", linked.from, linked.to),
                    (None, Some(reason)) => reason.clone(),
                    (None, None) => String::new(),
                },
                None => String::new(),
            };
            format!(
                "{} -> {}  {}  {}  {}",
                edge.from,
                edge.to,
                edge.page_label(),
                edge.coefficient_label(),
                note
            )
            .trim_end()
            .to_string()
        })
        .collect()
}
