//! Chart view model: which dots and edges a renderer should draw for a view.
//!
//! Nothing here knows about coordinates on screen. A renderer receives names,
//! chart positions and module types and lays them out itself.

use std::collections::HashSet;

use serde::Serialize;

use crate::constants::LIMIT_PAGE;
use crate::dataset::Dataset;
use crate::differential::{Differential, DifferentialKind};
use crate::generator::Generator;
use crate::module_state::ModuleState;
use crate::projection::{SurvivorState, project};
use crate::view::{Category, Truncation, ViewParameters};

/// A class alive on the viewed page.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Dot {
    pub name: String,
    pub x: i32,
    pub y: i32,
    /// Adams filtration after replay.
    pub filtration: i32,
    pub module: ModuleState,
    /// Still alive on E∞.
    pub permanent: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DiffLine {
    pub from: String,
    pub to: String,
    pub page: i32,
    /// τ exponent to draw; always 0 outside the synthetic category.
    pub coeff: i32,
    pub kind: DifferentialKind,
    pub synthetic_only: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Edge {
    pub from: String,
    pub to: String,
    pub internal: bool,
}

/// Everything the EHP chart shows for one [`ViewParameters`].
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct EhpView {
    pub view: ViewParameters,
    pub dots: Vec<Dot>,
    pub differentials: Vec<DiffLine>,
    pub multiplications: Vec<Edge>,
    pub tau_mults: Vec<Edge>,
}

impl EhpView {
    pub fn dot(&self, name: &str) -> Option<&Dot> {
        self.dots.iter().find(|d| d.name == name)
    }
}

/// Build the EHP chart for `view`.
///
/// Dots come from the projection at `view.page`. Lines are the differentials
/// that fire somewhere from this page on, between classes still alive here.
pub fn ehp_view(dataset: &Dataset, view: &ViewParameters) -> EhpView {
    let current = project(dataset, view);
    let limit = project(
        dataset,
        &ViewParameters {
            page: LIMIT_PAGE,
            include_all_fired: true,
            tau_finalization: false,
            ..*view
        },
    );

    let mut seen = HashSet::new();
    let dots = dataset
        .generators()
        .iter()
        .filter(|g| seen.insert(g.name.as_str()))
        .filter_map(|g| {
            let survivor = current.get(&g.name).filter(|s| s.is_alive())?;
            Some(Dot {
                name: g.name.clone(),
                x: g.x,
                y: g.y,
                filtration: survivor.filtration,
                module: survivor.module,
                permanent: limit.is_alive(&g.name),
            })
        })
        .collect();

    let differentials = limit
        .fired()
        .iter()
        .filter(|d| both_alive(&current, &d.from, &d.to))
        .filter(|d| d.page >= view.page)
        .filter(|d| view.include_all_fired || d.page == view.page)
        .map(|d| line(d, view.category))
        .collect();

    let multiplications = dataset
        .multiplications()
        .iter()
        .filter(|m| both_alive(&current, &m.from, &m.to))
        .map(|m| Edge {
            from: m.from.clone(),
            to: m.to.clone(),
            internal: m.internal,
        })
        .collect();

    let tau_mults = match view.category {
        Category::Synthetic => dataset
            .tau_mults()
            .iter()
            .filter(|t| both_alive(&current, &t.from, &t.to))
            .map(|t| Edge {
                from: t.from.clone(),
                to: t.to.clone(),
                internal: false,
            })
            .collect(),
        _ => Vec::new(),
    };

    EhpView {
        view: *view,
        dots,
        differentials,
        multiplications,
        tau_mults,
    }
}

/// Permanent synthetic classes placed in the Adams chart at `(stem, filtration)`.
pub fn ass_view(dataset: &Dataset, truncation: Truncation) -> Vec<Generator> {
    let limit = project(
        dataset,
        &ViewParameters::limit(Category::Synthetic).with_truncation(truncation),
    );

    limit
        .alive()
        .filter_map(|(name, survivor)| {
            let g = dataset.find(name)?;
            let mut placed = g.placed_at(name, g.x, survivor.filtration);
            placed.torsion = survivor.module.to_raw();
            Some(placed)
        })
        .collect()
}

fn both_alive(state: &SurvivorState, from: &str, to: &str) -> bool {
    state.is_alive(from) && state.is_alive(to)
}

fn line(d: &Differential, category: Category) -> DiffLine {
    DiffLine {
        from: d.from.clone(),
        to: d.to.clone(),
        page: d.page,
        coeff: if category == Category::Synthetic {
            d.coeff
        } else {
            0
        },
        kind: d.kind,
        synthetic_only: d.synthetic_only,
    }
}
