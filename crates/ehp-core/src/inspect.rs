//! Per-class and per-differential summaries for info popups and `ehp inspect`.

use std::fmt;

use serde::Serialize;

use crate::dataset::Dataset;
use crate::differential::Differential;
use crate::generator::Generator;
use crate::naming::{generated_by_name, generates, generating_name, parse_sphere};

/// Sphere on which a class appears and the algebraic sphere on which it dies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct SphereLifecycle {
    pub born: Option<i32>,
    /// `None` when the class survives stably.
    pub dies: Option<i32>,
}

impl SphereLifecycle {
    pub fn of(g: &Generator) -> Self {
        let Some(dies) = g.dies else {
            return Self {
                born: g.born,
                dies: None,
            };
        };

        let born = g.born.or_else(|| {
            g.induced_name
                .iter()
                .map(|(sphere, _)| *sphere)
                .filter(|&sphere| sphere > 0)
                .min()
                .or_else(|| parse_sphere(&g.name))
        });

        Self {
            born,
            dies: Some(dies),
        }
    }

    pub fn survives_stably(&self) -> bool {
        self.dies.is_none()
    }
}

impl fmt::Display for SphereLifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.born {
            Some(born) => write!(f, "born on S^{born}")?,
            None => write!(f, "born on an unknown sphere")?,
        }
        match self.dies {
            Some(dies) => write!(f, ", dies on algebraic S^{dies}"),
            None => write!(f, ", survives stably"),
        }
    }
}

/// Everything known about one generator without projecting.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct GeneratorInfo {
    pub name: String,
    pub x: i32,
    pub y: i32,
    pub adams_filtration: i32,
    /// `F2[τ]` or `F2[τ]/τ^n`.
    pub module: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alg_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hom_name: Option<String>,
    pub induced_name: Vec<(i32, String)>,
    pub lifecycle: SphereLifecycle,
    pub generated_by: String,
    pub generating_name: String,
    pub generates: Vec<String>,
}

pub fn inspect_generator(dataset: &Dataset, name: &str) -> Option<GeneratorInfo> {
    let g = dataset.find(name)?;

    let module = match g.torsion {
        Some(n) => format!("F2[τ]/τ^{n}"),
        None => "F2[τ]".to_string(),
    };

    Some(GeneratorInfo {
        name: g.name.clone(),
        x: g.x,
        y: g.y,
        adams_filtration: g.adams_filtration,
        module,
        alg_name: g.alg_name.clone(),
        hom_name: g.hom_name.clone(),
        induced_name: g
            .induced_name
            .iter()
            .filter(|(sphere, _)| *sphere != 0)
            .cloned()
            .collect(),
        lifecycle: SphereLifecycle::of(g),
        generated_by: generated_by_name(&g.name),
        generating_name: generating_name(&g.name),
        generates: generates(dataset.generators(), &g.name)
            .into_iter()
            .map(|g| g.name.clone())
            .collect(),
    })
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DifferentialInfo {
    pub from: String,
    pub to: String,
    /// `E{d}`.
    pub page: String,
    /// `1` or `τ^c`.
    pub coefficient: String,
    pub synthetic_only: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proof: Option<String>,
}

impl From<&Differential> for DifferentialInfo {
    fn from(d: &Differential) -> Self {
        Self {
            from: d.from.clone(),
            to: d.to.clone(),
            page: d.page_label(),
            coefficient: d.coefficient_label(),
            synthetic_only: d.synthetic_only,
            proof: d.proof.clone(),
        }
    }
}

pub fn inspect_differential(dataset: &Dataset, from: &str, to: &str) -> Option<DifferentialInfo> {
    dataset.find_differential(from, to).map(DifferentialInfo::from)
}
