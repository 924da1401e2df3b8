use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

/// Whether a differential comes from the data or was synthesized by inference.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum DifferentialKind {
    #[default]
    Real,
    Fake,
}

/// d_page(from) = τ^coeff · to
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Differential {
    pub from: String,
    pub to: String,
    pub coeff: i32,
    pub page: i32,
    #[serde(default)]
    pub kind: DifferentialKind,
    /// Only exists synthetically; never fires in the algebraic projection.
    #[serde(default)]
    pub synthetic_only: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proof: Option<String>,
}

impl Differential {
    pub fn new(from: impl Into<String>, to: impl Into<String>, coeff: i32, page: i32) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            coeff,
            page,
            kind: DifferentialKind::Real,
            synthetic_only: false,
            proof: None,
        }
    }

    pub fn fake(
        from: impl Into<String>,
        to: impl Into<String>,
        coeff: i32,
        page: i32,
        note: impl Into<String>,
    ) -> Self {
        Self {
            kind: DifferentialKind::Fake,
            proof: Some(note.into()),
            ..Self::new(from, to, coeff, page)
        }
    }

    pub fn synthetic(mut self) -> Self {
        self.synthetic_only = true;
        self
    }

    pub fn with_proof(mut self, proof: impl Into<String>) -> Self {
        self.proof = Some(proof.into());
        self
    }

    pub fn is_real(&self) -> bool {
        self.kind == DifferentialKind::Real
    }

    /// `"from->to"`, the key used for provenance lookups.
    pub fn key(&self) -> String {
        format!("{}->{}", self.from, self.to)
    }

    pub fn page_label(&self) -> String {
        format!("E{}", self.page)
    }

    pub fn coefficient_label(&self) -> String {
        if self.coeff == 0 {
            "1".to_string()
        } else {
            format!("τ^{}", self.coeff)
        }
    }

    /// Replay order: ascending page, higher coefficients first within a page.
    pub fn replay_order(a: &Self, b: &Self) -> Ordering {
        a.page.cmp(&b.page).then_with(|| b.coeff.cmp(&a.coeff))
    }
}

/// Product with a non-τ element, drawn between living classes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Multiplication {
    pub from: String,
    pub to: String,
    #[serde(default)]
    pub internal: bool,
}

impl Multiplication {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            internal: false,
        }
    }
}

/// τ·from = to, applied only when finalizing the limit page.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TauMultiplication {
    pub from: String,
    pub to: String,
}

impl TauMultiplication {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}
