//! JSON serde for the chart's dataset wire format.
//!
//! Differentials carry their page as `d`, synthetic-only differentials are
//! marked by the mere presence of a `synthetic` field, and induced names are
//! `[[sphere, label], ...]` arrays.

use serde::{Deserialize, Serialize};

use crate::dataset::Dataset;
use crate::differential::{Differential, DifferentialKind, Multiplication, TauMultiplication};
use crate::generator::Generator;

// --- Wire format types ---

#[derive(Serialize, Deserialize, Debug)]
pub struct WireDataset {
    pub generators: Vec<WireGenerator>,
    #[serde(default)]
    pub differentials: Vec<WireDifferential>,
    #[serde(default)]
    pub multiplications: Vec<Multiplication>,
    #[serde(default)]
    pub tau_mults: Vec<TauMultiplication>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct WireGenerator {
    pub name: String,
    pub x: i32,
    pub y: i32,
    pub adams_filtration: i32,
    /// Negative exponents in hand-edited data are read as dead.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub torsion: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alg_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hom_name: Option<String>,
    #[serde(default)]
    pub induced_name: Vec<(i32, String)>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub born: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dies: Option<i32>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct WireDifferential {
    pub from: String,
    pub to: String,
    #[serde(default)]
    pub coeff: i32,
    pub d: i32,
    #[serde(default)]
    pub kind: DifferentialKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub synthetic: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proof: Option<String>,
}

// --- Conversion: Wire → Domain ---

impl WireDataset {
    /// Convert to a [`Dataset`], sorting differentials into replay order.
    pub fn into_dataset(self) -> Dataset {
        let generators = self
            .generators
            .into_iter()
            .map(wire_generator_to_domain)
            .collect();
        let differentials = self
            .differentials
            .into_iter()
            .map(wire_differential_to_domain)
            .collect();
        Dataset::new(
            generators,
            differentials,
            self.multiplications,
            self.tau_mults,
        )
    }

    pub fn from_dataset(dataset: &Dataset) -> Self {
        WireDataset {
            generators: dataset
                .generators()
                .iter()
                .map(domain_generator_to_wire)
                .collect(),
            differentials: dataset
                .differentials()
                .iter()
                .map(domain_differential_to_wire)
                .collect(),
            multiplications: dataset.multiplications().to_vec(),
            tau_mults: dataset.tau_mults().to_vec(),
        }
    }
}

fn wire_generator_to_domain(wire: WireGenerator) -> Generator {
    Generator {
        name: wire.name,
        x: wire.x,
        y: wire.y,
        adams_filtration: wire.adams_filtration,
        torsion: wire.torsion.map(|t| t.max(0) as u32),
        alg_name: wire.alg_name,
        hom_name: wire.hom_name,
        induced_name: wire.induced_name,
        born: wire.born,
        dies: wire.dies,
    }
}

fn wire_differential_to_domain(wire: WireDifferential) -> Differential {
    Differential {
        from: wire.from,
        to: wire.to,
        coeff: wire.coeff.max(0),
        page: wire.d.max(1),
        kind: wire.kind,
        synthetic_only: wire.synthetic.is_some(),
        proof: wire.proof,
    }
}

fn domain_generator_to_wire(g: &Generator) -> WireGenerator {
    WireGenerator {
        name: g.name.clone(),
        x: g.x,
        y: g.y,
        adams_filtration: g.adams_filtration,
        torsion: g.torsion.map(|t| i32::try_from(t).unwrap_or(i32::MAX)),
        alg_name: g.alg_name.clone(),
        hom_name: g.hom_name.clone(),
        induced_name: g.induced_name.clone(),
        born: g.born,
        dies: g.dies,
    }
}

fn domain_differential_to_wire(d: &Differential) -> WireDifferential {
    WireDifferential {
        from: d.from.clone(),
        to: d.to.clone(),
        coeff: d.coeff,
        d: d.page,
        kind: d.kind,
        synthetic: d.synthetic_only.then_some(serde_json::Value::Bool(true)),
        proof: d.proof.clone(),
    }
}

/// Deserialize a JSON dataset.
pub fn import_json(json: &str) -> Result<Dataset, serde_json::Error> {
    let wire: WireDataset = serde_json::from_str(json)?;
    Ok(wire.into_dataset())
}

/// Serialize a dataset to pretty-printed JSON.
pub fn export_json(dataset: &Dataset) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&WireDataset::from_dataset(dataset))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module_state::ModuleState;

    const SAMPLE: &str = r#"{
        "generators": [
            {"name": "1[2]", "x": 1, "y": 2, "adams_filtration": 1, "induced_name": [[3, "h1"]]},
            {"name": "[1]", "x": 0, "y": 1, "adams_filtration": 3, "torsion": 2, "alg_name": "h0^2"},
            {"name": "dead[1]", "x": 4, "y": 1, "adams_filtration": 0, "torsion": 0}
        ],
        "differentials": [
            {"from": "1[2]", "to": "[1]", "coeff": 1, "d": 3, "proof": "Toda"},
            {"from": "1[2]", "to": "dead[1]", "coeff": 0, "d": 1, "synthetic": true},
            {"from": "1[2]", "to": "[1]", "coeff": 2, "d": 3, "kind": "Fake"}
        ],
        "multiplications": [{"from": "1[2]", "to": "[1]", "internal": true}],
        "tau_mults": [{"from": "[1]", "to": "1[2]"}]
    }"#;

    #[test]
    fn test_import_sample() {
        let data = import_json(SAMPLE).unwrap();
        assert_eq!(data.len(), 3);

        let g = data.find("1[2]").unwrap();
        assert_eq!(g.induced_name, vec![(3, "h1".to_string())]);
        assert_eq!(data.find("[1]").unwrap().raw_module(), ModuleState::Torsion(2));
        assert_eq!(data.find("dead[1]").unwrap().raw_module(), ModuleState::Dead);

        let pages: Vec<_> = data.differentials().iter().map(|d| (d.page, d.coeff)).collect();
        assert_eq!(pages, vec![(1, 0), (3, 2), (3, 1)]);
        assert!(data.differentials()[0].synthetic_only);
        assert_eq!(data.differentials()[1].kind, DifferentialKind::Fake);
        assert_eq!(data.differentials()[2].proof.as_deref(), Some("Toda"));

        assert!(data.multiplications()[0].internal);
        assert_eq!(data.tau_mults().len(), 1);
    }

    #[test]
    fn test_synthetic_marker_is_presence() {
        let json = r#"{"generators": [], "differentials": [
            {"from": "a", "to": "b", "coeff": 0, "d": 1, "synthetic": false}
        ]}"#;
        let data = import_json(json).unwrap();
        assert!(data.differentials()[0].synthetic_only);
        assert!(data.multiplications().is_empty());
    }

    #[test]
    fn test_negative_torsion_is_dead() {
        let json = r#"{"generators": [
            {"name": "a[1]", "x": 0, "y": 1, "adams_filtration": 0, "torsion": -1}
        ]}"#;
        let data = import_json(json).unwrap();
        assert_eq!(data.find("a[1]").unwrap().torsion, Some(0));
    }

    #[test]
    fn test_out_of_range_coefficient_and_page_are_clamped() {
        let json = r#"{"generators": [], "differentials": [
            {"from": "a", "to": "b", "coeff": -3, "d": 0},
            {"from": "c", "to": "d", "coeff": 2147483647, "d": -7}
        ]}"#;
        let data = import_json(json).unwrap();
        let clamped: Vec<_> = data.differentials().iter().map(|d| (d.coeff, d.page)).collect();
        assert_eq!(clamped, vec![(i32::MAX, 1), (0, 1)]);
    }

    #[test]
    fn test_export_shape() {
        let data = import_json(SAMPLE).unwrap();
        let json = export_json(&data).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        let diff = &value["differentials"][0];
        assert_eq!(diff["d"], 1);
        assert_eq!(diff["synthetic"], true);
        assert_eq!(diff["kind"], "Real");
        assert!(value["differentials"][2].get("synthetic").is_none());
        assert!(value["generators"][0].get("torsion").is_none());
        assert_eq!(value["generators"][0]["induced_name"][0][1], "h1");

        let again = import_json(&json).unwrap();
        assert_eq!(again.generators(), data.generators());
        assert_eq!(again.differentials(), data.differentials());
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        assert!(import_json("{").is_err());
        assert!(import_json(r#"{"differentials": []}"#).is_err());
    }
}
