use serde::{Deserialize, Serialize};

use crate::module_state::ModuleState;

/// A named class of the E1 page.
///
/// `x` is the stem and `y` the EHP row used by truncation. The engine replays
/// `adams_filtration`; `y` only decides whether a class is in view.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Generator {
    pub name: String,
    pub x: i32,
    pub y: i32,
    pub adams_filtration: i32,
    /// `None` is free, `Some(0)` dead, `Some(n)` F2[τ]/τ^n.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub torsion: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alg_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hom_name: Option<String>,
    /// (sphere, label) pairs naming this class on other spheres.
    #[serde(default)]
    pub induced_name: Vec<(i32, String)>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub born: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dies: Option<i32>,
}

impl Generator {
    pub fn new(name: impl Into<String>, x: i32, y: i32, adams_filtration: i32) -> Self {
        Self {
            name: name.into(),
            x,
            y,
            adams_filtration,
            torsion: None,
            alg_name: None,
            hom_name: None,
            induced_name: Vec::new(),
            born: None,
            dies: None,
        }
    }

    pub fn with_torsion(mut self, torsion: u32) -> Self {
        self.torsion = Some(torsion);
        self
    }

    pub fn stem(&self) -> i32 {
        self.x
    }

    /// Module type as recorded on the E1 page.
    pub fn raw_module(&self) -> ModuleState {
        ModuleState::from_raw(self.torsion)
    }

    /// Copy of this class placed at `(x, filtration)` for the Adams chart.
    pub fn placed_at(&self, name: impl Into<String>, x: i32, filtration: i32) -> Self {
        Self {
            name: name.into(),
            x,
            y: filtration,
            adams_filtration: filtration,
            torsion: None,
            alg_name: self.alg_name.clone(),
            hom_name: self.hom_name.clone(),
            induced_name: Vec::new(),
            born: None,
            dies: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_is_free() {
        let g = Generator::new("1 2[3]", 4, 3, 2);
        assert_eq!(g.raw_module(), ModuleState::Free);
        assert_eq!(g.stem(), 4);
        assert!(g.induced_name.is_empty());
    }

    #[test]
    fn test_with_torsion() {
        let g = Generator::new("a[1]", 1, 1, 1).with_torsion(2);
        assert_eq!(g.raw_module(), ModuleState::Torsion(2));
    }

    #[test]
    fn test_placed_at_keeps_names() {
        let mut g = Generator::new("a[1]", 1, 5, 3).with_torsion(1);
        g.hom_name = Some("eta".to_string());
        let placed = g.placed_at("a[1]_src", 1, 2);
        assert_eq!(placed.y, 2);
        assert_eq!(placed.adams_filtration, 2);
        assert_eq!(placed.torsion, None);
        assert_eq!(placed.hom_name.as_deref(), Some("eta"));
    }

    #[test]
    fn test_serde_defaults() {
        let g: Generator =
            serde_json::from_str(r#"{"name":"[3]","x":3,"y":1,"adams_filtration":1}"#).unwrap();
        assert_eq!(g.torsion, None);
        assert!(g.induced_name.is_empty());
        assert_eq!(g.dies, None);
    }
}
