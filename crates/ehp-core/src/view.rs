use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::constants::LIMIT_PAGE;
use crate::generator::Generator;

/// Which lossy reading of the registry a projection uses.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Torsion is tracked over F2[τ].
    #[default]
    Synthetic,
    /// Every class is free; only coefficient-free differentials fire.
    Algebraic,
    /// Only raw-free classes exist; every differential into a live class fires.
    Geometric,
}

impl Category {
    pub const ALL: [Category; 3] = [Self::Synthetic, Self::Algebraic, Self::Geometric];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Synthetic => "synthetic",
            Self::Algebraic => "algebraic",
            Self::Geometric => "geometric",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "synthetic" | "s" => Ok(Self::Synthetic),
            "algebraic" | "a" => Ok(Self::Algebraic),
            "geometric" | "classical" | "g" => Ok(Self::Geometric),
            other => Err(format!(
                "unknown category '{other}' (expected synthetic, algebraic or geometric)"
            )),
        }
    }
}

/// Window on the EHP row coordinate: `bottom <= y < top`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Truncation {
    pub top: Option<i32>,
    pub bottom: Option<i32>,
}

impl Truncation {
    pub fn new(top: Option<i32>, bottom: Option<i32>) -> Self {
        Self { top, bottom }
    }

    pub fn top(top: i32) -> Self {
        Self {
            top: Some(top),
            bottom: None,
        }
    }

    pub fn admits(&self, y: i32) -> bool {
        self.top.is_none_or(|top| y < top) && self.bottom.is_none_or(|bottom| y >= bottom)
    }
}

/// Everything a single projection depends on besides the dataset.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewParameters {
    pub category: Category,
    pub page: i32,
    pub truncation: Truncation,
    /// Report every fired differential up to `page`, not only those on it.
    pub include_all_fired: bool,
    /// Restrict seeding to stems within one of this value.
    pub stem_window: Option<i32>,
    /// Apply tau multiplications when projecting the synthetic limit page.
    pub tau_finalization: bool,
}

impl Default for ViewParameters {
    fn default() -> Self {
        Self {
            category: Category::Synthetic,
            page: 1,
            truncation: Truncation::default(),
            include_all_fired: true,
            stem_window: None,
            tau_finalization: false,
        }
    }
}

impl ViewParameters {
    pub fn new(category: Category, page: i32) -> Self {
        Self {
            category,
            page,
            ..Self::default()
        }
    }

    /// E∞ view of a category.
    pub fn limit(category: Category) -> Self {
        Self::new(category, LIMIT_PAGE)
    }

    pub fn with_truncation(mut self, truncation: Truncation) -> Self {
        self.truncation = truncation;
        self
    }

    pub fn with_stem_window(mut self, stem: i32) -> Self {
        self.stem_window = Some(stem);
        self
    }

    pub fn with_tau_finalization(mut self, apply: bool) -> Self {
        self.tau_finalization = apply;
        self
    }

    pub fn exact_page(mut self) -> Self {
        self.include_all_fired = false;
        self
    }

    pub fn at_page(mut self, page: i32) -> Self {
        self.page = page;
        self
    }

    pub fn is_limit_page(&self) -> bool {
        self.page >= LIMIT_PAGE
    }

    /// Whether `g` is seeded under this view's truncation and stem window.
    pub fn admits(&self, g: &Generator) -> bool {
        self.truncation.admits(g.y)
            && self
                .stem_window
                .is_none_or(|stem| stem - 1 <= g.x && g.x <= stem + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_parse() {
        assert_eq!("Synthetic".parse::<Category>(), Ok(Category::Synthetic));
        assert_eq!("classical".parse::<Category>(), Ok(Category::Geometric));
        assert!("nope".parse::<Category>().is_err());
        for c in Category::ALL {
            assert_eq!(c.as_str().parse::<Category>(), Ok(c));
        }
    }

    #[test]
    fn test_truncation_window() {
        let t = Truncation::new(Some(5), Some(2));
        assert!(!t.admits(1));
        assert!(t.admits(2));
        assert!(t.admits(4));
        assert!(!t.admits(5));
        assert!(Truncation::default().admits(-100));
    }

    #[test]
    fn test_stem_window() {
        let view = ViewParameters::new(Category::Synthetic, 2).with_stem_window(5);
        assert!(!view.admits(&Generator::new("a[1]", 3, 0, 0)));
        assert!(view.admits(&Generator::new("a[1]", 4, 0, 0)));
        assert!(view.admits(&Generator::new("a[1]", 6, 0, 0)));
        assert!(!view.admits(&Generator::new("a[1]", 7, 0, 0)));
    }

    #[test]
    fn test_limit_page() {
        assert!(ViewParameters::limit(Category::Algebraic).is_limit_page());
        assert!(ViewParameters::new(Category::Synthetic, 1001).is_limit_page());
        assert!(!ViewParameters::new(Category::Synthetic, 999).is_limit_page());
    }
}
