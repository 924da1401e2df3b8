//! Generator names encode a multiplicative decomposition and a bracketed index:
//!
//! ```text
//! name := multiplicands "[" index "]"
//! multiplicands := "" | token (" " token)*
//! ```
//!
//! `"5 3 3[4]"` has multiplicands `5 3 3` and index `4`. Moving the index to the
//! front of the multiplicands names the class one sphere up that this one
//! generates; the inverse move names the class that generates it.

use std::sync::LazyLock;

use regex::Regex;

use crate::generator::Generator;

static NAME_GRAMMAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?P<prefix>[^\[]*)\[(?P<index>[^\]\[]*)").unwrap());
static TRAILING_INDEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[(\d+)\]$").unwrap());

/// A name split along the grammar above.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ParsedName<'a> {
    pub prefix: &'a str,
    pub index: &'a str,
}

impl<'a> ParsedName<'a> {
    pub fn multiplicands(&self) -> impl Iterator<Item = &'a str> {
        self.prefix.split(' ').filter(|t| !t.is_empty())
    }
}

/// `None` when the name carries no bracket.
pub fn parse_name(name: &str) -> Option<ParsedName<'_>> {
    let caps = NAME_GRAMMAR.captures(name)?;
    Some(ParsedName {
        prefix: caps.name("prefix").map_or("", |m| m.as_str()),
        index: caps.name("index").map_or("", |m| m.as_str()),
    })
}

/// `"a b[12]" -> "12 a b"`, `"[15]" -> "15"`.
///
/// A name without a bracket comes back unchanged.
pub fn generating_name(name: &str) -> String {
    match parse_name(name) {
        Some(parsed) if parsed.prefix.is_empty() => parsed.index.to_string(),
        Some(parsed) => format!("{} {}", parsed.index, parsed.prefix),
        None => name.to_string(),
    }
}

/// Name of the class this one is generated by: `"12 a b[3]" -> "a b[12]"`.
pub fn generated_by_name(name: &str) -> String {
    let initial = name.split('[').next().unwrap_or("");
    let mut tokens = initial.split(' ');
    let first = tokens.next().unwrap_or("");
    let rest: Vec<&str> = tokens.collect();
    format!("{}[{first}]", rest.join(" "))
}

/// Sphere index in a trailing `[n]`, if the name ends with one.
pub fn parse_sphere(name: &str) -> Option<i32> {
    TRAILING_INDEX
        .captures(name)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Every other generator named `<generating_name(name)>[k]`, ordered by `k`.
///
/// Linear in the registry; called once per inspected class.
pub fn generates<'a>(generators: &'a [Generator], name: &str) -> Vec<&'a Generator> {
    let base = generating_name(name);
    let Ok(pattern) = Regex::new(&format!(r"^{}\[(\d+)\]$", regex::escape(&base))) else {
        return Vec::new();
    };

    let mut matches: Vec<(u64, &Generator)> = generators
        .iter()
        .filter(|g| g.name != name)
        .filter_map(|g| {
            let caps = pattern.captures(&g.name)?;
            let idx = caps[1].parse::<u64>().unwrap_or(u64::MAX);
            Some((idx, g))
        })
        .collect();

    matches.sort_by_key(|(idx, _)| *idx);
    matches.into_iter().map(|(_, g)| g).collect()
}
