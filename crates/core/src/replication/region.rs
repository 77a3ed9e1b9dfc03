use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::RegionError;

/// A well-formed region identifier such as `us-east-1`.
///
/// Comparison is byte-wise. Parsing only trims surrounding whitespace and
/// never rewrites case, so `US-EAST-1` is rejected instead of being folded
/// into `us-east-1`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Region(String);

impl Region {
    /// Parses and validates a region identifier.
    pub fn parse(value: &str) -> Result<Self, RegionError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(RegionError::Empty);
        }
        if !is_well_formed(trimmed) {
            return Err(RegionError::Malformed(trimmed.to_string()));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// `<area>-<segment>...-<number>`, lowercase letters in every segment but the last.
fn is_well_formed(value: &str) -> bool {
    let segments: Vec<&str> = value.split('-').collect();
    let Some((number, names)) = segments.split_last() else {
        return false;
    };

    names.len() >= 2
        && names
            .iter()
            .all(|s| !s.is_empty() && s.chars().all(|c| c.is_ascii_lowercase()))
        && !number.is_empty()
        && number.chars().all(|c| c.is_ascii_digit())
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Region {
    type Error = RegionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Region::parse(&value)
    }
}

impl From<Region> for String {
    fn from(region: Region) -> Self {
        region.0
    }
}

/// A deduplicated, deterministically ordered set of regions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionSet(BTreeSet<Region>);

impl RegionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a comma-separated list such as `"us-east-1, us-west-2"`.
    ///
    /// Blank items are ignored. Repeated regions collapse into one.
    pub fn parse_list(list: &str) -> Result<Self, RegionError> {
        list.split(',')
            .filter(|item| !item.trim().is_empty())
            .map(Region::parse)
            .collect()
    }

    /// Returns the set union of `self` and `other`.
    pub fn union(&self, other: &RegionSet) -> RegionSet {
        Self(self.0.union(&other.0).cloned().collect())
    }

    pub fn insert(&mut self, region: Region) -> bool {
        self.0.insert(region)
    }

    pub fn contains(&self, region: &Region) -> bool {
        self.0.contains(region)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Region> {
        self.0.iter()
    }
}

impl FromIterator<Region> for RegionSet {
    fn from_iter<I: IntoIterator<Item = Region>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a RegionSet {
    type Item = &'a Region;
    type IntoIter = std::collections::btree_set::Iter<'a, Region>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for RegionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.0.iter().map(Region::as_str).collect();
        write!(f, "{{{}}}", names.join(", "))
    }
}
