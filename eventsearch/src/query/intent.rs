//! Structured description of what a user is searching for

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::document::GeoPoint;
use crate::error::{Error, Result};

/// Whether keyword matching tolerates typos
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Fuzziness {
    Off,
    #[default]
    Auto,
}

impl FromStr for Fuzziness {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "off" | "none" => Ok(Self::Off),
            "auto" => Ok(Self::Auto),
            other => Err(Error::validation(format!("unknown fuzziness '{}'", other))),
        }
    }
}

/// Cost bounds: `min` inclusive, `max` exclusive. A missing bound is open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct CostRange {
    #[serde(default)]
    pub min: Option<i64>,
    #[serde(default)]
    pub max: Option<i64>,
}

impl CostRange {
    pub fn between(min: i64, max: i64) -> Self {
        Self {
            min: Some(min),
            max: Some(max),
        }
    }

    pub fn at_least(min: i64) -> Self {
        Self {
            min: Some(min),
            max: None,
        }
    }

    pub fn below(max: i64) -> Self {
        Self {
            min: None,
            max: Some(max),
        }
    }

    pub fn is_unbounded(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }

    pub fn validate(&self) -> Result<()> {
        if let (Some(min), Some(max)) = (self.min, self.max) {
            if min > max {
                return Err(Error::validation(format!(
                    "cost range min {} is greater than max {}",
                    min, max
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceUnit {
    Miles,
    Kilometers,
    Meters,
    Yards,
    Feet,
}

impl DistanceUnit {
    pub fn suffix(self) -> &'static str {
        match self {
            Self::Miles => "mi",
            Self::Kilometers => "km",
            Self::Meters => "m",
            Self::Yards => "yd",
            Self::Feet => "ft",
        }
    }

    fn from_suffix(s: &str) -> Option<Self> {
        match s {
            "mi" | "miles" => Some(Self::Miles),
            "km" | "kilometers" => Some(Self::Kilometers),
            "m" | "meters" => Some(Self::Meters),
            "yd" | "yards" => Some(Self::Yards),
            "ft" | "feet" => Some(Self::Feet),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct Distance {
    pub value: f64,
    pub unit: DistanceUnit,
}

impl Distance {
    pub fn new(value: f64, unit: DistanceUnit) -> Self {
        Self { value, unit }
    }

    pub fn miles(value: f64) -> Self {
        Self::new(value, DistanceUnit::Miles)
    }

    pub fn kilometers(value: f64) -> Self {
        Self::new(value, DistanceUnit::Kilometers)
    }
}

impl fmt::Display for Distance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.value, self.unit.suffix())
    }
}

impl FromStr for Distance {
    type Err = Error;

    /// Parses `6mi`, `2.5 km`, `500m`
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let split = s
            .find(|c: char| c.is_ascii_alphabetic())
            .ok_or_else(|| Error::validation(format!("distance '{}' has no unit", s)))?;
        let (number, unit) = s.split_at(split);
        let value: f64 = number
            .trim()
            .parse()
            .map_err(|_| Error::validation(format!("invalid distance value '{}'", number.trim())))?;
        let unit = DistanceUnit::from_suffix(&unit.trim().to_ascii_lowercase())
            .ok_or_else(|| Error::validation(format!("unknown distance unit '{}'", unit)))?;
        Ok(Self { value, unit })
    }
}

/// Circular geographic constraint
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct GeoFilter {
    pub center: GeoPoint,
    pub radius: Distance,
}

impl GeoFilter {
    pub fn new(lat: f64, lon: f64, radius: Distance) -> Self {
        Self {
            center: GeoPoint { lat, lon },
            radius,
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.center.validate()?;
        if !self.radius.value.is_finite() || self.radius.value <= 0.0 {
            return Err(Error::validation(format!(
                "geo radius must be positive, got {}",
                self.radius
            )));
        }
        Ok(())
    }
}

/// What the user wants: free text plus inclusion constraints.
///
/// An intent with every field empty means "everything".
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct SearchIntent {
    #[serde(default)]
    pub keywords: Option<String>,

    /// Any of these tags. Empty means no tag constraint.
    #[serde(default)]
    pub tags: BTreeSet<String>,

    #[serde(default)]
    pub cost: Option<CostRange>,

    #[serde(default)]
    pub geo: Option<GeoFilter>,

    #[serde(default)]
    pub fuzziness: Fuzziness,

    #[serde(default)]
    pub from: Option<usize>,

    #[serde(default)]
    pub size: Option<usize>,
}

impl SearchIntent {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_keywords(mut self, keywords: impl Into<String>) -> Self {
        self.keywords = Some(keywords.into());
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }

    pub fn with_cost(mut self, cost: CostRange) -> Self {
        self.cost = Some(cost);
        self
    }

    pub fn with_geo(mut self, geo: GeoFilter) -> Self {
        self.geo = Some(geo);
        self
    }

    pub fn with_fuzziness(mut self, fuzziness: Fuzziness) -> Self {
        self.fuzziness = fuzziness;
        self
    }

    pub fn with_page(mut self, from: usize, size: usize) -> Self {
        self.from = Some(from);
        self.size = Some(size);
        self
    }

    /// Keywords that will actually produce a relevance clause
    pub fn effective_keywords(&self) -> Option<&str> {
        self.keywords
            .as_deref()
            .filter(|k| !k.trim().is_empty())
    }
}
