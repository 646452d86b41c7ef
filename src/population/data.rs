//! Age buckets and age-keyed series
//!
//! Every quantity in the crate (population counts, proportions, death rates)
//! is stored keyed by its [`AgeBucket`] rather than by position, so series
//! loaded from different sources can only be combined once their bucket sets
//! have been checked to be identical.

use crate::error::{Result, StandardizationError};
use crate::standardize;
use serde::{Deserialize, Serialize};
use std::collections::{btree_map, BTreeMap};
use std::fmt;
use std::str::FromStr;

/// Lower bound of the open-ended top bucket in the reference layout (85+)
pub const REFERENCE_OPEN_AGE: u8 = 85;

/// Width of the reference buckets in years
pub const REFERENCE_BUCKET_WIDTH: u8 = 5;

/// An age interval, e.g. `0-4` or `85+`
///
/// Ordered by lower bound, so a sorted collection of non-overlapping buckets
/// reads youngest to oldest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct AgeBucket {
    lower: u8,
    /// Inclusive upper bound; `None` for an open-ended bucket
    upper: Option<u8>,
}

impl AgeBucket {
    /// Closed interval `lower..=upper`
    pub fn closed(lower: u8, upper: u8) -> Result<Self> {
        if upper < lower {
            return Err(StandardizationError::InvalidAgeBucket(format!("{}-{}", lower, upper)));
        }
        Ok(Self { lower, upper: Some(upper) })
    }

    /// Open interval `lower+`
    pub fn open(lower: u8) -> Self {
        Self { lower, upper: None }
    }

    pub fn lower(&self) -> u8 {
        self.lower
    }

    pub fn upper(&self) -> Option<u8> {
        self.upper
    }

    pub fn is_open(&self) -> bool {
        self.upper.is_none()
    }

    pub fn contains(&self, age: u8) -> bool {
        age >= self.lower && self.upper.map_or(true, |upper| age <= upper)
    }

    /// Five-year buckets from 0 up to an open bucket starting at `open_from`
    ///
    /// `open_from` is rounded down to a multiple of five.
    pub fn five_year_layout(open_from: u8) -> Vec<AgeBucket> {
        let open_from = open_from - open_from % REFERENCE_BUCKET_WIDTH;
        let mut buckets: Vec<AgeBucket> = (0..open_from)
            .step_by(REFERENCE_BUCKET_WIDTH as usize)
            .map(|lower| AgeBucket { lower, upper: Some(lower + REFERENCE_BUCKET_WIDTH - 1) })
            .collect();
        buckets.push(AgeBucket::open(open_from));
        buckets
    }

    /// The 18-bucket layout used by the WHO standard: 0-4, 5-9, ..., 80-84, 85+
    pub fn reference_layout() -> Vec<AgeBucket> {
        Self::five_year_layout(REFERENCE_OPEN_AGE)
    }
}

impl fmt::Display for AgeBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.upper {
            Some(upper) => write!(f, "{}-{}", self.lower, upper),
            None => write!(f, "{}+", self.lower),
        }
    }
}

impl FromStr for AgeBucket {
    type Err = StandardizationError;

    /// Accepts `0-4`, `0–4`, `5 - 9`, `85+`, `100+` and single ages such as `7`
    fn from_str(label: &str) -> Result<Self> {
        let invalid = || StandardizationError::InvalidAgeBucket(label.to_string());
        let normalized: String = label
            .trim()
            .chars()
            .map(|c| if c == '\u{2013}' || c == '\u{2014}' { '-' } else { c })
            .filter(|c| !c.is_whitespace())
            .collect();

        if normalized.is_empty() {
            return Err(invalid());
        }

        if let Some(lower) = normalized.strip_suffix('+') {
            let lower: u8 = lower.parse().map_err(|_| invalid())?;
            return Ok(AgeBucket::open(lower));
        }

        match normalized.split_once('-') {
            Some((lower, upper)) => {
                let lower: u8 = lower.parse().map_err(|_| invalid())?;
                let upper: u8 = upper.parse().map_err(|_| invalid())?;
                AgeBucket::closed(lower, upper).map_err(|_| invalid())
            }
            None => {
                let age: u8 = normalized.parse().map_err(|_| invalid())?;
                Ok(AgeBucket { lower: age, upper: Some(age) })
            }
        }
    }
}

impl From<AgeBucket> for String {
    fn from(bucket: AgeBucket) -> Self {
        bucket.to_string()
    }
}

impl TryFrom<String> for AgeBucket {
    type Error = StandardizationError;

    fn try_from(label: String) -> Result<Self> {
        label.parse()
    }
}

/// Values keyed by age bucket, iterated youngest to oldest
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgeSeries {
    values: BTreeMap<AgeBucket, f64>,
}

impl AgeSeries {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from `(bucket, value)` pairs; a repeated bucket is an error
    pub fn from_pairs<I>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (AgeBucket, f64)>,
    {
        let mut series = Self::new();
        for (bucket, value) in pairs {
            series.insert(bucket, value)?;
        }
        Ok(series)
    }

    /// Zip a bucket layout with positional values
    pub fn from_layout(buckets: &[AgeBucket], values: &[f64]) -> Result<Self> {
        if buckets.len() != values.len() {
            return Err(StandardizationError::LengthMismatch {
                rates: values.len(),
                weights: buckets.len(),
            });
        }
        Self::from_pairs(buckets.iter().copied().zip(values.iter().copied()))
    }

    /// Insert a value for a bucket not yet present
    pub fn insert(&mut self, bucket: AgeBucket, value: f64) -> Result<()> {
        match self.values.entry(bucket) {
            btree_map::Entry::Vacant(slot) => {
                slot.insert(value);
                Ok(())
            }
            btree_map::Entry::Occupied(_) => {
                Err(StandardizationError::InvalidAgeBucket(format!("duplicate bucket {}", bucket)))
            }
        }
    }

    pub fn get(&self, bucket: &AgeBucket) -> Option<f64> {
        self.values.get(bucket).copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn buckets(&self) -> impl Iterator<Item = &AgeBucket> + '_ {
        self.values.keys()
    }

    /// Values in bucket order
    pub fn to_vec(&self) -> Vec<f64> {
        self.values.values().copied().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&AgeBucket, &f64)> + '_ {
        self.values.iter()
    }

    pub fn total(&self) -> f64 {
        self.values.values().sum()
    }

    /// Fails with `BucketMismatch` unless both series cover exactly the same buckets
    ///
    /// `self` plays the role of the rates and `weights` the role of the weights
    /// in the error report.
    pub fn check_alignment(&self, weights: &AgeSeries) -> Result<()> {
        let missing_in_rates: Vec<String> = weights
            .values
            .keys()
            .filter(|bucket| !self.values.contains_key(bucket))
            .map(ToString::to_string)
            .collect();
        let missing_in_weights: Vec<String> = self
            .values
            .keys()
            .filter(|bucket| !weights.values.contains_key(bucket))
            .map(ToString::to_string)
            .collect();

        if missing_in_rates.is_empty() && missing_in_weights.is_empty() {
            Ok(())
        } else {
            Err(StandardizationError::BucketMismatch { missing_in_rates, missing_in_weights })
        }
    }

    /// Sum every bucket starting at or above `open_from` into one `open_from+` bucket
    ///
    /// A bucket that straddles `open_from` cannot be split and is rejected.
    pub fn fold_from(&self, open_from: u8) -> Result<AgeSeries> {
        let mut folded = AgeSeries::new();
        let mut tail = 0.0;
        let mut has_tail = false;

        for (bucket, value) in &self.values {
            if bucket.lower() >= open_from {
                tail += value;
                has_tail = true;
            } else if bucket.contains(open_from) {
                return Err(StandardizationError::InvalidAgeBucket(format!(
                    "{} straddles {}+",
                    bucket, open_from
                )));
            } else {
                folded.insert(*bucket, *value)?;
            }
        }

        if has_tail {
            folded.insert(AgeBucket::open(open_from), tail)?;
        }
        Ok(folded)
    }
}

impl FromIterator<(AgeBucket, f64)> for AgeSeries {
    /// Later values for a repeated bucket replace earlier ones
    fn from_iter<I: IntoIterator<Item = (AgeBucket, f64)>>(iter: I) -> Self {
        Self { values: iter.into_iter().collect() }
    }
}

/// Non-negative head counts per age bucket for one population and year
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PopulationDistribution {
    counts: AgeSeries,
}

impl PopulationDistribution {
    /// Wrap counts, rejecting negative or non-finite entries
    pub fn new(counts: AgeSeries) -> Result<Self> {
        for (index, (_, &value)) in counts.iter().enumerate() {
            if !value.is_finite() || value < 0.0 {
                return Err(StandardizationError::InvalidValue { index, value });
            }
        }
        Ok(Self { counts })
    }

    pub fn from_layout(buckets: &[AgeBucket], counts: &[f64]) -> Result<Self> {
        Self::new(AgeSeries::from_layout(buckets, counts)?)
    }

    pub fn counts(&self) -> &AgeSeries {
        &self.counts
    }

    pub fn total(&self) -> f64 {
        self.counts.total()
    }

    /// Fold the oldest buckets into a single open bucket (e.g. 85-89 ... 100+ into 85+)
    pub fn collapse_open_interval(&self, open_from: u8) -> Result<Self> {
        Ok(Self { counts: self.counts.fold_from(open_from)? })
    }

    /// Share of the population in each bucket
    pub fn proportions(&self) -> Result<PopulationProportions> {
        PopulationProportions::from_weights(&self.counts)
    }
}

/// Per-bucket shares in [0, 1] summing to one
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct PopulationProportions {
    shares: AgeSeries,
}

impl PopulationProportions {
    /// Normalize arbitrary non-negative weights (counts, percentages) to shares
    pub fn from_weights(weights: &AgeSeries) -> Result<Self> {
        let shares = standardize::normalize(&weights.to_vec())?;
        let buckets: Vec<AgeBucket> = weights.buckets().copied().collect();
        Ok(Self { shares: AgeSeries::from_layout(&buckets, &shares)? })
    }

    /// Wrap shares that are already known to be normalized
    pub(crate) fn from_normalized(shares: AgeSeries) -> Self {
        Self { shares }
    }

    pub fn as_series(&self) -> &AgeSeries {
        &self.shares
    }

    pub fn get(&self, bucket: &AgeBucket) -> Option<f64> {
        self.shares.get(bucket)
    }

    pub fn len(&self) -> usize {
        self.shares.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shares.is_empty()
    }
}
