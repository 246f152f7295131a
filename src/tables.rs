//! Frequency tables built from a training set.
//!
//! Every count is a count of recipes: an ingredient listed in a recipe counts once for that
//! recipe. Only observed keys are stored, so lookups of unseen keys go through the accessors
//! below, which make the default explicit.

use crate::error::{Error, Result};
use crate::recipe::Recipe;
use log::debug;
use std::collections::BTreeMap;

/// Empirical probability of each key, as the number of recipes the key was seen in divided by
/// the total number of recipes.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbabilityTable {
    counts: BTreeMap<String, usize>,
    total: usize,
}

/// `P(cuisine)`. Sums to 1 over a training set.
pub type CuisineProbabilityTable = ProbabilityTable;

/// `P(ingredient)`, the chance of a recipe containing the ingredient. Does not sum to 1.
pub type IngredientProbabilityTable = ProbabilityTable;

impl ProbabilityTable {
    fn from_counts(counts: BTreeMap<String, usize>, total: usize) -> Self {
        ProbabilityTable { counts, total }
    }

    fn ratio(&self, count: usize) -> f64 {
        count as f64 / self.total as f64
    }

    /// Probability of `key`, or `None` if it never occurred in training.
    pub fn get(&self, key: &str) -> Option<f64> {
        self.counts.get(key).map(|&count| self.ratio(count))
    }

    /// Like [`get`](Self::get), also handing back the table's own copy of the key.
    pub fn get_key_value(&self, key: &str) -> Option<(&str, f64)> {
        self.counts
            .get_key_value(key)
            .map(|(key, &count)| (key.as_str(), self.ratio(count)))
    }

    /// Probability of `key`, 0 if it never occurred in training.
    pub fn prob(&self, key: &str) -> f64 {
        self.get(key).unwrap_or(0.0)
    }

    /// Number of training recipes `key` was seen in.
    pub fn count(&self, key: &str) -> usize {
        self.counts.get(key).copied().unwrap_or(0)
    }

    /// Number of training recipes.
    pub fn total(&self) -> usize {
        self.total
    }

    pub fn contains(&self, key: &str) -> bool {
        self.counts.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.counts.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.counts
            .iter()
            .map(|(key, &count)| (key.as_str(), self.ratio(count)))
    }

    pub(crate) fn len(&self) -> usize {
        self.counts.len()
    }
}

/// A conditional distribution `P(inner | outer)` for every observed `(outer, inner)` pair.
/// Each row sums to 1.
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionalTable {
    counts: BTreeMap<String, BTreeMap<String, usize>>,
    rows: BTreeMap<String, BTreeMap<String, f64>>,
}

impl ConditionalTable {
    // Each row is normalized by its own total, which for `P(ingredient | cuisine)` is the
    // number of ingredient occurrences in that cuisine and for `P(cuisine | ingredient)` is the
    // number of recipes containing that ingredient.
    fn from_counts(counts: BTreeMap<String, BTreeMap<String, usize>>) -> Self {
        let rows = counts
            .iter()
            .map(|(outer, row)| {
                let total = row.values().sum::<usize>() as f64;
                let row = row
                    .iter()
                    .map(|(inner, &count)| (inner.clone(), count as f64 / total))
                    .collect();
                (outer.clone(), row)
            })
            .collect();
        ConditionalTable { counts, rows }
    }

    /// `P(inner | outer)`, 0 for any pair never observed together.
    pub fn get(&self, outer: &str, inner: &str) -> f64 {
        self.rows
            .get(outer)
            .and_then(|row| row.get(inner))
            .copied()
            .unwrap_or(0.0)
    }

    /// Number of training recipes in which `outer` and `inner` occurred together.
    pub fn count(&self, outer: &str, inner: &str) -> usize {
        self.counts
            .get(outer)
            .and_then(|row| row.get(inner))
            .copied()
            .unwrap_or(0)
    }

    pub fn row(&self, outer: &str) -> Option<&BTreeMap<String, f64>> {
        self.rows.get(outer)
    }

    pub fn rows(&self) -> impl Iterator<Item = (&str, &BTreeMap<String, f64>)> {
        self.rows.iter().map(|(outer, row)| (outer.as_str(), row))
    }
}

/// Every table the Naive Bayes variants need, built together from one training set.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbabilityTables {
    pub cuisine: CuisineProbabilityTable,
    pub ingredient: IngredientProbabilityTable,
    pub ingredient_given_cuisine: ConditionalTable,
    pub cuisine_given_ingredient: ConditionalTable,
}

impl ProbabilityTables {
    pub fn build(train: &[Recipe]) -> Result<Self> {
        if train.is_empty() {
            return Err(Error::EmptyTrainingSet);
        }

        let mut cuisine_counts: BTreeMap<String, usize> = BTreeMap::new();
        let mut ingredient_counts: BTreeMap<String, usize> = BTreeMap::new();
        let mut by_cuisine: BTreeMap<String, BTreeMap<String, usize>> = BTreeMap::new();
        let mut by_ingredient: BTreeMap<String, BTreeMap<String, usize>> = BTreeMap::new();

        for recipe in train {
            *cuisine_counts.entry(recipe.cuisine.clone()).or_default() += 1;

            let cuisine_row = by_cuisine.entry(recipe.cuisine.clone()).or_default();
            for ingredient in &recipe.ingredients {
                *ingredient_counts.entry(ingredient.clone()).or_default() += 1;
                *cuisine_row.entry(ingredient.clone()).or_default() += 1;
                *by_ingredient
                    .entry(ingredient.clone())
                    .or_default()
                    .entry(recipe.cuisine.clone())
                    .or_default() += 1;
            }
        }

        // A cuisine whose recipes have no ingredients has nothing to condition on.
        by_cuisine.retain(|_, row| !row.is_empty());

        let tables = ProbabilityTables {
            cuisine: ProbabilityTable::from_counts(cuisine_counts, train.len()),
            ingredient: ProbabilityTable::from_counts(ingredient_counts, train.len()),
            ingredient_given_cuisine: ConditionalTable::from_counts(by_cuisine),
            cuisine_given_ingredient: ConditionalTable::from_counts(by_ingredient),
        };
        debug!(
            "built tables for {} recipes: {} cuisines, {} ingredients",
            train.len(),
            tables.cuisine.len(),
            tables.ingredient.len()
        );

        Ok(tables)
    }

    /// `P(cuisine)`, 0 for a cuisine never seen in training.
    pub fn prior(&self, cuisine: &str) -> f64 {
        self.cuisine.prob(cuisine)
    }

    /// `P(ingredient)`, 0 for an ingredient never seen in training.
    pub fn marginal(&self, ingredient: &str) -> f64 {
        self.ingredient.prob(ingredient)
    }

    /// Every cuisine seen in training, in label order.
    pub fn cuisines(&self) -> impl Iterator<Item = &str> {
        self.cuisine.keys()
    }
}
