//! Running classifiers over a held-out set and scoring the results.

use crate::bayes::{NaiveBayesClassifier, Variant};
use crate::error::{Error, Result};
use crate::knn::NearestNeighbors;
use crate::recipe::{Recipe, RecipeId, Record};
use log::debug;
use std::{
    collections::{BTreeMap, BTreeSet},
    io::Write,
};

/// A predicted label that can be checked against the true cuisine. A missing prediction never
/// matches.
pub trait Label {
    fn matches(&self, actual: &str) -> bool;
}

impl Label for str {
    fn matches(&self, actual: &str) -> bool {
        self == actual
    }
}

impl Label for String {
    fn matches(&self, actual: &str) -> bool {
        self == actual
    }
}

impl<L: Label + ?Sized> Label for &L {
    fn matches(&self, actual: &str) -> bool {
        (**self).matches(actual)
    }
}

impl<L: Label> Label for Option<L> {
    fn matches(&self, actual: &str) -> bool {
        self.as_ref().map_or(false, |label| label.matches(actual))
    }
}

/// Fraction of `(predicted, actual)` pairs that agree.
pub fn accuracy<P, T>(results: &[(P, T)]) -> Result<f64>
where
    P: Label,
    T: AsRef<str>,
{
    if results.is_empty() {
        return Err(Error::EmptyEvaluationSet);
    }

    let correct = results
        .iter()
        .filter(|(predicted, actual)| predicted.matches(actual.as_ref()))
        .count();

    Ok(correct as f64 / results.len() as f64)
}

/// `(predicted, actual)` cuisines for every test recipe.
pub fn test_nearest_neighbors(
    knn: &NearestNeighbors,
    test: &[Recipe],
    k: usize,
) -> Result<Vec<(String, String)>> {
    let mut results = Vec::with_capacity(test.len());
    for recipe in test {
        let cuisine = knn.predict(&recipe.ingredients, k)?;
        results.push((cuisine.to_string(), recipe.cuisine.clone()));
    }
    debug!("classified {} recipes with {} neighbors", results.len(), k);

    Ok(results)
}

/// `(predicted, actual)` cuisines for every test recipe, `None` where no cuisine scored above 0.
pub fn test_naive_bayes(
    bayes: &NaiveBayesClassifier,
    test: &[Recipe],
    variant: Variant,
) -> Vec<(Option<String>, String)> {
    let results: Vec<_> = test
        .iter()
        .map(|recipe| {
            let cuisine = bayes.predict(&recipe.ingredients, variant);
            (cuisine.map(str::to_string), recipe.cuisine.clone())
        })
        .collect();

    let unpredicted = results.iter().filter(|(cuisine, _)| cuisine.is_none()).count();
    debug!(
        "classified {} recipes with {:?}, {} without a prediction",
        results.len(),
        variant,
        unpredicted
    );

    results
}

/// Classifies every record and keys the predictions by record id. Every record must carry
/// an id.
pub fn predict_batch<R, F>(
    records: &[R],
    mut predict: F,
) -> Result<BTreeMap<RecipeId, Option<String>>>
where
    R: Record,
    F: FnMut(&BTreeSet<String>) -> Result<Option<String>>,
{
    let mut predictions = BTreeMap::new();
    for (index, record) in records.iter().enumerate() {
        let id = record.id().ok_or(Error::MissingRecordId { index })?;
        predictions.insert(id, predict(record.ingredients())?);
    }

    Ok(predictions)
}

/// Keys predictions already made for `records`, in the same order, by record id.
pub fn key_by_id<R, I>(
    records: &[R],
    predictions: I,
) -> Result<BTreeMap<RecipeId, Option<String>>>
where
    R: Record,
    I: IntoIterator<Item = Option<String>>,
{
    records
        .iter()
        .zip(predictions)
        .enumerate()
        .map(|(index, (record, cuisine))| -> Result<(RecipeId, Option<String>)> {
            let id = record.id().ok_or(Error::MissingRecordId { index })?;
            Ok((id, cuisine))
        })
        .collect()
}

/// Writes `id,cuisine` rows, leaving the cuisine empty where there was no prediction.
pub fn write_predictions<W: Write>(
    writer: W,
    predictions: &BTreeMap<RecipeId, Option<String>>,
) -> Result<()> {
    let mut writer = csv::Writer::from_writer(writer);

    writer.write_record(["id", "cuisine"])?;
    for (id, cuisine) in predictions {
        writer.write_record([id.to_string().as_str(), cuisine.as_deref().unwrap_or("")])?;
    }
    writer.flush()?;

    Ok(())
}
