//! Naive Bayes cuisine classifier.
//!
//! Every variant scores each candidate cuisine as a product of per-ingredient factors under
//! the assumption that ingredients are independent given the cuisine, then picks the highest
//! score. The products are taken directly rather than in log space, so a long ingredient list
//! can underflow to 0 and leave no winner.

use crate::error::Result;
use crate::recipe::Recipe;
use crate::tables::ProbabilityTables;
use log::{debug, trace};
use std::collections::BTreeSet;

/// How a cuisine's score is computed from the ingredients of a recipe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Variant {
    /// `P(cuisine) * Π P(ingredient | cuisine)`.
    Likelihood,
    /// `Π P(cuisine | ingredient) / P(cuisine)`. An ingredient never seen in training zeroes
    /// every cuisine's score.
    InverseConditional,
    /// `Π P(cuisine | ingredient) * P(ingredient) / P(cuisine)`, skipping ingredients never
    /// seen in training.
    CorrectedInverseConditional,
}

pub struct NaiveBayesClassifier {
    tables: ProbabilityTables,
}

impl NaiveBayesClassifier {
    pub fn new(train: &[Recipe]) -> Result<Self> {
        Ok(NaiveBayesClassifier {
            tables: ProbabilityTables::build(train)?,
        })
    }

    pub fn tables(&self) -> &ProbabilityTables {
        &self.tables
    }

    /// Score of `cuisine` for a recipe with the given ingredients, 0 for a cuisine never seen
    /// in training.
    pub fn score(&self, ingredients: &BTreeSet<String>, cuisine: &str, variant: Variant) -> f64 {
        match self.tables.cuisine.get(cuisine) {
            Some(prior) => self.score_with_prior(ingredients, cuisine, prior, variant),
            None => 0.0,
        }
    }

    fn score_with_prior(
        &self,
        ingredients: &BTreeSet<String>,
        cuisine: &str,
        prior: f64,
        variant: Variant,
    ) -> f64 {
        let tables = &self.tables;

        let mut product = match variant {
            Variant::Likelihood => prior,
            Variant::InverseConditional | Variant::CorrectedInverseConditional => 1.0,
        };

        for ingredient in ingredients {
            match variant {
                Variant::Likelihood => {
                    product *= tables.ingredient_given_cuisine.get(cuisine, ingredient);
                }
                Variant::InverseConditional => {
                    product *= tables.cuisine_given_ingredient.get(ingredient, cuisine);
                }
                // Unseen ingredients contribute a factor of 1.
                Variant::CorrectedInverseConditional => {
                    if tables.ingredient.contains(ingredient) {
                        product *= tables.marginal(ingredient);
                        product *= tables.cuisine_given_ingredient.get(ingredient, cuisine);
                    }
                }
            }
        }

        match variant {
            Variant::Likelihood => product,
            Variant::InverseConditional | Variant::CorrectedInverseConditional => product / prior,
        }
    }

    /// Predicts the cuisine out of every cuisine seen in training.
    ///
    /// Returns `None` when no cuisine scores above 0.
    pub fn predict(&self, ingredients: &BTreeSet<String>, variant: Variant) -> Option<&str> {
        self.best_of(self.tables.cuisine.iter(), ingredients, variant)
    }

    /// Predicts the cuisine out of `candidates` only, visited in the given order. Candidates
    /// never seen in training can't be scored and are skipped.
    pub fn predict_among<'c, I>(
        &self,
        ingredients: &BTreeSet<String>,
        variant: Variant,
        candidates: I,
    ) -> Option<&str>
    where
        I: IntoIterator<Item = &'c str>,
    {
        let known = candidates
            .into_iter()
            .filter_map(|candidate| match self.tables.cuisine.get_key_value(candidate) {
                Some(entry) => Some(entry),
                None => {
                    debug!("skipping candidate cuisine {} unseen in training", candidate);
                    None
                }
            });
        self.best_of(known, ingredients, variant)
    }

    // Only a strictly greater score replaces the current best, which starts at 0, so ties keep
    // the earlier cuisine and an all-zero outcome has no winner.
    fn best_of<'s, I>(
        &'s self,
        cuisines: I,
        ingredients: &BTreeSet<String>,
        variant: Variant,
    ) -> Option<&'s str>
    where
        I: IntoIterator<Item = (&'s str, f64)>,
    {
        let (best_cuisine, best_score) = cuisines.into_iter().fold(
            (None, 0.0),
            |(best_cuisine, best_score), (cuisine, prior)| {
                let score = self.score_with_prior(ingredients, cuisine, prior, variant);
                if score > best_score {
                    (Some(cuisine), score)
                } else {
                    (best_cuisine, best_score)
                }
            },
        );

        trace!("{:?} picked {:?} scoring {}", variant, best_cuisine, best_score);
        best_cuisine
    }
}
