//! Guessing a recipe's cuisine from its ingredients, either by the cuisines of the recipes
//! sharing the most ingredients with it or with Naive Bayes.

pub mod bayes;
pub mod error;
pub mod evaluate;
pub mod knn;
pub mod recipe;
pub mod tables;

pub use bayes::{NaiveBayesClassifier, Variant};
pub use error::{Error, Result};
pub use knn::NearestNeighbors;
pub use recipe::{Recipe, RecipeId, Record, UnlabelledRecipe};
