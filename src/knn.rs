use crate::error::{Error, Result};
use crate::recipe::Recipe;
use log::trace;
use std::collections::BTreeSet;

/// Classifies a recipe by the cuisines of the training recipes sharing the most ingredients
/// with it.
#[derive(Debug, Clone, Copy)]
pub struct NearestNeighbors<'a> {
    train: &'a [Recipe],
}

impl<'a> NearestNeighbors<'a> {
    pub fn new(train: &'a [Recipe]) -> Result<Self> {
        if train.is_empty() {
            return Err(Error::EmptyTrainingSet);
        }
        Ok(NearestNeighbors { train })
    }

    /// Number of query ingredients the recipe also contains.
    pub fn overlap(query: &BTreeSet<String>, recipe: &Recipe) -> usize {
        query
            .iter()
            .filter(|ingredient| recipe.ingredients.contains(*ingredient))
            .count()
    }

    /// Indices of the `k` highest scoring training recipes, lowest score first.
    ///
    /// Recipes are ordered by `(score, index)`, so among equal scores the later recipes are
    /// preferred. An empty query scores every recipe 0 and simply selects the last `k` recipes.
    /// A `k` larger than the training set selects every recipe.
    pub fn neighbors(&self, query: &BTreeSet<String>, k: usize) -> Result<Vec<usize>> {
        if k == 0 {
            return Err(Error::InvalidNeighborCount(k));
        }

        let mut scores: Vec<(usize, usize)> = self
            .train
            .iter()
            .enumerate()
            .map(|(index, recipe)| (Self::overlap(query, recipe), index))
            .collect();
        scores.sort_unstable();

        let start = scores.len().saturating_sub(k);
        Ok(scores[start..].iter().map(|&(_, index)| index).collect())
    }

    /// The most common cuisine among the `k` nearest recipes.
    pub fn predict(&self, query: &BTreeSet<String>, k: usize) -> Result<&'a str> {
        let neighbors = self.neighbors(query, k)?;
        let train = self.train;
        let labels = neighbors
            .iter()
            .map(|&index| train[index].cuisine.as_str());

        let cuisine = plurality(labels).ok_or(Error::EmptyTrainingSet)?;
        trace!("{} nearest neighbors voted for {}", neighbors.len(), cuisine);

        Ok(cuisine)
    }
}

/// The most frequent label. On a tie the label that was seen first wins.
fn plurality<'b, I>(labels: I) -> Option<&'b str>
where
    I: IntoIterator<Item = &'b str>,
{
    // Kept in first-seen order so the tie break doesn't depend on hashing.
    let mut counts: Vec<(&str, usize)> = Vec::new();
    for label in labels {
        match counts.iter_mut().find(|(seen, _)| *seen == label) {
            Some((_, count)) => *count += 1,
            None => counts.push((label, 1)),
        }
    }

    let mut best: Option<(&str, usize)> = None;
    for (label, count) in counts {
        if best.map_or(true, |(_, best_count)| count > best_count) {
            best = Some((label, count));
        }
    }
    best.map(|(label, _)| label)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(ingredients: &[&str]) -> BTreeSet<String> {
        ingredients.iter().map(|i| i.to_string()).collect()
    }

    #[test]
    fn tied_neighbors_prefer_the_later_recipe() {
        let train = vec![
            Recipe::new("greek", ["feta", "olive"]),
            Recipe::new("italian", ["basil", "olive"]),
        ];
        let knn = NearestNeighbors::new(&train).unwrap();

        assert_eq!(knn.neighbors(&query(&["olive"]), 1).unwrap(), vec![1]);
        assert_eq!(knn.predict(&query(&["olive"]), 1).unwrap(), "italian");
    }

    #[test]
    fn highest_overlap_wins() {
        let train = vec![
            Recipe::new("greek", ["feta", "olive", "oregano"]),
            Recipe::new("italian", ["basil", "olive"]),
            Recipe::new("mexican", ["lime", "cilantro"]),
        ];
        let knn = NearestNeighbors::new(&train).unwrap();

        assert_eq!(
            knn.predict(&query(&["feta", "oregano", "basil"]), 1).unwrap(),
            "greek"
        );
        assert_eq!(
            knn.neighbors(&query(&["feta", "oregano", "basil"]), 2).unwrap(),
            vec![1, 0]
        );
    }

    #[test]
    fn vote_ties_go_to_the_first_collected_label() {
        assert_eq!(plurality(["thai", "greek", "greek", "thai"]), Some("thai"));
        assert_eq!(plurality(["thai", "greek", "greek"]), Some("greek"));
        assert_eq!(plurality(Vec::<&str>::new()), None);
    }

    #[test]
    fn k_larger_than_training_set_uses_everything() {
        let train = vec![
            Recipe::new("greek", ["feta"]),
            Recipe::new("italian", ["basil"]),
            Recipe::new("italian", ["tomato"]),
        ];
        let knn = NearestNeighbors::new(&train).unwrap();

        assert_eq!(knn.neighbors(&query(&["feta"]), 10).unwrap().len(), 3);
        assert_eq!(knn.predict(&query(&["feta"]), 10).unwrap(), "italian");
    }

    #[test]
    fn empty_query_selects_the_last_recipes() {
        let train = vec![
            Recipe::new("greek", ["feta"]),
            Recipe::new("italian", ["basil"]),
            Recipe::new("mexican", ["lime"]),
        ];
        let knn = NearestNeighbors::new(&train).unwrap();

        assert_eq!(knn.neighbors(&BTreeSet::new(), 2).unwrap(), vec![1, 2]);
    }

    #[test]
    fn degenerate_inputs_are_rejected() {
        assert!(matches!(
            NearestNeighbors::new(&[]),
            Err(Error::EmptyTrainingSet)
        ));

        let train = vec![Recipe::new("greek", ["feta"])];
        let knn = NearestNeighbors::new(&train).unwrap();
        assert!(matches!(
            knn.predict(&query(&["feta"]), 0),
            Err(Error::InvalidNeighborCount(0))
        ));
    }
}
