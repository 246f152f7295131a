use crate::error::{Error, Result};
use log::debug;
use serde::Deserialize;
use std::{
    collections::BTreeSet,
    fs::File,
    io::{BufReader, Read},
    path::Path,
};

pub type RecipeId = u64;

/// Number of trailing records held out for testing when no explicit test set is given.
pub const DEFAULT_TEST_SIZE: usize = 1000;

/// Anything that can be classified: an optional id and a set of ingredients.
pub trait Record {
    fn id(&self) -> Option<RecipeId>;
    fn ingredients(&self) -> &BTreeSet<String>;
}

/// A labelled recipe. Ingredients are kept as an ordered set so membership tests are cheap
/// and iterating them always visits the same ingredients in the same order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipe {
    pub id: Option<RecipeId>,
    pub cuisine: String,
    pub ingredients: BTreeSet<String>,
}

impl Recipe {
    pub fn new<C, I, S>(cuisine: C, ingredients: I) -> Self
    where
        C: Into<String>,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Recipe {
            id: None,
            cuisine: cuisine.into(),
            ingredients: ingredients.into_iter().map(Into::into).collect(),
        }
    }

    pub fn with_id(mut self, id: RecipeId) -> Self {
        self.id = Some(id);
        self
    }
}

impl Record for Recipe {
    fn id(&self) -> Option<RecipeId> {
        self.id
    }

    fn ingredients(&self) -> &BTreeSet<String> {
        &self.ingredients
    }
}

/// A recipe whose cuisine is unknown, as found in a file of recipes to classify.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnlabelledRecipe {
    pub id: Option<RecipeId>,
    pub ingredients: BTreeSet<String>,
}

impl Record for UnlabelledRecipe {
    fn id(&self) -> Option<RecipeId> {
        self.id
    }

    fn ingredients(&self) -> &BTreeSet<String> {
        &self.ingredients
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// An array of `{"id": .., "cuisine": .., "ingredients": [..]}` objects.
    Json,
    /// `id,cuisine,ingredient,...` rows after a header row, with any number of ingredient
    /// columns.
    Csv,
}

impl Format {
    /// `.csv` files are CSV, anything else is JSON.
    pub fn from_path(path: &Path) -> Self {
        let is_csv = path
            .extension()
            .map_or(false, |ext| ext.eq_ignore_ascii_case("csv"));
        if is_csv {
            Format::Csv
        } else {
            Format::Json
        }
    }
}

// Every field is optional here so a missing one is reported as a malformed record rather
// than a generic deserialization failure.
#[derive(Deserialize)]
struct RawRecipe {
    id: Option<RecipeId>,
    cuisine: Option<String>,
    ingredients: Option<BTreeSet<String>>,
}

impl RawRecipe {
    fn into_unlabelled(self, index: usize) -> Result<(Option<String>, UnlabelledRecipe)> {
        let ingredients = self.ingredients.ok_or(Error::MalformedRecord {
            index,
            field: "ingredients",
        })?;
        Ok((
            self.cuisine,
            UnlabelledRecipe {
                id: self.id,
                ingredients,
            },
        ))
    }

    fn into_recipe(self, index: usize) -> Result<Recipe> {
        let (cuisine, recipe) = self.into_unlabelled(index)?;
        let cuisine = cuisine.ok_or(Error::MalformedRecord {
            index,
            field: "cuisine",
        })?;

        Ok(Recipe {
            id: recipe.id,
            cuisine,
            ingredients: recipe.ingredients,
        })
    }
}

fn read_raw<R: Read>(reader: R, format: Format) -> Result<Vec<RawRecipe>> {
    match format {
        Format::Json => Ok(serde_json::from_reader(reader)?),
        Format::Csv => read_csv_rows(reader),
    }
}

fn read_csv_rows<R: Read>(reader: R) -> Result<Vec<RawRecipe>> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);

    let mut recipes = Vec::new();
    for (index, record) in reader.records().enumerate() {
        let record = record?;

        let id = match record.get(0).map(str::trim) {
            None | Some("") => None,
            Some(id) => Some(id.parse().map_err(|_| Error::MalformedRecord {
                index,
                field: "id",
            })?),
        };

        let cuisine = match record.get(1).map(str::trim) {
            None | Some("") => None,
            Some(cuisine) => Some(cuisine.to_string()),
        };

        let mut ingredients = BTreeSet::new();
        for ingredient in record.iter().skip(2) {
            let ingredient = ingredient.trim();
            if ingredient.is_empty() {
                continue;
            }
            ingredients.insert(ingredient.to_string());
        }

        recipes.push(RawRecipe {
            id,
            cuisine,
            ingredients: Some(ingredients),
        });
    }

    Ok(recipes)
}

/// Reads labelled recipes. A record without a cuisine or without ingredients is malformed.
pub fn read<R: Read>(reader: R, format: Format) -> Result<Vec<Recipe>> {
    read_raw(reader, format)?
        .into_iter()
        .enumerate()
        .map(|(index, recipe)| recipe.into_recipe(index))
        .collect()
}

/// Reads recipes to classify. Any cuisine present is ignored.
pub fn read_unlabelled<R: Read>(reader: R, format: Format) -> Result<Vec<UnlabelledRecipe>> {
    read_raw(reader, format)?
        .into_iter()
        .enumerate()
        .map(|(index, recipe)| Ok(recipe.into_unlabelled(index)?.1))
        .collect()
}

/// Loads labelled recipes, picking the format from the file extension.
pub fn load<P: AsRef<Path>>(path: P) -> Result<Vec<Recipe>> {
    let path = path.as_ref();
    let recipes = read(BufReader::new(File::open(path)?), Format::from_path(path))?;
    debug!("loaded {} recipes from {}", recipes.len(), path.display());
    Ok(recipes)
}

/// Loads recipes to classify, picking the format from the file extension.
pub fn load_unlabelled<P: AsRef<Path>>(path: P) -> Result<Vec<UnlabelledRecipe>> {
    let path = path.as_ref();
    let recipes = read_unlabelled(BufReader::new(File::open(path)?), Format::from_path(path))?;
    debug!("loaded {} unlabelled recipes from {}", recipes.len(), path.display());
    Ok(recipes)
}

/// Splits off the final `test_size` recipes as the test set. A corpus shorter than
/// `test_size` leaves nothing to train on.
pub fn split_last(corpus: &[Recipe], test_size: usize) -> (&[Recipe], &[Recipe]) {
    corpus.split_at(corpus.len().saturating_sub(test_size))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_records_become_ingredient_sets() {
        let json = r#"[
            {"id": 10259, "cuisine": "greek", "ingredients": ["feta", "olive", "feta"]},
            {"cuisine": "italian", "ingredients": ["basil"]}
        ]"#;
        let recipes = read(json.as_bytes(), Format::Json).unwrap();

        assert_eq!(recipes.len(), 2);
        assert_eq!(recipes[0].id, Some(10259));
        assert_eq!(recipes[0].ingredients.len(), 2);
        assert_eq!(recipes[1].id, None);
        assert_eq!(recipes[1].cuisine, "italian");
    }

    #[test]
    fn json_record_without_ingredients_is_malformed() {
        let json = r#"[{"cuisine": "greek", "ingredients": []}, {"cuisine": "greek"}]"#;
        match read(json.as_bytes(), Format::Json) {
            Err(Error::MalformedRecord { index, field }) => {
                assert_eq!(index, 1);
                assert_eq!(field, "ingredients");
            }
            other => panic!("expected a malformed record, got {:?}", other),
        }
    }

    #[test]
    fn json_record_without_cuisine_is_malformed() {
        let json = r#"[{"id": 1, "ingredients": ["salt"]}]"#;
        assert!(matches!(
            read(json.as_bytes(), Format::Json),
            Err(Error::MalformedRecord {
                index: 0,
                field: "cuisine"
            })
        ));
    }

    #[test]
    fn unlabelled_json_records_need_no_cuisine() {
        let json = r#"[
            {"id": 7, "ingredients": ["feta", "olive"]},
            {"id": 8, "cuisine": "italian", "ingredients": ["basil"]}
        ]"#;
        let recipes = read_unlabelled(json.as_bytes(), Format::Json).unwrap();

        assert_eq!(recipes.len(), 2);
        assert_eq!(recipes[0].id, Some(7));
        assert_eq!(
            recipes[0].ingredients,
            ["feta", "olive"]
                .iter()
                .map(|i| i.to_string())
                .collect::<BTreeSet<_>>()
        );
        assert_eq!(recipes[1].id(), Some(8));
    }

    #[test]
    fn unlabelled_records_still_need_ingredients() {
        let json = r#"[{"id": 7}]"#;
        assert!(matches!(
            read_unlabelled(json.as_bytes(), Format::Json),
            Err(Error::MalformedRecord {
                index: 0,
                field: "ingredients"
            })
        ));
    }

    #[test]
    fn csv_rows_skip_empty_cells() {
        let csv = "id,cuisine,ingredients\n\
                   1,greek, feta ,olive,,\n\
                   ,italian,basil\n";
        let recipes = read(csv.as_bytes(), Format::Csv).unwrap();

        assert_eq!(recipes[0], Recipe::new("greek", ["feta", "olive"]).with_id(1));
        assert_eq!(recipes[1], Recipe::new("italian", ["basil"]));
    }

    #[test]
    fn csv_row_without_cuisine_is_malformed_unless_unlabelled() {
        let csv = "id,cuisine,ingredients\n1,,salt\n";
        assert!(matches!(
            read(csv.as_bytes(), Format::Csv),
            Err(Error::MalformedRecord {
                index: 0,
                field: "cuisine"
            })
        ));

        let recipes = read_unlabelled(csv.as_bytes(), Format::Csv).unwrap();
        assert_eq!(recipes[0].id, Some(1));
        assert!(recipes[0].ingredients.contains("salt"));
    }

    #[test]
    fn csv_id_must_be_a_number() {
        let csv = "id,cuisine,ingredients\nabc,greek,feta\n";
        assert!(matches!(
            read(csv.as_bytes(), Format::Csv),
            Err(Error::MalformedRecord {
                index: 0,
                field: "id"
            })
        ));
    }

    #[test]
    fn format_follows_the_extension() {
        assert_eq!(Format::from_path(Path::new("train.CSV")), Format::Csv);
        assert_eq!(Format::from_path(Path::new("train.json")), Format::Json);
        assert_eq!(Format::from_path(Path::new("train")), Format::Json);
    }

    #[test]
    fn split_holds_out_the_tail() {
        let corpus: Vec<Recipe> = (0..5)
            .map(|i| Recipe::new("greek", ["feta"]).with_id(i))
            .collect();

        let (train, test) = split_last(&corpus, 2);
        assert_eq!(train.len(), 3);
        assert_eq!(test[0].id, Some(3));
        assert_eq!(test[1].id, Some(4));

        let (train, test) = split_last(&corpus, 10);
        assert!(train.is_empty());
        assert_eq!(test.len(), 5);
    }
}
