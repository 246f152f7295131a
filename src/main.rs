use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use cuisine_bayes::{
    evaluate,
    recipe::{self, DEFAULT_TEST_SIZE},
    NaiveBayesClassifier, NearestNeighbors, Recipe, RecipeId, Variant,
};
use log::info;
use std::{
    collections::{BTreeMap, BTreeSet},
    fs::File,
    path::{Path, PathBuf},
};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Classifier {
    /// Plurality vote of the recipes sharing the most ingredients.
    Knn,
    /// Naive Bayes on P(ingredient | cuisine).
    Likelihood,
    /// Naive Bayes on P(cuisine | ingredient).
    Inverse,
    /// Naive Bayes on P(cuisine | ingredient), ignoring unseen ingredients.
    Corrected,
}

impl Classifier {
    /// The Naive Bayes variant, `None` for nearest neighbors.
    fn variant(self) -> Option<Variant> {
        match self {
            Classifier::Knn => None,
            Classifier::Likelihood => Some(Variant::Likelihood),
            Classifier::Inverse => Some(Variant::InverseConditional),
            Classifier::Corrected => Some(Variant::CorrectedInverseConditional),
        }
    }
}

enum Model<'a> {
    Knn(NearestNeighbors<'a>, usize),
    Bayes(NaiveBayesClassifier, Variant),
}

impl<'a> Model<'a> {
    fn train(classifier: Classifier, train: &'a [Recipe], k: usize) -> Result<Self> {
        let model = match classifier.variant() {
            None => Model::Knn(
                NearestNeighbors::new(train).context("no recipes to train on")?,
                k,
            ),
            Some(variant) => Model::Bayes(
                NaiveBayesClassifier::new(train).context("no recipes to train on")?,
                variant,
            ),
        };
        Ok(model)
    }

    fn predict(&self, ingredients: &BTreeSet<String>) -> cuisine_bayes::Result<Option<String>> {
        Ok(match self {
            Model::Knn(knn, k) => Some(knn.predict(ingredients, *k)?.to_string()),
            Model::Bayes(bayes, variant) => {
                bayes.predict(ingredients, *variant).map(str::to_string)
            }
        })
    }

    /// `(predicted, actual)` cuisines for every test recipe.
    fn test(&self, test: &[Recipe]) -> Result<Vec<(Option<String>, String)>> {
        let results: Vec<(Option<String>, String)> = match self {
            Model::Knn(knn, k) => evaluate::test_nearest_neighbors(knn, test, *k)?
                .into_iter()
                .map(|(predicted, actual)| (Some(predicted), actual))
                .collect(),
            Model::Bayes(bayes, variant) => evaluate::test_naive_bayes(bayes, test, *variant),
        };
        Ok(results)
    }
}

/// Guesses the cuisine of held-out recipes and reports the accuracy.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Labelled recipes, as a JSON array or a CSV of `id,cuisine,ingredient,...` rows.
    #[arg(long)]
    train: PathBuf,
    /// Recipes to test on. Without it the last `test_size` training recipes are held out.
    #[arg(long)]
    test: Option<PathBuf>,
    #[arg(long, default_value_t = DEFAULT_TEST_SIZE)]
    test_size: usize,
    #[arg(long, value_enum, default_value_t = Classifier::Corrected)]
    classifier: Classifier,
    /// Neighbors to vote with for `knn`.
    #[arg(short, default_value_t = 6)]
    k: usize,
    /// Write `id,cuisine` predictions for the test recipes here.
    #[arg(long)]
    output: Option<PathBuf>,
    /// The `--test` recipes carry no cuisine: train on the whole `--train` corpus, write
    /// predictions to `--output` and skip the accuracy.
    #[arg(long, requires_all = ["test", "output"])]
    unlabelled: bool,
}

fn write(path: &Path, predictions: &BTreeMap<RecipeId, Option<String>>) -> Result<()> {
    let file =
        File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    evaluate::write_predictions(file, predictions)?;
    info!("wrote {} predictions to {}", predictions.len(), path.display());
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let args = Args::parse();

    let corpus = recipe::load(&args.train)
        .with_context(|| format!("failed to load recipes from {}", args.train.display()))?;

    if let (true, Some(test_path), Some(output)) = (args.unlabelled, &args.test, &args.output) {
        let test = recipe::load_unlabelled(test_path)
            .with_context(|| format!("failed to load recipes from {}", test_path.display()))?;
        info!(
            "training on {} recipes, predicting {}",
            corpus.len(),
            test.len()
        );

        let model = Model::train(args.classifier, &corpus, args.k)?;
        let predictions =
            evaluate::predict_batch(&test, |ingredients| model.predict(ingredients))?;
        write(output, &predictions)?;

        return Ok(());
    }

    let held_out;
    let (train, test) = match &args.test {
        Some(path) => {
            held_out = recipe::load(path)
                .with_context(|| format!("failed to load recipes from {}", path.display()))?;
            (corpus.as_slice(), held_out.as_slice())
        }
        None => recipe::split_last(&corpus, args.test_size),
    };
    info!(
        "training on {} recipes, testing on {}",
        train.len(),
        test.len()
    );

    let model = Model::train(args.classifier, train, args.k)?;
    let results = model.test(test)?;
    let accuracy = evaluate::accuracy(&results)?;
    info!("{:?} accuracy: {:.3}", args.classifier, accuracy);

    if let Some(output) = &args.output {
        let predictions =
            evaluate::key_by_id(test, results.into_iter().map(|(predicted, _)| predicted))?;
        write(output, &predictions)?;
    }

    println!("{}", accuracy);

    Ok(())
}
