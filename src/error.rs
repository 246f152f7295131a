use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("record {index} is missing its `{field}` field")]
    MalformedRecord { index: usize, field: &'static str },

    #[error("cannot evaluate an empty set of predictions")]
    EmptyEvaluationSet,

    #[error("cannot train on an empty set of recipes")]
    EmptyTrainingSet,

    #[error("neighbor count must be at least 1, got {0}")]
    InvalidNeighborCount(usize),

    #[error("record {index} has no id to key its prediction by")]
    MissingRecordId { index: usize },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),
}
