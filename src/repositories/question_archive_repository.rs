use async_trait::async_trait;
use futures::TryStreamExt;
use chrono::{TimeZone, Utc};
use mongodb::{
    bson::{self, doc},
    options::{FindOptions, IndexOptions},
    Collection, IndexModel,
};
use serde::{Deserialize, Serialize};

use crate::{
    db::Database,
    errors::{AppError, AppResult},
    models::domain::{ArchivedQuestionSet, Question},
};

/// Durable record of every question set the model produced.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QuestionArchive: Send + Sync {
    async fn save(&self, set: ArchivedQuestionSet) -> AppResult<ArchivedQuestionSet>;
    async fn find_by_problem(&self, problem_id: &str) -> AppResult<Vec<ArchivedQuestionSet>>;
    async fn health_check(&self) -> AppResult<()>;
}

/// Stored shape of an [`ArchivedQuestionSet`]. `createdAt` is a native BSON
/// date so the newest-first sort orders by instant, not by string.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
struct ArchivedQuestionDocument {
    id: String,
    problem_id: String,
    stage: String,
    questions: Vec<Question>,
    created_at: bson::DateTime,
}

impl From<&ArchivedQuestionSet> for ArchivedQuestionDocument {
    fn from(set: &ArchivedQuestionSet) -> Self {
        Self {
            id: set.id.clone(),
            problem_id: set.problem_id.clone(),
            stage: set.stage.clone(),
            questions: set.questions.clone(),
            created_at: bson::DateTime::from_millis(set.created_at.timestamp_millis()),
        }
    }
}

impl ArchivedQuestionDocument {
    fn into_set(self) -> AppResult<ArchivedQuestionSet> {
        let millis = self.created_at.timestamp_millis();
        let created_at = Utc.timestamp_millis_opt(millis).single().ok_or_else(|| {
            AppError::DatabaseError(format!(
                "Archived question set {} has an invalid createdAt ({})",
                self.id, millis
            ))
        })?;

        Ok(ArchivedQuestionSet {
            id: self.id,
            problem_id: self.problem_id,
            stage: self.stage,
            questions: self.questions,
            created_at,
        })
    }
}

pub struct MongoQuestionArchive {
    db: Database,
    collection: Collection<ArchivedQuestionDocument>,
}

impl MongoQuestionArchive {
    pub fn new(db: &Database, collection_name: &str) -> Self {
        let collection = db.get_collection(collection_name);
        Self {
            db: db.clone(),
            collection,
        }
    }

    pub async fn ensure_indexes(&self) -> AppResult<()> {
        log::info!("Creating indexes for generated question collection");

        let id_index = IndexModel::builder()
            .keys(doc! { "id": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("id_unique".to_string())
                    .build(),
            )
            .build();
        let problem_index = IndexModel::builder()
            .keys(doc! { "problemId": 1, "createdAt": -1 })
            .options(
                IndexOptions::builder()
                    .name("problem_created".to_string())
                    .build(),
            )
            .build();

        self.collection.create_index(id_index).await?;
        self.collection.create_index(problem_index).await?;

        log::info!("Successfully created indexes for generated question collection");
        Ok(())
    }
}

#[async_trait]
impl QuestionArchive for MongoQuestionArchive {
    async fn save(&self, set: ArchivedQuestionSet) -> AppResult<ArchivedQuestionSet> {
        self.collection
            .insert_one(ArchivedQuestionDocument::from(&set))
            .await?;
        Ok(set)
    }

    async fn find_by_problem(&self, problem_id: &str) -> AppResult<Vec<ArchivedQuestionSet>> {
        let options = FindOptions::builder()
            .sort(doc! { "createdAt": -1 })
            .build();

        let cursor = self
            .collection
            .find(doc! { "problemId": problem_id })
            .with_options(options)
            .await?;
        let documents: Vec<ArchivedQuestionDocument> = cursor.try_collect().await?;
        documents
            .into_iter()
            .map(ArchivedQuestionDocument::into_set)
            .collect()
    }

    async fn health_check(&self) -> AppResult<()> {
        self.db.health_check().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::test_utils::fixtures::questions_for;

    #[test]
    fn test_created_at_is_stored_as_bson_date() {
        let set = ArchivedQuestionSet::new("two-sum", "Review", questions_for(2, 0));
        let document = bson::to_document(&ArchivedQuestionDocument::from(&set)).unwrap();

        assert!(matches!(document.get("createdAt"), Some(bson::Bson::DateTime(_))));
        assert_eq!(document.get_str("problemId").unwrap(), "two-sum");
    }

    #[test]
    fn test_dates_order_by_instant_within_a_second() {
        let whole = Utc.timestamp_millis_opt(1_700_000_000_000).unwrap();
        let later = Utc.timestamp_millis_opt(1_700_000_000_120).unwrap();

        let mut first = ArchivedQuestionSet::new("two-sum", "Review", vec![]);
        first.created_at = whole;
        let mut second = ArchivedQuestionSet::new("two-sum", "Review", vec![]);
        second.created_at = later;

        // RFC3339 strings for these sort the wrong way round: "...:20Z" > "...:20.120Z".
        assert!(whole.to_rfc3339_opts(chrono::SecondsFormat::AutoSi, true)
            > later.to_rfc3339_opts(chrono::SecondsFormat::AutoSi, true));
        assert!(
            ArchivedQuestionDocument::from(&first).created_at
                < ArchivedQuestionDocument::from(&second).created_at
        );
    }

    #[test]
    fn test_document_converts_back_to_set() {
        let set = ArchivedQuestionSet::new("two-sum", "Evaluate", questions_for(1, 3));
        let restored = ArchivedQuestionDocument::from(&set).into_set().unwrap();

        assert_eq!(restored.id, set.id);
        assert_eq!(restored.questions, set.questions);
        assert_eq!(
            restored.created_at.timestamp_millis(),
            set.created_at.timestamp_millis()
        );
    }

    #[test]
    fn test_archive_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<MongoQuestionArchive>();
    }
}
