use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{bson::doc, options::IndexOptions, Client, Collection, IndexModel};

use crate::{db::Database, errors::AppResult, models::domain::AssessmentQuestionRecord};

#[async_trait]
pub trait AssessmentRepository: Send + Sync {
    /// Deletes every stored question for `course_id`, then inserts `records`.
    async fn replace_for_course(
        &self,
        course_id: &str,
        records: Vec<AssessmentQuestionRecord>,
    ) -> AppResult<()>;
    /// Stored questions for a course, ordered by position.
    async fn find_by_course(&self, course_id: &str) -> AppResult<Vec<AssessmentQuestionRecord>>;
    async fn delete_by_course(&self, course_id: &str) -> AppResult<u64>;
}

pub struct MongoAssessmentRepository {
    client: Client,
    collection: Collection<AssessmentQuestionRecord>,
    use_transactions: bool,
}

impl MongoAssessmentRepository {
    pub fn new(db: &Database, collection_name: &str, use_transactions: bool) -> Self {
        let collection = db.get_collection(collection_name);
        Self {
            client: db.client().clone(),
            collection,
            use_transactions,
        }
    }

    pub async fn ensure_indexes(&self) -> AppResult<()> {
        log::info!("Creating indexes for assessment questions collection");

        let id_index = IndexModel::builder()
            .keys(doc! { "id": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("id_unique".to_string())
                    .build(),
            )
            .build();

        let course_position_index = IndexModel::builder()
            .keys(doc! { "course_id": 1, "position": 1 })
            .options(
                IndexOptions::builder()
                    .name("course_position".to_string())
                    .build(),
            )
            .build();

        self.collection.create_index(id_index).await?;
        self.collection.create_index(course_position_index).await?;

        log::info!("Successfully created indexes for assessment questions collection");
        Ok(())
    }

    async fn replace_in_transaction(
        &self,
        course_id: &str,
        records: &[AssessmentQuestionRecord],
    ) -> AppResult<()> {
        let mut session = self.client.start_session().await?;
        session.start_transaction().await?;

        let outcome: AppResult<()> = async {
            self.collection
                .delete_many(doc! { "course_id": course_id })
                .session(&mut session)
                .await?;
            for record in records {
                self.collection
                    .insert_one(record)
                    .session(&mut session)
                    .await?;
            }
            Ok(())
        }
        .await;

        match outcome {
            Ok(()) => {
                session.commit_transaction().await?;
                Ok(())
            }
            Err(err) => {
                if let Err(abort_err) = session.abort_transaction().await {
                    log::error!(
                        "Failed to abort assessment replacement for course {}: {}",
                        course_id,
                        abort_err
                    );
                }
                Err(err)
            }
        }
    }
}

#[async_trait]
impl AssessmentRepository for MongoAssessmentRepository {
    async fn replace_for_course(
        &self,
        course_id: &str,
        records: Vec<AssessmentQuestionRecord>,
    ) -> AppResult<()> {
        if self.use_transactions {
            return self.replace_in_transaction(course_id, &records).await;
        }

        let deleted = self
            .collection
            .delete_many(doc! { "course_id": course_id })
            .await?;
        log::debug!(
            "Removed {} prior questions for course {}",
            deleted.deleted_count,
            course_id
        );

        for record in &records {
            self.collection.insert_one(record).await?;
        }
        Ok(())
    }

    async fn find_by_course(&self, course_id: &str) -> AppResult<Vec<AssessmentQuestionRecord>> {
        let cursor = self
            .collection
            .find(doc! { "course_id": course_id })
            .sort(doc! { "position": 1 })
            .await?;
        let items: Vec<AssessmentQuestionRecord> = cursor.try_collect().await?;
        Ok(items)
    }

    async fn delete_by_course(&self, course_id: &str) -> AppResult<u64> {
        let result = self
            .collection
            .delete_many(doc! { "course_id": course_id })
            .await?;
        Ok(result.deleted_count)
    }
}
