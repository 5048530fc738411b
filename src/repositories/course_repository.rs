use async_trait::async_trait;
use mongodb::{bson::doc, Collection};

use crate::{db::Database, errors::AppResult, models::domain::CourseRef};

/// Read-only view of the portal's course storage.
#[async_trait]
pub trait CourseRepository: Send + Sync {
    async fn find_by_id(&self, id: &str) -> AppResult<Option<CourseRef>>;
}

pub struct MongoCourseRepository {
    collection: Collection<CourseRef>,
}

impl MongoCourseRepository {
    pub fn new(db: &Database, collection_name: &str) -> Self {
        let collection = db.get_collection(collection_name);
        Self { collection }
    }
}

#[async_trait]
impl CourseRepository for MongoCourseRepository {
    async fn find_by_id(&self, id: &str) -> AppResult<Option<CourseRef>> {
        let course = self.collection.find_one(doc! { "id": id }).await?;
        Ok(course)
    }
}
