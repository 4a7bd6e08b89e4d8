//! Creator and story storage trait.
//!
//! The minimum catalog surface the metrics refresher needs: who the
//! creators are and which stories belong to them.

use crate::StoreError;
use gratia_types::{CreatorId, StoryId};
use serde::{Deserialize, Serialize};

/// A content creator receiving gratitude events.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Creator {
    pub id: CreatorId,
    pub name: String,
}

/// A story published by a creator; events reference stories.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Story {
    pub id: StoryId,
    pub creator_id: CreatorId,
    pub title: String,
}

pub trait CreatorStore: Send + Sync {
    fn put_creator(&self, creator: &Creator) -> Result<(), StoreError>;

    fn iter_creators(&self) -> Result<Vec<Creator>, StoreError>;

    fn put_story(&self, story: &Story) -> Result<(), StoreError>;

    fn stories_for_creator(&self, creator_id: &CreatorId) -> Result<Vec<Story>, StoreError>;
}
