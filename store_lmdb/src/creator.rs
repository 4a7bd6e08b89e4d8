//! LMDB implementation of CreatorStore.

use gratia_store::creator::{Creator, CreatorStore, Story};
use gratia_store::StoreError;
use gratia_types::CreatorId;

use crate::environment::{decode, encode};
use crate::{LmdbError, LmdbStore};

impl CreatorStore for LmdbStore {
    fn put_creator(&self, creator: &Creator) -> Result<(), StoreError> {
        let data = encode(creator)?;
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        self.creators_db
            .put(&mut wtxn, creator.id.as_str().as_bytes(), &data)
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn iter_creators(&self) -> Result<Vec<Creator>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let mut creators = Vec::new();
        for item in self.creators_db.iter(&rtxn).map_err(LmdbError::from)? {
            let (_key, val) = item.map_err(LmdbError::from)?;
            creators.push(decode(val)?);
        }
        Ok(creators)
    }

    fn put_story(&self, story: &Story) -> Result<(), StoreError> {
        let data = encode(story)?;
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        self.stories_db
            .put(&mut wtxn, story.id.as_str().as_bytes(), &data)
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn stories_for_creator(&self, creator_id: &CreatorId) -> Result<Vec<Story>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let mut stories = Vec::new();
        for item in self.stories_db.iter(&rtxn).map_err(LmdbError::from)? {
            let (_key, val) = item.map_err(LmdbError::from)?;
            let story: Story = decode(val)?;
            if story.creator_id == *creator_id {
                stories.push(story);
            }
        }
        Ok(stories)
    }
}
