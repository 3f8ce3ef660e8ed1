//! MySQL-backed destination store.
//!
//! Table names are `{prefix}posts` / `{prefix}postmeta`; the pipeline only
//! claims rows whose `post_type` is [`ENTITY_TYPE`]. Each replicated
//! listing is its own transaction: one failed record rolls back alone and
//! the run moves on.

use anyhow::{Context, Result};
use async_trait::async_trait;
use mediere_client::RawListing;
use sqlx::mysql::{MySqlPool, MySqlPoolOptions};

use super::content::{self, ENTITY_TYPE, VIEW_COUNT_MAX, VIEW_COUNT_MIN};
use crate::config::Config;
use crate::traits::BaseDestination;

pub struct MySqlDestination {
    pool: MySqlPool,
    table_prefix: String,
    thumbnail_id: String,
}

impl MySqlDestination {
    /// Acquire the destination connection for this run.
    pub async fn connect(config: &Config) -> Result<Self> {
        let url = config
            .database_url
            .as_deref()
            .context("DATABASE_URL is not set")?;

        let pool = MySqlPoolOptions::new()
            .max_connections(5)
            .connect(url)
            .await
            .context("Failed to connect to destination database")?;
        tracing::info!("Connected to destination database");

        Ok(Self {
            pool,
            table_prefix: config.table_prefix.clone(),
            thumbnail_id: config.thumbnail_id.clone(),
        })
    }

    /// Release the connection; called on every exit path.
    pub async fn close(&self) {
        self.pool.close().await;
        tracing::info!("Destination connection closed");
    }

    fn posts_table(&self) -> String {
        format!("{}posts", self.table_prefix)
    }

    fn postmeta_table(&self) -> String {
        format!("{}postmeta", self.table_prefix)
    }
}

#[async_trait]
impl BaseDestination for MySqlDestination {
    async fn purge(&self) -> Result<u64> {
        let mut tx = self
            .pool
            .begin()
            .await
            .context("Failed to open purge transaction")?;

        // Attribute rows first: they reference the entity rows by id.
        let purge_attributes = format!(
            "DELETE pm FROM {postmeta} pm \
             JOIN {posts} p ON pm.post_id = p.ID \
             WHERE p.post_type = ?",
            postmeta = self.postmeta_table(),
            posts = self.posts_table(),
        );
        sqlx::query(&purge_attributes)
            .bind(ENTITY_TYPE)
            .execute(&mut *tx)
            .await
            .context("Failed to purge attribute rows")?;

        let purge_entities = format!(
            "DELETE FROM {posts} WHERE post_type = ?",
            posts = self.posts_table(),
        );
        let result = sqlx::query(&purge_entities)
            .bind(ENTITY_TYPE)
            .execute(&mut *tx)
            .await
            .context("Failed to purge entity rows")?;

        tx.commit()
            .await
            .context("Failed to commit purge transaction")?;

        Ok(result.rows_affected())
    }

    async fn replicate(&self, listing: &RawListing) -> Result<()> {
        let entity = content::entity_row(listing)?;
        let view_count = fastrand::u32(VIEW_COUNT_MIN..=VIEW_COUNT_MAX);
        let attributes = content::attribute_rows(listing, view_count, &self.thumbnail_id);

        let mut tx = self
            .pool
            .begin()
            .await
            .context("Failed to open replication transaction")?;

        let upsert = format!(
            "INSERT INTO {posts} (\
                ID, post_author, post_date, post_date_gmt, \
                post_content, post_title, post_modified, post_modified_gmt, \
                post_type, post_excerpt, to_ping, pinged, \
                post_content_filtered, post_name\
             ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, '', '', '', '', ?) \
             ON DUPLICATE KEY UPDATE \
                post_content = VALUES(post_content), \
                post_title = VALUES(post_title), \
                post_modified = VALUES(post_modified), \
                post_modified_gmt = VALUES(post_modified_gmt)",
            posts = self.posts_table(),
        );
        sqlx::query(&upsert)
            .bind(entity.id)
            .bind(entity.author)
            .bind(&entity.date)
            .bind(&entity.date)
            .bind(&entity.content)
            .bind(&entity.title)
            .bind(&entity.date)
            .bind(&entity.date)
            .bind(ENTITY_TYPE)
            .bind(&entity.slug)
            .execute(&mut *tx)
            .await
            .context("Failed to upsert entity row")?;

        let insert_attribute = format!(
            "INSERT INTO {postmeta} (post_id, meta_key, meta_value) VALUES (?, ?, ?)",
            postmeta = self.postmeta_table(),
        );
        for attribute in &attributes {
            sqlx::query(&insert_attribute)
                .bind(entity.id)
                .bind(attribute.key)
                .bind(&attribute.value)
                .execute(&mut *tx)
                .await
                .with_context(|| format!("Failed to insert attribute {}", attribute.key))?;
        }

        tx.commit()
            .await
            .context("Failed to commit replication transaction")?;

        tracing::debug!(id = entity.id, "Replicated listing");
        Ok(())
    }
}
