//! services/client/src/adapters/pg.rs
//!
//! This module contains the PostgreSQL adapter, the concrete implementation of
//! the `DocumentStore` port backed by a single JSONB `documents` table. Live
//! queries are driven by a `LISTEN/NOTIFY` trigger on that table.

use async_trait::async_trait;
use serde_json::Value;
use sqlx::postgres::{PgListener, PgPoolOptions};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use tracing::{debug, info};
use uuid::Uuid;
use wellness_core::ports::{
    CollectionPath, Direction, Document, DocumentStore, PortError, PortResult, Query, Snapshot,
    SnapshotStream,
};

/// The channel the `documents` trigger notifies, with the collection path as payload.
pub const CHANGE_CHANNEL: &str = "document_changes";

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

#[derive(Clone)]
pub struct PgDocumentStore {
    pool: PgPool,
}

impl PgDocumentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new().max_connections(5).connect(database_url).await?;
        Ok(Self::new(pool))
    }

    /// A helper function to run the embedded migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    async fn fetch(&self, query: &Query) -> PortResult<Snapshot> {
        fetch(&self.pool, query).await
    }
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct DocumentRow {
    id: String,
    data: Json<Value>,
}
impl DocumentRow {
    fn to_domain(self) -> Document {
        Document { id: self.id, data: self.data.0 }
    }
}

fn map_sqlx(e: sqlx::Error) -> PortError {
    match e {
        sqlx::Error::RowNotFound => PortError::NotFound(e.to_string()),
        sqlx::Error::Io(_) | sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => {
            PortError::Unavailable(e.to_string())
        }
        _ => PortError::Unexpected(e.to_string()),
    }
}

/// Builds the `SELECT` behind every read and live-query refresh.
///
/// Ordering compares the text form of the field byte-wise, which for the fixed
/// width dates and instants the client writes is chronological order.
fn select_documents(query: &Query) -> QueryBuilder<'_, Postgres> {
    let mut sql: QueryBuilder<Postgres> =
        QueryBuilder::new("SELECT id, data FROM documents WHERE collection = ");
    sql.push_bind(query.path.as_str());
    if let Some(filter) = &query.filter {
        sql.push(" AND data -> ").push_bind(filter.field.as_str());
        sql.push(" = ").push_bind(Json(filter.value.clone()));
    }
    sql.push(" ORDER BY ");
    if let Some(order) = &query.order {
        sql.push("(data ->> ").push_bind(order.field.as_str()).push(") COLLATE \"C\"");
        sql.push(match order.direction {
            Direction::Ascending => " ASC, ",
            Direction::Descending => " DESC, ",
        });
    }
    sql.push("id ASC");
    sql
}

async fn fetch(pool: &PgPool, query: &Query) -> PortResult<Snapshot> {
    let mut sql = select_documents(query);
    let rows = sql
        .build_query_as::<DocumentRow>()
        .fetch_all(pool)
        .await
        .map_err(map_sqlx)?;
    Ok(rows.into_iter().map(DocumentRow::to_domain).collect())
}

//=========================================================================================
// `DocumentStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn subscribe(&self, query: Query) -> PortResult<SnapshotStream> {
        let mut listener = PgListener::connect_with(&self.pool).await.map_err(map_sqlx)?;
        listener.listen(CHANGE_CHANNEL).await.map_err(map_sqlx)?;
        let first = self.fetch(&query).await?;
        let pool = self.pool.clone();
        info!("Listening for changes to {}.", query.path);

        let stream = async_stream::stream! {
            let mut last = first;
            yield Ok(last.clone());
            loop {
                match listener.try_recv().await {
                    Ok(Some(notice)) if notice.payload() != query.path.as_str() => continue,
                    Ok(Some(_)) => {}
                    // The connection was lost and re-established; notices may have been missed.
                    Ok(None) => debug!("Listener on {} reconnected, refetching.", query.path),
                    Err(e) => {
                        yield Err(map_sqlx(e));
                        break;
                    }
                }
                match fetch(&pool, &query).await {
                    Ok(snapshot) if snapshot != last => {
                        last = snapshot.clone();
                        yield Ok(snapshot);
                    }
                    Ok(_) => {}
                    Err(e) => {
                        yield Err(e);
                        break;
                    }
                }
            }
        };
        Ok(Box::pin(stream))
    }

    async fn read(&self, query: &Query) -> PortResult<Snapshot> {
        self.fetch(query).await
    }

    async fn create(&self, path: &CollectionPath, data: Value) -> PortResult<String> {
        if !data.is_object() {
            return Err(PortError::InvalidPayload(format!("expected a JSON object, got {}", data)));
        }
        let id = Uuid::now_v7().to_string();
        sqlx::query("INSERT INTO documents (id, collection, data) VALUES ($1, $2, $3)")
            .bind(&id)
            .bind(path.as_str())
            .bind(Json(data))
            .execute(&self.pool)
            .await
            .map_err(map_sqlx)?;
        Ok(id)
    }

    async fn update(&self, path: &CollectionPath, id: &str, patch: Value) -> PortResult<()> {
        if !patch.is_object() {
            return Err(PortError::InvalidPayload(format!("expected a JSON object, got {}", patch)));
        }
        let result = sqlx::query(
            "UPDATE documents SET data = data || $3, updated_at = now() WHERE collection = $1 AND id = $2",
        )
        .bind(path.as_str())
        .bind(id)
        .bind(Json(patch))
        .execute(&self.pool)
        .await
        .map_err(map_sqlx)?;

        if result.rows_affected() == 0 {
            return Err(PortError::NotFound(path.document(id)));
        }
        Ok(())
    }

    async fn delete(&self, path: &CollectionPath, id: &str) -> PortResult<()> {
        sqlx::query("DELETE FROM documents WHERE collection = $1 AND id = $2")
            .bind(path.as_str())
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wellness_core::domain::Session;
    use wellness_core::ports::{Collection, FieldFilter, OrderBy};

    #[test]
    fn select_binds_the_filter_and_breaks_ties_by_id() {
        let session = Session { id: "u1".to_string(), anonymous: false };
        let path = CollectionPath::private("demo-app", &session, Collection::ConsultationMessages);
        let query = Query::new(path)
            .filtered(FieldFilter::eq("consultationId", "a"))
            .ordered_by(Collection::ConsultationMessages.ordering());
        assert_eq!(
            select_documents(&query).sql(),
            "SELECT id, data FROM documents WHERE collection = $1 AND data -> $2 = $3 \
             ORDER BY (data ->> $4) COLLATE \"C\" ASC, id ASC"
        );
    }

    #[test]
    fn select_without_filter_or_ordering() {
        let articles = Query::new(CollectionPath::public("demo-app", Collection::Articles));
        assert_eq!(
            select_documents(&articles).sql(),
            "SELECT id, data FROM documents WHERE collection = $1 ORDER BY id ASC"
        );

        let newest_first = articles.ordered_by(OrderBy::new("date", Direction::Descending));
        assert_eq!(
            select_documents(&newest_first).sql(),
            "SELECT id, data FROM documents WHERE collection = $1 \
             ORDER BY (data ->> $2) COLLATE \"C\" DESC, id ASC"
        );
    }
}
