use async_trait::async_trait;
use chrono::{DateTime, Utc};
use notemarket_model::{
    Document, DocumentId, DocumentPatch, Grade, NewDocument, Semester, UserId,
};
use sqlx::PgPool;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::database::ports::documents::{DocumentOrder, DocumentRepository};
use crate::error::{MarketError, Result};

#[derive(Debug, Clone)]
pub struct PostgresDocumentRepository {
    pool: PgPool,
}

impl PostgresDocumentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn fetch_rows(&self, sql: &str, owner: Option<Uuid>) -> Result<Vec<Document>> {
        let mut query = sqlx::query_as::<_, DocumentRow>(sql);
        if let Some(owner) = owner {
            query = query.bind(owner);
        }
        let rows = query.fetch_all(self.pool()).await?;
        rows.into_iter().map(Document::try_from).collect()
    }
}

const DOCUMENT_COLUMNS: &str = "id, user_id, title, course_code, university, price, \
    description, file_path, file_size, page_count, preview_page_count, tags, grade, \
    grade_verified, grade_proof_url, semester, view_count, created_at, updated_at";

// Database row type for documents
#[derive(sqlx::FromRow)]
struct DocumentRow {
    id: Uuid,
    user_id: Uuid,
    title: String,
    course_code: Option<String>,
    university: Option<String>,
    price: f64,
    description: Option<String>,
    file_path: String,
    file_size: i64,
    page_count: Option<i32>,
    preview_page_count: i32,
    tags: Vec<String>,
    grade: Option<String>,
    grade_verified: bool,
    grade_proof_url: Option<String>,
    semester: Option<String>,
    view_count: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<DocumentRow> for Document {
    type Error = MarketError;

    fn try_from(row: DocumentRow) -> Result<Self> {
        if !row.price.is_finite() || row.price < 0.0 {
            return Err(MarketError::Database(format!(
                "document {} has invalid price {}",
                row.id, row.price
            )));
        }
        let grade = row
            .grade
            .as_deref()
            .map(str::parse::<Grade>)
            .transpose()
            .map_err(|e| MarketError::Database(format!("document {}: {e}", row.id)))?;
        // Free-text semesters from older rows are dropped rather than failing the list.
        let semester = row.semester.as_deref().and_then(|raw| {
            raw.parse::<Semester>()
                .inspect_err(|_| warn!(document = %row.id, semester = raw, "unparseable semester"))
                .ok()
        });

        Ok(Document {
            id: DocumentId(row.id),
            owner_id: UserId(row.user_id),
            title: row.title,
            course_code: row.course_code,
            university: row.university,
            price: row.price,
            description: row.description,
            file_path: row.file_path,
            file_size: u64::try_from(row.file_size).unwrap_or(0),
            page_count: row.page_count.and_then(|p| u32::try_from(p).ok()),
            preview_page_count: u32::try_from(row.preview_page_count).unwrap_or(1).max(1),
            tags: row.tags.into_iter().collect(),
            grade,
            grade_verified: row.grade_verified,
            grade_proof_url: row.grade_proof_url,
            semester,
            view_count: u64::try_from(row.view_count).unwrap_or(0),
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn to_i64(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

fn to_i32(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

#[async_trait]
impl DocumentRepository for PostgresDocumentRepository {
    async fn list_documents(
        &self,
        order: DocumentOrder,
        limit: Option<usize>,
    ) -> Result<Vec<Document>> {
        let direction = match order {
            DocumentOrder::NewestFirst => "DESC",
            DocumentOrder::OldestFirst => "ASC",
        };
        let limit = limit.map(|n| format!(" LIMIT {n}")).unwrap_or_default();
        let sql = format!(
            "SELECT {DOCUMENT_COLUMNS} FROM documents ORDER BY created_at {direction}, id{limit}"
        );
        self.fetch_rows(&sql, None).await
    }

    async fn list_by_owner(&self, owner: UserId) -> Result<Vec<Document>> {
        let sql = format!(
            "SELECT {DOCUMENT_COLUMNS} FROM documents WHERE user_id = $1 ORDER BY created_at DESC, id"
        );
        self.fetch_rows(&sql, Some(owner.to_uuid())).await
    }

    async fn get_document(&self, id: DocumentId) -> Result<Option<Document>> {
        let row = sqlx::query_as::<_, DocumentRow>(&format!(
            "SELECT {DOCUMENT_COLUMNS} FROM documents WHERE id = $1"
        ))
        .bind(id.to_uuid())
        .fetch_optional(self.pool())
        .await?;
        row.map(Document::try_from).transpose()
    }

    async fn insert_document(&self, new: NewDocument) -> Result<Document> {
        let doc = Document::from_new(DocumentId::new(), new, Utc::now());
        let tags: Vec<String> = doc.tags.iter().cloned().collect();

        sqlx::query(
            r#"
            INSERT INTO documents (
                id, user_id, title, course_code, university, price, description,
                file_path, file_size, page_count, preview_page_count, tags, grade,
                grade_verified, grade_proof_url, semester, view_count, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19)
            "#,
        )
        .bind(doc.id.to_uuid())
        .bind(doc.owner_id.to_uuid())
        .bind(&doc.title)
        .bind(&doc.course_code)
        .bind(&doc.university)
        .bind(doc.price)
        .bind(&doc.description)
        .bind(&doc.file_path)
        .bind(to_i64(doc.file_size))
        .bind(doc.page_count.map(to_i32))
        .bind(to_i32(doc.preview_page_count))
        .bind(&tags)
        .bind(doc.grade.map(|g| g.as_str()))
        .bind(doc.grade_verified)
        .bind(&doc.grade_proof_url)
        .bind(doc.semester.map(|s| s.to_string()))
        .bind(to_i64(doc.view_count))
        .bind(doc.created_at)
        .bind(doc.updated_at)
        .execute(self.pool())
        .await?;

        Ok(doc)
    }

    async fn update_document(&self, id: DocumentId, patch: &DocumentPatch) -> Result<Document> {
        let mut tx = self.pool().begin().await?;
        let row = sqlx::query_as::<_, DocumentRow>(&format!(
            "SELECT {DOCUMENT_COLUMNS} FROM documents WHERE id = $1 FOR UPDATE"
        ))
        .bind(id.to_uuid())
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| MarketError::NotFound(format!("document {id}")))?;
        let mut doc = Document::try_from(row)?;
        patch.apply(&mut doc, Utc::now());
        let tags: Vec<String> = doc.tags.iter().cloned().collect();

        sqlx::query(
            r#"
            UPDATE documents
            SET title = $2, course_code = $3, university = $4, price = $5,
                description = $6, file_path = $7, file_size = $8, page_count = $9,
                preview_page_count = $10, tags = $11, grade = $12, grade_verified = $13,
                grade_proof_url = $14, semester = $15, updated_at = $16
            WHERE id = $1
            "#,
        )
        .bind(id.to_uuid())
        .bind(&doc.title)
        .bind(&doc.course_code)
        .bind(&doc.university)
        .bind(doc.price)
        .bind(&doc.description)
        .bind(&doc.file_path)
        .bind(to_i64(doc.file_size))
        .bind(doc.page_count.map(to_i32))
        .bind(to_i32(doc.preview_page_count))
        .bind(&tags)
        .bind(doc.grade.map(|g| g.as_str()))
        .bind(doc.grade_verified)
        .bind(&doc.grade_proof_url)
        .bind(doc.semester.map(|s| s.to_string()))
        .bind(doc.updated_at)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;

        Ok(doc)
    }

    async fn delete_document(&self, id: DocumentId) -> Result<Option<Document>> {
        let row = sqlx::query_as::<_, DocumentRow>(&format!(
            "DELETE FROM documents WHERE id = $1 RETURNING {DOCUMENT_COLUMNS}"
        ))
        .bind(id.to_uuid())
        .fetch_optional(self.pool())
        .await?;
        row.map(Document::try_from).transpose()
    }

    async fn delete_by_owner(&self, owner: UserId) -> Result<Vec<Document>> {
        let sql = format!("DELETE FROM documents WHERE user_id = $1 RETURNING {DOCUMENT_COLUMNS}");
        self.fetch_rows(&sql, Some(owner.to_uuid())).await
    }

    async fn increment_view_count(&self, id: DocumentId) -> Result<()> {
        let result = sqlx::query("UPDATE documents SET view_count = view_count + 1 WHERE id = $1")
            .bind(id.to_uuid())
            .execute(self.pool())
            .await?;
        if result.rows_affected() == 0 {
            return Err(MarketError::NotFound(format!("document {id}")));
        }
        Ok(())
    }

    async fn set_page_count(&self, id: DocumentId, pages: u32) -> Result<()> {
        let result = sqlx::query(
            "UPDATE documents SET page_count = $2 WHERE id = $1 AND page_count IS NULL",
        )
        .bind(id.to_uuid())
        .bind(to_i32(pages))
        .execute(self.pool())
        .await?;
        if result.rows_affected() == 0 {
            debug!(document = %id, "page count already set or document missing");
        }
        Ok(())
    }
}
