use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::{DeleteOutcome, FarmerRepository};
use crate::{
    cpf::Cpf,
    error::Result,
    models::{
        common::PageRequest,
        farmer::{Farmer, FarmerFilter},
    },
};

const COLUMNS: &str =
    "id, full_name, cpf, birth_date, phone, is_active, created_at, updated_at";

pub struct PgFarmerRepository {
    pool: PgPool,
}

impl PgFarmerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FarmerRepository for PgFarmerRepository {
    async fn insert(&self, farmer: &Farmer) -> Result<Farmer> {
        // Unique violations on farmers_cpf_key surface as 409 via AppError::Database.
        let row = sqlx::query_as::<_, Farmer>(&format!(
            r#"
            INSERT INTO farmers (id, full_name, cpf, birth_date, phone, is_active, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {COLUMNS}
            "#
        ))
        .bind(farmer.id)
        .bind(&farmer.full_name)
        .bind(&farmer.cpf)
        .bind(farmer.birth_date)
        .bind(farmer.phone.as_deref())
        .bind(farmer.is_active)
        .bind(farmer.created_at)
        .bind(farmer.updated_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Farmer>> {
        let row = sqlx::query_as::<_, Farmer>(&format!(
            "SELECT {COLUMNS} FROM farmers WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn find_by_cpf(&self, cpf: &Cpf) -> Result<Option<Farmer>> {
        let row = sqlx::query_as::<_, Farmer>(&format!(
            "SELECT {COLUMNS} FROM farmers WHERE cpf = $1"
        ))
        .bind(cpf.as_str())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn list(&self, filter: &FarmerFilter, page: &PageRequest) -> Result<(Vec<Farmer>, u64)> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM farmers");
        push_filter(&mut count, filter);
        let total = count.build_query_scalar::<i64>().fetch_one(&self.pool).await?;

        let mut select = QueryBuilder::<Postgres>::new(format!("SELECT {COLUMNS} FROM farmers"));
        push_filter(&mut select, filter);
        select
            .push(" ORDER BY created_at DESC, id LIMIT ")
            .push_bind(i64::from(page.limit()))
            .push(" OFFSET ")
            .push_bind(i64::try_from(page.skip()).unwrap_or(i64::MAX));
        let rows = select
            .build_query_as::<Farmer>()
            .fetch_all(&self.pool)
            .await?;

        Ok((rows, u64::try_from(total).unwrap_or(0)))
    }

    async fn update(&self, farmer: &Farmer) -> Result<Option<Farmer>> {
        let row = sqlx::query_as::<_, Farmer>(&format!(
            r#"
            UPDATE farmers
            SET full_name  = $2,
                birth_date = $3,
                phone      = $4,
                is_active  = $5,
                updated_at = $6
            WHERE id = $1
            RETURNING {COLUMNS}
            "#
        ))
        .bind(farmer.id)
        .bind(&farmer.full_name)
        .bind(farmer.birth_date)
        .bind(farmer.phone.as_deref())
        .bind(farmer.is_active)
        .bind(farmer.updated_at)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn delete(&self, id: Uuid) -> Result<DeleteOutcome> {
        let rows = sqlx::query("DELETE FROM farmers WHERE id = $1 AND is_active = FALSE")
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();
        if rows > 0 {
            return Ok(DeleteOutcome::Deleted);
        }

        // Still present means it was active when the DELETE ran.
        let exists: Option<bool> =
            sqlx::query_scalar("SELECT is_active FROM farmers WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(match exists {
            Some(_) => DeleteOutcome::StillActive,
            None => DeleteOutcome::NotFound,
        })
    }
}

fn push_filter(qb: &mut QueryBuilder<'_, Postgres>, filter: &FarmerFilter) {
    qb.push(" WHERE TRUE");
    if let Some(name) = &filter.name {
        qb.push(" AND full_name ILIKE ")
            .push_bind(contains_pattern(name));
    }
    if let Some(digits) = &filter.cpf_digits {
        qb.push(" AND cpf LIKE ").push_bind(contains_pattern(digits));
    }
    if let Some(active) = filter.is_active {
        qb.push(" AND is_active = ").push_bind(active);
    }
}

/// `%value%` with LIKE metacharacters escaped (backslash is the default escape).
fn contains_pattern(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('%');
    for c in value.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('%');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contains_pattern_escapes_wildcards() {
        assert_eq!(contains_pattern("ana"), "%ana%");
        assert_eq!(contains_pattern("50%_off\\"), "%50\\%\\_off\\\\%");
    }

    #[test]
    fn filter_sql_has_one_clause_per_predicate() {
        let filter = FarmerFilter::from_criteria(Some("Ana"), Some("529.982"), Some(true));
        let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM farmers");
        push_filter(&mut qb, &filter);
        assert_eq!(
            qb.sql(),
            "SELECT COUNT(*) FROM farmers WHERE TRUE AND full_name ILIKE $1 AND cpf LIKE $2 AND is_active = $3"
        );
    }

    #[test]
    fn empty_filter_matches_everything() {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM farmers");
        push_filter(&mut qb, &FarmerFilter::default());
        assert_eq!(qb.sql(), "SELECT COUNT(*) FROM farmers WHERE TRUE");
    }
}
