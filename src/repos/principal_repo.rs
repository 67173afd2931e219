/*
 * Responsibility
 * - users / authorities テーブルから Principal を解決する (SQLx)
 * - users.enabled = false のユーザーは「存在しない」扱い
 */
use sqlx::{FromRow, PgPool};

use crate::repos::error::RepoResult;
use crate::services::principal::{BoxFuture, LookupError, Principal, PrincipalLookup};

#[derive(Debug, FromRow)]
pub struct UserRow {
    pub username: String,
    pub enabled: bool,
}

#[derive(Clone, Debug)]
pub struct PgPrincipalRepo {
    pool: PgPool,
}

impl PgPrincipalRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_user(&self, username: &str) -> RepoResult<Option<UserRow>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT username, enabled
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn list_authorities(&self, username: &str) -> RepoResult<Vec<String>> {
        let rows = sqlx::query_scalar::<_, String>(
            r#"
            SELECT authority
            FROM authorities
            WHERE username = $1
            ORDER BY authority
            "#,
        )
        .bind(username)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn find_principal(&self, username: &str) -> RepoResult<Option<Principal>> {
        let user = match self.find_user(username).await? {
            Some(u) if u.enabled => u,
            _ => return Ok(None),
        };
        let authorities = self.list_authorities(&user.username).await?;

        Ok(Some(Principal::new(user.username, authorities)))
    }
}

impl PrincipalLookup for PgPrincipalRepo {
    fn lookup_principal<'a>(
        &'a self,
        subject: &'a str,
    ) -> BoxFuture<'a, Result<Option<Principal>, LookupError>> {
        Box::pin(async move { Ok(self.find_principal(subject).await?) })
    }
}
