use chrono::{DateTime, Utc};
use color_eyre::Result;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{cooking::DietaryRestriction, parse_all, to_text};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FamilyMember {
    pub family_member_id: Uuid,
    pub name: String,
    pub dietary_restrictions: Vec<DietaryRestriction>,
    pub favorite_ingredients: Vec<String>,
    pub allergies: Vec<String>,
    pub dislikes: Vec<String>,
    pub notes: String,
    pub created_at: DateTime<Utc>,
}

/// Fields a caller supplies when creating or replacing a family member.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FamilyMemberInput {
    pub name: String,
    #[serde(default)]
    pub dietary_restrictions: Vec<DietaryRestriction>,
    #[serde(default)]
    pub favorite_ingredients: Vec<String>,
    #[serde(default)]
    pub allergies: Vec<String>,
    #[serde(default)]
    pub dislikes: Vec<String>,
    #[serde(default)]
    pub notes: String,
}

#[derive(sqlx::FromRow)]
struct FamilyMemberRow {
    family_member_id: Uuid,
    name: String,
    dietary_restrictions: Vec<String>,
    favorite_ingredients: Vec<String>,
    allergies: Vec<String>,
    dislikes: Vec<String>,
    notes: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<FamilyMemberRow> for FamilyMember {
    type Error = color_eyre::Report;

    fn try_from(row: FamilyMemberRow) -> Result<Self> {
        Ok(Self {
            family_member_id: row.family_member_id,
            name: row.name,
            dietary_restrictions: parse_all(row.dietary_restrictions)?,
            favorite_ingredients: row.favorite_ingredients,
            allergies: row.allergies,
            dislikes: row.dislikes,
            notes: row.notes,
            created_at: row.created_at,
        })
    }
}

const FAMILY_MEMBER_COLUMNS: &str = "
    family_member_id,
    name,
    dietary_restrictions,
    favorite_ingredients,
    allergies,
    dislikes,
    notes,
    created_at
";

impl FamilyMember {
    pub async fn create(pool: &PgPool, input: &FamilyMemberInput) -> Result<Self> {
        let row = sqlx::query_as::<_, FamilyMemberRow>(&format!(
            "
            INSERT INTO family_members (
                name, dietary_restrictions, favorite_ingredients, allergies, dislikes, notes
            )
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {FAMILY_MEMBER_COLUMNS}
            "
        ))
        .bind(&input.name)
        .bind(to_text(&input.dietary_restrictions))
        .bind(&input.favorite_ingredients)
        .bind(&input.allergies)
        .bind(&input.dislikes)
        .bind(&input.notes)
        .fetch_one(pool)
        .await?;

        row.try_into()
    }

    pub async fn list(pool: &PgPool) -> Result<Vec<Self>> {
        let rows = sqlx::query_as::<_, FamilyMemberRow>(&format!(
            "
            SELECT {FAMILY_MEMBER_COLUMNS}
            FROM family_members
            ORDER BY created_at
            "
        ))
        .fetch_all(pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    pub async fn get_by_id(pool: &PgPool, family_member_id: Uuid) -> Result<Option<Self>> {
        let row = sqlx::query_as::<_, FamilyMemberRow>(&format!(
            "
            SELECT {FAMILY_MEMBER_COLUMNS}
            FROM family_members
            WHERE family_member_id = $1
            "
        ))
        .bind(family_member_id)
        .fetch_optional(pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    pub async fn get_by_ids(pool: &PgPool, family_member_ids: &[Uuid]) -> Result<Vec<Self>> {
        let rows = sqlx::query_as::<_, FamilyMemberRow>(&format!(
            "
            SELECT {FAMILY_MEMBER_COLUMNS}
            FROM family_members
            WHERE family_member_id = ANY($1)
            ORDER BY created_at
            "
        ))
        .bind(family_member_ids)
        .fetch_all(pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Replaces every editable field. Returns `None` when the member does not exist.
    pub async fn update(
        pool: &PgPool,
        family_member_id: Uuid,
        input: &FamilyMemberInput,
    ) -> Result<Option<Self>> {
        let row = sqlx::query_as::<_, FamilyMemberRow>(&format!(
            "
            UPDATE family_members
            SET name = $2,
                dietary_restrictions = $3,
                favorite_ingredients = $4,
                allergies = $5,
                dislikes = $6,
                notes = $7
            WHERE family_member_id = $1
            RETURNING {FAMILY_MEMBER_COLUMNS}
            "
        ))
        .bind(family_member_id)
        .bind(&input.name)
        .bind(to_text(&input.dietary_restrictions))
        .bind(&input.favorite_ingredients)
        .bind(&input.allergies)
        .bind(&input.dislikes)
        .bind(&input.notes)
        .fetch_optional(pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    pub async fn delete(pool: &PgPool, family_member_id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM family_members WHERE family_member_id = $1")
            .bind(family_member_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "needs a Postgres DATABASE_URL"]
    async fn test_create_update_delete_family_member(pool: PgPool) {
        let input = FamilyMemberInput {
            name: "Avery".to_string(),
            dietary_restrictions: vec![DietaryRestriction::GlutenFree],
            allergies: vec!["peanuts".to_string()],
            ..Default::default()
        };

        let member = FamilyMember::create(&pool, &input).await.unwrap();
        assert_eq!(member.name, "Avery");
        assert_eq!(
            member.dietary_restrictions,
            vec![DietaryRestriction::GlutenFree]
        );

        let renamed = FamilyMemberInput {
            name: "Avery J".to_string(),
            ..input
        };
        let updated = FamilyMember::update(&pool, member.family_member_id, &renamed)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.name, "Avery J");
        assert_eq!(updated.allergies, vec!["peanuts".to_string()]);

        assert!(FamilyMember::delete(&pool, member.family_member_id)
            .await
            .unwrap());
        assert!(FamilyMember::get_by_id(&pool, member.family_member_id)
            .await
            .unwrap()
            .is_none());
    }
}
