//! DrinkRepository - Repository per la gestione dei drink

use super::{Create, Delete, Read, ReadAll, Update};
use crate::dtos::{CreateDrinkDTO, UpdateDrinkDTO};
use crate::entities::{Drink, Ingredient};
use sqlx::types::Json;
use sqlx::{Error, SqlitePool};
use tracing::{info, instrument};

pub struct DrinkRepository {
    connection_pool: SqlitePool,
}

impl DrinkRepository {
    pub fn new(connection_pool: SqlitePool) -> DrinkRepository {
        Self { connection_pool }
    }

    /// Svuota la tabella, azzera la sequenza degli id e inserisce il drink di
    /// default. Usato solo all'avvio con RESET_DATABASE.
    #[instrument(skip(self))]
    pub async fn reset(&self) -> Result<Drink, Error> {
        let mut tx = self.connection_pool.begin().await?;

        sqlx::query("DELETE FROM drinks").execute(&mut *tx).await?;
        sqlx::query("DELETE FROM sqlite_sequence WHERE name = 'drinks'")
            .execute(&mut *tx)
            .await?;

        let water = vec![Ingredient {
            name: "water".to_string(),
            color: "blue".to_string(),
            parts: 1u32.into(),
        }];
        let seeded = sqlx::query_as::<_, Drink>(
            "INSERT INTO drinks (title, recipe) VALUES (?, ?) RETURNING id, title, recipe",
        )
        .bind("water")
        .bind(Json(water))
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        info!("Drinks table reset, seeded drink {}", seeded.id);
        Ok(seeded)
    }
}

impl Create<Drink, CreateDrinkDTO> for DrinkRepository {
    async fn create(&self, data: &CreateDrinkDTO) -> Result<Drink, Error> {
        sqlx::query_as::<_, Drink>(
            "INSERT INTO drinks (title, recipe) VALUES (?, ?) RETURNING id, title, recipe",
        )
        .bind(&data.title)
        .bind(Json(&data.recipe))
        .fetch_one(&self.connection_pool)
        .await
    }
}

impl Read<Drink, i64> for DrinkRepository {
    async fn read(&self, id: &i64) -> Result<Option<Drink>, Error> {
        sqlx::query_as::<_, Drink>("SELECT id, title, recipe FROM drinks WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.connection_pool)
            .await
    }
}

impl ReadAll<Drink> for DrinkRepository {
    async fn read_all(&self) -> Result<Vec<Drink>, Error> {
        sqlx::query_as::<_, Drink>("SELECT id, title, recipe FROM drinks ORDER BY id")
            .fetch_all(&self.connection_pool)
            .await
    }
}

impl Update<Drink, UpdateDrinkDTO, i64> for DrinkRepository {
    async fn update(&self, id: &i64, data: &UpdateDrinkDTO) -> Result<Drink, Error> {
        // un solo statement: i campi NULL lasciano il valore corrente
        sqlx::query_as::<_, Drink>(
            "UPDATE drinks SET title = COALESCE(?, title), recipe = COALESCE(?, recipe) \
             WHERE id = ? RETURNING id, title, recipe",
        )
        .bind(data.title.as_deref())
        .bind(data.recipe.as_ref().map(Json))
        .bind(id)
        .fetch_optional(&self.connection_pool)
        .await?
        .ok_or(Error::RowNotFound)
    }
}

impl Delete<i64> for DrinkRepository {
    async fn delete(&self, id: &i64) -> Result<(), Error> {
        let result = sqlx::query("DELETE FROM drinks WHERE id = ?")
            .bind(id)
            .execute(&self.connection_pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(Error::RowNotFound);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::SqlitePool;

    fn ingredient(name: &str, color: &str, parts: u32) -> Ingredient {
        Ingredient {
            name: name.to_string(),
            color: color.to_string(),
            parts: parts.into(),
        }
    }

    #[sqlx::test(fixtures(path = "../../fixtures", scripts("drinks")))]
    async fn test_read_all_returns_rows_in_id_order(pool: SqlitePool) -> sqlx::Result<()> {
        let repo = DrinkRepository::new(pool);
        let drinks = repo.read_all().await?;
        let ids: Vec<i64> = drinks.iter().map(|d| d.id).collect();
        assert_eq!(ids, vec![1, 2]);
        assert_eq!(drinks[1].ingredients().len(), 2);
        Ok(())
    }

    #[sqlx::test]
    async fn test_create_assigns_id_and_round_trips_recipe(pool: SqlitePool) -> sqlx::Result<()> {
        let repo = DrinkRepository::new(pool);
        let created = repo
            .create(&CreateDrinkDTO {
                title: "flat white".to_string(),
                recipe: vec![ingredient("espresso", "brown", 1), ingredient("milk", "white", 2)],
            })
            .await?;

        let stored = repo.read(&created.id).await?.expect("drink should exist");
        assert_eq!(stored.title, "flat white");
        assert_eq!(stored.ingredients(), created.ingredients());
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../../fixtures", scripts("drinks")))]
    async fn test_duplicate_title_is_a_constraint_violation(pool: SqlitePool) -> sqlx::Result<()> {
        let repo = DrinkRepository::new(pool);
        let err = repo
            .create(&CreateDrinkDTO {
                title: "water".to_string(),
                recipe: vec![ingredient("water", "blue", 1)],
            })
            .await
            .unwrap_err();

        match err {
            Error::Database(db) => assert!(db.is_unique_violation()),
            other => panic!("unexpected error: {other:?}"),
        }
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../../fixtures", scripts("drinks")))]
    async fn test_partial_update_keeps_other_fields(pool: SqlitePool) -> sqlx::Result<()> {
        let repo = DrinkRepository::new(pool);
        let updated = repo
            .update(
                &2,
                &UpdateDrinkDTO {
                    title: Some("iced matcha".to_string()),
                    recipe: None,
                },
            )
            .await?;
        assert_eq!(updated.title, "iced matcha");
        assert_eq!(updated.ingredients().len(), 2);

        let updated = repo
            .update(
                &2,
                &UpdateDrinkDTO {
                    title: None,
                    recipe: Some(vec![ingredient("matcha", "green", 1)]),
                },
            )
            .await?;
        assert_eq!(updated.title, "iced matcha");
        assert_eq!(updated.ingredients(), &[ingredient("matcha", "green", 1)]);
        Ok(())
    }

    #[sqlx::test]
    async fn test_update_and_delete_missing_row(pool: SqlitePool) -> sqlx::Result<()> {
        let repo = DrinkRepository::new(pool);
        let changes = UpdateDrinkDTO {
            title: Some("ghost".to_string()),
            recipe: None,
        };
        assert!(matches!(repo.update(&42, &changes).await, Err(Error::RowNotFound)));
        assert!(matches!(repo.delete(&42).await, Err(Error::RowNotFound)));
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../../fixtures", scripts("drinks")))]
    async fn test_deleted_ids_are_not_reused(pool: SqlitePool) -> sqlx::Result<()> {
        let repo = DrinkRepository::new(pool);
        repo.delete(&2).await?;
        assert!(repo.read(&2).await?.is_none());

        let created = repo
            .create(&CreateDrinkDTO {
                title: "cortado".to_string(),
                recipe: vec![ingredient("espresso", "brown", 1)],
            })
            .await?;
        assert_eq!(created.id, 3);
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../../fixtures", scripts("drinks")))]
    async fn test_reset_seeds_water(pool: SqlitePool) -> sqlx::Result<()> {
        let repo = DrinkRepository::new(pool);
        let seeded = repo.reset().await?;
        assert_eq!(seeded.id, 1);

        let drinks = repo.read_all().await?;
        assert_eq!(drinks.len(), 1);
        assert_eq!(drinks[0].title, "water");
        assert_eq!(drinks[0].ingredients(), &[ingredient("water", "blue", 1)]);
        Ok(())
    }
}
