use color_eyre::Result;
use db::setup_db_pool;

use crate::seed::reseed_recipes;

pub(crate) async fn seed_recipes() -> Result<()> {
    let pool = setup_db_pool().await?;

    let recipes = reseed_recipes(&pool).await?;
    for recipe in &recipes {
        println!("{}: {}", recipe.recipe_id, recipe.name);
    }
    println!("Seeded {} recipes", recipes.len());

    pool.close().await;

    Ok(())
}
