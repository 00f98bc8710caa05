//! Seed the storefront catalog with the starter cookie lineup.
//!
//! Seeding only runs against an empty `products` table so it is safe to
//! repeat after deploys.

use sweets_core::{Price, PriceError};
use sweets_storefront::db::{ProductRepository, RepositoryError};
use sweets_storefront::models::NewProduct;
use thiserror::Error;

use super::{DATABASE_URL_VAR, connect, database_url};

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error("Invalid seed price for {name}: {source}")]
    Price {
        name: &'static str,
        #[source]
        source: PriceError,
    },
}

struct SeedProduct {
    name: &'static str,
    description: &'static str,
    price_cents: i64,
    ingredients: &'static [&'static str],
    allergens: &'static [&'static str],
    is_featured: bool,
}

const PLACEHOLDER_IMAGE: &str = "/placeholder.svg";

const STARTER_CATALOG: &[SeedProduct] = &[
    SeedProduct {
        name: "Classic Chocolate Chip",
        description: "Our signature chocolate chip cookie, soft and chewy with rich chocolate chunks.",
        price_cents: 250,
        ingredients: &[
            "Flour",
            "Butter",
            "Sugar",
            "Brown Sugar",
            "Eggs",
            "Chocolate Chips",
            "Baking Soda",
            "Salt",
        ],
        allergens: &["Gluten", "Dairy", "Eggs"],
        is_featured: true,
    },
    SeedProduct {
        name: "Oatmeal Raisin",
        description: "Hearty oatmeal cookies packed with plump raisins and a hint of cinnamon.",
        price_cents: 225,
        ingredients: &[
            "Flour",
            "Oats",
            "Butter",
            "Sugar",
            "Brown Sugar",
            "Eggs",
            "Raisins",
            "Cinnamon",
            "Baking Soda",
            "Salt",
        ],
        allergens: &["Gluten", "Dairy", "Eggs"],
        is_featured: false,
    },
    SeedProduct {
        name: "Peanut Butter Delight",
        description: "Rich and creamy peanut butter cookies, a classic favorite.",
        price_cents: 275,
        ingredients: &[
            "Flour",
            "Peanut Butter",
            "Butter",
            "Sugar",
            "Brown Sugar",
            "Eggs",
            "Baking Soda",
            "Salt",
        ],
        allergens: &["Gluten", "Dairy", "Eggs", "Peanuts"],
        is_featured: true,
    },
    SeedProduct {
        name: "Sugar Cookie",
        description: "Simple yet delicious sugar cookies, perfect for decorating.",
        price_cents: 200,
        ingredients: &[
            "Flour",
            "Butter",
            "Sugar",
            "Eggs",
            "Vanilla Extract",
            "Baking Powder",
            "Salt",
        ],
        allergens: &["Gluten", "Dairy", "Eggs"],
        is_featured: false,
    },
    SeedProduct {
        name: "Double Chocolate Fudge",
        description: "For the true chocolate lover, a decadent double chocolate cookie with fudge chunks.",
        price_cents: 300,
        ingredients: &[
            "Flour",
            "Cocoa Powder",
            "Butter",
            "Sugar",
            "Eggs",
            "Chocolate Chunks",
            "Baking Soda",
            "Salt",
        ],
        allergens: &["Gluten", "Dairy", "Eggs"],
        is_featured: true,
    },
];

impl SeedProduct {
    fn to_new_product(&self) -> Result<NewProduct, SeedError> {
        let price = Price::from_cents(self.price_cents).map_err(|source| SeedError::Price {
            name: self.name,
            source,
        })?;

        Ok(NewProduct {
            name: self.name.to_owned(),
            description: self.description.to_owned(),
            price,
            image_url: PLACEHOLDER_IMAGE.to_owned(),
            ingredients: self.ingredients.iter().map(|s| (*s).to_owned()).collect(),
            allergens: self.allergens.iter().map(|s| (*s).to_owned()).collect(),
            is_available: true,
            is_featured: self.is_featured,
        })
    }
}

/// Insert the starter catalog if the products table is empty.
///
/// Returns the number of products inserted.
pub async fn products() -> Result<usize, SeedError> {
    let database_url = database_url().ok_or(SeedError::MissingEnvVar(DATABASE_URL_VAR))?;
    let pool = connect(&database_url).await?;
    let repo = ProductRepository::new(&pool);

    let existing = repo.count().await?;
    if existing > 0 {
        tracing::info!("Catalog already has {existing} product(s), skipping seed");
        return Ok(0);
    }

    let products = STARTER_CATALOG
        .iter()
        .map(SeedProduct::to_new_product)
        .collect::<Result<Vec<_>, _>>()?;

    for product in &products {
        let created = repo.create(product).await?;
        tracing::info!(product_id = %created.id, "Seeded {}", created.name);
    }

    tracing::info!("Seeded {} products", products.len());
    Ok(products.len())
}
