//! Catalog service.

use async_trait::async_trait;
use mockall::automock;

use crate::{
    database::Db,
    domain::catalog::{
        errors::CatalogServiceError,
        models::{
            Category, NewProduct, Product, ProductFields, ProductFilter, ProductUuid, StockLevel,
        },
        repository::PgCatalogRepository,
    },
};

#[derive(Debug, Clone)]
pub struct PgCatalogService {
    db: Db,
    repository: PgCatalogRepository,
}

impl PgCatalogService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgCatalogRepository::new(),
        }
    }
}

#[async_trait]
impl CatalogService for PgCatalogService {
    async fn list_products(
        &self,
        category: Category,
        filter: ProductFilter,
    ) -> Result<Vec<Product>, CatalogServiceError> {
        if let (Some(min), Some(max)) = (filter.min_price, filter.max_price)
            && min > max
        {
            return Err(CatalogServiceError::InvalidData(
                "minimum price exceeds maximum price",
            ));
        }

        let mut tx = self.db.begin().await?;

        let products = self
            .repository
            .list_products(&mut tx, category, &filter)
            .await?;

        tx.commit().await?;

        Ok(products)
    }

    async fn get_product(
        &self,
        category: Category,
        product: ProductUuid,
    ) -> Result<Product, CatalogServiceError> {
        let mut tx = self.db.begin().await?;

        let product = self
            .repository
            .get_product(&mut tx, category, product)
            .await?;

        tx.commit().await?;

        Ok(product)
    }

    async fn create_product(
        &self,
        category: Category,
        product: NewProduct,
    ) -> Result<Product, CatalogServiceError> {
        product.fields.validate()?;

        let mut tx = self.db.begin().await?;

        let created = self
            .repository
            .create_product(&mut tx, category, product.uuid, &product.fields)
            .await?;

        tx.commit().await?;

        Ok(created)
    }

    async fn update_product(
        &self,
        category: Category,
        product: ProductUuid,
        fields: ProductFields,
    ) -> Result<Product, CatalogServiceError> {
        fields.validate()?;

        let mut tx = self.db.begin().await?;

        let updated = self
            .repository
            .update_product(&mut tx, category, product, &fields)
            .await?;

        tx.commit().await?;

        Ok(updated)
    }

    async fn delete_product(
        &self,
        category: Category,
        product: ProductUuid,
    ) -> Result<(), CatalogServiceError> {
        let mut tx = self.db.begin().await?;

        let rows_affected = self
            .repository
            .delete_product(&mut tx, category, product)
            .await?;

        if rows_affected == 0 {
            return Err(CatalogServiceError::NotFound);
        }

        tx.commit().await?;

        Ok(())
    }

    async fn stock_levels(
        &self,
        products: Vec<ProductUuid>,
    ) -> Result<Vec<StockLevel>, CatalogServiceError> {
        if products.is_empty() {
            return Ok(Vec::new());
        }

        let mut tx = self.db.begin().await?;

        let levels = self.repository.stock_levels(&mut tx, &products).await?;

        tx.commit().await?;

        Ok(levels)
    }
}

#[automock]
#[async_trait]
pub trait CatalogService: Send + Sync {
    /// Retrieve the products of a category matching `filter`, oldest first.
    async fn list_products(
        &self,
        category: Category,
        filter: ProductFilter,
    ) -> Result<Vec<Product>, CatalogServiceError>;

    /// Retrieve a single product.
    async fn get_product(
        &self,
        category: Category,
        product: ProductUuid,
    ) -> Result<Product, CatalogServiceError>;

    /// Creates a new product in the given category.
    async fn create_product(
        &self,
        category: Category,
        product: NewProduct,
    ) -> Result<Product, CatalogServiceError>;

    /// Replaces the editable fields of a product.
    async fn update_product(
        &self,
        category: Category,
        product: ProductUuid,
        fields: ProductFields,
    ) -> Result<Product, CatalogServiceError>;

    /// Deletes a product with the given UUID.
    async fn delete_product(
        &self,
        category: Category,
        product: ProductUuid,
    ) -> Result<(), CatalogServiceError>;

    /// Current stock of the given products, in any category. Unknown UUIDs are omitted.
    async fn stock_levels(
        &self,
        products: Vec<ProductUuid>,
    ) -> Result<Vec<StockLevel>, CatalogServiceError>;
}
