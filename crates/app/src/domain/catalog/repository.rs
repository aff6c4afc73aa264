//! Catalog Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as};
use uuid::Uuid;

use crate::domain::catalog::models::{
    Category, Product, ProductFields, ProductFilter, ProductUuid, StockLevel,
};

const LIST_PRODUCTS_SQL: &str = include_str!("sql/list_products.sql");
const GET_PRODUCT_SQL: &str = include_str!("sql/get_product.sql");
const CREATE_PRODUCT_SQL: &str = include_str!("sql/create_product.sql");
const UPDATE_PRODUCT_SQL: &str = include_str!("sql/update_product.sql");
const DELETE_PRODUCT_SQL: &str = include_str!("sql/delete_product.sql");
const STOCK_LEVELS_SQL: &str = include_str!("sql/stock_levels.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgCatalogRepository;

impl PgCatalogRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn list_products(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        category: Category,
        filter: &ProductFilter,
    ) -> Result<Vec<Product>, sqlx::Error> {
        query_as::<Postgres, Product>(LIST_PRODUCTS_SQL)
            .bind(category.as_str())
            .bind(non_blank(filter.kind.as_deref()))
            .bind(non_blank(filter.brand.as_deref()))
            .bind(filter.min_price)
            .bind(filter.max_price)
            .bind(non_blank(filter.search.as_deref()).map(escape_like))
            .fetch_all(&mut **tx)
            .await
    }

    pub(crate) async fn get_product(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        category: Category,
        product: ProductUuid,
    ) -> Result<Product, sqlx::Error> {
        query_as::<Postgres, Product>(GET_PRODUCT_SQL)
            .bind(product.into_uuid())
            .bind(category.as_str())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn create_product(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        category: Category,
        product: ProductUuid,
        fields: &ProductFields,
    ) -> Result<Product, sqlx::Error> {
        query_as::<Postgres, Product>(CREATE_PRODUCT_SQL)
            .bind(product.into_uuid())
            .bind(category.as_str())
            .bind(fields.name.trim())
            .bind(&fields.kind)
            .bind(&fields.brand)
            .bind(fields.price)
            .bind(fields.discount_price)
            .bind(stock_column(fields.stock)?)
            .bind(&fields.description)
            .bind(fields.image_url.as_deref())
            .bind(&fields.specs)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn update_product(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        category: Category,
        product: ProductUuid,
        fields: &ProductFields,
    ) -> Result<Product, sqlx::Error> {
        query_as::<Postgres, Product>(UPDATE_PRODUCT_SQL)
            .bind(product.into_uuid())
            .bind(category.as_str())
            .bind(fields.name.trim())
            .bind(&fields.kind)
            .bind(&fields.brand)
            .bind(fields.price)
            .bind(fields.discount_price)
            .bind(stock_column(fields.stock)?)
            .bind(&fields.description)
            .bind(fields.image_url.as_deref())
            .bind(&fields.specs)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn delete_product(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        category: Category,
        product: ProductUuid,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(DELETE_PRODUCT_SQL)
            .bind(product.into_uuid())
            .bind(category.as_str())
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    pub(crate) async fn stock_levels(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        products: &[ProductUuid],
    ) -> Result<Vec<StockLevel>, sqlx::Error> {
        let uuids: Vec<Uuid> = products.iter().map(|uuid| uuid.into_uuid()).collect();

        query_as::<Postgres, StockLevel>(STOCK_LEVELS_SQL)
            .bind(uuids)
            .fetch_all(&mut **tx)
            .await
    }
}

impl<'r> FromRow<'r, PgRow> for Product {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let category: String = row.try_get("category")?;

        let category = category
            .parse::<Category>()
            .map_err(|e| sqlx::Error::ColumnDecode {
                index: "category".to_string(),
                source: Box::new(e),
            })?;

        Ok(Self {
            uuid: ProductUuid::from_uuid(row.try_get("uuid")?),
            category,
            name: row.try_get("name")?,
            kind: row.try_get("kind")?,
            brand: row.try_get("brand")?,
            price: row.try_get("price")?,
            discount_price: row.try_get("discount_price")?,
            stock: try_get_stock(row)?,
            description: row.try_get("description")?,
            image_url: row.try_get("image_url")?,
            specs: row.try_get("specs")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}

impl<'r> FromRow<'r, PgRow> for StockLevel {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: ProductUuid::from_uuid(row.try_get("uuid")?),
            stock: try_get_stock(row)?,
        })
    }
}

pub(crate) fn try_get_stock(row: &PgRow) -> Result<u32, sqlx::Error> {
    let stock_i32: i32 = row.try_get("stock")?;

    u32::try_from(stock_i32).map_err(|e| sqlx::Error::ColumnDecode {
        index: "stock".to_string(),
        source: Box::new(e),
    })
}

fn stock_column(stock: i64) -> Result<i32, sqlx::Error> {
    i32::try_from(stock).map_err(|e| sqlx::Error::Encode(Box::new(e)))
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

/// Escape `LIKE` wildcards so user input only matches literally.
fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());

    for c in value.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }

        escaped.push(c);
    }

    escaped
}
