//! Cart Items Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as, query_scalar};
use uuid::Uuid;

use crate::{
    auth::UserUuid,
    domain::{
        carts::models::{CartItem, CartItemUuid},
        catalog::{models::ProductUuid, try_get_stock},
    },
};

const GET_CART_ITEMS_SQL: &str = include_str!("sql/get_cart_items.sql");
const GET_CART_ITEM_SQL: &str = include_str!("sql/get_cart_item.sql");
const UPSERT_CART_ITEM_SQL: &str = include_str!("sql/upsert_cart_item.sql");
const INSERT_CART_ITEM_SQL: &str = include_str!("sql/insert_cart_item.sql");
const UPDATE_CART_ITEM_SQL: &str = include_str!("sql/update_cart_item.sql");
const DELETE_CART_ITEM_SQL: &str = include_str!("sql/delete_cart_item.sql");
const CLEAR_CART_SQL: &str = include_str!("sql/clear_cart.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgCartItemsRepository;

impl PgCartItemsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn get_cart_items(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
    ) -> Result<Vec<CartItem>, sqlx::Error> {
        query_as::<Postgres, CartItem>(GET_CART_ITEMS_SQL)
            .bind(user.into_uuid())
            .fetch_all(&mut **tx)
            .await
    }

    pub(crate) async fn get_cart_item(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
        item: CartItemUuid,
    ) -> Result<CartItem, sqlx::Error> {
        query_as::<Postgres, CartItem>(GET_CART_ITEM_SQL)
            .bind(item.into_uuid())
            .bind(user.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    /// Insert a line or add `quantity` to the user's existing line for the product.
    pub(crate) async fn upsert_cart_item(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
        product: ProductUuid,
        quantity: i32,
    ) -> Result<CartItemUuid, sqlx::Error> {
        let uuid: Uuid = query_scalar(UPSERT_CART_ITEM_SQL)
            .bind(CartItemUuid::new().into_uuid())
            .bind(user.into_uuid())
            .bind(product.into_uuid())
            .bind(quantity)
            .fetch_one(&mut **tx)
            .await?;

        Ok(CartItemUuid::from_uuid(uuid))
    }

    pub(crate) async fn insert_cart_item(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
        product: ProductUuid,
        quantity: i32,
    ) -> Result<(), sqlx::Error> {
        query(INSERT_CART_ITEM_SQL)
            .bind(CartItemUuid::new().into_uuid())
            .bind(user.into_uuid())
            .bind(product.into_uuid())
            .bind(quantity)
            .execute(&mut **tx)
            .await?;

        Ok(())
    }

    pub(crate) async fn update_cart_item(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
        item: CartItemUuid,
        quantity: i32,
    ) -> Result<(), sqlx::Error> {
        query_scalar::<Postgres, Uuid>(UPDATE_CART_ITEM_SQL)
            .bind(item.into_uuid())
            .bind(user.into_uuid())
            .bind(quantity)
            .fetch_one(&mut **tx)
            .await?;

        Ok(())
    }

    pub(crate) async fn delete_cart_item(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
        item: CartItemUuid,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(DELETE_CART_ITEM_SQL)
            .bind(item.into_uuid())
            .bind(user.into_uuid())
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    pub(crate) async fn clear_cart(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(CLEAR_CART_SQL)
            .bind(user.into_uuid())
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }
}

impl<'r> FromRow<'r, PgRow> for CartItem {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let quantity_i32: i32 = row.try_get("quantity")?;

        let quantity = u32::try_from(quantity_i32).map_err(|e| sqlx::Error::ColumnDecode {
            index: "quantity".to_string(),
            source: Box::new(e),
        })?;

        Ok(Self {
            uuid: CartItemUuid::from_uuid(row.try_get("uuid")?),
            product_uuid: ProductUuid::from_uuid(row.try_get("product_uuid")?),
            name: row.try_get("name")?,
            image_url: row.try_get("image_url")?,
            price: row.try_get("price")?,
            list_price: row.try_get("list_price")?,
            stock: try_get_stock(row)?,
            quantity,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}
