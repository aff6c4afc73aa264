//! Carts service.

use async_trait::async_trait;
use mockall::automock;

use crate::{
    auth::UserUuid,
    database::Db,
    domain::{
        carts::{
            errors::CartsServiceError,
            models::{Cart, CartItem, CartItemUuid, SyncItem},
            repository::PgCartItemsRepository,
        },
        catalog::models::ProductUuid,
    },
};

#[derive(Debug, Clone)]
pub struct PgCartsService {
    db: Db,
    repository: PgCartItemsRepository,
}

impl PgCartsService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgCartItemsRepository::new(),
        }
    }
}

#[async_trait]
impl CartsService for PgCartsService {
    async fn get_cart(&self, user: UserUuid) -> Result<Cart, CartsServiceError> {
        let mut tx = self.db.begin().await?;

        let items = self.repository.get_cart_items(&mut tx, user).await?;

        tx.commit().await?;

        Ok(Cart::from_items(items))
    }

    async fn add_item(
        &self,
        user: UserUuid,
        product: ProductUuid,
        quantity: i64,
    ) -> Result<CartItem, CartsServiceError> {
        let quantity = quantity_column(quantity)?;

        let mut tx = self.db.begin().await?;

        let item = self
            .repository
            .upsert_cart_item(&mut tx, user, product, quantity)
            .await?;

        let item = self.repository.get_cart_item(&mut tx, user, item).await?;

        tx.commit().await?;

        Ok(item)
    }

    async fn update_item(
        &self,
        user: UserUuid,
        item: CartItemUuid,
        quantity: i64,
    ) -> Result<CartItem, CartsServiceError> {
        let quantity = quantity_column(quantity)?;

        let mut tx = self.db.begin().await?;

        self.repository
            .update_cart_item(&mut tx, user, item, quantity)
            .await?;

        let item = self.repository.get_cart_item(&mut tx, user, item).await?;

        tx.commit().await?;

        Ok(item)
    }

    async fn remove_item(&self, user: UserUuid, item: CartItemUuid) -> Result<(), CartsServiceError> {
        let mut tx = self.db.begin().await?;

        let rows_affected = self.repository.delete_cart_item(&mut tx, user, item).await?;

        if rows_affected == 0 {
            return Err(CartsServiceError::NotFound);
        }

        tx.commit().await?;

        Ok(())
    }

    async fn clear_cart(&self, user: UserUuid) -> Result<(), CartsServiceError> {
        let mut tx = self.db.begin().await?;

        self.repository.clear_cart(&mut tx, user).await?;

        tx.commit().await?;

        Ok(())
    }

    async fn sync_cart(
        &self,
        user: UserUuid,
        items: Vec<SyncItem>,
    ) -> Result<Cart, CartsServiceError> {
        let items = fold_sync_items(items)?;

        let mut tx = self.db.begin().await?;

        self.repository.clear_cart(&mut tx, user).await?;

        for (product, quantity) in items {
            self.repository
                .insert_cart_item(&mut tx, user, product, quantity)
                .await?;
        }

        let items = self.repository.get_cart_items(&mut tx, user).await?;

        tx.commit().await?;

        Ok(Cart::from_items(items))
    }
}

#[automock]
#[async_trait]
pub trait CartsService: Send + Sync {
    /// Retrieve the user's cart, priced at the current effective product prices.
    async fn get_cart(&self, user: UserUuid) -> Result<Cart, CartsServiceError>;

    /// Add `quantity` units of a product, creating the line if needed.
    async fn add_item(
        &self,
        user: UserUuid,
        product: ProductUuid,
        quantity: i64,
    ) -> Result<CartItem, CartsServiceError>;

    /// Set the quantity of an existing line.
    async fn update_item(
        &self,
        user: UserUuid,
        item: CartItemUuid,
        quantity: i64,
    ) -> Result<CartItem, CartsServiceError>;

    /// Delete a line.
    async fn remove_item(&self, user: UserUuid, item: CartItemUuid) -> Result<(), CartsServiceError>;

    /// Delete every line of the user's cart.
    async fn clear_cart(&self, user: UserUuid) -> Result<(), CartsServiceError>;

    /// Replace the user's cart with `items`. Quantities of repeated products are summed.
    async fn sync_cart(
        &self,
        user: UserUuid,
        items: Vec<SyncItem>,
    ) -> Result<Cart, CartsServiceError>;
}

fn quantity_column(quantity: i64) -> Result<i32, CartsServiceError> {
    i32::try_from(quantity)
        .ok()
        .filter(|quantity| *quantity > 0)
        .ok_or(CartsServiceError::InvalidData(
            "quantity must be a positive integer",
        ))
}

/// Validate sync lines and sum repeated products, keeping first-seen order.
fn fold_sync_items(items: Vec<SyncItem>) -> Result<Vec<(ProductUuid, i32)>, CartsServiceError> {
    let mut folded: Vec<(ProductUuid, i32)> = Vec::with_capacity(items.len());

    for item in items {
        let quantity = quantity_column(item.quantity)?;

        match folded
            .iter_mut()
            .find(|(product, _)| *product == item.product_uuid)
        {
            Some((_, total)) => {
                *total = total
                    .checked_add(quantity)
                    .ok_or(CartsServiceError::InvalidData("quantity is out of range"))?;
            }
            None => folded.push((item.product_uuid, quantity)),
        }
    }

    Ok(folded)
}
