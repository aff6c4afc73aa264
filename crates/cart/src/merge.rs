//! Guest-into-user cart merge.

use crate::lines::CartLine;

/// Merge a guest cart into a user cart.
///
/// For every product in `guest`, its quantity is added to the user's matching line; products
/// the user does not have yet are appended verbatim, in guest order. Shared lines keep the
/// user's price snapshot.
///
/// This is an additive, last-writer-wins merge: merging the same guest cart twice counts its
/// quantities twice.
#[must_use]
pub fn merge_carts(user: Vec<CartLine>, guest: Vec<CartLine>) -> Vec<CartLine> {
    let mut merged = user;

    for guest_line in guest {
        match merged
            .iter_mut()
            .find(|line| line.product_id == guest_line.product_id)
        {
            Some(line) => line.quantity = line.quantity.saturating_add(guest_line.quantity),
            None => merged.push(guest_line),
        }
    }

    merged
}
