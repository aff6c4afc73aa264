//! Catalog
//!
//! Components and computers share one set of handlers; the category is chosen by the
//! hoop mounted on each resource path.

mod errors;
pub(crate) mod handlers;
pub(crate) mod models;

use rigforge_app::domain::catalog::models::Category;
use salvo::prelude::*;

use crate::extensions::*;

pub(crate) use handlers::*;

#[salvo::handler]
pub(crate) async fn components(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
    ctrl: &mut FlowCtrl,
) {
    depot.insert_category(Category::Component);

    ctrl.call_next(req, depot, res).await;
}

#[salvo::handler]
pub(crate) async fn computers(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
    ctrl: &mut FlowCtrl,
) {
    depot.insert_category(Category::Computer);

    ctrl.call_next(req, depot, res).await;
}

/// Collection path a category is served under.
pub(crate) const fn collection_path(category: Category) -> &'static str {
    match category {
        Category::Component => "/components",
        Category::Computer => "/computers",
    }
}
