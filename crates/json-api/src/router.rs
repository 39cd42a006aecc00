//! App Router

use salvo::Router;

use crate::{auth, books, carts, categories, orders, payments, reports};

pub(crate) fn app_router() -> Router {
    Router::new()
        .push(
            Router::new()
                .hoop(auth::middleware::optional)
                .push(Router::with_path("payments").post(payments::create::handler)),
        )
        .push(
            Router::new()
                .hoop(auth::middleware::handler)
                .push(
                    Router::with_path("categories")
                        .get(categories::index::handler)
                        .post(categories::create::handler),
                )
                .push(
                    Router::with_path("books")
                        .get(books::index::handler)
                        .post(books::create::handler)
                        .push(Router::with_path("requested").get(books::requested::handler))
                        .push(Router::with_path("mine").get(books::mine::handler))
                        .push(
                            Router::with_path("{book}")
                                .get(books::get::handler)
                                .put(books::update::handler)
                                .delete(books::delete::handler)
                                .push(Router::with_path("approve").post(books::moderate::approve))
                                .push(Router::with_path("reject").post(books::moderate::reject)),
                        ),
                )
                .push(
                    Router::with_path("cart").get(carts::get::handler).push(
                        Router::with_path("items")
                            .post(carts::items::create::handler)
                            .push(
                                Router::with_path("{item}")
                                    .put(carts::items::update::handler)
                                    .delete(carts::items::delete::handler),
                            ),
                    ),
                )
                .push(
                    Router::with_path("orders")
                        .get(orders::index::handler)
                        .post(orders::create::handler)
                        .push(
                            Router::with_path("{order}")
                                .get(orders::get::handler)
                                .delete(orders::delete::handler)
                                .push(Router::with_path("status").put(orders::status::handler))
                                .push(Router::with_path("cancel").post(orders::cancel::handler)),
                        ),
                )
                .push(
                    Router::with_path("payments")
                        .get(payments::index::handler)
                        .push(Router::with_path("mine").get(payments::mine::handler))
                        .push(
                            Router::with_path("{payment}")
                                .get(payments::get::handler)
                                .push(Router::with_path("status").put(payments::status::handler)),
                        ),
                )
                .push(Router::with_path("seller/sales").get(reports::seller_sales::handler))
                .push(Router::with_path("admin/orders").get(reports::admin_orders::handler)),
        )
}
