//! Test helpers.

use std::sync::Arc;

use bookstore_app::{
    auth::MockAuthService,
    context::AppContext,
    domain::{
        books::MockBooksService,
        carts::MockCartsService,
        categories::MockCategoriesService,
        orders::MockOrdersService,
        payments::MockPaymentsService,
        reports::MockReportsService,
        users::records::{Actor, Role, UserUuid},
    },
};
use salvo::{affix_state::inject, prelude::*};
use uuid::Uuid;

use crate::{extensions::*, state::State};

pub(crate) const TEST_CUSTOMER: Actor = Actor::new(
    UserUuid::from_uuid(Uuid::from_u128(0x0001)),
    Role::Customer,
);

pub(crate) const TEST_SELLER: Actor =
    Actor::new(UserUuid::from_uuid(Uuid::from_u128(0x0002)), Role::Seller);

pub(crate) const TEST_ADMIN: Actor =
    Actor::new(UserUuid::from_uuid(Uuid::from_u128(0x0003)), Role::Admin);

/// Mocked services for one test. Any mock left untouched fails the test if called.
#[derive(Debug)]
pub(crate) struct TestState {
    auth: MockAuthService,
    categories: MockCategoriesService,
    books: MockBooksService,
    carts: MockCartsService,
    orders: MockOrdersService,
    payments: MockPaymentsService,
    reports: MockReportsService,
}

impl TestState {
    pub(crate) fn new() -> Self {
        Self {
            auth: MockAuthService::new(),
            categories: MockCategoriesService::new(),
            books: MockBooksService::new(),
            carts: MockCartsService::new(),
            orders: MockOrdersService::new(),
            payments: MockPaymentsService::new(),
            reports: MockReportsService::new(),
        }
    }

    pub(crate) fn auth(mut self, auth: MockAuthService) -> Self {
        self.auth = auth;
        self
    }

    pub(crate) fn categories(mut self, categories: MockCategoriesService) -> Self {
        self.categories = categories;
        self
    }

    pub(crate) fn books(mut self, books: MockBooksService) -> Self {
        self.books = books;
        self
    }

    pub(crate) fn carts(mut self, carts: MockCartsService) -> Self {
        self.carts = carts;
        self
    }

    pub(crate) fn orders(mut self, orders: MockOrdersService) -> Self {
        self.orders = orders;
        self
    }

    pub(crate) fn payments(mut self, payments: MockPaymentsService) -> Self {
        self.payments = payments;
        self
    }

    pub(crate) fn reports(mut self, reports: MockReportsService) -> Self {
        self.reports = reports;
        self
    }

    fn into_state(self) -> Arc<State> {
        let app = AppContext {
            auth: Arc::new(self.auth),
            categories: Arc::new(self.categories),
            books: Arc::new(self.books),
            carts: Arc::new(self.carts),
            orders: Arc::new(self.orders),
            payments: Arc::new(self.payments),
            reports: Arc::new(self.reports),
        };

        Arc::new(State::new(app, false))
    }
}

#[derive(Debug)]
struct InjectActor(Actor);

#[handler]
impl InjectActor {
    async fn handle(
        &self,
        req: &mut Request,
        depot: &mut Depot,
        res: &mut Response,
        ctrl: &mut FlowCtrl,
    ) {
        depot.insert_actor(self.0);
        ctrl.call_next(req, depot, res).await;
    }
}

/// Serve `route` with mocked state and no caller.
pub(crate) fn service_with_state(state: TestState, route: Router) -> Service {
    Service::new(
        Router::new()
            .hoop(inject(state.into_state()))
            .push(route),
    )
}

/// Serve `route` with mocked state as an already-authenticated `actor`.
pub(crate) fn service_as(actor: Actor, state: TestState, route: Router) -> Service {
    Service::new(
        Router::new()
            .hoop(inject(state.into_state()))
            .hoop(InjectActor(actor))
            .push(route),
    )
}
