//! Payments service: recording payments and settling them per seller.

use async_trait::async_trait;
use mockall::automock;
use sqlx::{Postgres, Transaction};
use tracing::{Span, info};

use crate::{
    database::Db,
    domain::{
        carts::repositories::{PgCartItemsRepository, PgCartsRepository},
        orders::{
            records::{OrderUuid, PaymentStatus},
            repositories::PgOrdersRepository,
        },
        payments::{
            data::NewPayment,
            errors::PaymentsServiceError,
            records::{
                PaymentRecord, PaymentState, PaymentUuid, RecordedPayment, SellerPaymentRecord,
                pays_order,
            },
            repositories::{PgPaymentsRepository, PgSettlementsRepository},
            settlement::split_by_seller,
            validation::validate_payment,
        },
        users::records::Actor,
    },
};

#[derive(Debug, Clone)]
pub struct PgPaymentsService {
    db: Db,
    payments: PgPaymentsRepository,
    settlements: PgSettlementsRepository,
    orders: PgOrdersRepository,
    carts: PgCartsRepository,
    cart_items: PgCartItemsRepository,
}

impl PgPaymentsService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            payments: PgPaymentsRepository::new(),
            settlements: PgSettlementsRepository::new(),
            orders: PgOrdersRepository::new(),
            carts: PgCartsRepository::new(),
            cart_items: PgCartItemsRepository::new(),
        }
    }

    /// Write one settlement row per seller in the order.
    async fn settle(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
        payment: PaymentUuid,
    ) -> Result<Vec<SellerPaymentRecord>, PaymentsServiceError> {
        let lines = self.settlements.list_lines(tx, order).await?;
        let shares = split_by_seller(&lines).ok_or(PaymentsServiceError::InvalidData)?;

        let mut settlements = Vec::with_capacity(shares.len());

        for share in shares {
            settlements.push(
                self.settlements
                    .create_seller_payment(tx, order, payment, share)
                    .await?,
            );
        }

        Ok(settlements)
    }
}

#[async_trait]
impl PaymentsService for PgPaymentsService {
    #[tracing::instrument(
        name = "payments.service.record_payment",
        skip_all,
        fields(
            order_uuid = %payment.order,
            payment_method = %payment.method,
            payment_status = %payment.status,
            authenticated = actor.is_some(),
            payment_uuid = tracing::field::Empty,
            seller_count = tracing::field::Empty
        ),
        err
    )]
    async fn record_payment(
        &self,
        actor: Option<Actor>,
        payment: NewPayment,
    ) -> Result<RecordedPayment, PaymentsServiceError> {
        let validated = validate_payment(&payment)?;

        let payer = actor.map(|actor| actor.user);

        let mut tx = self.db.begin().await?;

        // Concurrent payments for one order serialize here.
        let order = self.orders.lock_order(&mut tx, payment.order).await?;

        let record = self
            .payments
            .create_payment(&mut tx, payer, &payment, validated.card_last_four.as_deref())
            .await?;

        let span = Span::current();

        span.record("payment_uuid", tracing::field::display(record.uuid));

        let order_payment_status = if pays_order(record.method, record.status) {
            self.orders
                .set_payment_status(&mut tx, order.uuid, PaymentStatus::Paid)
                .await?
                .payment_status
        } else {
            order.payment_status
        };

        let settlements = if record.status == PaymentState::Failed {
            Vec::new()
        } else {
            self.settle(&mut tx, order.uuid, record.uuid).await?
        };

        span.record("seller_count", tracing::field::display(settlements.len()));

        if let Some(user) = payer
            && let Some(cart) = self.carts.lock_cart(&mut tx, user).await?
        {
            self.cart_items.clear_items(&mut tx, cart.uuid).await?;
        }

        tx.commit().await?;

        info!(
            payment_uuid = %record.uuid,
            order_payment_status = %order_payment_status,
            "recorded payment"
        );

        Ok(RecordedPayment {
            payment: record,
            order_payment_status,
            settlements,
        })
    }

    async fn list_payments(
        &self,
        actor: Actor,
    ) -> Result<Vec<PaymentRecord>, PaymentsServiceError> {
        if !actor.is_admin() {
            return Err(PaymentsServiceError::Unauthorized);
        }

        let mut tx = self.db.begin().await?;

        let payments = self.payments.list_payments(&mut tx).await?;

        tx.commit().await?;

        Ok(payments)
    }

    async fn get_payment(
        &self,
        actor: Actor,
        payment: PaymentUuid,
    ) -> Result<PaymentRecord, PaymentsServiceError> {
        let mut tx = self.db.begin().await?;

        let payment = self.payments.get_payment(&mut tx, payment).await?;

        tx.commit().await?;

        if !actor.is_admin() && payment.user_uuid != Some(actor.user) {
            return Err(PaymentsServiceError::Unauthorized);
        }

        Ok(payment)
    }

    async fn list_user_payments(
        &self,
        actor: Actor,
    ) -> Result<Vec<PaymentRecord>, PaymentsServiceError> {
        let mut tx = self.db.begin().await?;

        let payments = self.payments.list_user_payments(&mut tx, actor.user).await?;

        tx.commit().await?;

        Ok(payments)
    }

    #[tracing::instrument(
        name = "payments.service.update_payment_status",
        skip_all,
        fields(payment_uuid = %payment, payment_status = %status),
        err
    )]
    async fn update_payment_status(
        &self,
        actor: Actor,
        payment: PaymentUuid,
        status: PaymentState,
    ) -> Result<PaymentRecord, PaymentsServiceError> {
        if !actor.is_admin() {
            return Err(PaymentsServiceError::Unauthorized);
        }

        let mut tx = self.db.begin().await?;

        let order: OrderUuid = self
            .payments
            .get_payment(&mut tx, payment)
            .await?
            .order_uuid;

        // Order before payment, the same order `record_payment` takes.
        self.orders.lock_order(&mut tx, order).await?;

        self.payments.lock_payment(&mut tx, payment).await?;

        let updated = self.payments.set_state(&mut tx, payment, status).await?;

        // Payments recorded as failed were never settled.
        if updated.status != PaymentState::Failed
            && !self.settlements.is_settled(&mut tx, payment).await?
        {
            self.settle(&mut tx, order, payment).await?;
        }

        if pays_order(updated.method, updated.status) {
            self.orders
                .set_payment_status(&mut tx, order, PaymentStatus::Paid)
                .await?;
        }

        tx.commit().await?;

        info!("updated payment status");

        Ok(updated)
    }
}

#[automock]
#[async_trait]
pub trait PaymentsService: Send + Sync {
    /// Record a payment attempt against an order in one transaction.
    ///
    /// A completed card payment marks the order paid. Unless the attempt failed,
    /// one settlement row is written per seller in the order. An authenticated
    /// payer's cart is emptied. `actor` is `None` for guest checkouts.
    async fn record_payment(
        &self,
        actor: Option<Actor>,
        payment: NewPayment,
    ) -> Result<RecordedPayment, PaymentsServiceError>;

    /// Every payment, newest first. Admin only.
    async fn list_payments(&self, actor: Actor)
    -> Result<Vec<PaymentRecord>, PaymentsServiceError>;

    /// A single payment. Visible to admins and to the user who paid.
    async fn get_payment(
        &self,
        actor: Actor,
        payment: PaymentUuid,
    ) -> Result<PaymentRecord, PaymentsServiceError>;

    /// The caller's own payments, newest first.
    async fn list_user_payments(
        &self,
        actor: Actor,
    ) -> Result<Vec<PaymentRecord>, PaymentsServiceError>;

    /// Change the status of a recorded payment. Admin only.
    ///
    /// A payment that was never settled is settled once it leaves `failed`.
    async fn update_payment_status(
        &self,
        actor: Actor,
        payment: PaymentUuid,
        status: PaymentState,
    ) -> Result<PaymentRecord, PaymentsServiceError>;
}
