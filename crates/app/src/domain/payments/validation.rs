//! Payment input validation.
//!
//! Everything here runs before a transaction is opened, so a rejected payment
//! writes nothing.

use std::fmt::{Display, Formatter, Result as FmtResult};

use thiserror::Error;
use validator::ValidateEmail;
use zeroize::Zeroizing;

use crate::domain::payments::{
    data::{BillingDetails, CardDetails, NewPayment},
    records::PaymentMethod,
};

const NAME_MAX: usize = 255;
const SHORT_MAX: usize = 20;
const NOTES_MAX: usize = 1_000;
const EXPIRY_MAX: usize = 10;
const CARD_DIGITS: std::ops::RangeInclusive<usize> = 12..=19;
const CVC_DIGITS: std::ops::RangeInclusive<usize> = 3..=4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FieldProblem {
    #[error("is required")]
    Required,

    #[error("must be at most {0} characters")]
    TooLong(usize),

    #[error("is not a valid email address")]
    InvalidEmail,

    #[error("must contain 12 to 19 digits")]
    InvalidCardNumber,

    #[error("must be 3 or 4 digits")]
    InvalidCvc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{field} {problem}")]
pub struct FieldError {
    pub field: &'static str,
    pub problem: FieldProblem,
}

/// Every problem found in a payment request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    #[must_use]
    pub fn fields(&self) -> &[FieldError] {
        &self.0
    }
}

impl Display for ValidationErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        for (position, error) in self.0.iter().enumerate() {
            if position > 0 {
                f.write_str("; ")?;
            }

            write!(f, "{error}")?;
        }

        Ok(())
    }
}

/// A payment that passed validation. Holds the only card data that may be stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedPayment {
    pub card_last_four: Option<String>,
}

#[derive(Default)]
struct Collector(Vec<FieldError>);

impl Collector {
    fn push(&mut self, field: &'static str, problem: FieldProblem) {
        self.0.push(FieldError { field, problem });
    }

    fn required(&mut self, field: &'static str, value: &str, max: usize) {
        if value.trim().is_empty() {
            self.push(field, FieldProblem::Required);
        } else {
            self.at_most(field, value, max);
        }
    }

    fn optional(&mut self, field: &'static str, value: Option<&str>, max: usize) {
        if let Some(value) = value {
            self.at_most(field, value, max);
        }
    }

    fn at_most(&mut self, field: &'static str, value: &str, max: usize) {
        if value.chars().count() > max {
            self.push(field, FieldProblem::TooLong(max));
        }
    }
}

fn check_billing(errors: &mut Collector, billing: &BillingDetails) {
    errors.required("first_name", &billing.first_name, NAME_MAX);
    errors.required("last_name", &billing.last_name, NAME_MAX);
    errors.required("country", &billing.country, NAME_MAX);
    errors.required("street_address", &billing.street_address, NAME_MAX);
    errors.required("town_city", &billing.town_city, NAME_MAX);
    errors.required("state_county", &billing.state_county, NAME_MAX);
    errors.required("postcode", &billing.postcode, SHORT_MAX);
    errors.required("phone", &billing.phone, SHORT_MAX);
    errors.required("email", &billing.email, NAME_MAX);

    if !billing.email.trim().is_empty() && !billing.email.validate_email() {
        errors.push("email", FieldProblem::InvalidEmail);
    }

    errors.optional("order_notes", billing.order_notes.as_deref(), NOTES_MAX);
}

/// Last four digits of a well-formed card, or the problems with it.
fn check_card(errors: &mut Collector, card: Option<&CardDetails>) -> Option<String> {
    let Some(card) = card else {
        errors.push("card_number", FieldProblem::Required);
        errors.push("card_expiry", FieldProblem::Required);
        errors.push("card_cvc", FieldProblem::Required);

        return None;
    };

    let digits: Zeroizing<String> = Zeroizing::new(
        card.number
            .chars()
            .filter(|c| !matches!(*c, ' ' | '-'))
            .collect(),
    );

    let number_ok =
        CARD_DIGITS.contains(&digits.len()) && digits.chars().all(|c| c.is_ascii_digit());

    if card.number.trim().is_empty() {
        errors.push("card_number", FieldProblem::Required);
    } else if !number_ok {
        errors.push("card_number", FieldProblem::InvalidCardNumber);
    }

    errors.required("card_expiry", &card.expiry, EXPIRY_MAX);

    if card.cvc.trim().is_empty() {
        errors.push("card_cvc", FieldProblem::Required);
    } else if !CVC_DIGITS.contains(&card.cvc.len())
        || !card.cvc.chars().all(|c| c.is_ascii_digit())
    {
        errors.push("card_cvc", FieldProblem::InvalidCvc);
    }

    if !number_ok {
        return None;
    }

    digits
        .get(digits.len().saturating_sub(4)..)
        .map(ToString::to_string)
}

/// Validate a payment request before anything is written.
///
/// # Errors
///
/// Returns every field problem found.
pub fn validate_payment(payment: &NewPayment) -> Result<ValidatedPayment, ValidationErrors> {
    let mut errors = Collector::default();

    check_billing(&mut errors, &payment.billing);

    errors.optional("transaction_id", payment.transaction_id.as_deref(), NAME_MAX);
    errors.optional("location", payment.location.as_deref(), NAME_MAX);

    let card_last_four = match payment.method {
        PaymentMethod::Card => check_card(&mut errors, payment.card.as_ref()),
        PaymentMethod::Cash => None,
    };

    if !errors.0.is_empty() {
        return Err(ValidationErrors(errors.0));
    }

    Ok(ValidatedPayment { card_last_four })
}

#[cfg(test)]
mod tests {
    use crate::{
        domain::{orders::records::OrderUuid, payments::records::PaymentState},
        test::{billing_details as billing, card_details as card},
    };

    use super::*;

    fn payment(method: PaymentMethod, card: Option<CardDetails>) -> NewPayment {
        NewPayment {
            order: OrderUuid::new(),
            method,
            status: PaymentState::Completed,
            transaction_id: None,
            billing: billing(),
            card,
            location: None,
        }
    }

    fn problems(
        result: Result<ValidatedPayment, ValidationErrors>,
    ) -> Vec<(&'static str, FieldProblem)> {
        result
            .err()
            .map(|errors| {
                errors
                    .fields()
                    .iter()
                    .map(|error| (error.field, error.problem))
                    .collect()
            })
            .unwrap_or_default()
    }

    #[test]
    fn card_payment_keeps_only_last_four_digits() {
        let result = validate_payment(&payment(
            PaymentMethod::Card,
            Some(card("4242-4242 4242-1234")),
        ));

        assert_eq!(
            result,
            Ok(ValidatedPayment {
                card_last_four: Some("1234".to_string()),
            })
        );
    }

    #[test]
    fn cash_payment_ignores_card_fields() {
        let result = validate_payment(&payment(PaymentMethod::Cash, Some(card("nonsense"))));

        assert_eq!(result, Ok(ValidatedPayment { card_last_four: None }));
    }

    #[test]
    fn card_payment_requires_card_details() {
        let found = problems(validate_payment(&payment(PaymentMethod::Card, None)));

        assert_eq!(
            found,
            vec![
                ("card_number", FieldProblem::Required),
                ("card_expiry", FieldProblem::Required),
                ("card_cvc", FieldProblem::Required),
            ]
        );
    }

    #[test]
    fn malformed_card_number_and_cvc_are_rejected() {
        let mut bad = card("4242 4242");
        bad.cvc = "12a".to_string();

        let found = problems(validate_payment(&payment(PaymentMethod::Card, Some(bad))));

        assert_eq!(
            found,
            vec![
                ("card_number", FieldProblem::InvalidCardNumber),
                ("card_cvc", FieldProblem::InvalidCvc),
            ]
        );
    }

    #[test]
    fn billing_fields_are_required_and_bounded() {
        let mut request = payment(PaymentMethod::Cash, None);

        request.billing.first_name = "  ".to_string();
        request.billing.postcode = "1".repeat(21);
        request.billing.email = "not-an-email".to_string();
        request.billing.order_notes = Some("n".repeat(1_001));

        let found = problems(validate_payment(&request));

        assert_eq!(
            found,
            vec![
                ("first_name", FieldProblem::Required),
                ("postcode", FieldProblem::TooLong(20)),
                ("email", FieldProblem::InvalidEmail),
                ("order_notes", FieldProblem::TooLong(1_000)),
            ]
        );

        for email in [
            "<script>@x.com",
            "a@-bad-.com",
            "a@x.c\0m",
            "a\"b@x.com",
            "two@@x.com",
            "spaced out@x.com",
        ] {
            let mut request = payment(PaymentMethod::Cash, None);
            request.billing.email = email.to_string();

            assert_eq!(
                problems(validate_payment(&request)),
                vec![("email", FieldProblem::InvalidEmail)],
                "{email:?} should be rejected"
            );
        }
    }

    #[test]
    fn ordinary_email_addresses_are_accepted() {
        for email in ["ada@example.com", "first.last+books@mail.example.co.uk"] {
            let mut request = payment(PaymentMethod::Cash, None);
            request.billing.email = email.to_string();

            assert_eq!(
                validate_payment(&request),
                Ok(ValidatedPayment { card_last_four: None }),
                "{email:?} should be accepted"
            );
        }
    }

    #[test]
    fn errors_render_as_one_message() {
        let errors = ValidationErrors(vec![
            FieldError {
                field: "phone",
                problem: FieldProblem::Required,
            },
            FieldError {
                field: "email",
                problem: FieldProblem::InvalidEmail,
            },
        ]);

        assert_eq!(
            errors.to_string(),
            "phone is required; email is not a valid email address"
        );
    }
}
