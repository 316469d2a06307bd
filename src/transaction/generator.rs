//! Generates realistic looking mock payment transactions.
//!
//! Randomness and the current time are passed in so that callers (and tests)
//! control both.

use rand::Rng;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

use crate::{
    Error,
    transaction::core::{Transaction, TransactionStatus, TransactionType, insert_transaction},
};

/// The most transactions that can be generated in one request.
pub const MAX_GENERATE_COUNT: u32 = 1000;
/// The smallest allowed value for either amount bound.
pub const MIN_AMOUNT: f64 = 0.01;
/// The largest allowed value for either amount bound.
///
/// Keeps the sampled range, the fee and the amount in cents finite.
pub const MAX_AMOUNT: f64 = 1_000_000_000.0;
/// The furthest back in days a generated timestamp may be.
pub const MAX_DAYS_BACK: u32 = 365;

/// The percentage part of the processing fee.
const FEE_RATE: f64 = 0.029;
/// The fixed part of the processing fee.
const FIXED_FEE: f64 = 0.30;
const SECONDS_PER_DAY: i64 = 86_400;

const SAMPLE_NAMES: [&str; 14] = [
    "John Smith",
    "Sarah Johnson",
    "Michael Brown",
    "Emily Davis",
    "David Wilson",
    "Jessica Garcia",
    "Christopher Martinez",
    "Ashley Anderson",
    "Matthew Taylor",
    "Amanda Thomas",
    "Daniel Jackson",
    "Jennifer White",
    "James Harris",
    "Lisa Martin",
];

const SAMPLE_EMAILS: [&str; 12] = [
    "john.smith@email.com",
    "sarah.j@gmail.com",
    "mike.brown@yahoo.com",
    "emily.davis@outlook.com",
    "david.w@company.com",
    "jessica.g@business.org",
    "chris.m@startup.io",
    "ashley.a@freelance.net",
    "matt.t@agency.com",
    "amanda.th@consultant.biz",
    "daniel.j@enterprise.com",
    "jennifer.w@shop.store",
];

const SAMPLE_DESCRIPTIONS: [&str; 12] = [
    "Online Purchase - Electronics",
    "Digital Service Subscription",
    "Freelance Web Development",
    "Online Course Payment",
    "E-commerce Store Purchase",
    "Consulting Services",
    "Software License Fee",
    "Marketplace Commission",
    "Digital Download",
    "Monthly Subscription",
    "Product Return Refund",
    "Service Cancellation",
];

/// Most transactions complete; the rest are spread over the other statuses.
const STATUS_WEIGHTS: [(TransactionStatus, f64); 6] = [
    (TransactionStatus::Completed, 0.70),
    (TransactionStatus::Pending, 0.15),
    (TransactionStatus::Failed, 0.05),
    (TransactionStatus::Cancelled, 0.03),
    (TransactionStatus::Refunded, 0.04),
    (TransactionStatus::Disputed, 0.03),
];

/// The parameters for generating a batch of transactions.
///
/// Missing fields take their defaults when deserializing, so `{}` is a valid
/// request for ten transactions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateRequest {
    /// How many transactions to generate, `1..=1000`.
    #[serde(default = "default_count")]
    pub count: u32,
    /// Generate only this type, otherwise any type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_type: Option<TransactionType>,
    /// Generate only this status, otherwise a weighted mix.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TransactionStatus>,
    /// The lower bound for the gross amount.
    #[serde(default = "default_min_amount")]
    pub min_amount: f64,
    /// The upper bound for the gross amount.
    #[serde(default = "default_max_amount")]
    pub max_amount: f64,
    /// The currency code stamped on every transaction.
    #[serde(default = "default_currency")]
    pub currency: String,
    /// How many days back timestamps may go, `1..=365`.
    #[serde(default = "default_days_back")]
    pub days_back: u32,
}

fn default_count() -> u32 {
    10
}

fn default_min_amount() -> f64 {
    1.0
}

fn default_max_amount() -> f64 {
    1000.0
}

fn default_currency() -> String {
    "USD".to_owned()
}

fn default_days_back() -> u32 {
    30
}

impl Default for GenerateRequest {
    fn default() -> Self {
        Self {
            count: default_count(),
            transaction_type: None,
            status: None,
            min_amount: default_min_amount(),
            max_amount: default_max_amount(),
            currency: default_currency(),
            days_back: default_days_back(),
        }
    }
}

impl GenerateRequest {
    /// Check every field is within its allowed range.
    ///
    /// # Errors
    /// Returns [Error::InvalidRequest] naming the first field that is out of range.
    pub fn validate(&self) -> Result<(), Error> {
        if !(1..=MAX_GENERATE_COUNT).contains(&self.count) {
            return Err(Error::InvalidRequest(format!(
                "count must be between 1 and {MAX_GENERATE_COUNT}, got {}",
                self.count
            )));
        }

        for (name, value) in [
            ("min_amount", self.min_amount),
            ("max_amount", self.max_amount),
        ] {
            if !(MIN_AMOUNT..=MAX_AMOUNT).contains(&value) {
                return Err(Error::InvalidRequest(format!(
                    "{name} must be a number between {MIN_AMOUNT} and {MAX_AMOUNT}, got {value}"
                )));
            }
        }

        if !(1..=MAX_DAYS_BACK).contains(&self.days_back) {
            return Err(Error::InvalidRequest(format!(
                "days_back must be between 1 and {MAX_DAYS_BACK}, got {}",
                self.days_back
            )));
        }

        Ok(())
    }
}

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn choose<'a, R: Rng + ?Sized>(items: &[&'a str], rng: &mut R) -> &'a str {
    items[rng.gen_range(0..items.len())]
}

/// Pick an item that is not `excluded`. `items` must contain at least two distinct values.
fn choose_other<'a, R: Rng + ?Sized>(items: &[&'a str], excluded: &str, rng: &mut R) -> &'a str {
    loop {
        let item = choose(items, rng);

        if item != excluded {
            return item;
        }
    }
}

fn choose_status<R: Rng + ?Sized>(rng: &mut R) -> TransactionStatus {
    let total: f64 = STATUS_WEIGHTS.iter().map(|(_, weight)| weight).sum();
    let mut roll = rng.gen_range(0.0..total);

    for (status, weight) in STATUS_WEIGHTS {
        if roll < weight {
            return status;
        }

        roll -= weight;
    }

    // Only reachable through floating point rounding on the last bucket.
    TransactionStatus::Disputed
}

/// Generate a single transaction from `request` without validating it.
///
/// The timestamp is a whole second in `[now - days_back days, now]`.
pub fn generate_transaction<R: Rng + ?Sized>(
    request: &GenerateRequest,
    now: OffsetDateTime,
    rng: &mut R,
) -> Transaction {
    let (low, high) = if request.min_amount <= request.max_amount {
        (request.min_amount, request.max_amount)
    } else {
        (request.max_amount, request.min_amount)
    };

    let mut amount = round_cents(rng.gen_range(low..=high));
    let mut fee = round_cents(amount * FEE_RATE + FIXED_FEE);
    let mut net_amount = round_cents(amount - fee);

    let window = i64::from(request.days_back) * SECONDS_PER_DAY;
    let timestamp = (now - Duration::seconds(rng.gen_range(0..=window)))
        .replace_nanosecond(0)
        .unwrap_or(now);

    let payer_name = choose(&SAMPLE_NAMES, rng);
    let payer_email = choose(&SAMPLE_EMAILS, rng);
    let recipient_name = choose_other(&SAMPLE_NAMES, payer_name, rng);
    let recipient_email = choose_other(&SAMPLE_EMAILS, payer_email, rng);
    let description = choose(&SAMPLE_DESCRIPTIONS, rng);

    let transaction_type = request
        .transaction_type
        .unwrap_or_else(|| TransactionType::ALL[rng.gen_range(0..TransactionType::ALL.len())]);
    let status = request.status.unwrap_or_else(|| choose_status(rng));

    if transaction_type == TransactionType::Refund {
        amount = -amount.abs();
        fee = -fee.abs();
        net_amount = round_cents(amount - fee);
    }

    let invoice_id = rng
        .gen_bool(0.5)
        .then(|| format!("INV-{}", rng.gen_range(1000..=9999)));

    Transaction {
        id: uuid::Builder::from_random_bytes(rng.r#gen()).into_uuid(),
        transaction_id: format!("TXN{}", rng.gen_range(100_000_000..=999_999_999)),
        transaction_type,
        status,
        amount,
        currency: request.currency.clone(),
        fee,
        net_amount,
        payer_email: payer_email.to_owned(),
        payer_name: payer_name.to_owned(),
        recipient_email: recipient_email.to_owned(),
        recipient_name: recipient_name.to_owned(),
        merchant_id: format!("MERCHANT{}", rng.gen_range(100_000..=999_999)),
        description: description.to_owned(),
        invoice_id,
        timestamp,
        created_at: timestamp,
    }
}

/// Validate `request` and generate `request.count` transactions without saving them.
///
/// # Errors
/// Returns [Error::InvalidRequest] if the request is out of range.
pub fn generate_batch<R: Rng + ?Sized>(
    request: &GenerateRequest,
    now: OffsetDateTime,
    rng: &mut R,
) -> Result<Vec<Transaction>, Error> {
    request.validate()?;

    Ok((0..request.count)
        .map(|_| generate_transaction(request, now, rng))
        .collect())
}

/// Save `transactions` in a single SQL transaction, so either every
/// transaction is saved or none are.
///
/// # Errors
/// Returns [Error::SqlError] if saving fails.
pub fn save_transactions(
    transactions: &[Transaction],
    connection: &mut Connection,
) -> Result<(), Error> {
    let sql_transaction = connection.transaction()?;

    for transaction in transactions {
        insert_transaction(transaction, &sql_transaction)?;
    }

    sql_transaction.commit()?;

    Ok(())
}

/// Validate `request`, then generate and save `request.count` transactions.
///
/// Callers sharing a locked connection should call [generate_batch] before
/// taking the lock and [save_transactions] after.
///
/// # Errors
/// Returns [Error::InvalidRequest] if the request is out of range, or
/// [Error::SqlError] if saving fails.
pub fn generate_transactions<R: Rng + ?Sized>(
    request: &GenerateRequest,
    now: OffsetDateTime,
    rng: &mut R,
    connection: &mut Connection,
) -> Result<Vec<Transaction>, Error> {
    let transactions = generate_batch(request, now, rng)?;
    save_transactions(&transactions, connection)?;

    Ok(transactions)
}

#[cfg(test)]
mod generate_transaction_tests {
    use rand::{SeedableRng, rngs::StdRng};
    use time::{Duration, macros::datetime};

    use crate::transaction::{TransactionStatus, TransactionType};

    use super::{FEE_RATE, FIXED_FEE, GenerateRequest, generate_transaction, round_cents};

    const NOW: time::OffsetDateTime = datetime!(2025-06-30 12:00:00.5 UTC);

    fn generate_many(request: &GenerateRequest, count: usize) -> Vec<crate::Transaction> {
        let mut rng = StdRng::seed_from_u64(42);

        (0..count)
            .map(|_| generate_transaction(request, NOW, &mut rng))
            .collect()
    }

    #[test]
    fn amounts_are_within_bounds_and_rounded_to_cents() {
        let request = GenerateRequest {
            transaction_type: Some(TransactionType::Payment),
            min_amount: 5.0,
            max_amount: 20.0,
            ..Default::default()
        };

        for transaction in generate_many(&request, 200) {
            assert!(
                (5.0..=20.0).contains(&transaction.amount),
                "amount {} out of bounds",
                transaction.amount
            );
            assert_eq!(transaction.amount, round_cents(transaction.amount));
        }
    }

    #[test]
    fn swapped_bounds_are_accepted() {
        let request = GenerateRequest {
            transaction_type: Some(TransactionType::Payment),
            min_amount: 20.0,
            max_amount: 5.0,
            ..Default::default()
        };

        for transaction in generate_many(&request, 50) {
            assert!((5.0..=20.0).contains(&transaction.amount));
        }
    }

    #[test]
    fn fee_and_net_follow_processing_formula() {
        let request = GenerateRequest {
            transaction_type: Some(TransactionType::Payment),
            ..Default::default()
        };

        for transaction in generate_many(&request, 100) {
            let want_fee = round_cents(transaction.amount * FEE_RATE + FIXED_FEE);
            assert_eq!(transaction.fee, want_fee);
            assert_eq!(
                transaction.net_amount,
                round_cents(transaction.amount - want_fee)
            );
        }
    }

    #[test]
    fn refunds_have_negative_amount_and_fee() {
        let request = GenerateRequest {
            transaction_type: Some(TransactionType::Refund),
            ..Default::default()
        };

        for transaction in generate_many(&request, 100) {
            assert!(transaction.amount < 0.0, "got amount {}", transaction.amount);
            assert!(transaction.fee < 0.0, "got fee {}", transaction.fee);
            assert_eq!(
                transaction.net_amount,
                round_cents(transaction.amount - transaction.fee)
            );
        }
    }

    #[test]
    fn payer_and_recipient_differ() {
        for transaction in generate_many(&GenerateRequest::default(), 500) {
            assert_ne!(transaction.payer_name, transaction.recipient_name);
            assert_ne!(transaction.payer_email, transaction.recipient_email);
        }
    }

    #[test]
    fn timestamps_are_whole_seconds_within_window() {
        let request = GenerateRequest {
            days_back: 3,
            ..Default::default()
        };
        let earliest = NOW - Duration::days(3) - Duration::seconds(1);

        for transaction in generate_many(&request, 200) {
            assert!(transaction.timestamp <= NOW);
            assert!(transaction.timestamp >= earliest);
            assert_eq!(transaction.timestamp.nanosecond(), 0);
            assert_eq!(transaction.created_at, transaction.timestamp);
        }
    }

    #[test]
    fn requested_type_and_status_are_used() {
        let request = GenerateRequest {
            transaction_type: Some(TransactionType::Dispute),
            status: Some(TransactionStatus::Failed),
            ..Default::default()
        };

        for transaction in generate_many(&request, 50) {
            assert_eq!(transaction.transaction_type, TransactionType::Dispute);
            assert_eq!(transaction.status, TransactionStatus::Failed);
        }
    }

    #[test]
    fn unspecified_status_is_mostly_completed() {
        let transactions = generate_many(&GenerateRequest::default(), 1000);

        let completed = transactions
            .iter()
            .filter(|transaction| transaction.status == TransactionStatus::Completed)
            .count();

        assert!(
            (600..=800).contains(&completed),
            "want roughly 70% completed, got {completed} of 1000"
        );
    }

    #[test]
    fn references_have_expected_shape() {
        for transaction in generate_many(&GenerateRequest::default(), 100) {
            assert_eq!(transaction.id.get_version_num(), 4);

            let digits = transaction.transaction_id.strip_prefix("TXN").unwrap();
            assert_eq!(digits.len(), 9);
            assert!(digits.chars().all(|c| c.is_ascii_digit()));

            let digits = transaction.merchant_id.strip_prefix("MERCHANT").unwrap();
            assert_eq!(digits.len(), 6);

            if let Some(invoice_id) = &transaction.invoice_id {
                let digits = invoice_id.strip_prefix("INV-").unwrap();
                assert_eq!(digits.len(), 4);
            }
        }
    }

    #[test]
    fn same_seed_gives_same_transactions() {
        let request = GenerateRequest::default();

        assert_eq!(generate_many(&request, 10), generate_many(&request, 10));
    }
}

#[cfg(test)]
mod validate_tests {
    use rand::{SeedableRng, rngs::StdRng};
    use time::macros::datetime;

    use crate::Error;

    use super::{GenerateRequest, MAX_AMOUNT, generate_batch};

    #[track_caller]
    fn assert_invalid(request: GenerateRequest, field: &str) {
        match request.validate() {
            Err(Error::InvalidRequest(detail)) => assert!(
                detail.starts_with(field),
                "want error about {field}, got {detail:?}"
            ),
            other => panic!("want invalid request error about {field}, got {other:?}"),
        }
    }

    #[test]
    fn default_request_is_valid() {
        assert_eq!(GenerateRequest::default().validate(), Ok(()));
    }

    #[test]
    fn rejects_count_out_of_range() {
        assert_invalid(
            GenerateRequest {
                count: 0,
                ..Default::default()
            },
            "count",
        );
        assert_invalid(
            GenerateRequest {
                count: 1001,
                ..Default::default()
            },
            "count",
        );
    }

    #[test]
    fn rejects_tiny_or_non_finite_amounts() {
        assert_invalid(
            GenerateRequest {
                min_amount: 0.0,
                ..Default::default()
            },
            "min_amount",
        );
        assert_invalid(
            GenerateRequest {
                max_amount: f64::NAN,
                ..Default::default()
            },
            "max_amount",
        );
        assert_invalid(
            GenerateRequest {
                max_amount: f64::INFINITY,
                ..Default::default()
            },
            "max_amount",
        );
    }

    #[test]
    fn rejects_amounts_too_large_to_sample() {
        assert_invalid(
            GenerateRequest {
                max_amount: f64::MAX,
                ..Default::default()
            },
            "max_amount",
        );
        assert_invalid(
            GenerateRequest {
                min_amount: 1e308,
                max_amount: 1e308,
                ..Default::default()
            },
            "min_amount",
        );
    }

    #[test]
    fn largest_amounts_give_finite_transactions() {
        let request = GenerateRequest {
            min_amount: MAX_AMOUNT,
            max_amount: MAX_AMOUNT,
            ..Default::default()
        };
        assert_eq!(request.validate(), Ok(()));

        let mut rng = StdRng::seed_from_u64(3);
        let transactions =
            generate_batch(&request, datetime!(2025-06-30 12:00:00 UTC), &mut rng).unwrap();

        for transaction in transactions {
            assert!(transaction.amount.is_finite());
            assert!(transaction.fee.is_finite());
            assert!(transaction.net_amount.is_finite());
        }
    }

    #[test]
    fn rejects_days_back_out_of_range() {
        assert_invalid(
            GenerateRequest {
                days_back: 366,
                ..Default::default()
            },
            "days_back",
        );
    }

    #[test]
    fn empty_json_uses_defaults() {
        let request: GenerateRequest = serde_json::from_str("{}").unwrap();

        assert_eq!(request, GenerateRequest::default());
    }
}
