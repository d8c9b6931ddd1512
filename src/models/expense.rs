use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize, Serializer};
use std::collections::HashMap;
use uuid::Uuid;
use validator::Validate;

use super::{deserialize_some, text_enum};
use crate::errors::AppError;
use crate::utils::validation::validate_payload;

/// Largest storable amount, `99999999.99` in major units.
pub const MAX_AMOUNT_CENTS: i64 = 9_999_999_999;
pub const DEFAULT_CURRENCY: &str = "USD";

text_enum! {
    pub enum ExpenseCategory {
        Food => "food",
        Transport => "transport",
        Accommodation => "accommodation",
        Activities => "activities",
        Shopping => "shopping",
        Other => "other",
    }
    default = Other;
}

/// Money in minor units. Serialized as a decimal number of major units.
#[derive(sqlx::Type, Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[sqlx(transparent)]
pub struct Cents(pub i64);

impl Serialize for Cents {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.0 as f64 / 100.0)
    }
}

impl std::ops::Add for Cents {
    type Output = Cents;

    fn add(self, other: Cents) -> Cents {
        Cents(self.0 + other.0)
    }
}

impl std::iter::Sum for Cents {
    fn sum<I: Iterator<Item = Cents>>(iter: I) -> Cents {
        iter.fold(Cents::default(), |acc, c| acc + c)
    }
}

/// Converts a client amount to cents, rejecting anything finer than a cent.
pub fn to_cents(amount: f64) -> Result<Cents, AppError> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(AppError::BadRequest("Amount must be greater than 0".to_string()));
    }
    let scaled = amount * 100.0;
    let cents = scaled.round();
    if (scaled - cents).abs() > 1e-3 {
        return Err(AppError::BadRequest(
            "Amount must have at most 2 decimal places".to_string(),
        ));
    }
    if cents < 1.0 {
        return Err(AppError::BadRequest("Amount must be greater than 0".to_string()));
    }
    if cents > MAX_AMOUNT_CENTS as f64 {
        return Err(AppError::BadRequest(
            "Amount must be at most 99999999.99".to_string(),
        ));
    }
    Ok(Cents(cents as i64))
}

/// Uppercases a three-letter ISO 4217 code.
pub fn normalize_currency(code: &str) -> Result<String, AppError> {
    let code = code.trim();
    if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(AppError::BadRequest(
            "Currency must be a three-letter ISO 4217 code".to_string(),
        ));
    }
    Ok(code.to_ascii_uppercase())
}

fn default_currency() -> String {
    DEFAULT_CURRENCY.to_string()
}

#[derive(sqlx::FromRow, Serialize, Debug, Clone)]
pub struct Expense {
    pub id: Uuid,
    pub trip_id: Uuid,
    pub title: String,
    #[serde(rename = "amount")]
    pub amount_cents: Cents,
    pub currency: String,
    pub category: ExpenseCategory,
    pub date: NaiveDate,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Deserialize, Validate, Debug)]
pub struct NewExpense {
    pub trip_id: Uuid,
    #[validate(length(min = 1, max = 255, message = "Title must be between 1 and 255 characters"))]
    pub title: String,
    pub amount: f64,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default)]
    pub category: ExpenseCategory,
    pub date: NaiveDate,
    pub notes: Option<String>,
}

impl NewExpense {
    pub fn validate_all(&self) -> Result<(), AppError> {
        validate_payload(self)?;
        to_cents(self.amount)?;
        normalize_currency(&self.currency)?;
        Ok(())
    }
}

#[derive(Deserialize, Validate, Debug, Default)]
pub struct ExpensePatch {
    #[validate(length(min = 1, max = 255, message = "Title must be between 1 and 255 characters"))]
    pub title: Option<String>,
    pub amount: Option<f64>,
    pub currency: Option<String>,
    pub category: Option<ExpenseCategory>,
    pub date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub notes: Option<Option<String>>,
}

impl ExpensePatch {
    pub fn apply(self, expense: &mut Expense) -> Result<(), AppError> {
        validate_payload(&self)?;
        let amount = self.amount.map(to_cents).transpose()?;
        let currency = self.currency.as_deref().map(normalize_currency).transpose()?;

        if let Some(title) = self.title {
            expense.title = title;
        }
        if let Some(amount) = amount {
            expense.amount_cents = amount;
        }
        if let Some(currency) = currency {
            expense.currency = currency;
        }
        if let Some(category) = self.category {
            expense.category = category;
        }
        if let Some(date) = self.date {
            expense.date = date;
        }
        if let Some(notes) = self.notes {
            expense.notes = notes;
        }
        Ok(())
    }
}

/// One `(category, currency)` bucket of a trip's spending.
#[derive(sqlx::FromRow, Serialize, Debug, Clone, PartialEq)]
pub struct CategoryTotal {
    pub category: ExpenseCategory,
    pub currency: String,
    pub total_amount: Cents,
    pub count: i64,
}

#[derive(Serialize, Debug)]
pub struct ExpenseSummary {
    pub by_category: Vec<CategoryTotal>,
    pub total_amount: Cents,
    pub currency: String,
}

impl ExpenseSummary {
    pub fn from_totals(by_category: Vec<CategoryTotal>) -> Self {
        let total_amount = by_category.iter().map(|row| row.total_amount).sum();
        let currency = primary_currency(&by_category);
        ExpenseSummary {
            by_category,
            total_amount,
            currency,
        }
    }
}

/// Currency with the most expenses; ties go to the alphabetically first code.
pub fn primary_currency(rows: &[CategoryTotal]) -> String {
    let mut counts: HashMap<&str, i64> = HashMap::new();
    for row in rows {
        *counts.entry(row.currency.as_str()).or_default() += row.count;
    }
    counts
        .into_iter()
        .max_by(|a, b| a.1.cmp(&b.1).then_with(|| b.0.cmp(a.0)))
        .map(|(code, _)| code.to_string())
        .unwrap_or_else(default_currency)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(category: ExpenseCategory, currency: &str, cents: i64, count: i64) -> CategoryTotal {
        CategoryTotal {
            category,
            currency: currency.to_string(),
            total_amount: Cents(cents),
            count,
        }
    }

    #[test]
    fn amounts_convert_to_whole_cents() {
        assert_eq!(to_cents(12.5).unwrap(), Cents(1250));
        assert_eq!(to_cents(0.29).unwrap(), Cents(29));
        assert_eq!(to_cents(0.01).unwrap(), Cents(1));
        assert_eq!(to_cents(99_999_999.99).unwrap(), Cents(MAX_AMOUNT_CENTS));
    }

    #[test]
    fn invalid_amounts_are_rejected() {
        for bad in [0.0, -3.0, 0.001, 10.005, 100_000_000.0, f64::NAN, f64::INFINITY] {
            assert!(
                matches!(to_cents(bad), Err(AppError::BadRequest(_))),
                "{} accepted",
                bad
            );
        }
    }

    #[test]
    fn amount_serializes_in_major_units() {
        let value = serde_json::to_value(row(ExpenseCategory::Food, "EUR", 1999, 1)).unwrap();
        assert_eq!(value["total_amount"], serde_json::json!(19.99));
        assert_eq!(value["category"], "food");
    }

    #[test]
    fn currency_is_uppercased_and_checked() {
        assert_eq!(normalize_currency("eur").unwrap(), "EUR");
        assert!(normalize_currency("EURO").is_err());
        assert!(normalize_currency("E1R").is_err());
        assert!(normalize_currency("").is_err());
    }

    #[test]
    fn create_defaults_currency_and_category() {
        let expense: NewExpense = serde_json::from_value(serde_json::json!({
            "trip_id": Uuid::new_v4(),
            "title": "Ferry",
            "amount": 42.0,
            "date": "2025-06-02",
        }))
        .unwrap();
        assert_eq!(expense.currency, "USD");
        assert_eq!(expense.category, ExpenseCategory::Other);
        assert!(expense.validate_all().is_ok());
    }

    #[test]
    fn patch_rejects_bad_amount_without_touching_the_row() {
        let mut expense = Expense {
            id: Uuid::new_v4(),
            trip_id: Uuid::new_v4(),
            title: "Hostel".to_string(),
            amount_cents: Cents(4500),
            currency: "EUR".to_string(),
            category: ExpenseCategory::Accommodation,
            date: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            notes: Some("two nights".to_string()),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let bad: ExpensePatch =
            serde_json::from_str(r#"{"title": "Hotel", "amount": -1}"#).unwrap();
        assert!(bad.apply(&mut expense).is_err());
        assert_eq!(expense.title, "Hostel");

        let good: ExpensePatch =
            serde_json::from_str(r#"{"amount": 60.1, "currency": "gbp", "notes": null}"#).unwrap();
        good.apply(&mut expense).unwrap();
        assert_eq!(expense.amount_cents, Cents(6010));
        assert_eq!(expense.currency, "GBP");
        assert_eq!(expense.notes, None);
    }

    #[test]
    fn summary_totals_and_picks_most_used_currency() {
        let summary = ExpenseSummary::from_totals(vec![
            row(ExpenseCategory::Food, "EUR", 3000, 3),
            row(ExpenseCategory::Transport, "USD", 12000, 2),
            row(ExpenseCategory::Shopping, "USD", 500, 2),
        ]);
        assert_eq!(summary.total_amount, Cents(15500));
        assert_eq!(summary.currency, "USD");

        assert_eq!(primary_currency(&[]), "USD");
        assert_eq!(
            primary_currency(&[
                row(ExpenseCategory::Food, "JPY", 100, 1),
                row(ExpenseCategory::Food, "CHF", 100, 1),
            ]),
            "CHF"
        );
    }
}
