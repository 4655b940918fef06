//! Typed access to the new-bill form and assembly of the submitted bill.
//!
//! The containers never query a rendering technology for input values. They
//! read a fixed set of [`FormField`]s through the [`FormValues`] trait, which a
//! view layer implements however it likes.

use crate::{
    entities::{Bill, BillStatus, ExpenseType},
    errors::ValidationError,
};
use chrono::NaiveDate;
use std::collections::HashMap;
use std::fmt;
use tracing::debug;

/// Input fields of the new-bill form.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FormField {
    ExpenseType,
    ExpenseName,
    Amount,
    Date,
    Vat,
    Pct,
    Commentary,
}

impl FormField {
    /// Stable identifier of the field in the rendered form.
    #[must_use]
    pub const fn test_id(self) -> &'static str {
        match self {
            Self::ExpenseType => "expense-type",
            Self::ExpenseName => "expense-name",
            Self::Amount => "amount",
            Self::Date => "datepicker",
            Self::Vat => "vat",
            Self::Pct => "pct",
            Self::Commentary => "commentary",
        }
    }
}

impl fmt::Display for FormField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.test_id())
    }
}

/// Source of raw form input. Missing fields read as the empty string.
pub trait FormValues {
    /// Current raw value of `field`.
    fn value(&self, field: FormField) -> String;
}

impl FormValues for HashMap<FormField, String> {
    fn value(&self, field: FormField) -> String {
        self.get(&field).cloned().unwrap_or_default()
    }
}

/// Plain struct implementation of [`FormValues`], convenient for callers that
/// already hold every value.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NewBillForm {
    pub expense_type: String,
    pub expense_name: String,
    pub amount: String,
    pub date: String,
    pub vat: String,
    pub pct: String,
    pub commentary: String,
}

impl FormValues for NewBillForm {
    fn value(&self, field: FormField) -> String {
        match field {
            FormField::ExpenseType => self.expense_type.clone(),
            FormField::ExpenseName => self.expense_name.clone(),
            FormField::Amount => self.amount.clone(),
            FormField::Date => self.date.clone(),
            FormField::Vat => self.vat.clone(),
            FormField::Pct => self.pct.clone(),
            FormField::Commentary => self.commentary.clone(),
        }
    }
}

/// Parses the leading integer of `input` the way browsers' `parseInt` does:
/// leading whitespace, an optional sign, then as many digits as are present.
/// Returns `None` when no digit is found or the value overflows.
#[must_use]
pub fn parse_int(input: &str) -> Option<i64> {
    let trimmed = input.trim_start();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    let digits_len = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits_len == 0 {
        return None;
    }
    let magnitude: i64 = rest[..digits_len].parse().ok()?;
    Some(if negative { -magnitude } else { magnitude })
}

/// Upload metadata staged by a successful file change.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StagedUpload {
    /// Location of the stored receipt
    pub file_url: String,
    /// Original name of the selected file
    pub file_name: String,
    /// Store key of the upload record
    pub key: String,
}

/// Assembles the bill to submit from form input, session email and staged upload.
///
/// The name must be non-blank, the date must be `YYYY-MM-DD`, the amount must
/// start with an integer and the type must be a known category. A blank or
/// non-numeric `pct` silently becomes `default_pct`.
pub fn build_bill(
    form: &dyn FormValues,
    email: &str,
    upload: &StagedUpload,
    default_pct: i64,
) -> Result<Bill, ValidationError> {
    let expense_type: ExpenseType = form.value(FormField::ExpenseType).parse()?;

    let name = form.value(FormField::ExpenseName);
    if name.trim().is_empty() {
        return Err(ValidationError::MissingField {
            field: FormField::ExpenseName,
        });
    }

    let date = form.value(FormField::Date);
    if date.trim().is_empty() {
        return Err(ValidationError::MissingField {
            field: FormField::Date,
        });
    }
    let date = date.trim().to_string();
    if NaiveDate::parse_from_str(&date, "%Y-%m-%d").is_err() {
        return Err(ValidationError::InvalidDate { value: date });
    }

    let raw_amount = form.value(FormField::Amount);
    let amount =
        parse_int(&raw_amount).ok_or(ValidationError::InvalidAmount { value: raw_amount })?;

    let raw_pct = form.value(FormField::Pct);
    let pct = parse_int(&raw_pct).unwrap_or_else(|| {
        debug!(raw = %raw_pct, default_pct, "pct not numeric, using default");
        default_pct
    });

    Ok(Bill {
        id: None,
        email: email.to_string(),
        expense_type,
        name,
        amount,
        date,
        vat: Some(form.value(FormField::Vat)),
        pct,
        commentary: Some(form.value(FormField::Commentary)),
        file_url: Some(upload.file_url.clone()),
        file_name: Some(upload.file_name.clone()),
        status: BillStatus::Pending,
    })
}
