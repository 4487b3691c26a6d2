//! Daily balance calculation and expense aggregation.
//!
//! The daily balance is the monthly income spread over [DAYS_PER_MONTH] days,
//! adjusted by every income and expense the user has recorded:
//!
//! ```text
//! daily balance = income / 30 + sum(income values) - sum(expense values)
//! ```

use std::collections::BTreeMap;

use crate::transaction::{Transaction, TransactionType};

/// The number of days a monthly income is spread over.
pub const DAYS_PER_MONTH: f64 = 30.0;

/// The daily balance of a user that has not recorded any transactions yet.
pub fn initial_daily_balance(monthly_income: f64) -> f64 {
    monthly_income / DAYS_PER_MONTH
}

/// Calculate how much a user can spend per day.
///
/// Income transactions add their value and expenses subtract theirs. The
/// order of `transactions` does not matter. No rounding is applied and
/// `monthly_income` is not validated, so zero or negative incomes pass
/// straight through.
///
/// # Examples
///
/// ```
/// use daily_budget::compute_daily_balance;
///
/// assert_eq!(compute_daily_balance(3000.0, &[]), 100.0);
/// ```
pub fn compute_daily_balance(monthly_income: f64, transactions: &[Transaction]) -> f64 {
    let net_transactions: f64 = transactions.iter().map(Transaction::signed_value).sum();

    initial_daily_balance(monthly_income) + net_transactions
}

/// Sum the value of expenses per category.
///
/// Income transactions are ignored, so categories that only contain income do
/// not appear in the result. The map is ordered by category name.
pub fn expenses_by_category(transactions: &[Transaction]) -> BTreeMap<String, f64> {
    let mut totals = BTreeMap::new();

    for transaction in transactions
        .iter()
        .filter(|transaction| transaction.kind == TransactionType::Expense)
    {
        *totals.entry(transaction.category.clone()).or_insert(0.0) += transaction.value;
    }

    totals
}
