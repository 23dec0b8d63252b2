//! Transaction Validator
//!
//! Request checks shared by the handlers. Order matters: callers run
//! `parse_body`, then `parse_account_number`, then `parse_amount`, then
//! `check_account` once the account is loaded.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::domain::{Account, AccountNumber, Amount, DomainError, TransactionType};
use crate::error::{AppError, AppResult};

pub const INVALID_BODY: &str = "Invalid request body";
pub const NOT_A_NUMBER: &str = "A number is expected";
pub const NO_AMOUNT: &str = "No amount entered";
pub const AMOUNT_TOO_LOW: &str = "Amount is too low";
pub const AMOUNT_TOO_HIGH: &str = "Amount is too high";
pub const AMOUNT_NOT_WHOLE: &str = "Amount must be a whole number";

/// Body of a credit/debit request
#[derive(Debug, Default, Deserialize)]
pub struct TransactionBody {
    #[serde(default)]
    pub amount: Option<Value>,
}

/// A transaction request that passed every stateless check
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedRequest {
    pub account_number: AccountNumber,
    pub amount: Amount,
    pub transaction_type: TransactionType,
}

/// Decode a JSON object body. An empty body reads as `{}`.
pub fn parse_body<T: DeserializeOwned>(body: &[u8]) -> AppResult<T> {
    let body = if body.iter().all(u8::is_ascii_whitespace) {
        b"{}".as_slice()
    } else {
        body
    };

    match serde_json::from_slice::<Value>(body) {
        Ok(value @ Value::Object(_)) => {
            serde_json::from_value(value).map_err(|_| AppError::bad_request(INVALID_BODY))
        }
        _ => Err(AppError::bad_request(INVALID_BODY)),
    }
}

pub fn parse_account_number(raw: &str) -> AppResult<AccountNumber> {
    raw.trim()
        .parse()
        .map_err(|_| AppError::bad_request(NOT_A_NUMBER))
}

/// Absent and null are "no amount"; zero and negatives are "too low".
pub fn parse_amount(raw: Option<&Value>) -> AppResult<Amount> {
    let number = match raw {
        None | Some(Value::Null) => return Err(AppError::bad_request(NO_AMOUNT)),
        Some(Value::Number(number)) => number,
        Some(_) => return Err(AppError::bad_request(AMOUNT_NOT_WHOLE)),
    };

    if let Some(value) = number.as_i64() {
        return Amount::new(value).map_err(|_| AppError::bad_request(AMOUNT_TOO_LOW));
    }

    match number.as_f64() {
        Some(value) if value <= 0.0 => Err(AppError::bad_request(AMOUNT_TOO_LOW)),
        Some(value) if value.fract() != 0.0 => Err(AppError::bad_request(AMOUNT_NOT_WHOLE)),
        _ => Err(AppError::bad_request(AMOUNT_TOO_HIGH)),
    }
}

/// Stateless part of transaction validation
pub fn validate(
    raw_account_number: &str,
    body: &[u8],
    transaction_type: TransactionType,
) -> AppResult<ValidatedRequest> {
    let body: TransactionBody = parse_body(body)?;
    let account_number = parse_account_number(raw_account_number)?;
    let amount = parse_amount(body.amount.as_ref())?;

    Ok(ValidatedRequest {
        account_number,
        amount,
        transaction_type,
    })
}

/// Checks against the loaded account: active, and enough funds for a debit
pub fn check_account(account: &Account, request: &ValidatedRequest) -> AppResult<()> {
    if !account.is_active() {
        return Err(DomainError::AccountNotActive(account.account_number).into());
    }

    if request.transaction_type == TransactionType::Debit
        && !account.balance.is_sufficient_for(&request.amount)
    {
        return Err(DomainError::insufficient_funds(
            request.amount.value(),
            account.balance.value(),
        )
        .into());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AccountStatus, AccountType, Balance, NewAccount};
    use serde_json::json;

    fn message(result: AppResult<impl std::fmt::Debug>) -> String {
        result.unwrap_err().public_message()
    }

    #[test]
    fn test_valid_credit() {
        let request = validate("2039939293", br#"{"amount": 555555}"#, TransactionType::Credit).unwrap();
        assert_eq!(request.account_number, 2039939293);
        assert_eq!(request.amount.value(), 555555);
    }

    #[test]
    fn test_amount_boundaries() {
        assert_eq!(message(parse_amount(Some(&json!(0)))), AMOUNT_TOO_LOW);
        assert_eq!(message(parse_amount(Some(&json!(-20)))), AMOUNT_TOO_LOW);
        assert_eq!(message(parse_amount(Some(&json!(-0.5)))), AMOUNT_TOO_LOW);
        assert_eq!(message(parse_amount(Some(&json!(null)))), NO_AMOUNT);
        assert_eq!(message(parse_amount(None)), NO_AMOUNT);
        assert_eq!(message(parse_amount(Some(&json!("12")))), AMOUNT_NOT_WHOLE);
        assert_eq!(message(parse_amount(Some(&json!(12.5)))), AMOUNT_NOT_WHOLE);
        assert_eq!(message(parse_amount(Some(&json!(u64::MAX)))), AMOUNT_TOO_HIGH);
        assert_eq!(parse_amount(Some(&json!(1))).unwrap().value(), 1);
    }

    #[test]
    fn test_null_and_missing_amount_differ_from_zero() {
        let err = validate("2039939293", br#"{"amount": null}"#, TransactionType::Debit);
        assert_eq!(message(err), NO_AMOUNT);
        let err = validate("2039939293", b"{}", TransactionType::Debit);
        assert_eq!(message(err), NO_AMOUNT);
        let err = validate("2039939293", b"", TransactionType::Debit);
        assert_eq!(message(err), NO_AMOUNT);
    }

    #[test]
    fn test_account_number_checked_before_amount() {
        let err = validate("xxyyzz", br#"{"amount": 0}"#, TransactionType::Credit);
        assert_eq!(message(err), NOT_A_NUMBER);
    }

    #[test]
    fn test_body_checked_before_account_number() {
        let err = validate("xxyyzz", b"{not json", TransactionType::Credit);
        assert_eq!(message(err), INVALID_BODY);
        let err = validate("2039939293", b"[1, 2]", TransactionType::Credit);
        assert_eq!(message(err), INVALID_BODY);
    }

    #[test]
    fn test_check_account() {
        let mut account = Account::open(NewAccount {
            account_number: 2039939293,
            owner_id: 90,
            account_type: AccountType::Current,
            opening_balance: Balance::new(1000).unwrap(),
        });
        let debit = ValidatedRequest {
            account_number: 2039939293,
            amount: Amount::new(30000000).unwrap(),
            transaction_type: TransactionType::Debit,
        };
        assert_eq!(message(check_account(&account, &debit)), "Insufficients Funds");

        let credit = ValidatedRequest {
            transaction_type: TransactionType::Credit,
            ..debit.clone()
        };
        assert!(check_account(&account, &credit).is_ok());

        account.status = AccountStatus::Dormant;
        assert_eq!(message(check_account(&account, &credit)), "Account is not active");
    }
}
