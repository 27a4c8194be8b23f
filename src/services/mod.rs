//! Business procedures. Each service owns its storage handle (passed in at
//! construction) so tests can run against an isolated database.

pub mod catalog;
pub mod customers;
pub mod inventory;
pub mod notifications;
pub mod payables;
pub mod purchasing;
pub mod reports;
pub mod sales;
pub mod suppliers;
pub mod transactions;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use sea_orm::TransactionError;

use crate::errors::ServiceError;

/// Flatten a sea-orm transaction error back into the service taxonomy.
pub(crate) fn txn_err(err: TransactionError<ServiceError>) -> ServiceError {
    match err {
        TransactionError::Connection(db_err) => ServiceError::from_db(db_err),
        TransactionError::Transaction(service_err) => service_err,
    }
}

/// Parse a date parameter that may arrive as RFC 3339 or a bare
/// `YYYY-MM-DD` (interpreted as midnight UTC).
pub(crate) fn parse_datetime_param(raw: &str, param: &str) -> Result<DateTime<Utc>, ServiceError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(DateTime::from_naive_utc_and_offset(
            date.and_time(NaiveTime::MIN),
            Utc,
        ));
    }
    Err(ServiceError::Validation(format!("Invalid {} value", param)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn parses_bare_dates_as_midnight_utc() {
        let dt = parse_datetime_param("2024-03-05", "from").unwrap();
        assert_eq!(dt.hour(), 0);
        assert_eq!(dt.date_naive().to_string(), "2024-03-05");
    }

    #[test]
    fn parses_rfc3339() {
        let dt = parse_datetime_param("2024-03-05T10:30:00Z", "from").unwrap();
        assert_eq!(dt.hour(), 10);
    }

    #[test]
    fn rejects_garbage() {
        let err = parse_datetime_param("not-a-date", "dueDate").unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }
}
