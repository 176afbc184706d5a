/// All database primary keys are PostgreSQL BIGSERIAL.
pub type DbId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Monetary amounts, stored as `NUMERIC(10,2)`.
pub type Money = rust_decimal::Decimal;

/// Largest amount a `NUMERIC(10,2)` column holds: 99,999,999.99.
pub fn max_money() -> Money {
    rust_decimal::Decimal::new(9_999_999_999, 2)
}

/// Midnight UTC at the start of `day`.
pub fn start_of_day(day: chrono::NaiveDate) -> Timestamp {
    day.and_time(chrono::NaiveTime::MIN).and_utc()
}
