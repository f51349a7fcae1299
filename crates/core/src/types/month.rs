//! Year-month partition key type.

use core::fmt;

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`MonthKey`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum MonthKeyError {
    /// The input is not of the form `YYYY-MM`.
    #[error("month must be formatted as YYYY-MM")]
    Malformed,
    /// The month component is not in 01-12.
    #[error("month component must be between 01 and 12 (got {0:02})")]
    MonthOutOfRange(u32),
}

/// A `YYYY-MM` year-month key used to bucket opt-ins for invoicing.
///
/// Opt-in rows are partitioned by the UTC month they were recorded in, and
/// invoice previews aggregate over one such bucket. The key is stored and
/// transmitted as its string form (e.g. `2026-08`).
///
/// ## Examples
///
/// ```
/// use carbon_offset_core::MonthKey;
///
/// assert!(MonthKey::parse("2026-08").is_ok());
///
/// assert!(MonthKey::parse("2026-13").is_err()); // month out of range
/// assert!(MonthKey::parse("2026-8").is_err());  // missing zero padding
/// assert!(MonthKey::parse("202608").is_err());  // missing separator
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(try_from = "String", into = "String")]
pub struct MonthKey(String);

impl MonthKey {
    /// Parse a `MonthKey` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is not a zero-padded `YYYY-MM` string
    /// or the month component is outside 01-12.
    pub fn parse(s: &str) -> Result<Self, MonthKeyError> {
        let bytes = s.as_bytes();
        if bytes.len() != 7 || bytes.get(4) != Some(&b'-') {
            return Err(MonthKeyError::Malformed);
        }

        let (year, month) = s.split_at(4);
        let month = &month[1..];
        if !year.bytes().all(|b| b.is_ascii_digit()) || !month.bytes().all(|b| b.is_ascii_digit()) {
            return Err(MonthKeyError::Malformed);
        }

        let month_num: u32 = month.parse().map_err(|_| MonthKeyError::Malformed)?;
        if !(1..=12).contains(&month_num) {
            return Err(MonthKeyError::MonthOutOfRange(month_num));
        }

        Ok(Self(s.to_owned()))
    }

    /// Derive the month key for a UTC timestamp.
    #[must_use]
    pub fn from_datetime(at: &DateTime<Utc>) -> Self {
        Self(format!("{:04}-{:02}", at.year(), at.month()))
    }

    /// Returns the key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `MonthKey` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for MonthKey {
    type Err = MonthKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for MonthKey {
    type Error = MonthKeyError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<MonthKey> for String {
    fn from(key: MonthKey) -> Self {
        key.0
    }
}

impl AsRef<str> for MonthKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// SQLx support (with postgres feature)
#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for MonthKey {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for MonthKey {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        // Database values are assumed valid
        Ok(Self(s))
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for MonthKey {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <String as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}
