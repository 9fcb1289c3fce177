//! Lenient integer counters.
//!
//! The backend only promises JSON numbers, and some counters (MongoDB
//! `dbStats` sizes in particular) arrive as doubles such as `5242880.0`.
//! Integral floats are accepted. Anything that is not a whole number in the
//! target type's range is rejected.

use serde::de::{self, Deserializer, Visitor};
use std::fmt;
use std::marker::PhantomData;

pub fn deserialize<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: TryFrom<u64>,
{
    deserializer.deserialize_any(CountVisitor(PhantomData))
}

struct CountVisitor<T>(PhantomData<T>);

impl<T> CountVisitor<T>
where
    T: TryFrom<u64>,
{
    fn narrow<E: de::Error>(value: u64) -> Result<T, E> {
        T::try_from(value).map_err(|_| E::custom(format!("count {} is out of range", value)))
    }
}

impl<'de, T> Visitor<'de> for CountVisitor<T>
where
    T: TryFrom<u64>,
{
    type Value = T;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a non-negative whole number")
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<T, E> {
        Self::narrow(value)
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<T, E> {
        let value = u64::try_from(value)
            .map_err(|_| E::custom(format!("count {} is negative", value)))?;
        Self::narrow(value)
    }

    fn visit_f64<E: de::Error>(self, value: f64) -> Result<T, E> {
        // 2^64 itself is not representable as u64.
        if !value.is_finite() || value.fract() != 0.0 || value < 0.0 || value >= u64::MAX as f64 {
            return Err(E::custom(format!("count {} is not a whole number", value)));
        }
        Self::narrow(value as u64)
    }
}
