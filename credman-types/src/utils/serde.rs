//! Helpers used in serde derives for more forgiving deserialization.
//!
//! Most enumerated members of the model carry the wording
//!
//! > The values SHOULD be members of `T` but client platforms MUST ignore unknown values.
//!
//! so values are first buffered into a [`serde_json::Value`] and only then interpreted, which keeps
//! a failed interpretation from poisoning the surrounding deserializer.

use serde::{de::DeserializeOwned, Deserialize, Deserializer};
use serde_json::Value;

#[cfg(test)]
mod tests;

/// Deserialize `T`, falling back to `T::default()` when the value is not understood.
pub(crate) fn ignore_unknown<'de, D, T>(de: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(de)?;
    Ok(T::deserialize(value).unwrap_or_default())
}

/// Deserialize a list of `T`, dropping the entries that are not understood.
pub(crate) fn ignore_unknown_vec<'de, D, T>(de: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let values = Vec::<Value>::deserialize(de)?;
    Ok(values
        .into_iter()
        .filter_map(|v| T::deserialize(v).ok())
        .collect())
}

/// Same as [`ignore_unknown_vec`] for an optional list. `null` stays `None`.
pub(crate) fn ignore_unknown_opt_vec<'de, D, T>(de: D) -> Result<Option<Vec<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let values = Option::<Vec<Value>>::deserialize(de)?;
    Ok(values.map(|values| {
        values
            .into_iter()
            .filter_map(|v| T::deserialize(v).ok())
            .collect()
    }))
}

/// `uvm` outputs are a list of `[method, key protection, matcher protection]` entries, or a flat
/// list of numbers where each number is an entry of its own.
pub(crate) fn uvm_entries<'de, D>(de: D) -> Result<Option<Vec<Vec<u32>>>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum UvmEntry {
        Entry(Vec<u32>),
        Flat(u32),
    }

    let entries = Option::<Vec<UvmEntry>>::deserialize(de)?;
    Ok(entries.map(|entries| {
        entries
            .into_iter()
            .map(|entry| match entry {
                UvmEntry::Entry(entry) => entry,
                UvmEntry::Flat(method) => vec![method],
            })
            .collect()
    }))
}

/// Timeouts show up as integers, floats and strings of either depending on the relying party.
/// Anything that is not a finite, non negative number becomes `0`.
pub(crate) fn maybe_stringified<'de, D>(de: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    fn clamp(num: f64) -> u32 {
        if num.is_finite() && num > 0.0 {
            // `as` saturates on overflow and truncates the fraction.
            #[allow(clippy::as_conversions)]
            let clamped = num as u32;
            clamped
        } else {
            0
        }
    }

    Ok(match Option::<Value>::deserialize(de)? {
        None | Some(Value::Null) => None,
        Some(Value::Number(n)) => n
            .as_u64()
            .map(|n| u32::try_from(n).unwrap_or(u32::MAX))
            .or_else(|| n.as_f64().map(clamp)),
        Some(Value::String(s)) => Some(s.trim().parse::<f64>().map(clamp).unwrap_or_default()),
        Some(other) => {
            return Err(serde::de::Error::invalid_type(
                serde::de::Unexpected::Other(&other.to_string()),
                &"a number or a stringified number",
            ))
        }
    })
}

/// COSE algorithm identifiers are plain integers on the wire.
pub(crate) mod i64_to_iana {
    use coset::iana::EnumI64;

    pub fn serialize<S, T>(value: &T, ser: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
        T: EnumI64,
    {
        ser.serialize_i64(value.to_i64())
    }

    pub fn deserialize<'de, D, T>(de: D) -> Result<T, D::Error>
    where
        D: serde::Deserializer<'de>,
        T: EnumI64,
    {
        let value = super::maybe_stringified_i64(de)?;

        T::from_i64(value).ok_or_else(|| {
            <D::Error as serde::de::Error>::invalid_value(
                serde::de::Unexpected::Signed(value),
                &"a registered COSE algorithm identifier",
            )
        })
    }
}

fn maybe_stringified_i64<'de, D>(de: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(de)? {
        Value::Number(n) => n
            .as_i64()
            .ok_or_else(|| serde::de::Error::custom("algorithm identifier out of range")),
        Value::String(s) => s.trim().parse().map_err(serde::de::Error::custom),
        other => Err(serde::de::Error::invalid_type(
            serde::de::Unexpected::Other(&other.to_string()),
            &"an integer",
        )),
    }
}
