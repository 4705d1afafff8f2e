use serde::{Deserialize, Deserializer, de::Error};

/// Rejects missing, empty and whitespace-only strings while deserializing
/// query parameters, so handlers never see a blank value.
pub fn disallow_empty_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(value) = Option::<String>::deserialize(deserializer)? else {
        return Err(Error::custom("field is missing"));
    };

    let trimmed = value.trim();

    if trimmed.is_empty() {
        return Err(Error::custom("field is empty"));
    }

    Ok(trimmed.to_string())
}
