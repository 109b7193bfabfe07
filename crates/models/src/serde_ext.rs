use serde::{Deserialize, Deserializer};

/// Deserialize a present field (including `null`) as `Some`, so an absent
/// field stays `None` through `#[serde(default)]`.
pub fn double_option<'de, T, D>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(de).map(Some)
}
