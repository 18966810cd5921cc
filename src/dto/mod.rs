use serde::{Deserialize, Deserializer};

pub mod auth;
pub mod blog;
pub mod cart;
pub mod purchases;
pub mod reviews;
pub mod templates;

/// For nullable fields in partial updates: absent stays `None`, an explicit
/// `null` becomes `Some(None)`.
pub(crate) fn double_option<'de, T, D>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(de).map(Some)
}
