//! Newtype ids so a `ShopId` can never be bound where an `OrderId` belongs.

/// Defines a `BIGINT`-backed id newtype.
///
/// The generated type is `Copy`, serializes as the bare integer and encodes
/// to Postgres as `BIGINT` through `#[sqlx(transparent)]`.
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            PartialOrd,
            Ord,
            Hash,
            ::serde::Serialize,
            ::serde::Deserialize,
            ::sqlx::Type,
        )]
        #[serde(transparent)]
        #[sqlx(transparent)]
        pub struct $name(i64);

        impl $name {
            pub const fn new(id: i64) -> Self { Self(id) }
            pub const fn get(self) -> i64 { self.0 }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result { write!(f, "{}", self.0) }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self { Self(id) }
        }
    };
}

define_id!(UserId);
define_id!(ShopId);
define_id!(CategoryId);
define_id!(ProductId);
define_id!(ProductInfoId);
define_id!(OrderId);
define_id!(OrderItemId);
define_id!(ContactId);

/// Collects raw ids for `= ANY($1)` binds.
pub fn raw_ids<I, T>(ids: I) -> Vec<i64>
where
    I: IntoIterator<Item = T>,
    T: Into<i64>,
{
    ids.into_iter().map(Into::into).collect()
}

macro_rules! into_raw {
    ($($name:ident),*) => {
        $(impl From<$name> for i64 { fn from(id: $name) -> Self { id.0 } })*
    };
}

into_raw!(UserId, ShopId, CategoryId, ProductId, ProductInfoId, OrderId, OrderItemId, ContactId);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_serializes_transparently() {
        let id = OrderId::new(42);
        assert_eq!(serde_json::to_string(&id).unwrap(), "42");
        let back: OrderId = serde_json::from_str("42").unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn test_raw_ids() {
        assert_eq!(raw_ids([ShopId::new(3), ShopId::new(7)]), vec![3, 7]);
    }
}
