use std::fmt;
use std::marker::PhantomData;

#[cfg(feature = "diesel")]
use diesel::{
    deserialize::{self, FromSql, Queryable},
    expression::AsExpression,
    pg::{Pg, PgValue},
    serialize::{self, Output, ToSql},
    sql_types::BigInt,
};
use serde::de::{self, Visitor};
use serde::ser;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::global_codec;

pub trait TypeMarker: std::fmt::Debug {
    fn name() -> &'static str;
}

/// A generic type-safe object ID field (a wrapped u64).
///
/// When serialized with Serde, the number is encoded into a short base58 string.
/// Deserialization accepts either such a string or, from self-describing formats, a
/// bare integer.  Anything that decodes to `0` or to a value above `i64::MAX` is
/// rejected.  The type marker keeps IDs of different kinds of
/// objects from being mixed up and names the kind in error messages.
///
/// With the `diesel` feature, the field maps to a Postgres `BIGINT` column.
///
/// # Examples
///
/// ```
/// #[derive(Clone, Copy, Debug)]
/// pub struct ExampleIdMarker;
/// impl b58id::TypeMarker for ExampleIdMarker {
///     fn name() -> &'static str { "example" }
/// }
///
/// type ExampleId = b58id::Field<ExampleIdMarker>;
///
/// #[derive(serde::Serialize, serde::Deserialize)]
/// struct Example {
///     pub id: ExampleId,
/// }
///
/// let obj = Example { id: ExampleId::from(123) };
/// let obj_str = serde_json::to_string(&obj).unwrap();
/// assert_eq!(obj_str, "{\"id\":\"MpBACvB\"}");
///
/// let back: Example = serde_json::from_str(&obj_str).unwrap();
/// assert_eq!(u64::from(back.id), 123);
/// ```
#[cfg_attr(feature = "diesel", derive(AsExpression))]
#[cfg_attr(feature = "diesel", diesel(sql_type = BigInt))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Field<T: TypeMarker> {
    id: u64,
    _marker: PhantomData<T>,
}

impl<T: TypeMarker> From<Field<T>> for u64 {
    /// Returns the raw `u64` value.
    fn from(field: Field<T>) -> Self {
        field.id
    }
}

impl<T: TypeMarker> fmt::Display for Field<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Field {{ id: {}, marker: {} }}", self.id, T::name())
    }
}

impl<T: TypeMarker> Field<T> {
    /// Creates a `Field<T>` value from a `u64`.
    pub fn from(id: u64) -> Self {
        Field {
            id,
            _marker: PhantomData,
        }
    }

    /// The encoded string form, or `None` if the ID is out of the encodable range.
    pub fn encoded(&self) -> Option<String> {
        let id = i64::try_from(self.id).ok()?;
        global_codec().encode(id).ok()
    }
}

impl<T: TypeMarker> Serialize for Field<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let id = i64::try_from(self.id).map_err(<S::Error as ser::Error>::custom)?;
        let encoded = global_codec()
            .encode(id)
            .map_err(<S::Error as ser::Error>::custom)?;
        serializer.serialize_str(&encoded)
    }
}

struct FieldVisitor<T>(PhantomData<T>);

impl<T: TypeMarker> FieldVisitor<T> {
    fn accept<E: de::Error>(id: u64) -> Result<Field<T>, E> {
        if id == 0 || id > i64::MAX as u64 {
            Err(E::custom(format!("invalid {} id", T::name())))
        } else {
            Ok(Field::from(id))
        }
    }
}

impl<T: TypeMarker> Visitor<'_> for FieldVisitor<T> {
    type Value = Field<T>;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "an encoded {} id or a positive integer", T::name())
    }

    fn visit_str<E: de::Error>(self, encoded: &str) -> Result<Self::Value, E> {
        Self::accept(global_codec().decode(encoded))
    }

    fn visit_u64<E: de::Error>(self, id: u64) -> Result<Self::Value, E> {
        Self::accept(global_codec().decode(id))
    }

    fn visit_i64<E: de::Error>(self, id: i64) -> Result<Self::Value, E> {
        Self::accept(u64::try_from(id).unwrap_or(0))
    }
}

impl<'de, T: TypeMarker> Deserialize<'de> for Field<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        // Formats that do not describe their own types only ever hold the string form.
        if deserializer.is_human_readable() {
            deserializer.deserialize_any(FieldVisitor(PhantomData))
        } else {
            deserializer.deserialize_str(FieldVisitor(PhantomData))
        }
    }
}

#[cfg(feature = "diesel")]
impl<T: TypeMarker> ToSql<BigInt, Pg> for Field<T> {
    fn to_sql(&self, out: &mut Output<'_, '_, Pg>) -> serialize::Result {
        let id = i64::try_from(self.id)?;
        <i64 as ToSql<BigInt, Pg>>::to_sql(&id, &mut out.reborrow())
    }
}

#[cfg(feature = "diesel")]
impl<T: TypeMarker> FromSql<BigInt, Pg> for Field<T> {
    fn from_sql(bytes: PgValue<'_>) -> deserialize::Result<Self> {
        let id = <i64 as FromSql<BigInt, Pg>>::from_sql(bytes)?;
        Ok(Field::from(u64::try_from(id)?))
    }
}

#[cfg(feature = "diesel")]
impl<T> Queryable<BigInt, Pg> for Field<T>
where
    T: TypeMarker,
{
    type Row = <i64 as Queryable<BigInt, Pg>>::Row;

    fn build(row: Self::Row) -> deserialize::Result<Self> {
        let id = i64::build(row)?;
        Ok(Field::from(u64::try_from(id)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    struct UserMarker;
    impl TypeMarker for UserMarker {
        fn name() -> &'static str {
            "user"
        }
    }

    type UserId = Field<UserMarker>;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct User {
        id: UserId,
    }

    #[test]
    fn test_serialize() {
        let user = User {
            id: UserId::from(4294967296),
        };
        assert_eq!(
            serde_json::to_string(&user).unwrap(),
            "{\"id\":\"HF2TPPGnRb4T\"}"
        );
        assert_eq!(user.id.encoded().as_deref(), Some("HF2TPPGnRb4T"));
    }

    #[test]
    fn test_serialize_out_of_range() {
        assert!(serde_json::to_string(&UserId::from(0)).is_err());
        assert!(serde_json::to_string(&UserId::from(u64::MAX)).is_err());
        assert_eq!(UserId::from(u64::MAX).encoded(), None);
    }

    #[test]
    fn test_deserialize() {
        let user: User = serde_json::from_str("{\"id\":\"MpBACvB\"}").unwrap();
        assert_eq!(user.id, UserId::from(123));

        // Bare integers pass through.
        let user: User = serde_json::from_str("{\"id\":42}").unwrap();
        assert_eq!(u64::from(user.id), 42);
    }

    #[test]
    fn test_deserialize_invalid() {
        for input in [
            "{\"id\":\"MpBACvC\"}",
            "{\"id\":\"\"}",
            "{\"id\":0}",
            "{\"id\":-1}",
            "{\"id\":true}",
            "{\"id\":18446744073709551615}",
            "{\"id\":9223372036854775808}",
            // u64::MAX in the large layout with a matching checksum.
            "{\"id\":\"3kTyU4b85LLpN\"}",
        ] {
            assert!(serde_json::from_str::<User>(input).is_err(), "{}", input);
        }

        let err = serde_json::from_str::<User>("{\"id\":\"MpBACvC\"}").unwrap_err();
        assert!(err.to_string().contains("invalid user id"));
    }

    #[test]
    fn test_deserialize_largest() {
        let user: User = serde_json::from_str("{\"id\":\"2D8qTwUdQf3W6\"}").unwrap();
        assert_eq!(u64::from(user.id), i64::MAX as u64);
        assert_eq!(
            serde_json::to_string(&user).unwrap(),
            "{\"id\":\"2D8qTwUdQf3W6\"}"
        );

        let user: User = serde_json::from_str("{\"id\":9223372036854775807}").unwrap();
        assert!(serde_json::to_string(&user).is_ok());
    }

    // A format that only knows the type it is asked for, like bincode.
    struct StringOnly<'a>(&'a str);

    impl<'de> Deserializer<'de> for StringOnly<'_> {
        type Error = de::value::Error;

        fn is_human_readable(&self) -> bool {
            false
        }

        fn deserialize_any<V: Visitor<'de>>(self, _: V) -> Result<V::Value, Self::Error> {
            Err(de::Error::custom("type information required"))
        }

        fn deserialize_str<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
            visitor.visit_str(self.0)
        }

        serde::forward_to_deserialize_any! {
            bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char string
            bytes byte_buf option unit unit_struct newtype_struct seq tuple
            tuple_struct map struct enum identifier ignored_any
        }
    }

    #[test]
    fn test_deserialize_not_self_describing() {
        let id = UserId::deserialize(StringOnly("MpBACvB")).unwrap();
        assert_eq!(u64::from(id), 123);
        assert!(UserId::deserialize(StringOnly("MpBACvC")).is_err());
    }

    #[cfg(feature = "diesel")]
    #[test]
    fn test_diesel_bigint() {
        fn maps_to_bigint<F>()
        where
            F: ToSql<BigInt, Pg> + FromSql<BigInt, Pg> + Queryable<BigInt, Pg>,
        {
        }
        maps_to_bigint::<UserId>();

        // Ids above i64::MAX cannot be stored in a BIGINT.
        assert!(i64::try_from(u64::from(UserId::from(u64::MAX))).is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(
            UserId::from(7).to_string(),
            "Field { id: 7, marker: user }"
        );
    }
}
