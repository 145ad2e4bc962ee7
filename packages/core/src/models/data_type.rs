//! Semantic Data Types
//!
//! `DataType` is the closed set of tags a schema can declare for a field and
//! the type inference engine can produce for a raw value. Most tags are
//! refinements of the four JSON scalar shapes (string, number, boolean,
//! array/object): a string can be an email, a URL, a UUID and so on.
//!
//! Serialized names match the declarative model format (`"email"`,
//! `"arrayofstring"`, `"objectid"`, ...).

use serde::{Deserialize, Serialize};
use std::fmt;

/// Semantic type tag for a field declaration or an inferred value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    String,
    #[serde(rename = "postalcode")]
    PostalCode,
    #[serde(rename = "objectid")]
    ObjectId,
    Uuid,
    Number,
    Integer,
    Decimal,
    Float,
    #[serde(rename = "bigint")]
    BigInt,
    #[serde(rename = "bigfloat")]
    BigFloat,
    /// Key-value record
    Object,
    Array,
    #[serde(rename = "arrayofstring")]
    ArrayOfString,
    #[serde(rename = "arrayofnumber")]
    ArrayOfNumber,
    #[serde(rename = "arrayofboolean")]
    ArrayOfBoolean,
    #[serde(rename = "arrayofobject")]
    ArrayOfObject,
    Boolean,
    /// Text that parses as a JSON object or array
    Json,
    #[serde(rename = "datetime")]
    DateTime,
    Email,
    Url,
    Port,
    #[serde(rename = "ipaddress")]
    IpAddress,
    Jwt,
    #[serde(rename = "latlong")]
    LatLong,
    /// ISO 3166-1 alpha-2 country code
    Iso2,
    /// ISO 3166-1 alpha-3 country code
    Iso3,
    #[serde(rename = "macaddress")]
    MacAddress,
    Mime,
    #[serde(rename = "creditcard")]
    CreditCard,
    Currency,
    /// Unique-values collection (declarable only)
    Set,
    /// Dictionary (declarable only)
    Map,
    Undefined,
}

impl DataType {
    /// Wire name of the tag, as used in model definitions and error messages
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::PostalCode => "postalcode",
            Self::ObjectId => "objectid",
            Self::Uuid => "uuid",
            Self::Number => "number",
            Self::Integer => "integer",
            Self::Decimal => "decimal",
            Self::Float => "float",
            Self::BigInt => "bigint",
            Self::BigFloat => "bigfloat",
            Self::Object => "object",
            Self::Array => "array",
            Self::ArrayOfString => "arrayofstring",
            Self::ArrayOfNumber => "arrayofnumber",
            Self::ArrayOfBoolean => "arrayofboolean",
            Self::ArrayOfObject => "arrayofobject",
            Self::Boolean => "boolean",
            Self::Json => "json",
            Self::DateTime => "datetime",
            Self::Email => "email",
            Self::Url => "url",
            Self::Port => "port",
            Self::IpAddress => "ipaddress",
            Self::Jwt => "jwt",
            Self::LatLong => "latlong",
            Self::Iso2 => "iso2",
            Self::Iso3 => "iso3",
            Self::MacAddress => "macaddress",
            Self::Mime => "mime",
            Self::CreditCard => "creditcard",
            Self::Currency => "currency",
            Self::Set => "set",
            Self::Map => "map",
            Self::Undefined => "undefined",
        }
    }

    /// Numeric family: the tags range constraints apply to
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            Self::Number
                | Self::Integer
                | Self::Float
                | Self::Decimal
                | Self::BigInt
                | Self::BigFloat
        )
    }

    /// Tags the inference engine derives from string values
    pub fn is_string_format(&self) -> bool {
        matches!(
            self,
            Self::String
                | Self::PostalCode
                | Self::ObjectId
                | Self::Uuid
                | Self::Json
                | Self::DateTime
                | Self::Email
                | Self::Url
                | Self::Port
                | Self::IpAddress
                | Self::Jwt
                | Self::LatLong
                | Self::Iso2
                | Self::Iso3
                | Self::MacAddress
                | Self::Mime
                | Self::CreditCard
                | Self::Currency
        )
    }

    pub fn is_array(&self) -> bool {
        matches!(
            self,
            Self::Array
                | Self::ArrayOfString
                | Self::ArrayOfNumber
                | Self::ArrayOfBoolean
                | Self::ArrayOfObject
        )
    }

    /// Whether a field declared as `self` accepts a value inferred as `inferred`
    ///
    /// Exact matches always pass. On top of that, a declared supertype accepts
    /// its refinements:
    ///
    /// - `string` accepts every string-derived format (`"US"` infers as `iso2`
    ///   but is still a valid string)
    /// - `number`, `float`, `decimal` and `bigfloat` accept any inferred number
    /// - `bigint` accepts integers
    /// - `array` accepts every typed array
    /// - `set` accepts any array, `map` accepts objects
    ///
    /// Refined declarations never accept their supertype: a field declared
    /// `email` rejects a plain `string`.
    pub fn accepts(&self, inferred: DataType) -> bool {
        if *self == inferred {
            return true;
        }
        match self {
            Self::String => inferred.is_string_format(),
            Self::Number | Self::Float | Self::Decimal | Self::BigFloat => inferred.is_numeric(),
            Self::BigInt => inferred == Self::Integer,
            Self::Array | Self::Set => inferred.is_array(),
            Self::Map => inferred == Self::Object,
            _ => false,
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
