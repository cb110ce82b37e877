use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(pub i64);
    };
}

id_newtype!(UserId);
id_newtype!(ListingId);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: UserId,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FarmerSummary {
    pub name: String,
}

/// A sellable crop record as returned by the marketplace backend. The image
/// travels base64-encoded inside the JSON body rather than as a separate
/// asset URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub id: ListingId,
    pub name: String,
    pub price: f64,
    pub unit: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub farmer: Option<FarmerSummary>,
}

impl Listing {
    /// Decodes the embedded base64 image payload, if any.
    pub fn image_bytes(&self) -> Result<Option<Vec<u8>>, base64::DecodeError> {
        self.image
            .as_deref()
            .map(|encoded| STANDARD.decode(encoded))
            .transpose()
    }

    pub fn farmer_name(&self) -> &str {
        self.farmer
            .as_ref()
            .map(|farmer| farmer.name.as_str())
            .unwrap_or("Unknown Farmer")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listing_parses_without_optional_fields() {
        let listing: Listing = serde_json::from_str(
            r#"{"id":1,"name":"Fresh Corn","price":1.0,"unit":"ear"}"#,
        )
        .expect("parse");
        assert!(listing.image.is_none());
        assert_eq!(listing.farmer_name(), "Unknown Farmer");
        assert_eq!(listing.image_bytes().expect("decode"), None);
    }

    #[test]
    fn image_bytes_decodes_the_base64_payload() {
        let listing = Listing {
            id: ListingId(1),
            name: "Organic Tomatoes".to_string(),
            price: 2.5,
            unit: "kg".to_string(),
            image: Some(STANDARD.encode(b"jpeg-bytes")),
            farmer: Some(FarmerSummary {
                name: "Rajinder Singh".to_string(),
            }),
        };
        assert_eq!(
            listing.image_bytes().expect("decode"),
            Some(b"jpeg-bytes".to_vec())
        );
        assert_eq!(listing.farmer_name(), "Rajinder Singh");
    }
}
