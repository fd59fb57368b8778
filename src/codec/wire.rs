//! JSON 线格式（serde 路径）

use serde::de::{Deserialize, Deserializer};
use serde::ser::{Serialize, Serializer};

use super::CodecError;
use crate::services::geoip::GeoLocation;

#[derive(serde::Serialize)]
struct WireRecord<'a> {
    country: WireCountry<'a>,
    location: WireLocation,
}

#[derive(serde::Serialize)]
struct WireCountry<'a> {
    iso_code: &'a str,
}

#[derive(serde::Serialize, serde::Deserialize)]
struct WireLocation {
    latitude: f64,
    longitude: f64,
    accuracy_radius: u32,
}

#[derive(serde::Deserialize)]
struct OwnedRecord {
    country: OwnedCountry,
    location: WireLocation,
}

#[derive(serde::Deserialize)]
struct OwnedCountry {
    iso_code: String,
}

impl<'a> From<&'a GeoLocation> for WireRecord<'a> {
    fn from(location: &'a GeoLocation) -> Self {
        WireRecord {
            country: WireCountry {
                iso_code: &location.country_iso_code,
            },
            location: WireLocation {
                latitude: location.latitude,
                longitude: location.longitude,
                accuracy_radius: location.accuracy_radius_km,
            },
        }
    }
}

impl Serialize for GeoLocation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        WireRecord::from(self).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for GeoLocation {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let record = OwnedRecord::deserialize(deserializer)?;
        Ok(GeoLocation {
            country_iso_code: record.country.iso_code,
            latitude: record.location.latitude,
            longitude: record.location.longitude,
            accuracy_radius_km: record.location.accuracy_radius,
        })
    }
}

pub(super) fn encode_into(location: &GeoLocation, out: &mut Vec<u8>) -> Result<(), CodecError> {
    serde_json::to_writer(out, location)?;
    Ok(())
}
