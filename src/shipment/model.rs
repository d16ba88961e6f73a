//! Canonical shipment representation served by the API.
//!
//! Every field is optional because the carrier may omit any of them. Absent
//! values serialize as `null` (or `[]` for lists) so consumers always see the
//! full shape.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Normalized tracking data for one shipment.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShipmentData {
    /// Carrier-internal shipment tracking identifier.
    pub stt_number: Option<String>,
    /// Waybill and consignment numbers, element for element as sent.
    pub reference_numbers: Vec<Value>,
    pub transport_mode: Option<String>,
    /// Carrier product code.
    pub product: Option<String>,
    pub sender: Option<Address>,
    pub receiver: Option<Address>,
    pub package: PackageSummary,
    pub delivery_date: DeliveryDate,
    /// Shipment-level events in upstream order.
    pub tracking_history: Vec<TrackingEvent>,
    /// Per-package event lists.
    pub packages: Vec<Package>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub postal_code: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub country_code: Option<String>,
}

/// Goods summary. Every member is kept as the carrier sends it; measurements
/// are usually `{ "value": .., "unit": .. }`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageSummary {
    pub pieces: Option<Value>,
    pub weight: Option<Value>,
    pub volume: Option<Value>,
    pub dimensions: Vec<Value>,
    pub loading_meters: Option<Value>,
    pub chargeable_weight: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryDate {
    pub estimated: Option<String>,
    pub agreed: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackingEvent {
    pub code: Option<String>,
    pub date: Option<String>,
    pub created_at: Option<String>,
    pub location: EventLocation,
    pub comment: Option<String>,
    pub recipient: Option<String>,
    pub reasons: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventLocation {
    pub name: Option<String>,
    pub code: Option<String>,
    pub country_code: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Package {
    pub id: Option<String>,
    pub events: Vec<PackageEvent>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageEvent {
    pub code: Option<String>,
    pub date: Option<String>,
    /// Usually a place name; other shapes pass through untouched.
    pub location: Option<Value>,
    pub country_code: Option<String>,
}
