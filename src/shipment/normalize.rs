//! Mapping of the carrier's details payload onto [`ShipmentData`].
//!
//! This is a structural reshape only: nothing is sorted, deduplicated or
//! validated. Missing or `null` upstream fields become `None`/empty lists;
//! present fields are carried over.

use serde_json::Value;

use crate::shipment::model::{
    Address, DeliveryDate, EventLocation, Package, PackageEvent, PackageSummary, ShipmentData,
    TrackingEvent,
};

/// Normalize a raw details payload. Total over any JSON value.
pub fn normalize(details: &Value) -> ShipmentData {
    let location = field(details, "location");
    let goods = field(details, "goods");
    let delivery = field(details, "deliveryDate");

    let sender = location
        .and_then(|l| field(l, "collectFrom").or_else(|| field(l, "shipperPlace")))
        .map(address);
    let receiver = location
        .and_then(|l| field(l, "deliverTo").or_else(|| field(l, "consigneePlace")))
        .map(address);

    ShipmentData {
        stt_number: text(field(details, "sttNumber")),
        reference_numbers: values(
            field(details, "references").and_then(|r| field(r, "waybillAndConsignementNumbers")),
        ),
        transport_mode: text(field(details, "transportMode")),
        product: text(field(details, "product")),
        sender,
        receiver,
        package: PackageSummary {
            pieces: goods.and_then(|g| field(g, "pieces")).cloned(),
            weight: goods.and_then(|g| field(g, "weight")).cloned(),
            volume: goods.and_then(|g| field(g, "volume")).cloned(),
            dimensions: values(goods.and_then(|g| field(g, "dimensions"))),
            loading_meters: goods.and_then(|g| field(g, "loadingMeters")).cloned(),
            chargeable_weight: goods.and_then(|g| field(g, "chargeableWeight")).cloned(),
        },
        delivery_date: DeliveryDate {
            estimated: text(delivery.and_then(|d| field(d, "estimated"))),
            agreed: text(delivery.and_then(|d| field(d, "agreed"))),
        },
        tracking_history: items(field(details, "events"))
            .iter()
            .map(tracking_event)
            .collect(),
        packages: items(field(details, "packages")).iter().map(package).collect(),
    }
}

fn address(place: &Value) -> Address {
    Address {
        postal_code: text(field(place, "postCode")),
        city: text(field(place, "city")),
        country: text(field(place, "country")),
        country_code: text(field(place, "countryCode")),
    }
}

fn tracking_event(event: &Value) -> TrackingEvent {
    let location = field(event, "location");
    TrackingEvent {
        code: text(field(event, "code")),
        date: text(field(event, "date")),
        created_at: text(field(event, "createdAt")),
        location: EventLocation {
            name: text(location.and_then(|l| field(l, "name"))),
            code: text(location.and_then(|l| field(l, "code"))),
            country_code: text(location.and_then(|l| field(l, "countryCode"))),
        },
        comment: text(field(event, "comment")),
        recipient: text(field(event, "recipient")),
        reasons: values(field(event, "reasons")),
    }
}

fn package(package: &Value) -> Package {
    Package {
        id: text(field(package, "id")),
        events: items(field(package, "events"))
            .iter()
            .map(|event| PackageEvent {
                code: text(field(event, "code")),
                date: text(field(event, "date")),
                location: field(event, "location").cloned(),
                country_code: text(field(event, "countryCode")),
            })
            .collect(),
    }
}

/// Member lookup where JSON `null` counts as absent.
fn field<'a>(value: &'a Value, key: &str) -> Option<&'a Value> {
    value.get(key).filter(|v| !v.is_null())
}

fn text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn items(value: Option<&Value>) -> &[Value] {
    value
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default()
}

/// List of opaque values, positions kept (a `null` element stays). A lone
/// non-array value becomes a one-element list.
fn values(value: Option<&Value>) -> Vec<Value> {
    match value {
        Some(Value::Array(items)) => items.clone(),
        Some(other) => vec![other.clone()],
        None => Vec::new(),
    }
}
