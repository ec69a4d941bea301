use serde_json::json;

/// A tracker with every field and a scale missing most of them.
#[must_use]
pub fn devices() -> String {
    json!([
        {
            "battery": "High",
            "batteryLevel": 87,
            "deviceVersion": "Charge 6",
            "features": [],
            "id": "2570612980",
            "lastSyncTime": "2024-01-15T06:59:12.000",
            "mac": "C6:1B:8E:2A:4F:10",
            "type": "TRACKER"
        },
        {
            "id": 1_234_567,
            "deviceVersion": "Aria Air",
            "type": "SCALE"
        }
    ])
    .to_string()
}
