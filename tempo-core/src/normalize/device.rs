use serde_json::Value;

use super::Chunk;
use super::json;
use crate::window::SubRequest;
use crate::{DeviceSnapshot, NOT_AVAILABLE, NormalizedRecord};

fn first_text(obj: &Value, keys: &[&str]) -> String {
    keys.iter()
        .find_map(|k| json::text_field(obj, k))
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

/// Flat array of paired devices.
pub fn snapshots(sub: &SubRequest, body: &Value) -> Chunk {
    let mut chunk = Chunk::default();
    let Some(devices) = body.as_array() else {
        chunk.warn(sub, "response is not a device array");
        return chunk;
    };
    for device in devices {
        if !device.is_object() {
            chunk.warn(sub, "device entry is not an object");
            continue;
        }
        chunk.records.push(NormalizedRecord::Device(DeviceSnapshot {
            id: first_text(device, &["id"]),
            version_label: first_text(device, &["versionLabel", "deviceVersion"]),
            battery_level: json::integer_field(device, "batteryLevel"),
            battery_state: first_text(device, &["batteryState", "battery"]),
            last_sync_time: first_text(device, &["lastSyncTime"]),
            device_type: first_text(device, &["type"]),
            mac_address: first_text(device, &["mac", "macAddress"]),
        }));
    }
    chunk
}
