//! Dotted-Key Config Text Extraction
//!
//! Parses the `head.section.Group_N.Property=value` config dump returned by
//! Dahua-style recorders. Lines are grouped by the third key segment into one
//! record per channel group. Disabled groups are filtered out and the result
//! is sorted by channel index, which downstream consumers rely on.

use regex::Regex;

use crate::record::{FieldValue, RawCameraRecord};

/// Extract camera records from a dotted-key config dump.
///
/// Malformed lines and unknown properties are skipped. An input with no
/// usable lines yields an empty list, never an error.
pub fn extract_records(payload: &str) -> Vec<RawCameraRecord> {
    let index_re = Regex::new(r"(\d+)$").unwrap();
    let mut groups: Vec<(String, RawCameraRecord)> = Vec::new();

    for line in payload.lines() {
        let line = line.trim();
        let (key, value) = match line.split_once('=') {
            Some(kv) => kv,
            None => continue,
        };

        let segments: Vec<&str> = key.split('.').collect();
        if segments.len() < 4 {
            continue;
        }

        let token = segments[2];
        let property = segments[3..].join(".");
        let record = group_record(&mut groups, token, &index_re);
        apply_property(record, &property, value);
    }

    // Groups without an explicit display name take the synthesized label
    for (_, record) in groups.iter_mut() {
        if !has_name(record) {
            if let Some(channel_name) = record.get("channelName").cloned() {
                record.set("name", channel_name);
            }
        }
    }

    let mut records: Vec<RawCameraRecord> = groups
        .into_iter()
        .map(|(_, record)| record)
        .filter(|record| {
            record
                .get("isEnabled")
                .and_then(FieldValue::as_bool)
                .unwrap_or(false)
        })
        .collect();

    // Stable sort: indexed groups ascending, unindexed groups after them
    records.sort_by_key(|record| {
        record
            .get("channelIndex")
            .and_then(FieldValue::as_i64)
            .map_or((1, 0), |index| (0, index))
    });

    records
}

/// Find or lazily create the record for a group token.
///
/// On first sight the trailing digits of the token become `channelIndex`,
/// with `channelName` synthesized as a 1-based label. Tokens without a
/// numeric suffix get neither field.
fn group_record<'a>(
    groups: &'a mut Vec<(String, RawCameraRecord)>,
    token: &str,
    index_re: &Regex,
) -> &'a mut RawCameraRecord {
    let position = match groups.iter().position(|(t, _)| t == token) {
        Some(position) => position,
        None => {
            let mut record = RawCameraRecord::new();
            if let Some(captures) = index_re.captures(token) {
                if let Ok(index) = captures[1].parse::<i64>() {
                    record.set("channelIndex", index);
                    record.set("channelName", format!("Channel {}", index + 1));
                }
            }
            groups.push((token.to_string(), record));
            groups.len() - 1
        }
    };
    &mut groups[position].1
}

/// Apply one property line to its group record.
///
/// Only the known property paths are mapped; anything else is ignored.
/// Integer parse failures leave the field untouched.
fn apply_property(record: &mut RawCameraRecord, property: &str, value: &str) {
    match property {
        "Address" => record.set("address", value),
        "DeviceType" => {
            record.set("deviceType", value);
            record.set("model", value);
        }
        "Enable" => record.set("isEnabled", value.trim().eq_ignore_ascii_case("true")),
        "Port" => set_integer(record, "port", value),
        "HttpPort" => set_integer(record, "httpPort", value),
        "VideoInputChannels" => set_integer(record, "videoInputChannels", value),
        "AlarmInChannels" => set_integer(record, "alarmInChannels", value),
        "AudioInputChannels" => set_integer(record, "audioInputChannels", value),
        "SerialNo" => record.set("serialNo", value),
        "Version" => record.set("version", value),
        "Vendor" => record.set("vendor", value),
        "ProtocolType" => record.set("protocolType", value),
        "VideoInput[0].Name" => record.set("name", value),
        _ => {}
    }
}

fn set_integer(record: &mut RawCameraRecord, name: &str, value: &str) {
    if let Ok(number) = value.trim().parse::<i64>() {
        record.set(name, number);
    }
}

fn has_name(record: &RawCameraRecord) -> bool {
    match record.get("name") {
        Some(FieldValue::Text(s)) => !s.trim().is_empty(),
        Some(_) => true,
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_groups_filtered_and_sorted_by_index() {
        let payload = "\
table.RemoteDevice.INFO_2.Enable=true\n\
table.RemoteDevice.INFO_2.Address=10.0.0.2\n\
table.RemoteDevice.INFO_1.Enable=true\n\
table.RemoteDevice.INFO_1.Address=10.0.0.1\n\
table.RemoteDevice.INFO_3.Enable=false\n\
table.RemoteDevice.INFO_3.Address=10.0.0.3\n";

        let records = extract_records(payload);
        assert_eq!(records.len(), 2);
        assert_eq!(
            records[0].get("channelIndex").and_then(FieldValue::as_i64),
            Some(1)
        );
        assert_eq!(
            records[1].get("channelIndex").and_then(FieldValue::as_i64),
            Some(2)
        );
    }

    #[test]
    fn test_trailing_digits_become_channel_index() {
        let payload = "table.RemoteDevice.INFO_10.Enable=true\n";
        let records = extract_records(payload);
        assert_eq!(records.len(), 1);
        assert_eq!(
            records[0].get("channelIndex"),
            Some(&FieldValue::Int(10))
        );
        assert_eq!(
            records[0].get("channelName"),
            Some(&FieldValue::Text("Channel 11".to_string()))
        );
    }

    #[test]
    fn test_missing_name_falls_back_to_channel_name() {
        let payload = "\
table.RemoteDevice.INFO_0.Enable=true\n\
table.RemoteDevice.INFO_0.Address=10.0.0.9\n";
        let records = extract_records(payload);
        assert_eq!(
            records[0].get("name"),
            Some(&FieldValue::Text("Channel 1".to_string()))
        );
    }

    #[test]
    fn test_explicit_display_name_kept() {
        let payload = "\
table.RemoteDevice.INFO_0.Enable=true\n\
table.RemoteDevice.INFO_0.VideoInput[0].Name=Lobby\n";
        let records = extract_records(payload);
        assert_eq!(
            records[0].get("name"),
            Some(&FieldValue::Text("Lobby".to_string()))
        );
    }

    #[test]
    fn test_malformed_lines_skipped() {
        let payload = "\
garbage line without equals\n\
short.key=value\n\
table.RemoteDevice.INFO_0.Enable=true\n";
        let records = extract_records(payload);
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_integer_parse_failure_swallowed() {
        let payload = "\
table.RemoteDevice.INFO_0.Enable=true\n\
table.RemoteDevice.INFO_0.Port=abc\n\
table.RemoteDevice.INFO_0.HttpPort=80\n";
        let records = extract_records(payload);
        assert!(records[0].get("port").is_none());
        assert_eq!(records[0].get("httpPort"), Some(&FieldValue::Int(80)));
    }

    #[test]
    fn test_device_type_sets_model_too() {
        let payload = "\
table.RemoteDevice.INFO_0.Enable=true\n\
table.RemoteDevice.INFO_0.DeviceType=IPC-HDW1230\n";
        let records = extract_records(payload);
        assert_eq!(
            records[0].get("deviceType"),
            Some(&FieldValue::Text("IPC-HDW1230".to_string()))
        );
        assert_eq!(
            records[0].get("model"),
            Some(&FieldValue::Text("IPC-HDW1230".to_string()))
        );
    }

    #[test]
    fn test_group_without_index_sorts_last() {
        let payload = "\
table.RemoteDevice.Extra.Enable=true\n\
table.RemoteDevice.INFO_5.Enable=true\n";
        let records = extract_records(payload);
        assert_eq!(records.len(), 2);
        assert_eq!(
            records[0].get("channelIndex").and_then(FieldValue::as_i64),
            Some(5)
        );
        assert!(records[1].get("channelIndex").is_none());
    }

    #[test]
    fn test_empty_payload_yields_no_records() {
        assert!(extract_records("").is_empty());
        assert!(extract_records("Error\n").is_empty());
    }
}
