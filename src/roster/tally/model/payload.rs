//! Text encoding of a record's field mapping as stored in the durable store.
//!
//! Payloads are written as `{"version": 1, "fields": {...}}`. Bare objects
//! without the envelope are the legacy layout and are read as version 0.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::roster::tally::error::{Result, SyncError};
use crate::roster::tally::model::{FieldValue, Record, Role};

/// Version written by [`encode_payload`].
pub const PAYLOAD_VERSION: u64 = 1;

#[derive(Serialize)]
struct Envelope<'a> {
    version: u64,
    fields: &'a BTreeMap<Role, FieldValue>,
}

/// Serialises the field mapping of `record` into the versioned envelope.
pub fn encode_payload(record: &Record) -> Result<String> {
    let envelope = Envelope {
        version: PAYLOAD_VERSION,
        fields: &record.fields,
    };
    Ok(serde_json::to_string(&envelope)?)
}

/// Rebuilds a record from its identity and stored payload.
pub fn decode_payload(id: &str, payload: &str) -> Result<Record> {
    let value: Value = serde_json::from_str(payload).map_err(|err| decode_error(id, err))?;
    let Value::Object(object) = value else {
        return Err(decode_error(id, "payload is not a JSON object"));
    };

    let fields = match split_envelope(&object) {
        Some((PAYLOAD_VERSION, fields)) => fields,
        Some((version, _)) => {
            return Err(decode_error(
                id,
                format!("unsupported payload version {version}"),
            ));
        }
        None => &object,
    };

    let mut record = Record::new(id);
    for (role, value) in fields {
        record.set(role.clone(), json_to_field(id, role, value)?);
    }
    Ok(record)
}

fn split_envelope(object: &Map<String, Value>) -> Option<(u64, &Map<String, Value>)> {
    if object.len() != 2 {
        return None;
    }
    let version = object.get("version")?.as_u64()?;
    let fields = object.get("fields")?.as_object()?;
    Some((version, fields))
}

fn json_to_field(id: &str, role: &str, value: &Value) -> Result<FieldValue> {
    Ok(match value {
        Value::String(text) => FieldValue::Text(text.clone()),
        Value::Number(number) => FieldValue::Number(
            number
                .as_f64()
                .ok_or_else(|| decode_error(id, format!("invalid number in '{role}'")))?,
        ),
        Value::Bool(flag) => FieldValue::Text(flag.to_string()),
        Value::Null => FieldValue::Text(String::new()),
        Value::Array(_) | Value::Object(_) => {
            return Err(decode_error(
                id,
                format!("field '{role}' is not a scalar value"),
            ));
        }
    })
}

fn decode_error(id: &str, reason: impl ToString) -> SyncError {
    SyncError::Decode {
        id: id.to_string(),
        reason: reason.to_string(),
    }
}
