//! Telemetry Extractor
//!
//! Issues exactly one device query per call and decodes only the subtree
//! that call asked for. Decoding is split into pure `decode_*` functions
//! so "missing", "empty" and "malformed" stay distinguishable.

use serde_json::Value;
use tracing::{debug, info};

use super::document::{entries, member};
use super::{DeviceQueryService, Document, QueryFilter};
use crate::error::{MonitorError, ParseError};
use crate::utils::types::{DeviceSnapshot, InterfaceInfo, SensorSample};

/// Typed view of the device, backed by a query service
pub struct TelemetryExtractor<Q> {
    service: Q,
}

impl<Q: DeviceQueryService> TelemetryExtractor<Q> {
    pub fn new(service: Q) -> Self {
        Self { service }
    }

    pub async fn hostname(&self) -> Result<String, MonitorError> {
        let doc = self.service.query(&QueryFilter::Hostname).await?;
        Ok(decode_hostname(&doc)?)
    }

    pub async fn up_interfaces(&self) -> Result<Vec<String>, MonitorError> {
        let doc = self.service.query(&QueryFilter::InterfacesUp).await?;
        Ok(decode_up_interfaces(&doc)?)
    }

    /// `None` when the interface has no IPv4 address configured
    pub async fn interface_address(&self, name: &str) -> Result<Option<String>, MonitorError> {
        let doc = self
            .service
            .query(&QueryFilter::Interface(name.to_string()))
            .await?;
        if doc.is_empty() {
            debug!("{} has no configured interface node", name);
            return Ok(None);
        }
        Ok(decode_interface_address(&doc))
    }

    pub async fn sensor(&self, id: &str) -> Result<SensorSample, MonitorError> {
        let doc = self.service.query(&QueryFilter::Sensor(id.to_string())).await?;
        Ok(decode_sensor(&doc, id)?)
    }

    /// Hostname, up interfaces and their addresses, in device order
    pub async fn snapshot(&self) -> Result<DeviceSnapshot, MonitorError> {
        let hostname = self.hostname().await?;
        let names = self.up_interfaces().await?;
        info!("{} has {} interfaces operationally up", hostname, names.len());

        let mut interfaces = Vec::with_capacity(names.len());
        for name in names {
            let ip = self.interface_address(&name).await?;
            debug!("Interface {} address: {}", name, ip.as_deref().unwrap_or("not configured"));
            interfaces.push(InterfaceInfo::new(name, ip));
        }

        Ok(DeviceSnapshot::new(hostname, interfaces))
    }
}

pub fn decode_hostname(doc: &Document) -> Result<String, ParseError> {
    let filter = QueryFilter::Hostname.name();
    let value = doc
        .lookup(&["hostname"])
        .ok_or(ParseError::MissingField { filter, field: "hostname" })?;
    let hostname = value
        .as_str()
        .ok_or_else(|| ParseError::Malformed {
            filter,
            field: "hostname",
            detail: format!("expected string, got {}", value),
        })?
        .trim();

    if hostname.is_empty() {
        return Err(ParseError::EmptyField { filter, field: "hostname" });
    }
    Ok(hostname.to_string())
}

pub fn decode_up_interfaces(doc: &Document) -> Result<Vec<String>, ParseError> {
    let filter = QueryFilter::InterfacesUp.name();
    let list = doc
        .lookup(&["interfaces-state", "interface"])
        .or_else(|| doc.lookup(&["interface"]))
        .ok_or(ParseError::MissingField { filter, field: "interface" })?;

    let mut names = Vec::new();
    for entry in entries(list) {
        let up = member(entry, "oper-status").and_then(Value::as_str) == Some("up");
        if !up {
            continue;
        }
        let name = member(entry, "name")
            .and_then(Value::as_str)
            .ok_or(ParseError::MissingField { filter, field: "name" })?;
        names.push(name.trim().to_string());
    }
    Ok(names)
}

/// First configured IPv4 address; any absence is "not configured", never an error.
pub fn decode_interface_address(doc: &Document) -> Option<String> {
    doc.lookup(&["interface", "ipv4", "address", "ip"])
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
        .map(str::to_string)
}

pub fn decode_sensor(doc: &Document, id: &str) -> Result<SensorSample, ParseError> {
    let filter = QueryFilter::Sensor(String::new()).name();
    let list = doc
        .lookup(&["environment-sensors", "environment-sensor"])
        .or_else(|| doc.lookup(&["environment-sensor"]))
        .ok_or(ParseError::MissingField { filter, field: "environment-sensor" })?;

    // Stacked switches report one entry per member under the same name; the first wins.
    let entry = entries(list)
        .into_iter()
        .find(|entry| member(entry, "name").and_then(Value::as_str).map(str::trim) == Some(id.trim()))
        .ok_or(ParseError::MissingField { filter, field: "name" })?;

    let reading = member(entry, "current-reading")
        .ok_or(ParseError::MissingField { filter, field: "current-reading" })?;
    let reading = match reading {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
    .ok_or_else(|| ParseError::Malformed {
        filter,
        field: "current-reading",
        detail: format!("expected integer, got {}", reading),
    })?;

    let state = member(entry, "state")
        .and_then(Value::as_str)
        .ok_or(ParseError::MissingField { filter, field: "state" })?
        .trim();
    if state.is_empty() {
        return Err(ParseError::EmptyField { filter, field: "state" });
    }

    Ok(SensorSample::new(reading, state))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::MockDeviceQueryService;
    use crate::error::QueryError;
    use serde_json::json;

    fn sensors_doc(reading: Value, state: &str) -> Document {
        Document::new(json!({
            "Cisco-IOS-XE-environment-oper:environment-sensors": {
                "environment-sensor": [
                    {"name": "Temp Sensor 1", "location": "Switch 1", "state": "Normal", "current-reading": 20},
                    {"name": "Temp Sensor 0", "location": "Switch 1", "state": state, "current-reading": reading, "sensor-units": "Celsius"},
                    {"name": "Temp Sensor 0", "location": "Switch 2", "state": "Normal", "current-reading": 99}
                ]
            }
        }))
    }

    #[test]
    fn test_decode_hostname() {
        let doc = Document::new(json!({"Cisco-IOS-XE-native:hostname": "sw1"}));
        assert_eq!(decode_hostname(&doc).unwrap(), "sw1");
    }

    #[test]
    fn test_hostname_error_kinds() {
        assert!(matches!(
            decode_hostname(&Document::empty()),
            Err(ParseError::MissingField { .. })
        ));
        assert!(matches!(
            decode_hostname(&Document::new(json!({"hostname": "  "}))),
            Err(ParseError::EmptyField { .. })
        ));
        assert!(matches!(
            decode_hostname(&Document::new(json!({"hostname": 7}))),
            Err(ParseError::Malformed { .. })
        ));
    }

    #[test]
    fn test_decode_up_interfaces_filters_oper_status() {
        let doc = Document::new(json!({
            "ietf-interfaces:interfaces-state": {
                "interface": [
                    {"name": "GigabitEthernet0/0", "oper-status": "up"},
                    {"name": "GigabitEthernet1/0/1", "oper-status": "up"},
                    {"name": "GigabitEthernet1/0/2", "oper-status": "down"},
                    {"name": "Vlan1", "oper-status": "up"}
                ]
            }
        }));
        assert_eq!(
            decode_up_interfaces(&doc).unwrap(),
            vec!["GigabitEthernet0/0", "GigabitEthernet1/0/1", "Vlan1"]
        );
    }

    #[test]
    fn test_empty_interface_list_is_valid() {
        let doc = Document::new(json!({"interfaces-state": {"interface": []}}));
        assert!(decode_up_interfaces(&doc).unwrap().is_empty());
        assert!(decode_up_interfaces(&Document::empty()).is_err());
    }

    #[test]
    fn test_interface_address_absent_is_none() {
        let configured = Document::new(json!({
            "ietf-interfaces:interface": {
                "name": "Vlan1",
                "ietf-ip:ipv4": {"address": [{"ip": "10.93.130.45", "netmask": "255.255.255.0"}]}
            }
        }));
        assert_eq!(decode_interface_address(&configured).as_deref(), Some("10.93.130.45"));

        let no_ipv4 = Document::new(json!({"ietf-interfaces:interface": {"name": "Gi1/0/2"}}));
        assert_eq!(decode_interface_address(&no_ipv4), None);
        assert_eq!(decode_interface_address(&Document::empty()), None);
    }

    #[test]
    fn test_decode_sensor_selects_first_named_entry() {
        let sample = decode_sensor(&sensors_doc(json!(32), "Normal"), "Temp Sensor 0").unwrap();
        assert_eq!(sample, SensorSample::new(32, "Normal"));
    }

    #[test]
    fn test_decode_sensor_accepts_string_reading() {
        let sample = decode_sensor(&sensors_doc(json!("41"), "Warning"), "Temp Sensor 0").unwrap();
        assert_eq!(sample.reading, 41);
        assert_eq!(sample.health.as_str(), "Warning");
    }

    #[test]
    fn test_decode_sensor_error_kinds() {
        assert!(matches!(
            decode_sensor(&sensors_doc(json!("warm"), "Normal"), "Temp Sensor 0"),
            Err(ParseError::Malformed { field: "current-reading", .. })
        ));
        assert!(matches!(
            decode_sensor(&sensors_doc(json!(30), "Normal"), "Temp Sensor 9"),
            Err(ParseError::MissingField { field: "name", .. })
        ));
        assert!(matches!(
            decode_sensor(&sensors_doc(json!(30), ""), "Temp Sensor 0"),
            Err(ParseError::EmptyField { field: "state", .. })
        ));
    }

    #[tokio::test]
    async fn test_snapshot_issues_one_query_per_field() {
        let mut service = MockDeviceQueryService::new();
        service
            .expect_query()
            .withf(|f| *f == QueryFilter::Hostname)
            .times(1)
            .returning(|_| Ok(Document::new(json!({"hostname": "sw1"}))));
        service
            .expect_query()
            .withf(|f| *f == QueryFilter::InterfacesUp)
            .times(1)
            .returning(|_| {
                Ok(Document::new(json!({"interfaces-state": {"interface": [
                    {"name": "Gi1/0/1", "oper-status": "up"},
                    {"name": "Gi1/0/2", "oper-status": "up"}
                ]}})))
            });
        service
            .expect_query()
            .withf(|f| matches!(f, QueryFilter::Interface(_)))
            .times(2)
            .returning(|f| match f {
                QueryFilter::Interface(name) if name == "Gi1/0/1" => Ok(Document::new(
                    json!({"interface": {"ipv4": {"address": [{"ip": "10.1.1.1"}]}}}),
                )),
                _ => Ok(Document::empty()),
            });

        let snapshot = TelemetryExtractor::new(service).snapshot().await.unwrap();
        assert_eq!(snapshot.hostname, "sw1");
        assert_eq!(snapshot.up_interface_count(), 2);
        assert_eq!(snapshot.addressed().collect::<Vec<_>>(), vec![("Gi1/0/1", "10.1.1.1")]);
    }

    #[tokio::test]
    async fn test_query_error_propagates() {
        let mut service = MockDeviceQueryService::new();
        service.expect_query().returning(|f| {
            Err(QueryError::Status {
                filter: f.name(),
                status: 401,
            })
        });

        let err = TelemetryExtractor::new(service)
            .sensor("Temp Sensor 0")
            .await
            .unwrap_err();
        assert!(matches!(err, MonitorError::Query(QueryError::Status { status: 401, .. })));
    }
}
