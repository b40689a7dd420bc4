use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::net::IpAddr;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::validation::FieldError;

/// A single player-connection event, as stored.
#[derive(Debug, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionLog {
    pub id: i64,
    pub server_id: i64,
    pub player_name: String,
    pub player_ip: String,
    pub player_uuid: Option<String>,
    pub full_domain: String,
    pub connected_at: Option<DateTime<Utc>>,
}

impl ConnectionLog {
    /// Post-create augmentation: attach the derived domain classification
    /// without touching the stored shape.
    pub fn with_domain_flag(self, is_custom_domain: bool) -> CreatedConnectionLog {
        CreatedConnectionLog {
            id: self.id,
            server_id: self.server_id,
            player_name: self.player_name,
            player_ip: self.player_ip,
            player_uuid: self.player_uuid,
            full_domain: self.full_domain,
            connected_at: self.connected_at,
            is_custom_domain,
        }
    }
}

/// The create response: the stored record plus `isCustomDomain`.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatedConnectionLog {
    pub id: i64,
    pub server_id: i64,
    pub player_name: String,
    pub player_ip: String,
    pub player_uuid: Option<String>,
    pub full_domain: String,
    pub connected_at: Option<DateTime<Utc>>,
    pub is_custom_domain: bool,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateConnectionLogRequest {
    #[validate(length(min = 1, max = 253, message = "fullDomain must be 1-253 characters"))]
    pub full_domain: String,
    #[validate(length(min = 1, max = 16, message = "playerName must be 1-16 characters"))]
    pub player_name: String,
    #[validate(custom(function = "validate_ip", message = "playerIp must be a valid IP address"))]
    pub player_ip: String,
    #[validate(custom(function = "validate_uuid", message = "playerUuid must be a valid UUID"))]
    pub player_uuid: Option<String>,
}

fn validate_ip(value: &str) -> Result<(), ValidationError> {
    value
        .parse::<IpAddr>()
        .map(|_| ())
        .map_err(|_| ValidationError::new("invalid_ip"))
}

fn validate_uuid(value: &str) -> Result<(), ValidationError> {
    Uuid::parse_str(value)
        .map(|_| ())
        .map_err(|_| ValidationError::new("invalid_uuid"))
}

/// Raw list-query parameters, exactly as they arrive on the wire. Everything
/// is optional and string-typed; `normalize` turns them into a typed query or
/// a list of field errors.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ConnectionLogListParams {
    pub page: Option<String>,
    pub page_size: Option<String>,
    pub ip: Option<String>,
    pub username: Option<String>,
    pub from_time: Option<String>,
    pub to_time: Option<String>,
    pub server: Option<String>,
}

/// A validated, normalized listing request as forwarded to the service.
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionLogQuery {
    pub page: u32,
    pub page_size: u32,
    pub ip: Option<String>,
    pub username: Option<String>,
    pub from_time: Option<DateTime<Utc>>,
    pub to_time: Option<DateTime<Utc>>,
    pub server: Option<i64>,
}

impl ConnectionLogListParams {
    pub fn normalize(&self) -> Result<ConnectionLogQuery, Vec<FieldError>> {
        let mut errors = Vec::new();

        let page = parse_positive(self.page.as_deref(), "page", 1, &mut errors);
        let page_size = parse_positive(self.page_size.as_deref(), "pageSize", 50, &mut errors);
        let from_time = parse_timestamp(self.from_time.as_deref(), "fromTime", &mut errors);
        let to_time = parse_timestamp(self.to_time.as_deref(), "toTime", &mut errors);

        let server = match self.server.as_deref() {
            None => None,
            Some(raw) => match raw.trim().parse::<i64>() {
                Ok(id) => Some(id),
                Err(_) => {
                    errors.push(FieldError::new("server", "must be a server id"));
                    None
                }
            },
        };

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(ConnectionLogQuery {
            page,
            page_size,
            ip: self.ip.clone(),
            username: self.username.clone(),
            from_time,
            to_time,
            server,
        })
    }
}

fn parse_positive(raw: Option<&str>, field: &str, default: u32, errors: &mut Vec<FieldError>) -> u32 {
    match raw {
        None => default,
        Some(s) => match s.trim().parse::<u32>() {
            Ok(n) if n >= 1 => n,
            _ => {
                errors.push(FieldError::new(field, "must be a positive integer"));
                default
            }
        },
    }
}

fn parse_timestamp(
    raw: Option<&str>,
    field: &str,
    errors: &mut Vec<FieldError>,
) -> Option<DateTime<Utc>> {
    let raw = raw?;
    match DateTime::parse_from_rfc3339(raw.trim()) {
        Ok(ts) => Some(ts.with_timezone(&Utc)),
        Err(_) => {
            errors.push(FieldError::new(field, "must be an RFC 3339 timestamp"));
            None
        }
    }
}

/// One page of results plus the metadata needed to page through the rest.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionLogPage {
    pub data: Vec<ConnectionLog>,
    pub total: i64,
    pub page: u32,
    pub page_size: u32,
    pub total_pages: u32,
}

impl ConnectionLogPage {
    pub fn new(data: Vec<ConnectionLog>, total: i64, page: u32, page_size: u32) -> Self {
        let total_pages = ((total + page_size as i64 - 1) / page_size as i64).max(0) as u32;
        Self {
            data,
            total,
            page,
            page_size,
            total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use validator::Validate;

    fn valid_create_request() -> CreateConnectionLogRequest {
        CreateConnectionLogRequest {
            full_domain: "mc.example.com".to_string(),
            player_name: "Steve".to_string(),
            player_ip: "123.45.67.89".to_string(),
            player_uuid: None,
        }
    }

    #[test]
    fn list_params_default_to_first_page_of_fifty() {
        let query = ConnectionLogListParams::default().normalize().unwrap();
        assert_eq!(query.page, 1);
        assert_eq!(query.page_size, 50);
        assert_eq!(query.server, None);
    }

    #[test]
    fn list_params_parse_base_ten_integers() {
        let params = ConnectionLogListParams {
            page: Some("3".to_string()),
            page_size: Some("25".to_string()),
            server: Some("7".to_string()),
            ..Default::default()
        };
        let query = params.normalize().unwrap();
        assert_eq!(query.page, 3);
        assert_eq!(query.page_size, 25);
        assert_eq!(query.server, Some(7));
    }

    #[test]
    fn non_numeric_page_is_rejected() {
        let params = ConnectionLogListParams {
            page: Some("abc".to_string()),
            ..Default::default()
        };
        let errors = params.normalize().unwrap_err();
        assert!(!errors.is_empty());
        assert_eq!(errors[0].field, "page");
    }

    #[test]
    fn zero_page_size_is_rejected() {
        let params = ConnectionLogListParams {
            page_size: Some("0".to_string()),
            ..Default::default()
        };
        let errors = params.normalize().unwrap_err();
        assert_eq!(errors[0].field, "pageSize");
    }

    #[test]
    fn time_bounds_parse_as_rfc3339() {
        let params = ConnectionLogListParams {
            from_time: Some("2024-05-01T00:00:00Z".to_string()),
            to_time: Some("2024-05-02T12:30:00+02:00".to_string()),
            ..Default::default()
        };
        let query = params.normalize().unwrap();
        assert_eq!(
            query.from_time,
            Some(Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap())
        );
        assert_eq!(
            query.to_time,
            Some(Utc.with_ymd_and_hms(2024, 5, 2, 10, 30, 0).unwrap())
        );
    }

    #[test]
    fn malformed_timestamp_is_rejected() {
        let params = ConnectionLogListParams {
            from_time: Some("yesterday".to_string()),
            ..Default::default()
        };
        let errors = params.normalize().unwrap_err();
        assert_eq!(errors[0].field, "fromTime");
    }

    #[test]
    fn bad_fields_are_all_reported_at_once() {
        let params = ConnectionLogListParams {
            page: Some("x".to_string()),
            page_size: Some("y".to_string()),
            server: Some("not-an-id".to_string()),
            ..Default::default()
        };
        let errors = params.normalize().unwrap_err();
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn valid_create_request_passes_validation() {
        assert!(valid_create_request().validate().is_ok());
    }

    #[test]
    fn empty_player_name_fails_validation() {
        let req = CreateConnectionLogRequest {
            player_name: String::new(),
            ..valid_create_request()
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn malformed_player_ip_fails_validation() {
        let req = CreateConnectionLogRequest {
            player_ip: "999.0.0.1".to_string(),
            ..valid_create_request()
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn ipv6_player_ip_is_accepted() {
        let req = CreateConnectionLogRequest {
            player_ip: "2001:db8::1".to_string(),
            ..valid_create_request()
        };
        assert!(req.validate().is_ok());
    }

    #[test]
    fn malformed_player_uuid_fails_validation() {
        let req = CreateConnectionLogRequest {
            player_uuid: Some("not-a-uuid".to_string()),
            ..valid_create_request()
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn well_formed_player_uuid_is_accepted() {
        let req = CreateConnectionLogRequest {
            player_uuid: Some("069a79f4-44e9-4726-a5be-fca90e38aaf5".to_string()),
            ..valid_create_request()
        };
        assert!(req.validate().is_ok());
    }

    #[test]
    fn augmentation_only_adds_the_domain_flag() {
        let log = ConnectionLog {
            id: 1,
            server_id: 2,
            player_name: "Steve".to_string(),
            player_ip: "123.45.67.89".to_string(),
            player_uuid: None,
            full_domain: "mc.example.com".to_string(),
            connected_at: None,
        };
        let created = log.with_domain_flag(false);
        assert_eq!(created.id, 1);
        assert_eq!(created.full_domain, "mc.example.com");
        assert!(!created.is_custom_domain);
    }

    #[test]
    fn created_log_serializes_with_wire_field_names() {
        let log = ConnectionLog {
            id: 1,
            server_id: 2,
            player_name: "Steve".to_string(),
            player_ip: "123.45.67.89".to_string(),
            player_uuid: None,
            full_domain: "custom.other.net".to_string(),
            connected_at: None,
        };
        let value = serde_json::to_value(log.with_domain_flag(true)).unwrap();
        assert_eq!(value["fullDomain"], "custom.other.net");
        assert_eq!(value["playerIp"], "123.45.67.89");
        assert_eq!(value["isCustomDomain"], true);
        assert_eq!(value["serverId"], 2);
    }

    #[test]
    fn page_count_rounds_up() {
        assert_eq!(ConnectionLogPage::new(vec![], 0, 1, 50).total_pages, 0);
        assert_eq!(ConnectionLogPage::new(vec![], 50, 1, 50).total_pages, 1);
        assert_eq!(ConnectionLogPage::new(vec![], 51, 1, 50).total_pages, 2);
    }
}
