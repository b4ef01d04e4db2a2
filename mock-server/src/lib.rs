use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Query, State},
    http::Method,
    routing::{any, get},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::net::TcpListener;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OrgUnit {
    pub id: String,
    pub name: String,
    pub level: u32,
}

pub type Db = Arc<Vec<OrgUnit>>;

/// Fixture resembling a small DHIS2 organisation unit hierarchy.
fn seed() -> Db {
    Arc::new(vec![
        OrgUnit {
            id: "ImspTQPwCqd".to_string(),
            name: "Sierra Leone".to_string(),
            level: 1,
        },
        OrgUnit {
            id: "O6uvpzGd5pu".to_string(),
            name: "Bo".to_string(),
            level: 2,
        },
        OrgUnit {
            id: "fdc6uOvgoji".to_string(),
            name: "Bombali".to_string(),
            level: 2,
        },
        OrgUnit {
            id: "YuQRtpLP10I".to_string(),
            name: "Badjia".to_string(),
            level: 3,
        },
    ])
}

pub fn app() -> Router {
    Router::new()
        .route("/api/organisationUnits.json", get(list_org_units))
        .route("/api/echo", any(echo))
        .route("/api/notJson", get(not_json))
        .with_state(seed())
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

/// Parse a DHIS2 `filter=level:eq:N` expression.
fn level_filter(filter: &str) -> Option<u32> {
    filter.strip_prefix("level:eq:")?.parse().ok()
}

async fn list_org_units(
    State(db): State<Db>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<Value> {
    let mut units: Vec<&OrgUnit> = db.iter().collect();
    if let Some(level) = params.get("filter").and_then(|f| level_filter(f)) {
        units.retain(|u| u.level == level);
    }

    let mut reply = json!({ "organisationUnits": units });
    // DHIS2 pages by default; only paging=false suppresses the pager.
    if params.get("paging").map(String::as_str) != Some("false") {
        reply["pager"] = json!({
            "page": 1,
            "pageCount": 1,
            "pageSize": 50,
            "total": units.len(),
        });
    }
    Json(reply)
}

/// Reflect the received method, query parameters and JSON body, so client
/// tests can assert what actually went over the wire.
async fn echo(
    method: Method,
    Query(params): Query<HashMap<String, String>>,
    body: String,
) -> Json<Value> {
    let body = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_str(&body).unwrap_or(Value::Null)
    };
    Json(json!({ "method": method.as_str(), "params": params, "body": body }))
}

async fn not_json() -> &'static str {
    "<html>server maintenance</html>"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn org_unit_serializes_to_json() {
        let unit = OrgUnit {
            id: "ImspTQPwCqd".to_string(),
            name: "Sierra Leone".to_string(),
            level: 1,
        };
        let json = serde_json::to_value(&unit).unwrap();
        assert_eq!(json["id"], "ImspTQPwCqd");
        assert_eq!(json["name"], "Sierra Leone");
        assert_eq!(json["level"], 1);
    }

    #[test]
    fn level_filter_parses_eq_expression() {
        assert_eq!(level_filter("level:eq:2"), Some(2));
        assert_eq!(level_filter("level:eq:nope"), None);
        assert_eq!(level_filter("name:eq:Bo"), None);
    }

    #[test]
    fn seed_has_units_on_multiple_levels() {
        let db = seed();
        assert!(db.iter().any(|u| u.level == 1));
        assert!(db.iter().filter(|u| u.level == 2).count() >= 2);
    }
}
