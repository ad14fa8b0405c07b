//! Activity records as returned by the activities endpoint, and the
//! [`ActivitySource`] seam the renderer fetches them through.

use futures::future::{self, BoxFuture};
use serde::{Deserialize, Serialize};

use crate::error::{RenderError, Result};

/// One logged exercise session.
///
/// Only the route geometry is needed for rendering; the remaining fields are
/// kept for labels and logs. Unknown fields in the payload are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActivityRecord {
    pub id: Option<u64>,
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub activity_type: Option<String>,
    pub sport_type: Option<String>,
    pub start_date: Option<String>,
    pub map: Option<ActivityMap>,
}

/// The `map` object of an activity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActivityMap {
    pub id: Option<String>,
    pub summary_polyline: Option<String>,
    /// Full resolution route, only present on detailed activity payloads
    pub polyline: Option<String>,
}

impl ActivityRecord {
    /// Record carrying nothing but a summary polyline.
    pub fn with_summary_polyline(encoded: impl Into<String>) -> Self {
        Self {
            map: Some(ActivityMap {
                summary_polyline: Some(encoded.into()),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    /// The encoded route: the summary polyline, falling back to the detailed
    /// one when the summary is absent or empty.
    pub fn encoded_route(&self) -> Option<&str> {
        let map = self.map.as_ref()?;
        match (map.summary_polyline.as_deref(), map.polyline.as_deref()) {
            (Some(summary), _) if !summary.is_empty() => Some(summary),
            (summary, detailed) => detailed.or(summary),
        }
    }

    /// Human readable label for logs.
    pub fn label(&self) -> String {
        match (&self.name, self.id) {
            (Some(name), Some(id)) => format!("{} ({})", name, id),
            (Some(name), None) => name.clone(),
            (None, Some(id)) => id.to_string(),
            (None, None) => "unnamed activity".to_string(),
        }
    }
}

/// One page of the activity listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub access_token: String,
    pub page: u32,
    pub per_page: u32,
}

impl PageRequest {
    /// The first page, which is the only page the renderer ever asks for.
    pub fn first(access_token: impl Into<String>, per_page: u32) -> Self {
        Self {
            access_token: access_token.into(),
            page: 1,
            per_page,
        }
    }

    /// Reject requests that could never succeed before touching the network.
    pub fn validate(&self) -> Result<()> {
        if self.access_token.trim().is_empty() {
            return Err(RenderError::InvalidArgument("access token is empty".to_string()));
        }
        if self.page == 0 {
            return Err(RenderError::InvalidArgument("page numbers start at 1".to_string()));
        }
        if self.per_page == 0 {
            return Err(RenderError::InvalidArgument("page size must be positive".to_string()));
        }
        Ok(())
    }

    /// Query parameters in the order the endpoint documents them.
    pub fn query_pairs(&self) -> [(&'static str, String); 3] {
        [
            ("access_token", self.access_token.clone()),
            ("page", self.page.to_string()),
            ("per_page", self.per_page.to_string()),
        ]
    }
}

/// Anything that can produce one page of activity records.
pub trait ActivitySource: Send + Sync {
    fn fetch_page<'a>(&'a self, request: &'a PageRequest) -> BoxFuture<'a, Result<Vec<ActivityRecord>>>;
}

/// Serves a fixed list of records, truncated to the requested page size.
///
/// Useful for rendering saved API responses without network access.
#[derive(Debug, Clone, Default)]
pub struct StaticActivities {
    records: Vec<ActivityRecord>,
}

impl StaticActivities {
    pub fn new(records: Vec<ActivityRecord>) -> Self {
        Self { records }
    }

    /// Parse a saved activities response (a JSON array).
    pub fn from_json(body: &str) -> Result<Self> {
        Ok(Self::new(serde_json::from_str(body)?))
    }

    pub fn records(&self) -> &[ActivityRecord] {
        &self.records
    }

    fn page(&self, request: &PageRequest) -> Result<Vec<ActivityRecord>> {
        request.validate()?;
        let skip = (request.page as usize - 1).saturating_mul(request.per_page as usize);
        Ok(self
            .records
            .iter()
            .skip(skip)
            .take(request.per_page as usize)
            .cloned()
            .collect())
    }
}

impl ActivitySource for StaticActivities {
    fn fetch_page<'a>(&'a self, request: &'a PageRequest) -> BoxFuture<'a, Result<Vec<ActivityRecord>>> {
        Box::pin(future::ready(self.page(request)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_strava_payload() {
        let body = r#"[{
            "resource_state": 2,
            "id": 154504250376823,
            "name": "Morning Ride",
            "type": "Ride",
            "sport_type": "MountainBikeRide",
            "start_date": "2018-05-02T12:15:09Z",
            "map": {"id": "a12345", "summary_polyline": "o}oeFhxkkO", "resource_state": 2},
            "trainer": false
        }]"#;
        let records: Vec<ActivityRecord> = serde_json::from_str(body).unwrap();
        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.id, Some(154504250376823));
        assert_eq!(record.activity_type.as_deref(), Some("Ride"));
        assert_eq!(record.encoded_route(), Some("o}oeFhxkkO"));
        assert_eq!(record.label(), "Morning Ride (154504250376823)");
    }

    #[test]
    fn test_encoded_route_fallback() {
        let detailed: ActivityRecord =
            serde_json::from_str(r#"{"map": {"summary_polyline": null, "polyline": "??"}}"#).unwrap();
        assert_eq!(detailed.encoded_route(), Some("??"));

        let manual: ActivityRecord = serde_json::from_str(r#"{"id": 7, "map": {}}"#).unwrap();
        assert_eq!(manual.encoded_route(), None);

        let blank_summary: ActivityRecord =
            serde_json::from_str(r#"{"map": {"summary_polyline": "", "polyline": "o}oeFhxkkO"}}"#).unwrap();
        assert_eq!(blank_summary.encoded_route(), Some("o}oeFhxkkO"));

        // Nothing better to fall back to, so the empty route stays empty
        let blank_only: ActivityRecord =
            serde_json::from_str(r#"{"map": {"summary_polyline": ""}}"#).unwrap();
        assert_eq!(blank_only.encoded_route(), Some(""));

        let no_map: ActivityRecord = serde_json::from_str("{}").unwrap();
        assert_eq!(no_map.encoded_route(), None);
        assert_eq!(no_map.label(), "unnamed activity");
    }

    #[test]
    fn test_page_request_validation() {
        assert!(PageRequest::first("abc", 30).validate().is_ok());
        assert!(matches!(
            PageRequest::first("  ", 30).validate(),
            Err(RenderError::InvalidArgument(_))
        ));
        assert!(matches!(
            PageRequest::first("abc", 0).validate(),
            Err(RenderError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_query_pairs_order() {
        let pairs = PageRequest::first("abc", 2).query_pairs();
        let keys: Vec<&str> = pairs.iter().map(|(k, _)| *k).collect();
        assert_eq!(keys, ["access_token", "page", "per_page"]);
        assert_eq!(pairs[2].1, "2");
    }

    #[tokio::test]
    async fn test_static_source_truncates_to_page_size() {
        let source = StaticActivities::new(vec![
            ActivityRecord::with_summary_polyline("??"),
            ActivityRecord::with_summary_polyline("o}oeFhxkkO"),
            ActivityRecord::with_summary_polyline("_ibE_seK_seK_seK"),
        ]);
        let page = source.fetch_page(&PageRequest::first("abc", 2)).await.unwrap();
        assert_eq!(page.len(), 2);
        assert_eq!(page[1].encoded_route(), Some("o}oeFhxkkO"));
    }
}
