use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Generation metadata attached to a content item
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ItemMeta {
    /// Parent item this one was mutated from, if any
    #[serde(default)]
    pub mutate_of_id: Option<i64>,
    /// Generation server that produced the item
    #[serde(default)]
    pub server_id: Option<String>,
    /// Generation method (sampler/pipeline identifier)
    #[serde(default)]
    pub method: Option<String>,
}

/// A piece of content eligible for recommendation
///
/// Supplied by the external data source for each call; the engine never
/// mutates it. `published: None` counts as published — only an explicit
/// `false` excludes an item from every bucket.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ContentItem {
    pub id: i64,
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub published: Option<bool>,
    /// Derivation family shared by an item and its variants
    #[serde(default)]
    pub family_id: Option<i64>,
    #[serde(default)]
    pub meta: ItemMeta,
}

impl ContentItem {
    /// Creates a published item with no lineage or generation metadata
    pub fn new(id: i64, user_id: i64, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            user_id,
            created_at,
            published: None,
            family_id: None,
            meta: ItemMeta::default(),
        }
    }

    pub fn is_published(&self) -> bool {
        self.published != Some(false)
    }
}

/// An observed "viewed A, then viewed B" aggregate
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TransitionRecord {
    #[serde(rename = "from_created_image_id")]
    pub from_id: i64,
    #[serde(rename = "to_created_image_id")]
    pub to_id: i64,
    pub count: f64,
    pub last_updated: DateTime<Utc>,
}

impl TransitionRecord {
    pub fn new(from_id: i64, to_id: i64, count: f64, last_updated: DateTime<Utc>) -> Self {
        Self {
            from_id,
            to_id,
            count,
            last_updated,
        }
    }
}

/// Why a candidate made it into the batch
///
/// Serialized with the wire tags the surrounding web layer exposes
/// (`"lineage"`, `"sameCreator"`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Reason {
    Lineage,
    SameCreator,
    SameServerMethod,
    ClickNext,
    Fallback,
    ExploreRandom,
}

/// One entry of the ranked batch returned to the caller
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RankedItem {
    pub id: i64,
    /// Merged signal score, rounded to 2 decimals
    pub score: f64,
    /// Signals that contributed, in the order they fired
    pub reasons: Vec<Reason>,
    /// Normalized click evidence in [0, 1]; 0.0 when no click signal fired
    pub click_score: f64,
    /// This candidate's share of all observed next-clicks; 0.0 when absent
    pub click_share: f64,
}

impl RankedItem {
    pub fn has_reason(&self, reason: Reason) -> bool {
        self.reasons.contains(&reason)
    }
}

/// Everything the loader must supply for one recommendation call
#[derive(Debug, Clone, PartialEq)]
pub struct RecommendInputs {
    pub anchor: ContentItem,
    pub pool: Vec<ContentItem>,
    pub transitions: Vec<TransitionRecord>,
}

/// Opaque per-request context handed to the data loader
#[derive(Debug, Clone, PartialEq)]
pub struct RequestContext {
    pub anchor_id: i64,
    pub user_id: Option<i64>,
}

impl RequestContext {
    pub fn new(anchor_id: i64) -> Self {
        Self {
            anchor_id,
            user_id: None,
        }
    }

    pub fn with_user(anchor_id: i64, user_id: i64) -> Self {
        Self {
            anchor_id,
            user_id: Some(user_id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_published_defaults_to_true() {
        let item = ContentItem::new(1, 10, ts());
        assert!(item.is_published());

        let unpublished = ContentItem {
            published: Some(false),
            ..ContentItem::new(2, 10, ts())
        };
        assert!(!unpublished.is_published());

        let explicit = ContentItem {
            published: Some(true),
            ..ContentItem::new(3, 10, ts())
        };
        assert!(explicit.is_published());
    }

    #[test]
    fn test_transition_wire_field_names() {
        let record = TransitionRecord::new(1, 2, 5.0, ts());
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["from_created_image_id"], 1);
        assert_eq!(json["to_created_image_id"], 2);
        assert_eq!(json["count"], 5.0);

        let parsed: TransitionRecord = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, record);
    }

    #[test]
    fn test_reason_wire_tags() {
        assert_eq!(
            serde_json::to_string(&Reason::SameServerMethod).unwrap(),
            r#""sameServerMethod""#
        );
        assert_eq!(
            serde_json::to_string(&Reason::ClickNext).unwrap(),
            r#""clickNext""#
        );
        assert_eq!(
            serde_json::to_string(&Reason::ExploreRandom).unwrap(),
            r#""exploreRandom""#
        );
    }

    #[test]
    fn test_ranked_item_serializes_flat() {
        let item = RankedItem {
            id: 7,
            score: 4.1,
            reasons: vec![Reason::Lineage, Reason::Fallback],
            click_score: 0.0,
            click_share: 0.0,
        };
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["id"], 7);
        assert_eq!(json["score"], 4.1);
        assert_eq!(json["reasons"][0], "lineage");
        assert_eq!(json["reasons"][1], "fallback");
        assert_eq!(json["click_score"], 0.0);
    }

    #[test]
    fn test_item_meta_deserializes_sparse_json() {
        let item: ContentItem = serde_json::from_str(
            r#"{"id": 4, "user_id": 9, "created_at": "2024-05-01T12:00:00Z"}"#,
        )
        .unwrap();
        assert_eq!(item.id, 4);
        assert_eq!(item.published, None);
        assert_eq!(item.meta, ItemMeta::default());
    }
}
