// 🗄️ Metadata Catalog - SQLite snapshot of applied definitions
// Apply is idempotent: unchanged objects keep their version, every change is an event

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

use crate::permissions::ResourceKind;
use crate::repo::FeatureRepo;

const ACTOR: &str = "feature_repo_apply";

// ============================================================================
// TYPES
// ============================================================================

/// One stored definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogObject {
    pub kind: ResourceKind,
    pub name: String,
    pub spec: Value,
    pub fingerprint: String,
    pub version: i64,
    pub applied_at: DateTime<Utc>,
}

/// Event for the catalog audit trail
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Event {
    pub event_id: String,
    pub timestamp: DateTime<Utc>,
    pub event_type: String,
    pub entity_type: String,
    pub entity_id: String,
    pub data: Value,
    pub actor: String,
}

impl Event {
    pub fn new(
        event_type: &str,
        entity_type: &str,
        entity_id: &str,
        data: Value,
        actor: &str,
    ) -> Self {
        Self {
            event_id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            event_type: event_type.to_string(),
            entity_type: entity_type.to_string(),
            entity_id: entity_id.to_string(),
            data,
            actor: actor.to_string(),
        }
    }
}

/// Outcome of one apply
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplySummary {
    pub project: String,
    pub created: usize,
    pub updated: usize,
    pub unchanged: usize,
    pub deleted: usize,
    /// Hash over every object fingerprint, in apply order
    pub repo_fingerprint: String,
    pub event_id: String,
}

impl ApplySummary {
    pub fn has_changes(&self) -> bool {
        self.created + self.updated + self.deleted > 0
    }
}

// ============================================================================
// SETUP
// ============================================================================

pub fn open_catalog(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create catalog directory {}", parent.display()))?;
    }
    let conn = Connection::open(path)
        .with_context(|| format!("Failed to open catalog {}", path.display()))?;
    setup_catalog(&conn)?;
    Ok(conn)
}

pub fn setup_catalog(conn: &Connection) -> Result<()> {
    // Enable WAL mode for crash recovery
    conn.pragma_update(None, "journal_mode", "WAL")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS registry_objects (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            kind TEXT NOT NULL,
            name TEXT NOT NULL,
            spec TEXT NOT NULL,
            fingerprint TEXT NOT NULL,
            version INTEGER NOT NULL DEFAULT 1,
            applied_at TEXT NOT NULL,
            UNIQUE (kind, name)
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS events (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            event_id TEXT UNIQUE NOT NULL,
            timestamp TEXT NOT NULL,
            event_type TEXT NOT NULL,
            entity_type TEXT NOT NULL,
            entity_id TEXT NOT NULL,
            data TEXT NOT NULL,
            actor TEXT NOT NULL,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP
        )",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_objects_kind ON registry_objects(kind)",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_events_entity ON events(entity_type, entity_id)",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_events_type ON events(event_type, timestamp)",
        [],
    )?;

    Ok(())
}

/// SHA-256 of the canonical JSON text (object keys sorted)
pub fn fingerprint(spec: &Value) -> String {
    let mut hasher = Sha256::new();
    hasher.update(spec.to_string());
    format!("{:x}", hasher.finalize())
}

// ============================================================================
// APPLY
// ============================================================================

pub fn apply_repo(conn: &Connection, repo: &FeatureRepo) -> Result<ApplySummary> {
    let objects = repo.objects()?;
    let now = Utc::now();
    let tx = conn
        .unchecked_transaction()
        .context("Failed to start apply transaction")?;

    let mut existing: BTreeMap<(String, String), (String, i64)> = BTreeMap::new();
    {
        let mut stmt = tx.prepare("SELECT kind, name, fingerprint, version FROM registry_objects")?;
        let rows = stmt.query_map([], |row| {
            Ok((
                (row.get::<_, String>(0)?, row.get::<_, String>(1)?),
                (row.get::<_, String>(2)?, row.get::<_, i64>(3)?),
            ))
        })?;
        for row in rows {
            let (key, value) = row?;
            existing.insert(key, value);
        }
    }

    let mut summary = ApplySummary {
        project: repo.project.clone(),
        created: 0,
        updated: 0,
        unchanged: 0,
        deleted: 0,
        repo_fingerprint: String::new(),
        event_id: String::new(),
    };
    let mut repo_hasher = Sha256::new();
    let mut applied: BTreeSet<(String, String)> = BTreeSet::new();

    for object in &objects {
        let kind = object.kind.as_str();
        let spec_json = serde_json::to_string(&object.spec)?;
        let fp = fingerprint(&object.spec);
        repo_hasher.update(fp.as_bytes());
        let key = (kind.to_string(), object.name.clone());

        match existing.get(&key) {
            Some((stored, _)) if *stored == fp => summary.unchanged += 1,
            Some((_, version)) => {
                let version = version + 1;
                tx.execute(
                    "UPDATE registry_objects
                     SET spec = ?1, fingerprint = ?2, version = ?3, applied_at = ?4
                     WHERE kind = ?5 AND name = ?6",
                    params![spec_json, fp, version, now.to_rfc3339(), kind, object.name],
                )
                .with_context(|| format!("Failed to update {} {}", kind, object.name))?;
                let data = serde_json::json!({ "version": version, "fingerprint": fp });
                insert_event(&tx, &Event::new("object_updated", kind, &object.name, data, ACTOR))?;
                summary.updated += 1;
            }
            None => {
                tx.execute(
                    "INSERT INTO registry_objects (kind, name, spec, fingerprint, version, applied_at)
                     VALUES (?1, ?2, ?3, ?4, 1, ?5)",
                    params![kind, object.name, spec_json, fp, now.to_rfc3339()],
                )
                .with_context(|| format!("Failed to insert {} {}", kind, object.name))?;
                let data = serde_json::json!({ "version": 1, "fingerprint": fp });
                insert_event(&tx, &Event::new("object_created", kind, &object.name, data, ACTOR))?;
                summary.created += 1;
            }
        }
        applied.insert(key);
    }

    for (kind, name) in existing.keys().filter(|k| !applied.contains(*k)) {
        tx.execute(
            "DELETE FROM registry_objects WHERE kind = ?1 AND name = ?2",
            params![kind, name],
        )
        .with_context(|| format!("Failed to delete {} {}", kind, name))?;
        insert_event(&tx, &Event::new("object_deleted", kind, name, Value::Null, ACTOR))?;
        summary.deleted += 1;
    }

    summary.repo_fingerprint = format!("{:x}", repo_hasher.finalize());
    let mut event = Event::new(
        "repo_applied",
        ResourceKind::Project.as_str(),
        &repo.project,
        Value::Null,
        ACTOR,
    );
    summary.event_id = event.event_id.clone();
    event.data = serde_json::to_value(&summary)?;
    insert_event(&tx, &event)?;

    tx.commit().context("Failed to commit apply")?;

    info!(
        created = summary.created,
        updated = summary.updated,
        unchanged = summary.unchanged,
        deleted = summary.deleted,
        "catalog applied"
    );
    Ok(summary)
}

// ============================================================================
// EVENTS
// ============================================================================

/// Insert event into audit trail
pub fn insert_event(conn: &Connection, event: &Event) -> Result<()> {
    let data_json = serde_json::to_string(&event.data)?;

    conn.execute(
        "INSERT INTO events (
            event_id, timestamp, event_type, entity_type, entity_id, data, actor
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            event.event_id,
            event.timestamp.to_rfc3339(),
            event.event_type,
            event.entity_type,
            event.entity_id,
            data_json,
            event.actor,
        ],
    )?;

    Ok(())
}

fn parse_timestamp(raw: &str, column: usize) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(column, Type::Text, Box::new(e)))
}

fn parse_json(raw: &str, column: usize) -> rusqlite::Result<Value> {
    serde_json::from_str(raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(column, Type::Text, Box::new(e)))
}

fn event_from_row(row: &Row<'_>) -> rusqlite::Result<Event> {
    let timestamp: String = row.get(1)?;
    let data: String = row.get(5)?;

    Ok(Event {
        event_id: row.get(0)?,
        timestamp: parse_timestamp(&timestamp, 1)?,
        event_type: row.get(2)?,
        entity_type: row.get(3)?,
        entity_id: row.get(4)?,
        data: parse_json(&data, 5)?,
        actor: row.get(6)?,
    })
}

/// Apply summaries, newest first
pub fn list_apply_events(conn: &Connection, limit: usize) -> Result<Vec<Event>> {
    let mut stmt = conn.prepare(
        "SELECT event_id, timestamp, event_type, entity_type, entity_id, data, actor
         FROM events
         WHERE event_type = 'repo_applied'
         ORDER BY id DESC
         LIMIT ?1",
    )?;

    let events = stmt
        .query_map(params![limit as i64], event_from_row)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(events)
}

/// Change history of one object, oldest first
pub fn get_events_for_object(
    conn: &Connection,
    kind: ResourceKind,
    name: &str,
) -> Result<Vec<Event>> {
    let mut stmt = conn.prepare(
        "SELECT event_id, timestamp, event_type, entity_type, entity_id, data, actor
         FROM events
         WHERE entity_type = ?1 AND entity_id = ?2
         ORDER BY id ASC",
    )?;

    let events = stmt
        .query_map(params![kind.as_str(), name], event_from_row)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(events)
}

// ============================================================================
// QUERIES
// ============================================================================

fn object_from_row(row: &Row<'_>) -> rusqlite::Result<CatalogObject> {
    let kind: String = row.get(0)?;
    let spec: String = row.get(2)?;
    let applied_at: String = row.get(5)?;

    Ok(CatalogObject {
        kind: kind
            .parse()
            .map_err(|e: anyhow::Error| {
                rusqlite::Error::FromSqlConversionFailure(0, Type::Text, e.into())
            })?,
        name: row.get(1)?,
        spec: parse_json(&spec, 2)?,
        fingerprint: row.get(3)?,
        version: row.get(4)?,
        applied_at: parse_timestamp(&applied_at, 5)?,
    })
}

/// Stored objects, optionally of one kind, ordered by kind then name
pub fn list_objects(conn: &Connection, kind: Option<ResourceKind>) -> Result<Vec<CatalogObject>> {
    let mut stmt = conn.prepare(
        "SELECT kind, name, spec, fingerprint, version, applied_at
         FROM registry_objects
         WHERE ?1 IS NULL OR kind = ?1
         ORDER BY kind, name",
    )?;

    let objects = stmt
        .query_map(params![kind.map(|k| k.as_str())], object_from_row)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(objects)
}

pub fn get_object(
    conn: &Connection,
    kind: ResourceKind,
    name: &str,
) -> Result<Option<CatalogObject>> {
    let object = conn
        .query_row(
            "SELECT kind, name, spec, fingerprint, version, applied_at
             FROM registry_objects
             WHERE kind = ?1 AND name = ?2",
            params![kind.as_str(), name],
            object_from_row,
        )
        .optional()?;

    Ok(object)
}

pub fn count_objects(conn: &Connection) -> Result<i64> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM registry_objects", [], |row| row.get(0))?;
    debug!(count, "catalog object count");
    Ok(count)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definitions::{FeatureView, Field};
    use crate::datasets::ValueType;

    fn catalog() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        setup_catalog(&conn).unwrap();
        conn
    }

    #[test]
    fn test_apply_twice_is_idempotent() {
        let conn = catalog();
        let repo = FeatureRepo::banking();
        let total = repo.resources().len();

        let first = apply_repo(&conn, &repo).unwrap();
        let count1 = count_objects(&conn).unwrap();

        let second = apply_repo(&conn, &repo).unwrap();
        let count2 = count_objects(&conn).unwrap();

        println!("First apply: {:?}", first);
        println!("Second apply: {:?}", second);

        assert_eq!(first.created, total);
        assert_eq!(count1 as usize, total);
        assert!(!second.has_changes());
        assert_eq!(second.unchanged, total);
        assert_eq!(count2, count1);
        assert_eq!(first.repo_fingerprint, second.repo_fingerprint);
        assert_eq!(first.repo_fingerprint.len(), 64);
    }

    #[test]
    fn test_changed_object_gets_new_version() {
        let conn = catalog();
        let mut repo = FeatureRepo::banking();
        apply_repo(&conn, &repo).unwrap();

        repo.feature_views[0].ttl_seconds += 86_400;
        let summary = apply_repo(&conn, &repo).unwrap();
        assert_eq!(summary.updated, 1);
        assert_eq!(summary.created, 0);

        let name = repo.feature_views[0].name.clone();
        let stored = get_object(&conn, ResourceKind::FeatureView, &name).unwrap().unwrap();
        assert_eq!(stored.version, 2);
        assert_eq!(stored.spec["ttl_seconds"], repo.feature_views[0].ttl_seconds);

        let history = get_events_for_object(&conn, ResourceKind::FeatureView, &name).unwrap();
        let types: Vec<&str> = history.iter().map(|e| e.event_type.as_str()).collect();
        assert_eq!(types, vec!["object_created", "object_updated"]);
    }

    #[test]
    fn test_removed_objects_are_deleted() {
        let conn = catalog();
        let mut repo = FeatureRepo::banking();
        repo.register_feature_view(
            FeatureView::new("scratch_view", "customer_data_source")
                .with_entities(&["customer"])
                .with_ttl_days(1)
                .with_schema(vec![Field::new("age", ValueType::Int64)]),
        );
        apply_repo(&conn, &repo).unwrap();
        assert!(get_object(&conn, ResourceKind::FeatureView, "scratch_view").unwrap().is_some());

        let summary = apply_repo(&conn, &FeatureRepo::banking()).unwrap();
        // project spec counts views, so it changes too
        assert_eq!(summary.deleted, 1);
        assert_eq!(summary.updated, 1);
        assert!(get_object(&conn, ResourceKind::FeatureView, "scratch_view").unwrap().is_none());
    }

    #[test]
    fn test_list_objects_by_kind() {
        let conn = catalog();
        apply_repo(&conn, &FeatureRepo::banking()).unwrap();

        let services = list_objects(&conn, Some(ResourceKind::FeatureService)).unwrap();
        assert_eq!(services.len(), 9);
        assert!(services.iter().all(|o| o.kind == ResourceKind::FeatureService && o.version == 1));
        assert!(services.windows(2).all(|w| w[0].name <= w[1].name));

        let all = list_objects(&conn, None).unwrap();
        assert_eq!(all.len(), FeatureRepo::banking().resources().len());
    }

    #[test]
    fn test_apply_events_newest_first() {
        let conn = catalog();
        let repo = FeatureRepo::banking();
        let first = apply_repo(&conn, &repo).unwrap();
        let second = apply_repo(&conn, &repo).unwrap();

        let events = list_apply_events(&conn, 10).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].event_id, second.event_id);
        assert_eq!(events[1].event_id, first.event_id);
        assert_eq!(events[1].data["created"], first.created);
        assert_eq!(events[0].data["event_id"], second.event_id.as_str());
        assert_eq!(events[1].data["event_id"], first.event_id.as_str());
        assert_eq!(events[0].entity_id, "banking_feature_store");
    }

    #[test]
    fn test_open_catalog_creates_parent_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("registry.db");
        let conn = open_catalog(&path).unwrap();
        assert!(path.exists());
        assert_eq!(count_objects(&conn).unwrap(), 0);
    }

    #[test]
    fn test_fingerprint_is_stable() {
        let a = serde_json::json!({"b": 1, "a": [1, 2]});
        let b = serde_json::json!({"a": [1, 2], "b": 1});
        assert_eq!(fingerprint(&a), fingerprint(&b));
        assert_ne!(fingerprint(&a), fingerprint(&serde_json::json!({"a": [2, 1], "b": 1})));
    }
}
