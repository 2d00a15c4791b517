use std::sync::Mutex;

use atrium_core::{Channel, IntentTag, RoutingLane, SessionId};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use crate::error::Result;
use crate::types::{AppendSource, AppendedResult, ContextEnvelope, ContextPayload};

/// Cold tier: the durable source of truth. A single `Mutex<Connection>`
/// wrapper, matching the `Mutex<Connection>` discipline used throughout
/// this codebase's other managers — one writer at a time, readers never
/// see a half-written row.
pub struct ColdStore {
    conn: Mutex<Connection>,
}

impl ColdStore {
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path)?;
        init_db(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        init_db(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn upsert_envelope(&self, envelope: &ContextEnvelope) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        let payload = serde_json::to_string(&envelope.payload)?;
        conn.execute(
            "INSERT INTO mcp_contexts (session_id, user_id, intent_tag, payload, created_at, expires_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT(session_id) DO UPDATE SET
                user_id = excluded.user_id,
                intent_tag = excluded.intent_tag,
                payload = excluded.payload,
                created_at = excluded.created_at,
                expires_at = excluded.expires_at",
            params![
                envelope.session_id.as_str(),
                envelope.user_id.as_str(),
                envelope.intent_tag.as_str(),
                payload,
                envelope.created_at.to_rfc3339(),
                envelope.expires_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    pub fn read_envelope(&self, session_id: &SessionId) -> Result<Option<ContextEnvelope>> {
        let conn = self.conn.lock().unwrap();
        let row = conn
            .query_row(
                "SELECT session_id, user_id, intent_tag, payload, created_at, expires_at
                 FROM mcp_contexts WHERE session_id = ?1",
                params![session_id.as_str()],
                |row| {
                    let session_id: String = row.get(0)?;
                    let user_id: String = row.get(1)?;
                    let intent_tag: String = row.get(2)?;
                    let payload: String = row.get(3)?;
                    let created_at: String = row.get(4)?;
                    let expires_at: String = row.get(5)?;
                    Ok((session_id, user_id, intent_tag, payload, created_at, expires_at))
                },
            )
            .optional()?;

        let Some((session_id, user_id, intent_tag, payload, created_at, expires_at)) = row else {
            return Ok(None);
        };

        let payload: ContextPayload = serde_json::from_str(&payload)?;
        Ok(Some(ContextEnvelope {
            session_id: SessionId::new(session_id),
            user_id: user_id.into(),
            intent_tag: IntentTag::from_str_tag(&intent_tag)
                .unwrap_or(IntentTag::GeneralChat),
            payload,
            created_at: parse_rfc3339(&created_at),
            expires_at: parse_rfc3339(&expires_at),
        }))
    }

    pub fn append(&self, append: &AppendedResult) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        let output = serde_json::to_string(&append.output)?;
        conn.execute(
            "INSERT INTO mcp_appends (append_id, session_id, source, output, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                append.append_id,
                append.session_id.as_str(),
                source_str(append.source),
                output,
                append.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// Unbounded, paginated read — cold tier retains everything.
    pub fn read_appends(&self, session_id: &SessionId, limit: usize, offset: usize) -> Result<Vec<AppendedResult>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT append_id, session_id, source, output, created_at
             FROM mcp_appends WHERE session_id = ?1
             ORDER BY created_at ASC LIMIT ?2 OFFSET ?3",
        )?;
        let rows = stmt.query_map(params![session_id.as_str(), limit as i64, offset as i64], |row| {
            let append_id: String = row.get(0)?;
            let session_id: String = row.get(1)?;
            let source: String = row.get(2)?;
            let output: String = row.get(3)?;
            let created_at: String = row.get(4)?;
            Ok((append_id, session_id, source, output, created_at))
        })?;

        let mut out = Vec::new();
        for row in rows {
            let (append_id, session_id, source, output, created_at) = row?;
            out.push(AppendedResult {
                session_id: SessionId::new(session_id),
                append_id,
                source: source_from_str(&source),
                output: serde_json::from_str(&output)?,
                created_at: parse_rfc3339(&created_at),
            });
        }
        Ok(out)
    }

    pub fn count_appends(&self, session_id: &SessionId) -> Result<usize> {
        let conn = self.conn.lock().unwrap();
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM mcp_appends WHERE session_id = ?1",
            params![session_id.as_str()],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    pub fn delete_session(&self, session_id: &SessionId) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "DELETE FROM mcp_contexts WHERE session_id = ?1",
            params![session_id.as_str()],
        )?;
        conn.execute(
            "DELETE FROM mcp_appends WHERE session_id = ?1",
            params![session_id.as_str()],
        )?;
        conn.execute("DELETE FROM turns WHERE session_id = ?1", params![session_id.as_str()])?;
        Ok(())
    }

    pub fn insert_turn(&self, turn: &atrium_core::Turn) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO turns (id, session_id, user_id, channel, user_text, ai_text, intent, routing, needs_approval, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                turn.id,
                turn.session_id.as_str(),
                turn.user_id.as_str(),
                channel_str(turn.channel),
                turn.user_text,
                turn.ai_text,
                turn.intent.as_str(),
                turn.routing.to_string(),
                turn.needs_approval,
                turn.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    pub fn list_turns(&self, session_id: &SessionId) -> Result<Vec<atrium_core::Turn>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, session_id, user_id, channel, user_text, ai_text, intent, routing, needs_approval, created_at
             FROM turns WHERE session_id = ?1 ORDER BY created_at ASC",
        )?;
        let rows = stmt.query_map(params![session_id.as_str()], |row| {
            let id: String = row.get(0)?;
            let session_id: String = row.get(1)?;
            let user_id: String = row.get(2)?;
            let channel: String = row.get(3)?;
            let user_text: String = row.get(4)?;
            let ai_text: String = row.get(5)?;
            let intent: String = row.get(6)?;
            let routing: String = row.get(7)?;
            let needs_approval: bool = row.get(8)?;
            let created_at: String = row.get(9)?;
            Ok((
                id,
                session_id,
                user_id,
                channel,
                user_text,
                ai_text,
                intent,
                routing,
                needs_approval,
                created_at,
            ))
        })?;

        let mut out = Vec::new();
        for row in rows {
            let (id, session_id, user_id, channel, user_text, ai_text, intent, routing, needs_approval, created_at) =
                row?;
            out.push(atrium_core::Turn {
                id,
                session_id: SessionId::new(session_id),
                user_id: user_id.into(),
                channel: channel_from_str(&channel),
                user_text,
                ai_text,
                intent: IntentTag::from_str_tag(&intent).unwrap_or(IntentTag::GeneralChat),
                routing: routing_from_str(&routing),
                needs_approval,
                created_at: parse_rfc3339(&created_at),
            });
        }
        Ok(out)
    }

    pub fn log_channel_conversation(&self, record: &ChannelConversationRecord) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO channel_conversations (platform, session_id, user_message, ai_response, intent, needs_approval, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                record.platform,
                record.session_id.as_str(),
                record.user_message,
                record.ai_response,
                record.intent,
                record.needs_approval,
                record.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    pub fn log_channel_error(&self, session_id: &SessionId, platform: &str, error: &str) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO channel_errors (platform, session_id, error, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![platform, session_id.as_str(), error, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }
}

pub struct ChannelConversationRecord {
    pub platform: String,
    pub session_id: SessionId,
    pub user_message: String,
    pub ai_response: String,
    pub intent: String,
    pub needs_approval: bool,
    pub created_at: DateTime<Utc>,
}

fn init_db(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS turns (
            id TEXT PRIMARY KEY,
            session_id TEXT NOT NULL,
            user_id TEXT NOT NULL,
            channel TEXT NOT NULL,
            user_text TEXT NOT NULL,
            ai_text TEXT NOT NULL,
            intent TEXT NOT NULL,
            routing TEXT NOT NULL,
            needs_approval INTEGER NOT NULL,
            created_at TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_turns_session ON turns(session_id, created_at);

        CREATE TABLE IF NOT EXISTS mcp_contexts (
            session_id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            intent_tag TEXT NOT NULL,
            payload TEXT NOT NULL,
            created_at TEXT NOT NULL,
            expires_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS mcp_appends (
            append_id TEXT PRIMARY KEY,
            session_id TEXT NOT NULL,
            source TEXT NOT NULL,
            output TEXT NOT NULL,
            created_at TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_appends_session ON mcp_appends(session_id, created_at);

        CREATE TABLE IF NOT EXISTS approvals (
            session_id TEXT PRIMARY KEY,
            intent_tag TEXT NOT NULL,
            fields TEXT NOT NULL,
            preview_text TEXT NOT NULL,
            state TEXT NOT NULL,
            created_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS channel_conversations (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            platform TEXT NOT NULL,
            session_id TEXT NOT NULL,
            user_message TEXT NOT NULL,
            ai_response TEXT NOT NULL,
            intent TEXT NOT NULL,
            needs_approval INTEGER NOT NULL,
            created_at TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_channel_conv_session ON channel_conversations(session_id);

        CREATE TABLE IF NOT EXISTS channel_errors (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            platform TEXT NOT NULL,
            session_id TEXT NOT NULL,
            error TEXT NOT NULL,
            created_at TEXT NOT NULL
        );",
    )?;
    Ok(())
}

fn parse_rfc3339(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

fn source_str(source: AppendSource) -> &'static str {
    match source {
        AppendSource::Engine => "engine",
        AppendSource::Tool => "tool",
        AppendSource::Approval => "approval",
        AppendSource::ExternalAgent => "external_agent",
    }
}

fn source_from_str(s: &str) -> AppendSource {
    match s {
        "tool" => AppendSource::Tool,
        "approval" => AppendSource::Approval,
        "external_agent" => AppendSource::ExternalAgent,
        _ => AppendSource::Engine,
    }
}

fn channel_str(channel: Channel) -> &'static str {
    match channel {
        Channel::Http => "http",
        Channel::Whatsapp => "whatsapp",
    }
}

fn channel_from_str(s: &str) -> Channel {
    match s {
        "whatsapp" => Channel::Whatsapp,
        _ => Channel::Http,
    }
}

fn routing_from_str(s: &str) -> RoutingLane {
    match s {
        "direct_auto" => RoutingLane::DirectAuto,
        "approval_gated" => RoutingLane::ApprovalGated,
        _ => RoutingLane::LlmReply,
    }
}
