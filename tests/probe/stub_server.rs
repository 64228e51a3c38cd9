//! In-process stub of the message-store collaborator.
//!
//! Implements exactly the client-observable contract the probe asserts:
//! uuid/priority/unfiltered lookup, group clearing, group defaults,
//! stats counters, and the store report. Selection policy is fixed to
//! lowest-priority-value-first, FIFO within a group; `reverse=true`
//! reads from the highest-valued group instead. This is a test double
//! for exercising the harness, not a broker.

use axum::Router;
use axum::extract::{Json, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use mqprobe::api::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

#[derive(Default)]
struct StubStore {
    groups: BTreeMap<i32, Vec<StoredMessage>>,
    defaults: BTreeMap<i32, Option<u64>>,
    inserted: u64,
    deleted: u64,
    pruned: u64,
}

struct StoredMessage {
    uuid: String,
    msg: String,
}

type Shared = Arc<Mutex<StubStore>>;

pub fn router() -> Router {
    let state: Shared = Arc::new(Mutex::new(StubStore::default()));
    Router::new()
        .route(
            "/api/msg",
            get(get_msg).post(add_msg).put(mv_msg).delete(rm_msg),
        )
        .route("/api/group", get(get_group).delete(clear_group))
        .route(
            "/api/group-defaults",
            get(get_defaults).post(set_defaults).delete(rm_defaults),
        )
        .route(
            "/api/stats",
            get(get_stats).put(put_stats).delete(reset_stats),
        )
        .route("/api/store", get(get_store))
        .with_state(state)
}

// =============================================================================
// MESSAGE HANDLERS
// =============================================================================

async fn add_msg(
    State(state): State<Shared>,
    Json(body): Json<AddMessageRequest>,
) -> Json<AddMessageResponse> {
    let mut store = state.lock().unwrap();
    let uuid = Uuid::new_v4().to_string();
    store.groups.entry(body.priority).or_default().push(StoredMessage {
        uuid: uuid.clone(),
        msg: body.msg,
    });
    store.inserted += 1;
    Json(AddMessageResponse { uuid })
}

async fn get_msg(
    State(state): State<Shared>,
    Query(query): Query<MessageQuery>,
) -> Json<Option<MessageData>> {
    let store = state.lock().unwrap();
    let found = if let Some(uuid) = &query.uuid {
        store
            .groups
            .values()
            .flat_map(|group| group.iter())
            .find(|message| &message.uuid == uuid)
    } else if let Some(priority) = query.priority {
        store.groups.get(&priority).and_then(|group| group.first())
    } else if query.reverse == Some(true) {
        store
            .groups
            .values()
            .rev()
            .find_map(|group| group.first())
    } else {
        store.groups.values().find_map(|group| group.first())
    };
    Json(found.map(|message| MessageData {
        uuid: message.uuid.clone(),
        msg: message.msg.clone(),
    }))
}

async fn mv_msg(State(state): State<Shared>, Json(body): Json<ReprioritizeRequest>) -> StatusCode {
    let mut store = state.lock().unwrap();
    let mut moved = None;
    for group in store.groups.values_mut() {
        if let Some(index) = group.iter().position(|message| message.uuid == body.uuid) {
            moved = Some(group.remove(index));
            break;
        }
    }
    store.groups.retain(|_, group| !group.is_empty());
    match moved {
        Some(message) => {
            store.groups.entry(body.priority).or_default().push(message);
            StatusCode::OK
        }
        None => StatusCode::NOT_FOUND,
    }
}

#[derive(Deserialize)]
struct UuidQuery {
    uuid: String,
}

async fn rm_msg(State(state): State<Shared>, Query(query): Query<UuidQuery>) -> StatusCode {
    let mut store = state.lock().unwrap();
    let mut removed = false;
    for group in store.groups.values_mut() {
        if let Some(index) = group.iter().position(|message| message.uuid == query.uuid) {
            group.remove(index);
            removed = true;
            break;
        }
    }
    store.groups.retain(|_, group| !group.is_empty());
    if removed {
        store.deleted += 1;
    }
    StatusCode::OK
}

// =============================================================================
// GROUP HANDLERS
// =============================================================================

#[derive(Serialize)]
#[serde(untagged)]
enum GroupReply {
    One { data: Option<GroupReport> },
    Many { data: Vec<GroupReport> },
}

fn report_for(
    priority: i32,
    messages: &[StoredMessage],
    max_byte_size: Option<u64>,
    include_msg_data: bool,
) -> GroupReport {
    GroupReport {
        priority,
        byte_size: messages.iter().map(|m| m.msg.len() as u64).sum(),
        max_byte_size,
        msg_count: messages.len() as u64,
        messages: if include_msg_data {
            messages
                .iter()
                .map(|m| GroupMessage {
                    uuid: m.uuid.clone(),
                    byte_size: m.msg.len() as u64,
                })
                .collect()
        } else {
            vec![]
        },
    }
}

async fn get_group(
    State(state): State<Shared>,
    Query(query): Query<GroupQuery>,
) -> Json<GroupReply> {
    let store = state.lock().unwrap();
    let include = query.include_msg_data.unwrap_or(false);
    match query.priority {
        Some(priority) => {
            let data = store.groups.get(&priority).map(|messages| {
                report_for(
                    priority,
                    messages,
                    store.defaults.get(&priority).copied().flatten(),
                    include,
                )
            });
            Json(GroupReply::One { data })
        }
        None => {
            let data = store
                .groups
                .iter()
                .map(|(priority, messages)| {
                    report_for(
                        *priority,
                        messages,
                        store.defaults.get(priority).copied().flatten(),
                        include,
                    )
                })
                .collect();
            Json(GroupReply::Many { data })
        }
    }
}

#[derive(Deserialize)]
struct PriorityQuery {
    priority: i32,
}

async fn clear_group(State(state): State<Shared>, Query(query): Query<PriorityQuery>) -> StatusCode {
    let mut store = state.lock().unwrap();
    if let Some(messages) = store.groups.remove(&query.priority) {
        store.deleted += messages.len() as u64;
    }
    StatusCode::OK
}

// =============================================================================
// GROUP DEFAULTS HANDLERS
// =============================================================================

#[derive(Deserialize)]
struct DefaultsQuery {
    priority: Option<i32>,
}

async fn get_defaults(
    State(state): State<Shared>,
    Query(query): Query<DefaultsQuery>,
) -> Json<DataEnvelope<Vec<GroupDefaultsEntry>>> {
    let store = state.lock().unwrap();
    let data = store
        .defaults
        .iter()
        .filter(|(priority, _)| query.priority.is_none() || query.priority == Some(**priority))
        .map(|(priority, max_byte_size)| GroupDefaultsEntry {
            priority: *priority,
            max_byte_size: *max_byte_size,
        })
        .collect();
    Json(DataEnvelope { data })
}

async fn set_defaults(
    State(state): State<Shared>,
    Json(entry): Json<GroupDefaultsEntry>,
) -> StatusCode {
    let mut store = state.lock().unwrap();
    store.defaults.insert(entry.priority, entry.max_byte_size);
    StatusCode::OK
}

async fn rm_defaults(State(state): State<Shared>, Query(query): Query<PriorityQuery>) -> StatusCode {
    let mut store = state.lock().unwrap();
    store.defaults.remove(&query.priority);
    StatusCode::OK
}

// =============================================================================
// STATS AND STORE HANDLERS
// =============================================================================

fn stats_of(store: &StubStore) -> StatsReport {
    StatsReport {
        inserted: store.inserted,
        deleted: store.deleted,
        pruned: store.pruned,
    }
}

async fn get_stats(State(state): State<Shared>) -> Json<DataEnvelope<StatsReport>> {
    let store = state.lock().unwrap();
    Json(DataEnvelope {
        data: stats_of(&store),
    })
}

async fn put_stats(State(state): State<Shared>, Json(update): Json<StatsUpdate>) -> StatusCode {
    let mut store = state.lock().unwrap();
    if let Some(inserted) = update.inserted {
        store.inserted = inserted;
    }
    if let Some(deleted) = update.deleted {
        store.deleted = deleted;
    }
    if let Some(pruned) = update.pruned {
        store.pruned = pruned;
    }
    StatusCode::OK
}

async fn reset_stats(State(state): State<Shared>) -> Json<DataEnvelope<StatsReport>> {
    let mut store = state.lock().unwrap();
    let data = stats_of(&store);
    store.inserted = 0;
    store.deleted = 0;
    store.pruned = 0;
    Json(DataEnvelope { data })
}

async fn get_store(State(state): State<Shared>) -> Json<DataEnvelope<StoreReport>> {
    let store = state.lock().unwrap();
    let groups: Vec<StoreGroupData> = store
        .groups
        .iter()
        .map(|(priority, messages)| StoreGroupData {
            priority: *priority,
            byte_size: messages.iter().map(|m| m.msg.len() as u64).sum(),
            max_byte_size: store.defaults.get(priority).copied().flatten(),
            msg_count: messages.len() as u64,
        })
        .collect();
    let group_defaults = store
        .defaults
        .iter()
        .map(|(priority, max_byte_size)| GroupDefaultsEntry {
            priority: *priority,
            max_byte_size: *max_byte_size,
        })
        .collect();
    let report = StoreReport {
        byte_size: groups.iter().map(|g| g.byte_size).sum(),
        max_byte_size: None,
        msg_count: groups.iter().map(|g| g.msg_count).sum(),
        group_count: groups.len() as u64,
        groups,
        group_defaults,
    };
    Json(DataEnvelope { data: report })
}
