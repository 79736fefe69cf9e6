//! In-memory stand-in for the persistence layer.
//!
//! Requests and replies travel as [`WireEnvelope`]s so the store sees the
//! same bytes a remote persistence service would.

use std::collections::BTreeMap;

use keel_console::actor::{Addr, Mailbox, Recipient};
use keel_types::error::Result;
use keel_types::manifest::{self, WireEnvelope, WireMessage};
use keel_types::model::{DataType, PersistenceReply, PersistenceRequest, Record};

/// One request to the persistence layer and where to send the answer.
#[derive(Debug)]
pub struct PersistenceCall {
    pub request: WireEnvelope,
    pub reply_to: Recipient<WireEnvelope>,
}

/// Address of a persistence service.
pub type PersistenceRef = Addr<PersistenceCall>;

/// Records kept in a map keyed by type and id.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    next_id: u64,
    records: BTreeMap<(DataType, u64), Record>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            next_id: 1,
            records: BTreeMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Run one request against the store.
    pub fn apply(&mut self, request: PersistenceRequest) -> PersistenceReply {
        match request {
            PersistenceRequest::GetAll { data_type } => PersistenceReply::Records {
                records: self.of_type(data_type).cloned().collect(),
            },
            PersistenceRequest::GetByIds {
                data_type,
                ids,
                active,
            } => PersistenceReply::Records {
                records: ids
                    .iter()
                    .filter_map(|id| self.records.get(&(data_type, *id)))
                    .filter(|r| active.is_none_or(|a| r.active == a))
                    .cloned()
                    .collect(),
            },
            PersistenceRequest::Add {
                data_type,
                active,
                data,
            } => {
                let record = Record {
                    id: self.next_id,
                    data_type,
                    active,
                    data,
                };
                self.next_id += 1;
                self.records.insert((data_type, record.id), record.clone());
                log::debug!("stored {data_type} {}", record.id);
                PersistenceReply::Records {
                    records: vec![record],
                }
            },
            PersistenceRequest::Delete { data_type, ids } => {
                let missing: Vec<String> = ids
                    .iter()
                    .filter(|id| !self.records.contains_key(&(data_type, **id)))
                    .map(u64::to_string)
                    .collect();
                if !missing.is_empty() {
                    return PersistenceReply::Failure {
                        message: format!("no {data_type} with id {}", missing.join(", ")),
                    };
                }
                PersistenceReply::Records {
                    records: ids
                        .iter()
                        .filter_map(|id| self.records.remove(&(data_type, *id)))
                        .collect(),
                }
            },
        }
    }

    /// Decode a request envelope, apply it and encode the reply.
    pub fn call(&mut self, envelope: &WireEnvelope) -> Result<WireEnvelope> {
        let reply = match manifest::decode(envelope) {
            Ok(WireMessage::PersistenceRequest(request)) => self.apply(request),
            Ok(other) => PersistenceReply::Failure {
                message: format!("not a persistence request: {other:?}"),
            },
            Err(e) => PersistenceReply::Failure {
                message: e.to_string(),
            },
        };
        WireEnvelope::encode(&reply)
    }

    fn of_type(&self, data_type: DataType) -> impl Iterator<Item = &Record> {
        self.records
            .range((data_type, 0)..=(data_type, u64::MAX))
            .map(|(_, r)| r)
    }
}

/// Persistence task.
pub async fn run_memory_store(mut mailbox: Mailbox<PersistenceCall>, mut store: MemoryStore) {
    while let Some(call) = mailbox.recv().await {
        match store.call(&call.request) {
            Ok(reply) => call.reply_to.tell(reply),
            Err(e) => log::error!("persistence reply could not be encoded: {e}"),
        }
    }
    log::debug!("persistence stopped");
}

/// Spawn `store` as a task. Must be called from within a tokio runtime.
pub fn spawn_memory_store(store: MemoryStore) -> PersistenceRef {
    let (addr, mailbox) = Addr::new("persistence");
    tokio::spawn(run_memory_store(mailbox, store));
    addr
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn add(store: &mut MemoryStore, data_type: DataType, active: bool) -> u64 {
        match store.apply(PersistenceRequest::Add {
            data_type,
            active,
            data: json!({"name": "acme"}),
        }) {
            PersistenceReply::Records { records } => records[0].id,
            other => panic!("unexpected {other:?}"),
        }
    }

    fn ids(reply: PersistenceReply) -> Vec<u64> {
        match reply {
            PersistenceReply::Records { records } => records.iter().map(|r| r.id).collect(),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn add_assigns_increasing_ids() {
        let mut store = MemoryStore::new();
        assert_eq!(add(&mut store, DataType::Company, true), 1);
        assert_eq!(add(&mut store, DataType::Record, true), 2);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn get_all_is_scoped_to_type() {
        let mut store = MemoryStore::new();
        add(&mut store, DataType::Company, true);
        add(&mut store, DataType::Record, true);
        add(&mut store, DataType::Company, false);
        let reply = store.apply(PersistenceRequest::GetAll {
            data_type: DataType::Company,
        });
        assert_eq!(ids(reply), [1, 3]);
    }

    #[test]
    fn get_by_ids_filters_on_status() {
        let mut store = MemoryStore::new();
        add(&mut store, DataType::Company, true);
        add(&mut store, DataType::Company, false);
        let request = |active| PersistenceRequest::GetByIds {
            data_type: DataType::Company,
            ids: vec![1, 2, 9],
            active,
        };
        assert_eq!(ids(store.apply(request(None))), [1, 2]);
        assert_eq!(ids(store.apply(request(Some(false)))), [2]);
    }

    #[test]
    fn delete_unknown_id_fails_without_deleting() {
        let mut store = MemoryStore::new();
        add(&mut store, DataType::Company, true);
        let reply = store.apply(PersistenceRequest::Delete {
            data_type: DataType::Company,
            ids: vec![1, 7],
        });
        assert_eq!(
            reply,
            PersistenceReply::Failure {
                message: "no company with id 7".into()
            }
        );
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn call_rejects_unknown_manifest() {
        let mut store = MemoryStore::new();
        let envelope = WireEnvelope {
            manifest: "keel.nope".into(),
            payload: b"{}".to_vec(),
        };
        let reply: PersistenceReply = store.call(&envelope).unwrap().open().unwrap();
        assert!(matches!(reply, PersistenceReply::Failure { message } if message.contains("keel.nope")));
    }

    #[tokio::test]
    async fn store_task_answers_over_the_wire() {
        let store = spawn_memory_store(MemoryStore::new());
        let (reply_to, mut replies) = Addr::<WireEnvelope>::new("client");
        store.tell(PersistenceCall {
            request: WireEnvelope::encode(&PersistenceRequest::Add {
                data_type: DataType::Record,
                active: true,
                data: json!(42),
            })
            .unwrap(),
            reply_to: reply_to.recipient(),
        });
        let reply: PersistenceReply = replies.recv().await.unwrap().open().unwrap();
        assert_eq!(ids(reply), [1]);
    }
}
