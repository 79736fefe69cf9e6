//! Models exchanged with the console's external collaborators.
//!
//! The persistence layer and the cluster membership tracker are not part of
//! the console. Handlers talk to them only through the messages below.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::KeelError;

// ---------------------------------------------------------------------------
// Persistence
// ---------------------------------------------------------------------------

/// Kind of record held by the persistence layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    Company,
    Record,
}

impl DataType {
    /// All known data types, in display order.
    pub const ALL: [DataType; 2] = [DataType::Company, DataType::Record];

    pub fn as_str(&self) -> &'static str {
        match self {
            DataType::Company => "company",
            DataType::Record => "record",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DataType {
    type Err = KeelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "company" => Ok(DataType::Company),
            "record" => Ok(DataType::Record),
            other => Err(KeelError::Codec(format!("unknown data type: {other}"))),
        }
    }
}

/// A stored record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: u64,
    pub data_type: DataType,
    pub active: bool,
    /// Free-form payload supplied by the operator.
    pub data: serde_json::Value,
}

/// Request sent to the persistence layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum PersistenceRequest {
    /// Every record of a type.
    GetAll { data_type: DataType },
    /// Records by id, optionally restricted to active (`Some(true)`) or
    /// inactive (`Some(false)`) ones.
    GetByIds {
        data_type: DataType,
        ids: Vec<u64>,
        active: Option<bool>,
    },
    /// Store a new record. The persistence layer assigns the id.
    Add {
        data_type: DataType,
        active: bool,
        data: serde_json::Value,
    },
    /// Delete records by id.
    Delete { data_type: DataType, ids: Vec<u64> },
}

impl PersistenceRequest {
    pub fn data_type(&self) -> DataType {
        match self {
            PersistenceRequest::GetAll { data_type }
            | PersistenceRequest::GetByIds { data_type, .. }
            | PersistenceRequest::Add { data_type, .. }
            | PersistenceRequest::Delete { data_type, .. } => *data_type,
        }
    }
}

/// Reply from the persistence layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PersistenceReply {
    /// Records produced by the request (affected records for add/delete).
    Records { records: Vec<Record> },
    /// The request failed. The message is shown to the operator verbatim.
    Failure { message: String },
}

// ---------------------------------------------------------------------------
// Cluster snapshot
// ---------------------------------------------------------------------------

/// Point-in-time view of one cluster member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterMember {
    pub address: String,
    pub protocol: String,
    pub status: String,
    #[serde(default)]
    pub roles: Vec<String>,
}

impl fmt::Display for ClusterMember {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{} [{}]", self.protocol, self.address, self.status)?;
        if !self.roles.is_empty() {
            write!(f, " roles: {}", self.roles.join(", "))?;
        }
        Ok(())
    }
}

/// Read-only access to the current cluster membership.
pub trait ClusterView: Send + Sync {
    /// Snapshot of every known member.
    fn members(&self) -> Vec<ClusterMember>;
}

/// A cluster view backed by a fixed member list.
#[derive(Debug, Clone, Default)]
pub struct StaticClusterView {
    members: Vec<ClusterMember>,
}

impl StaticClusterView {
    pub fn new(members: Vec<ClusterMember>) -> Self {
        Self { members }
    }
}

impl ClusterView for StaticClusterView {
    fn members(&self) -> Vec<ClusterMember> {
        self.members.clone()
    }
}
