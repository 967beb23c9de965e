//! Classification of catalog responses.
//!
//! Every operation has a closed table of status codes it understands.
//! [classify] maps a status code to an [Outcome] using that table;
//! `401` is [Outcome::Unauthorized] for all operations and any code outside
//! the table is [Outcome::Unexpected].

use std::fmt;

use http::StatusCode;
use ResourceKind::{DataStore, Workspace};

/// The kinds of resources managed through the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Workspace,
    DataStore,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceKind::Workspace => write!(f, "workspace"),
            ResourceKind::DataStore => write!(f, "data store"),
        }
    }
}

/// A catalog operation on a kind of resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Get(ResourceKind),
    List(ResourceKind),
    Create(ResourceKind),
    Update(ResourceKind),
    Delete(ResourceKind),
}

impl Operation {
    /// All status codes with a defined meaning for this operation,
    /// in ascending order.
    pub fn expected_status_codes(&self) -> Vec<StatusCode> {
        let mut codes = status_table(*self)
            .iter()
            .map(|(code, _)| *code)
            .chain([StatusCode::UNAUTHORIZED])
            .collect::<Vec<_>>();
        codes.sort();
        codes
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Get(kind) => write!(f, "get {kind}"),
            Operation::List(kind) => write!(f, "list {kind}s"),
            Operation::Create(kind) => write!(f, "create {kind}"),
            Operation::Update(kind) => write!(f, "update {kind}"),
            Operation::Delete(kind) => write!(f, "delete {kind}"),
        }
    }
}

/// The meaning of a status code in the context of an [Operation].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The operation succeeded, a payload may be decoded.
    Success,
    /// The resource does not exist.
    Absent,
    /// A resource with the same name already exists.
    Conflict,
    /// The resource is not empty and recursion was not requested.
    Forbidden,
    /// The requested change is not allowed,
    /// e.g. renaming a resource or deleting the default workspace.
    MethodNotAllowed,
    /// The catalog failed to create the resource server side.
    ServerRejected,
    /// The credentials were rejected.
    Unauthorized,
    /// A status code this operation does not know about.
    Unexpected(StatusCode),
}

impl Outcome {
    /// Whether this is a regular business result rather than a failure.
    pub fn is_business(&self) -> bool {
        matches!(
            self,
            Outcome::Success
                | Outcome::Absent
                | Outcome::Conflict
                | Outcome::Forbidden
                | Outcome::MethodNotAllowed
                | Outcome::ServerRejected
        )
    }
}

const READ: &[(StatusCode, Outcome)] = &[
    (StatusCode::OK, Outcome::Success),
    (StatusCode::NOT_FOUND, Outcome::Absent),
];

const CREATE_WORKSPACE: &[(StatusCode, Outcome)] = &[
    (StatusCode::CREATED, Outcome::Success),
    (StatusCode::CONFLICT, Outcome::Conflict),
];

const CREATE_DATA_STORE: &[(StatusCode, Outcome)] = &[
    (StatusCode::CREATED, Outcome::Success),
    (StatusCode::INTERNAL_SERVER_ERROR, Outcome::ServerRejected),
];

const UPDATE: &[(StatusCode, Outcome)] = &[
    (StatusCode::OK, Outcome::Success),
    (StatusCode::NOT_FOUND, Outcome::Absent),
    (StatusCode::METHOD_NOT_ALLOWED, Outcome::MethodNotAllowed),
];

const DELETE_WORKSPACE: &[(StatusCode, Outcome)] = &[
    (StatusCode::OK, Outcome::Success),
    (StatusCode::FORBIDDEN, Outcome::Forbidden),
    (StatusCode::NOT_FOUND, Outcome::Absent),
    (StatusCode::METHOD_NOT_ALLOWED, Outcome::MethodNotAllowed),
];

const DELETE_DATA_STORE: &[(StatusCode, Outcome)] = &[
    (StatusCode::OK, Outcome::Success),
    (StatusCode::FORBIDDEN, Outcome::Forbidden),
    (StatusCode::NOT_FOUND, Outcome::Absent),
];

fn status_table(operation: Operation) -> &'static [(StatusCode, Outcome)] {
    match operation {
        Operation::Get(_) | Operation::List(_) => READ,
        Operation::Create(Workspace) => CREATE_WORKSPACE,
        Operation::Create(DataStore) => CREATE_DATA_STORE,
        Operation::Update(_) => UPDATE,
        Operation::Delete(Workspace) => DELETE_WORKSPACE,
        Operation::Delete(DataStore) => DELETE_DATA_STORE,
    }
}

/// Classify the status code of a response to `operation`.
pub fn classify(operation: Operation, status: StatusCode) -> Outcome {
    if status == StatusCode::UNAUTHORIZED {
        return Outcome::Unauthorized;
    }

    status_table(operation)
        .iter()
        .find(|(code, _)| *code == status)
        .map(|(_, outcome)| *outcome)
        .unwrap_or(Outcome::Unexpected(status))
}
