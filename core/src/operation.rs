//! Logical operations as values, for callers that dispatch by verb name.

use serde::Serialize;

use crate::types::{
    CreateParams, DeleteManyParams, DeleteParams, GetManyParams, GetManyReferenceParams, GetOneParams,
    Identifier, ListParams, ListResponse, Record, UpdateManyParams, UpdateParams,
};

#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    GetList(ListParams),
    GetOne(GetOneParams),
    GetMany(GetManyParams),
    GetManyReference(GetManyReferenceParams),
    Create(CreateParams),
    Update(UpdateParams),
    UpdateMany(UpdateManyParams),
    Delete(DeleteParams),
    DeleteMany(DeleteManyParams),
}

impl Operation {
    /// The admin framework's name for this verb.
    pub fn name(&self) -> &'static str {
        match self {
            Operation::GetList(_) => "getList",
            Operation::GetOne(_) => "getOne",
            Operation::GetMany(_) => "getMany",
            Operation::GetManyReference(_) => "getManyReference",
            Operation::Create(_) => "create",
            Operation::Update(_) => "update",
            Operation::UpdateMany(_) => "updateMany",
            Operation::Delete(_) => "delete",
            Operation::DeleteMany(_) => "deleteMany",
        }
    }
}

/// Result of an `Operation`, shaped the way the admin framework expects.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Outcome {
    List(ListResponse),
    Record(Record),
    Records(Vec<Record>),
    Ids(Vec<Identifier>),
}
