//! An in-memory Greengrass.
//!
//! Definitions are kept as append-only chains of immutable versions, the way
//! the real service models them. Every call is recorded, and faults can be
//! queued per operation, so this doubles as the test backend.

use std::{
    collections::VecDeque,
    sync::{Mutex, MutexGuard, PoisonError},
};

use async_trait::async_trait;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::debug;

use crate::{
    Action, ApiError, Document, Entity, GreengrassApi, ID_NOT_FOUND, Operation, RESPONSE_METADATA,
};

const ARN_PREFIX: &str = "arn:aws:greengrass:local:000000000000:/greengrass";
const BAD_REQUEST: &str = "BadRequestException";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemoryState {
    #[serde(default)]
    pub definitions: IndexMap<String, DefinitionRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefinitionRecord {
    pub entity: Entity,
    pub id: String,
    pub arn: String,
    pub name: Option<String>,
    pub versions: Vec<VersionRecord>,
    #[serde(default)]
    pub role_arn: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VersionRecord {
    pub version: String,
    pub arn: String,
    pub content: Document,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub operation: Operation,
    pub input: Document,
}

#[derive(Debug, Default)]
pub struct MemoryGreengrass {
    state: Mutex<MemoryState>,
    calls: Mutex<Vec<RecordedCall>>,
    faults: Mutex<VecDeque<(Operation, ApiError)>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MemoryGreengrass {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_state(state: MemoryState) -> Self {
        Self {
            state: Mutex::new(state),
            ..Self::default()
        }
    }

    pub fn snapshot(&self) -> MemoryState {
        lock(&self.state).clone()
    }

    pub fn definition(&self, id: &str) -> Option<DefinitionRecord> {
        lock(&self.state).definitions.get(id).cloned()
    }

    /// Every call made so far, in order, including the ones that faulted.
    pub fn calls(&self) -> Vec<RecordedCall> {
        lock(&self.calls).clone()
    }

    pub fn calls_to(&self, operation: Operation) -> Vec<RecordedCall> {
        lock(&self.calls)
            .iter()
            .filter(|call| call.operation == operation)
            .cloned()
            .collect()
    }

    /// Makes the next call of `operation` fail with the given error code.
    pub fn fail_next(&self, operation: Operation, code: &str, message: &str) {
        lock(&self.faults).push_back((operation, ApiError::service(operation, code, message)));
    }

    fn take_fault(&self, operation: Operation) -> Option<ApiError> {
        let mut faults = lock(&self.faults);
        let index = faults.iter().position(|(op, _)| *op == operation)?;
        faults.remove(index).map(|(_, error)| error)
    }
}

#[async_trait]
impl GreengrassApi for MemoryGreengrass {
    async fn invoke(&self, operation: Operation, input: Document) -> Result<Document, ApiError> {
        debug!(%operation, "invoke");
        lock(&self.calls).push(RecordedCall {
            operation,
            input: input.clone(),
        });
        if let Some(error) = self.take_fault(operation) {
            return Err(error);
        }
        let mut state = lock(&self.state);
        let response = execute(&mut state, operation, input)?;
        Ok(with_metadata(response))
    }
}

fn execute(state: &mut MemoryState, operation: Operation, mut input: Document) -> Result<Document, ApiError> {
    let Operation { entity, action } = operation;
    match action {
        Action::Create => {
            let id = cuid2::create_id();
            let mut record = DefinitionRecord {
                entity,
                arn: format!("{ARN_PREFIX}/{}/{id}", entity.arn_segment()),
                id: id.clone(),
                name: string_field(&input, "Name"),
                versions: Vec::new(),
                role_arn: None,
            };
            if let Some(Value::Object(initial)) = input.shift_remove("InitialVersion") {
                record.push_version(initial);
            }
            let response = record.describe();
            state.definitions.insert(id, record);
            Ok(response)
        }
        Action::CreateVersion => {
            let record = find(state, operation, &input)?;
            input.shift_remove(entity.identity_key());
            let version = record.push_version(input);
            Ok(object(json!({
                "Arn": version.arn,
                "Id": record.id,
                "Version": version.version,
            })))
        }
        Action::Update => {
            let record = find(state, operation, &input)?;
            record.name = string_field(&input, "Name");
            Ok(Document::new())
        }
        Action::Delete => {
            let id = find(state, operation, &input)?.id.clone();
            state.definitions.shift_remove(&id);
            Ok(Document::new())
        }
        Action::Get => Ok(find(state, operation, &input)?.describe()),
        Action::AssociateRole => {
            let role_arn = string_field(&input, "RoleArn")
                .ok_or_else(|| ApiError::service(operation, BAD_REQUEST, "RoleArn is required"))?;
            let record = find(state, operation, &input)?;
            record.role_arn = Some(role_arn);
            Ok(Document::new())
        }
        Action::DisassociateRole => {
            find(state, operation, &input)?.role_arn = None;
            Ok(Document::new())
        }
    }
}

fn find<'a>(
    state: &'a mut MemoryState,
    operation: Operation,
    input: &Document,
) -> Result<&'a mut DefinitionRecord, ApiError> {
    let key = operation.entity.identity_key();
    let id = string_field(input, key)
        .ok_or_else(|| ApiError::service(operation, BAD_REQUEST, format!("{key} is required")))?;
    state
        .definitions
        .get_mut(&id)
        .filter(|record| record.entity == operation.entity)
        .ok_or_else(|| {
            ApiError::service(operation, ID_NOT_FOUND, format!("{} {id} does not exist", operation.entity))
        })
}

impl DefinitionRecord {
    fn push_version(&mut self, content: Document) -> VersionRecord {
        let version = cuid2::create_id();
        let record = VersionRecord {
            arn: format!("{}/versions/{version}", self.arn),
            version,
            content,
        };
        self.versions.push(record.clone());
        record
    }

    pub fn latest_version(&self) -> Option<&VersionRecord> {
        self.versions.last()
    }

    fn describe(&self) -> Document {
        let mut response = Document::new();
        response.insert("Arn".to_owned(), Value::from(self.arn.as_str()));
        response.insert("Id".to_owned(), Value::from(self.id.as_str()));
        if let Some(name) = &self.name {
            response.insert("Name".to_owned(), Value::from(name.as_str()));
        }
        if let Some(latest) = self.latest_version() {
            response.insert("LatestVersion".to_owned(), Value::from(latest.version.as_str()));
            response.insert("LatestVersionArn".to_owned(), Value::from(latest.arn.as_str()));
        }
        response
    }
}

fn string_field(input: &Document, key: &str) -> Option<String> {
    input.get(key).and_then(Value::as_str).map(ToOwned::to_owned)
}

fn object(value: Value) -> Document {
    match value {
        Value::Object(map) => map,
        _ => Document::new(),
    }
}

fn with_metadata(mut response: Document) -> Document {
    response.insert(
        RESPONSE_METADATA.to_owned(),
        json!({ "HTTPStatusCode": 200, "RequestId": cuid2::create_id() }),
    );
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(value: Value) -> Document {
        object(value)
    }

    const CREATE_CORE: Operation = Operation::new(Entity::CoreDefinition, Action::Create);
    const GET_CORE: Operation = Operation::new(Entity::CoreDefinition, Action::Get);

    async fn create_core(api: &MemoryGreengrass) -> String {
        let response = api
            .invoke(CREATE_CORE, doc(json!({ "Name": "core" })))
            .await
            .unwrap();
        response["Id"].as_str().unwrap().to_owned()
    }

    #[tokio::test]
    async fn create_returns_id_and_metadata() {
        let api = MemoryGreengrass::new();
        let response = api
            .invoke(
                CREATE_CORE,
                doc(json!({ "Name": "core", "InitialVersion": { "Cores": [] } })),
            )
            .await
            .unwrap();
        let id = response["Id"].as_str().unwrap();
        assert!(response.contains_key(RESPONSE_METADATA));
        assert!(response.contains_key("LatestVersion"));
        let record = api.definition(id).unwrap();
        assert_eq!(record.name.as_deref(), Some("core"));
        assert_eq!(record.versions.len(), 1);
    }

    #[tokio::test]
    async fn versions_are_appended() {
        let api = MemoryGreengrass::new();
        let id = create_core(&api).await;
        let create_version = Operation::new(Entity::CoreDefinition, Action::CreateVersion);
        for n in 0..2 {
            api.invoke(
                create_version,
                doc(json!({ "CoreDefinitionId": id, "Cores": [{ "Id": n }] })),
            )
            .await
            .unwrap();
        }
        let record = api.definition(&id).unwrap();
        assert_eq!(record.versions.len(), 2);
        assert_eq!(
            Value::Object(record.versions[0].content.clone()),
            json!({ "Cores": [{ "Id": 0 }] })
        );
        let latest = api
            .invoke(GET_CORE, doc(json!({ "CoreDefinitionId": id })))
            .await
            .unwrap();
        assert_eq!(latest["LatestVersion"], json!(record.versions[1].version));
    }

    #[tokio::test]
    async fn unknown_id_is_not_found() {
        let api = MemoryGreengrass::new();
        let error = api
            .invoke(GET_CORE, doc(json!({ "CoreDefinitionId": "missing" })))
            .await
            .unwrap_err();
        assert!(error.is_not_found());
    }

    #[tokio::test]
    async fn ids_are_scoped_by_entity() {
        let api = MemoryGreengrass::new();
        let id = create_core(&api).await;
        let get_device = Operation::new(Entity::DeviceDefinition, Action::Get);
        let error = api
            .invoke(get_device, doc(json!({ "DeviceDefinitionId": id })))
            .await
            .unwrap_err();
        assert!(error.is_not_found());
    }

    #[tokio::test]
    async fn delete_removes_definition() {
        let api = MemoryGreengrass::new();
        let id = create_core(&api).await;
        let delete = Operation::new(Entity::CoreDefinition, Action::Delete);
        api.invoke(delete, doc(json!({ "CoreDefinitionId": id })))
            .await
            .unwrap();
        assert!(api.definition(&id).is_none());
        assert!(api.snapshot().definitions.is_empty());
    }

    #[tokio::test]
    async fn queued_fault_fires_once() {
        let api = MemoryGreengrass::new();
        api.fail_next(CREATE_CORE, "InternalServerErrorException", "boom");
        let error = api
            .invoke(CREATE_CORE, doc(json!({ "Name": "core" })))
            .await
            .unwrap_err();
        assert_eq!(error.code(), Some("InternalServerErrorException"));
        create_core(&api).await;
        assert_eq!(api.calls_to(CREATE_CORE).len(), 2);
    }

    #[tokio::test]
    async fn role_association() {
        let api = MemoryGreengrass::new();
        let create = Operation::new(Entity::Group, Action::Create);
        let response = api.invoke(create, doc(json!({ "Name": "g" }))).await.unwrap();
        let id = response["Id"].as_str().unwrap().to_owned();

        let associate = Operation::new(Entity::Group, Action::AssociateRole);
        api.invoke(associate, doc(json!({ "GroupId": id, "RoleArn": "arn:role" })))
            .await
            .unwrap();
        assert_eq!(api.definition(&id).unwrap().role_arn.as_deref(), Some("arn:role"));

        let disassociate = Operation::new(Entity::Group, Action::DisassociateRole);
        api.invoke(disassociate, doc(json!({ "GroupId": id })))
            .await
            .unwrap();
        assert_eq!(api.definition(&id).unwrap().role_arn, None);
    }

    #[test]
    fn state_survives_json() {
        let mut state = MemoryState::default();
        let record = DefinitionRecord {
            entity: Entity::LoggerDefinition,
            id: "l-1".to_owned(),
            arn: "arn".to_owned(),
            name: Some("loggers".to_owned()),
            versions: Vec::new(),
            role_arn: None,
        };
        state.definitions.insert(record.id.clone(), record);
        let json = serde_json::to_string(&state).unwrap();
        let restored: MemoryState = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, state);
    }
}
