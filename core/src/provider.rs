//! `DataProvider`: the mapper wired to a transport.
//!
//! Every call builds one request, hands it to the transport once, and parses
//! the answer. Nothing is cached or retried, and failures propagate as-is.

use tracing::{debug, debug_span, warn};

use crate::client::RequestMapper;
use crate::config::ProviderConfig;
use crate::error::ProviderError;
use crate::http::{HttpRequest, HttpResponse};
use crate::operation::{Operation, Outcome};
use crate::transport::{Transport, UreqTransport};
use crate::types::{
    CreateParams, DeleteManyParams, DeleteParams, GetManyParams, GetManyReferenceParams, GetOneParams,
    Identifier, ListParams, ListResponse, Record, UpdateManyParams, UpdateParams,
};

#[derive(Debug, Clone)]
pub struct DataProvider<T = UreqTransport> {
    mapper: RequestMapper,
    transport: T,
}

impl DataProvider<UreqTransport> {
    /// Provider using the bundled blocking client.
    pub fn new(config: ProviderConfig) -> Self {
        let transport = UreqTransport::new(config.timeout());
        Self::with_transport(config, transport)
    }
}

impl<T: Transport> DataProvider<T> {
    pub fn with_transport(config: ProviderConfig, transport: T) -> Self {
        Self {
            mapper: RequestMapper::new(config),
            transport,
        }
    }

    pub fn mapper(&self) -> &RequestMapper {
        &self.mapper
    }

    pub fn get_list(&self, resource: &str, params: &ListParams) -> Result<ListResponse, ProviderError> {
        let request = self.mapper.build_get_list(resource, params);
        let response = self.send("getList", resource, &request)?;
        self.mapper.parse_get_list(response)
    }

    pub fn get_one(&self, resource: &str, params: &GetOneParams) -> Result<Record, ProviderError> {
        let request = self.mapper.build_get_one(resource, params);
        let response = self.send("getOne", resource, &request)?;
        self.mapper.parse_get_one(response)
    }

    pub fn get_many(&self, resource: &str, params: &GetManyParams) -> Result<Vec<Record>, ProviderError> {
        let request = self.mapper.build_get_many(resource, params);
        let response = self.send("getMany", resource, &request)?;
        self.mapper.parse_get_many(response)
    }

    pub fn get_many_reference(
        &self,
        resource: &str,
        params: &GetManyReferenceParams,
    ) -> Result<ListResponse, ProviderError> {
        let request = self.mapper.build_get_many_reference(resource, params);
        let response = self.send("getManyReference", resource, &request)?;
        self.mapper.parse_get_many_reference(response)
    }

    pub fn create(&self, resource: &str, params: &CreateParams) -> Result<Record, ProviderError> {
        let request = self.mapper.build_create(resource, params)?;
        let response = self.send("create", resource, &request)?;
        self.mapper.parse_create(params, response)
    }

    pub fn update(&self, resource: &str, params: &UpdateParams) -> Result<Record, ProviderError> {
        let request = self.mapper.build_update(resource, params)?;
        let response = self.send("update", resource, &request)?;
        self.mapper.parse_update(response)
    }

    pub fn update_many(&self, resource: &str, params: &UpdateManyParams) -> Result<Vec<Identifier>, ProviderError> {
        let request = self.mapper.build_update_many(resource, params)?;
        let response = self.send("updateMany", resource, &request)?;
        self.mapper.parse_update_many(response)
    }

    pub fn delete(&self, resource: &str, params: &DeleteParams) -> Result<Record, ProviderError> {
        let request = self.mapper.build_delete(resource, params);
        let response = self.send("delete", resource, &request)?;
        self.mapper.parse_delete(response)
    }

    pub fn delete_many(&self, resource: &str, params: &DeleteManyParams) -> Result<Vec<Identifier>, ProviderError> {
        let request = self.mapper.build_delete_many(resource, params);
        let response = self.send("deleteMany", resource, &request)?;
        self.mapper.parse_delete_many(response)
    }

    /// Dispatch on the operation's verb.
    pub fn execute(&self, resource: &str, operation: &Operation) -> Result<Outcome, ProviderError> {
        let outcome = match operation {
            Operation::GetList(params) => Outcome::List(self.get_list(resource, params)?),
            Operation::GetOne(params) => Outcome::Record(self.get_one(resource, params)?),
            Operation::GetMany(params) => Outcome::Records(self.get_many(resource, params)?),
            Operation::GetManyReference(params) => Outcome::List(self.get_many_reference(resource, params)?),
            Operation::Create(params) => Outcome::Record(self.create(resource, params)?),
            Operation::Update(params) => Outcome::Record(self.update(resource, params)?),
            Operation::UpdateMany(params) => Outcome::Ids(self.update_many(resource, params)?),
            Operation::Delete(params) => Outcome::Record(self.delete(resource, params)?),
            Operation::DeleteMany(params) => Outcome::Ids(self.delete_many(resource, params)?),
        };
        Ok(outcome)
    }

    fn send(&self, operation: &str, resource: &str, request: &HttpRequest) -> Result<HttpResponse, ProviderError> {
        let span = debug_span!("data_provider", operation, resource);
        let _enter = span.enter();
        debug!(method = %request.method, url = %request.url, "sending request");
        match self.transport.request(request) {
            Ok(response) => {
                debug!(status = response.status, "received response");
                Ok(response)
            }
            Err(err) => {
                warn!(error = %err, "request failed");
                Err(err.into())
            }
        }
    }
}
