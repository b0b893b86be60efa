//! Stateless HTTP request builder and response parser for the admin API.
//!
//! # Design
//! `RequestMapper` holds only its `ProviderConfig` and carries no mutable
//! state between calls. Each CRUD verb is split into a `build_*` method that
//! produces an `HttpRequest` and a `parse_*` method that consumes an
//! `HttpResponse`. A `Transport` executes the round-trip in between, keeping
//! the mapper deterministic and free of I/O.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::config::ProviderConfig;
use crate::error::{ProviderError, TransportError};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::query::{encode_segment, QueryString};
use crate::types::{
    CreateParams, DeleteManyParams, DeleteParams, GetManyParams, GetManyReferenceParams, GetOneParams,
    Identifier, ListParams, ListResponse, Record, UpdateManyParams, UpdateParams,
};

#[derive(Debug, Clone)]
pub struct RequestMapper {
    config: ProviderConfig,
}

impl RequestMapper {
    pub fn new(config: ProviderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    pub fn build_get_list(&self, resource: &str, params: &ListParams) -> HttpRequest {
        let mut query = QueryString::new();
        query
            .sort(&params.sort)
            .filter(&params.filter)
            .pagination(params.pagination);
        self.request(HttpMethod::Get, self.collection_url(resource, &query), None)
    }

    pub fn build_get_one(&self, resource: &str, params: &GetOneParams) -> HttpRequest {
        self.request(HttpMethod::Get, self.record_url(resource, &params.id), None)
    }

    pub fn build_get_many(&self, resource: &str, params: &GetManyParams) -> HttpRequest {
        let mut query = QueryString::new();
        query.id_in(&params.ids);
        self.request(HttpMethod::Get, self.collection_url(resource, &query), None)
    }

    pub fn build_get_many_reference(&self, resource: &str, params: &GetManyReferenceParams) -> HttpRequest {
        // The reference constraint replaces any caller filter on the same field.
        let mut filter = params.filter.clone();
        filter.insert(params.target.clone(), Value::from(params.id.clone()));
        let mut query = QueryString::new();
        query.sort(&params.sort).filter(&filter).pagination(params.pagination);
        self.request(HttpMethod::Get, self.collection_url(resource, &query), None)
    }

    pub fn build_create(&self, resource: &str, params: &CreateParams) -> Result<HttpRequest, ProviderError> {
        let body = envelope(resource, &params.data)?;
        let url = self.collection_url(resource, &QueryString::new());
        Ok(self.request(HttpMethod::Post, url, Some(body)))
    }

    pub fn build_update(&self, resource: &str, params: &UpdateParams) -> Result<HttpRequest, ProviderError> {
        let body = envelope(resource, &params.data)?;
        Ok(self.request(HttpMethod::Put, self.record_url(resource, &params.id), Some(body)))
    }

    pub fn build_update_many(&self, resource: &str, params: &UpdateManyParams) -> Result<HttpRequest, ProviderError> {
        let body = envelope(resource, &params.data)?;
        Ok(self.request(HttpMethod::Put, self.multi_url(resource, &params.ids), Some(body)))
    }

    pub fn build_delete(&self, resource: &str, params: &DeleteParams) -> HttpRequest {
        self.request(HttpMethod::Delete, self.record_url(resource, &params.id), None)
    }

    pub fn build_delete_many(&self, resource: &str, params: &DeleteManyParams) -> HttpRequest {
        self.request(HttpMethod::Delete, self.multi_url(resource, &params.ids), None)
    }

    pub fn parse_get_list(&self, response: HttpResponse) -> Result<ListResponse, ProviderError> {
        check_status(&response)?;
        let total = self.total(&response)?;
        let data = decode(&response.body)?;
        Ok(ListResponse { data, total })
    }

    pub fn parse_get_one(&self, response: HttpResponse) -> Result<Record, ProviderError> {
        check_status(&response)?;
        decode(&response.body)
    }

    pub fn parse_get_many(&self, response: HttpResponse) -> Result<Vec<Record>, ProviderError> {
        check_status(&response)?;
        decode(&response.body)
    }

    pub fn parse_get_many_reference(&self, response: HttpResponse) -> Result<ListResponse, ProviderError> {
        self.parse_get_list(response)
    }

    /// The local fields are kept and the server-assigned `id` is laid over
    /// them.
    pub fn parse_create(&self, params: &CreateParams, response: HttpResponse) -> Result<Record, ProviderError> {
        check_status(&response)?;
        let created: Record = decode(&response.body)?;
        let id = created
            .get("id")
            .cloned()
            .ok_or_else(|| ProviderError::MalformedResponse("create response has no id".to_string()))?;
        let mut record = params.data.clone();
        record.insert("id".to_string(), id);
        Ok(record)
    }

    pub fn parse_update(&self, response: HttpResponse) -> Result<Record, ProviderError> {
        check_status(&response)?;
        decode(&response.body)
    }

    pub fn parse_update_many(&self, response: HttpResponse) -> Result<Vec<Identifier>, ProviderError> {
        check_status(&response)?;
        decode(&response.body)
    }

    pub fn parse_delete(&self, response: HttpResponse) -> Result<Record, ProviderError> {
        check_status(&response)?;
        decode(&response.body)
    }

    pub fn parse_delete_many(&self, response: HttpResponse) -> Result<Vec<Identifier>, ProviderError> {
        check_status(&response)?;
        decode(&response.body)
    }

    fn total(&self, response: &HttpResponse) -> Result<u64, ProviderError> {
        let name = self.config.count_header();
        let value = response
            .header(name)
            .ok_or_else(|| ProviderError::MalformedResponse(format!("missing {name} header")))?;
        parse_total(value)
            .ok_or_else(|| ProviderError::MalformedResponse(format!("unparseable {name} header: {value:?}")))
    }

    fn collection_url(&self, resource: &str, query: &QueryString) -> String {
        let base = format!("{}/{resource}", self.config.api_url());
        if query.is_empty() {
            base
        } else {
            format!("{base}?{}", query.render())
        }
    }

    fn record_url(&self, resource: &str, id: &Identifier) -> String {
        format!(
            "{}/{resource}/{}",
            self.config.api_url(),
            encode_segment(&id.to_string())
        )
    }

    fn multi_url(&self, resource: &str, ids: &[Identifier]) -> String {
        let mut query = QueryString::new();
        query.ids_json(ids);
        format!("{}/{resource}/multi?{}", self.config.api_url(), query.render())
    }

    fn request(&self, method: HttpMethod, url: String, body: Option<String>) -> HttpRequest {
        let mut headers = vec![("accept".to_string(), "application/json".to_string())];
        if body.is_some() {
            headers.push(("content-type".to_string(), "application/json".to_string()));
        }
        headers.extend(self.config.headers().iter().cloned());
        HttpRequest {
            method,
            url,
            headers,
            body,
        }
    }
}

/// Trailing integer after the last `/`, e.g. `posts 0-4/27` -> 27.
pub fn parse_total(value: &str) -> Option<u64> {
    value.rsplit('/').next()?.trim().parse().ok()
}

/// `{ "<resource>": data }`
fn envelope(resource: &str, data: &Record) -> Result<String, ProviderError> {
    let mut wrapper = Map::new();
    wrapper.insert(resource.to_string(), Value::Object(data.clone()));
    serde_json::to_string(&wrapper).map_err(|e| ProviderError::Serialization(e.to_string()))
}

fn decode<T: DeserializeOwned>(body: &str) -> Result<T, ProviderError> {
    serde_json::from_str(body).map_err(|e| ProviderError::Deserialization(e.to_string()))
}

/// Non-2xx responses surface exactly as a transport would report them.
fn check_status(response: &HttpResponse) -> Result<(), ProviderError> {
    if (200..300).contains(&response.status) {
        return Ok(());
    }
    Err(TransportError::Status {
        status: response.status,
        body: response.body.clone(),
    }
    .into())
}
