//! Data-provider adapter for an admin frontend talking to a `q[...]`-style
//! REST backend.
//!
//! # Overview
//! Translates the admin framework's CRUD verbs (list, get-one, get-many,
//! get-many-reference, create, update, update-many, delete, delete-many)
//! into HTTP requests, and decodes the responses into the shapes the
//! framework expects.
//!
//! # Design
//! - `RequestMapper` is stateless: it holds only an immutable
//!   `ProviderConfig` and splits every verb into `build_*` (produces an
//!   `HttpRequest`) and `parse_*` (consumes an `HttpResponse`).
//! - `Transport` is the single injected I/O seam. `UreqTransport` is the
//!   default; tests substitute fakes that return canned responses.
//! - `DataProvider` wires the two together and also dispatches on
//!   `Operation` values.
//! - Transport failures propagate unchanged; a missing or unparseable count
//!   header is a `MalformedResponse`, never a default total.

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod operation;
pub mod provider;
pub mod query;
pub mod transport;
pub mod types;

pub use client::RequestMapper;
pub use config::ProviderConfig;
pub use error::{ConfigError, ProviderError, TransportError};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use operation::{Operation, Outcome};
pub use provider::DataProvider;
pub use transport::{Transport, UreqTransport};
pub use types::{
    CreateParams, DeleteManyParams, DeleteParams, Filter, GetManyParams, GetManyReferenceParams, GetOneParams,
    Identifier, ListParams, ListResponse, Pagination, Record, Sort, SortOrder, UpdateManyParams, UpdateParams,
};
