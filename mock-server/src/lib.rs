use std::{
    cmp::Ordering,
    collections::{BTreeMap, HashMap},
    sync::Arc,
};

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, put},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{Map, Value};
use tokio::{net::TcpListener, sync::RwLock};

pub type Record = Map<String, Value>;

/// Every resource lives in its own id-ordered table.
#[derive(Debug, Default)]
pub struct Store {
    tables: HashMap<String, BTreeMap<i64, Record>>,
    next_id: i64,
}

impl Store {
    /// Insert `fields` under a fresh id and return the stored record.
    pub fn insert(&mut self, resource: &str, mut fields: Record) -> Record {
        self.next_id += 1;
        let id = self.next_id;
        fields.insert("id".to_string(), Value::from(id));
        self.tables
            .entry(resource.to_string())
            .or_default()
            .insert(id, fields.clone());
        fields
    }

    fn table(&mut self, resource: &str) -> &mut BTreeMap<i64, Record> {
        self.tables.entry(resource.to_string()).or_default()
    }
}

pub type Db = Arc<RwLock<Store>>;

pub fn app() -> Router {
    app_with(Store::default())
}

pub fn app_with(store: Store) -> Router {
    let db: Db = Arc::new(RwLock::new(store));
    Router::new()
        .route("/{resource}", get(list_records).post(create_record))
        .route("/{resource}/multi", put(update_many).delete(delete_many))
        .route(
            "/{resource}/{id}",
            get(get_record).put(update_record).delete(delete_record),
        )
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

/// Decoded `q[...]`, `page` and `per` parameters of a list request.
#[derive(Debug, Default, PartialEq)]
struct ListQuery {
    sort: Option<(String, bool)>,
    equals: Vec<(String, String)>,
    id_in: Option<Vec<i64>>,
    page: Option<usize>,
    per: Option<usize>,
}

impl ListQuery {
    fn parse(pairs: Vec<(String, String)>) -> Result<Self, StatusCode> {
        let mut query = ListQuery::default();
        for (key, value) in pairs {
            match key.as_str() {
                "page" => query.page = Some(value.parse().map_err(|_| StatusCode::BAD_REQUEST)?),
                "per" => query.per = Some(value.parse().map_err(|_| StatusCode::BAD_REQUEST)?),
                "q[s]" => {
                    let text: String = serde_json::from_str(&value).map_err(|_| StatusCode::BAD_REQUEST)?;
                    let (field, order) = text.rsplit_once(' ').ok_or(StatusCode::BAD_REQUEST)?;
                    query.sort = Some((field.to_string(), order.eq_ignore_ascii_case("DESC")));
                }
                r#"q["id_in"][]"# | "q[id_in][]" => {
                    let id = value.parse().map_err(|_| StatusCode::BAD_REQUEST)?;
                    query.id_in.get_or_insert_with(Vec::new).push(id);
                }
                other => {
                    let field = other
                        .strip_prefix("q[")
                        .and_then(|rest| rest.strip_suffix("_eq]"))
                        .ok_or(StatusCode::BAD_REQUEST)?;
                    query.equals.push((field.to_string(), value));
                }
            }
        }
        Ok(query)
    }

    fn matches(&self, record: &Record) -> bool {
        let in_ids = match &self.id_in {
            Some(ids) => record
                .get("id")
                .and_then(Value::as_i64)
                .is_some_and(|id| ids.contains(&id)),
            None => true,
        };
        in_ids
            && self
                .equals
                .iter()
                .all(|(field, expected)| record.get(field).is_some_and(|v| &render(v) == expected))
    }
}

/// Same rendering the client uses for filter values.
fn render(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn compare(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            let (x, y) = (x.as_f64().unwrap_or(0.0), y.as_f64().unwrap_or(0.0));
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Some(x), Some(y)) => render(x).cmp(&render(y)),
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

async fn list_records(
    State(db): State<Db>,
    Path(resource): Path<String>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Response, StatusCode> {
    let query = ListQuery::parse(pairs)?;
    let store = db.read().await;
    let mut rows: Vec<Record> = store
        .tables
        .get(&resource)
        .map(|table| table.values().filter(|r| query.matches(r)).cloned().collect())
        .unwrap_or_default();

    // id_in lookups answer in the order the ids were asked for.
    if let Some(ids) = &query.id_in {
        rows.sort_by_key(|r| {
            let id = r.get("id").and_then(Value::as_i64);
            ids.iter().position(|candidate| Some(*candidate) == id)
        });
    }
    if let Some((field, descending)) = &query.sort {
        rows.sort_by(|a, b| {
            let ordering = compare(a.get(field), b.get(field));
            if *descending {
                ordering.reverse()
            } else {
                ordering
            }
        });
    }

    let total = rows.len();
    let (rows, start) = match (query.page, query.per) {
        (Some(page), Some(per)) => {
            let start = page.saturating_sub(1) * per;
            (rows.into_iter().skip(start).take(per).collect(), start)
        }
        _ => (rows, 0),
    };
    // An empty page has no range to report.
    let range = match rows.len() {
        0 => "*".to_string(),
        len => format!("{start}-{}", start + len - 1),
    };
    let headers = [
        ("content-range", format!("{resource} {range}/{total}")),
        ("x-total-count", total.to_string()),
    ];
    Ok((headers, Json(rows)).into_response())
}

/// Pull the `{ "<resource>": {...} }` payload out of a request body.
fn unwrap_envelope(resource: &str, mut body: Value) -> Result<Record, StatusCode> {
    match body.get_mut(resource).map(Value::take) {
        Some(Value::Object(fields)) => Ok(fields),
        _ => Err(StatusCode::UNPROCESSABLE_ENTITY),
    }
}

async fn create_record(
    State(db): State<Db>,
    Path(resource): Path<String>,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<Record>), StatusCode> {
    let mut fields = unwrap_envelope(&resource, body)?;
    fields.remove("id");
    let record = db.write().await.insert(&resource, fields);
    tracing::debug!(%resource, id = ?record.get("id"), "created record");
    Ok((StatusCode::CREATED, Json(record)))
}

async fn get_record(
    State(db): State<Db>,
    Path((resource, id)): Path<(String, i64)>,
) -> Result<Json<Record>, StatusCode> {
    let store = db.read().await;
    store
        .tables
        .get(&resource)
        .and_then(|table| table.get(&id))
        .cloned()
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

fn apply(record: &mut Record, changes: &Record) {
    for (field, value) in changes {
        if field != "id" {
            record.insert(field.clone(), value.clone());
        }
    }
}

async fn update_record(
    State(db): State<Db>,
    Path((resource, id)): Path<(String, i64)>,
    Json(body): Json<Value>,
) -> Result<Json<Record>, StatusCode> {
    let changes = unwrap_envelope(&resource, body)?;
    let mut store = db.write().await;
    let record = store.table(&resource).get_mut(&id).ok_or(StatusCode::NOT_FOUND)?;
    apply(record, &changes);
    Ok(Json(record.clone()))
}

async fn delete_record(
    State(db): State<Db>,
    Path((resource, id)): Path<(String, i64)>,
) -> Result<Json<Record>, StatusCode> {
    let mut store = db.write().await;
    store
        .table(&resource)
        .remove(&id)
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

#[derive(Deserialize)]
struct MultiQuery {
    ids: String,
}

impl MultiQuery {
    fn ids(&self) -> Result<Vec<i64>, StatusCode> {
        serde_json::from_str(&self.ids).map_err(|_| StatusCode::BAD_REQUEST)
    }
}

/// Answers with the ids that were actually touched.
async fn update_many(
    State(db): State<Db>,
    Path(resource): Path<String>,
    Query(multi): Query<MultiQuery>,
    Json(body): Json<Value>,
) -> Result<Json<Vec<i64>>, StatusCode> {
    let ids = multi.ids()?;
    let changes = unwrap_envelope(&resource, body)?;
    let mut store = db.write().await;
    let table = store.table(&resource);
    let mut updated = Vec::new();
    for id in ids {
        if let Some(record) = table.get_mut(&id) {
            apply(record, &changes);
            updated.push(id);
        }
    }
    Ok(Json(updated))
}

async fn delete_many(
    State(db): State<Db>,
    Path(resource): Path<String>,
    Query(multi): Query<MultiQuery>,
) -> Result<Json<Vec<i64>>, StatusCode> {
    let ids = multi.ids()?;
    let mut store = db.write().await;
    let table = store.table(&resource);
    Ok(Json(ids.into_iter().filter(|id| table.remove(id).is_some()).collect()))
}
