//! Local preview server
//!
//! `hcas-evidence serve` → renders the page once, opens the browser, and
//! serves the page, CSV exports and JSON views on localhost.

use crate::chart::spec::ChartSpec;
use crate::error::{Error, Result};
use crate::evidence::EvidenceRecord;
use crate::report::{html, Site};
use crate::sources::{group_sources, source_count, split_checklists, Checklists, SourceGroup};
use crate::table::csv::CsvExport;
use crate::table::{visible_records, GroupCounts, SortDir, SortKey, TableState};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tiny_http::{Header, Method, Request, Response, Server};
use uuid::Uuid;

/// How long a prepared export stays downloadable.
pub const EXPORT_TTL_SECS: i64 = 300;

#[derive(Serialize)]
struct ApiResponse<T> {
    ok: bool,
    data: Option<T>,
    error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    fn success(data: T) -> Self {
        Self { ok: true, data: Some(data), error: None }
    }
}

impl ApiResponse<()> {
    fn failure(error: impl Into<String>) -> Self {
        Self { ok: false, data: None, error: Some(error.into()) }
    }
}

/// Table view selection shared by `/evidence.csv`, `/api/evidence` and
/// `/api/export`.
#[derive(Deserialize, Debug, Default, PartialEq)]
pub struct ViewParams {
    pub sort: Option<SortKey>,
    pub dir: Option<SortDir>,
    pub q: Option<String>,
}

impl ViewParams {
    pub fn parse(query: &str) -> std::result::Result<Self, String> {
        serde_urlencoded::from_str(query).map_err(|e| format!("bad query: {}", e))
    }

    pub fn state(&self, sortable: bool) -> TableState {
        let base = TableState::new(sortable);
        let (key, dir) = (self.sort.unwrap_or(base.sort_by), self.dir.unwrap_or(base.sort_dir));
        base.sorted_by(key, dir).with_query(self.q.clone().unwrap_or_default())
    }
}

#[derive(Deserialize, Debug, Default)]
struct SourceParams {
    q: Option<String>,
}

#[derive(Debug, Clone)]
struct ExportEntry {
    export: CsvExport,
    created: DateTime<Utc>,
}

/// Short-lived CSV artifacts. An entry is released by its first download
/// or once its time-to-live has passed.
#[derive(Debug)]
pub struct ExportRegistry {
    entries: HashMap<String, ExportEntry>,
    ttl: Duration,
}

impl Default for ExportRegistry {
    fn default() -> Self {
        Self::new(Duration::seconds(EXPORT_TTL_SECS))
    }
}

impl ExportRegistry {
    pub fn new(ttl: Duration) -> Self {
        Self { entries: HashMap::new(), ttl }
    }

    pub fn insert(&mut self, export: CsvExport, now: DateTime<Utc>) -> String {
        let id = Uuid::new_v4().simple().to_string();
        self.entries.insert(id.clone(), ExportEntry { export, created: now });
        id
    }

    /// Remove and return the export, unless it has already expired.
    pub fn take(&mut self, id: &str, now: DateTime<Utc>) -> Option<CsvExport> {
        let entry = self.entries.remove(id)?;
        if now - entry.created >= self.ttl {
            tracing::debug!(id, "export expired before download");
            return None;
        }
        Some(entry.export)
    }

    /// Drop expired entries; returns how many were released.
    pub fn purge_expired(&mut self, now: DateTime<Utc>) -> usize {
        let before = self.entries.len();
        let ttl = self.ttl;
        self.entries.retain(|_, e| now - e.created < ttl);
        before - self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn ttl_secs(&self) -> i64 {
        self.ttl.num_seconds()
    }
}

#[derive(Serialize)]
struct EvidencePayload<'a> {
    summary: GroupCounts,
    sort: SortKey,
    dir: SortDir,
    rows: Vec<&'a EvidenceRecord>,
}

#[derive(Serialize)]
struct SourcesPayload<'a> {
    count: usize,
    groups: Vec<SourceGroup>,
    checklists: Checklists<'a>,
}

#[derive(Serialize)]
struct ExportCreated {
    id: String,
    url: String,
    rows: usize,
    expires_in_secs: i64,
}

/// Transport-independent response.
#[derive(Debug)]
pub struct Reply {
    pub status: u16,
    pub content_type: &'static str,
    pub body: Vec<u8>,
    pub disposition: Option<String>,
}

impl Reply {
    fn html(body: String) -> Self {
        Self { status: 200, content_type: "text/html; charset=utf-8", body: body.into_bytes(), disposition: None }
    }

    fn json<T: Serialize>(status: u16, payload: &T) -> Result<Self> {
        Ok(Self {
            status,
            content_type: "application/json",
            body: serde_json::to_vec(payload)?,
            disposition: None,
        })
    }

    fn csv(export: CsvExport) -> Self {
        Self {
            status: 200,
            content_type: "text/csv; charset=utf-8",
            disposition: Some(export.content_disposition()),
            body: export.body,
        }
    }

    fn text(status: u16, body: &str) -> Self {
        Self { status, content_type: "text/plain; charset=utf-8", body: body.as_bytes().to_vec(), disposition: None }
    }
}

/// Server state: the rendered page plus live exports.
pub struct Preview {
    site: Site,
    page: String,
    specs: Vec<ChartSpec>,
    exports: ExportRegistry,
}

impl Preview {
    pub fn new(site: Site) -> Result<Self> {
        let mut page = Vec::new();
        html::write(&mut page, &site)?;
        let page = String::from_utf8(page).map_err(|e| Error::Server(e.to_string()))?;
        let specs = site.chart_specs();
        Ok(Self { site, page, specs, exports: ExportRegistry::default() })
    }

    pub fn exports(&self) -> &ExportRegistry {
        &self.exports
    }

    /// Route one request. `url` includes the query string.
    pub fn route(&mut self, method: &Method, url: &str, body: &str, now: DateTime<Utc>) -> Result<Reply> {
        let (path, query) = url.split_once('?').unwrap_or((url, ""));

        let released = self.exports.purge_expired(now);
        if released > 0 {
            tracing::debug!(released, "released expired exports");
        }

        match (method, path) {
            (&Method::Get, "/") | (&Method::Get, "/index.html") => Ok(Reply::html(self.page.clone())),

            (&Method::Get, "/evidence.csv") => match ViewParams::parse(query) {
                Ok(params) => {
                    let state = params.state(self.site.table.sortable);
                    Ok(Reply::csv(CsvExport::from_view(&self.site.records, &state)?))
                }
                Err(e) => Ok(Reply::text(400, &e)),
            },

            (&Method::Get, "/api/evidence") => match ViewParams::parse(query) {
                Ok(params) => {
                    let state = params.state(self.site.table.sortable);
                    let payload = EvidencePayload {
                        summary: self.site.counts(),
                        sort: state.sort_by,
                        dir: state.sort_dir,
                        rows: visible_records(&self.site.records, &state),
                    };
                    Reply::json(200, &ApiResponse::success(payload))
                }
                Err(e) => Reply::json(400, &ApiResponse::failure(e)),
            },

            (&Method::Get, "/api/charts") => Reply::json(200, &ApiResponse::success(&self.specs)),

            (&Method::Get, "/api/sources") => match serde_urlencoded::from_str::<SourceParams>(query) {
                Ok(params) => {
                    let q = params.q.unwrap_or_default();
                    let groups = group_sources(&self.site.sources, &q);
                    let payload = SourcesPayload {
                        count: source_count(&groups),
                        groups,
                        checklists: split_checklists(&self.site.verify_steps, &q),
                    };
                    Reply::json(200, &ApiResponse::success(payload))
                }
                Err(e) => Reply::json(400, &ApiResponse::failure(format!("bad query: {}", e))),
            },

            (&Method::Post, "/api/export") => {
                // query string wins; otherwise a JSON body; otherwise the default view
                let params = if !query.is_empty() {
                    ViewParams::parse(query)
                } else if !body.trim().is_empty() {
                    serde_json::from_str::<ViewParams>(body).map_err(|e| format!("bad body: {}", e))
                } else {
                    Ok(ViewParams::default())
                };
                match params {
                    Ok(params) => {
                        let state = params.state(self.site.table.sortable);
                        let export = CsvExport::from_view(&self.site.records, &state)?;
                        let rows = export.rows;
                        let id = self.exports.insert(export, now);
                        tracing::info!(%id, rows, "prepared export");
                        let created = ExportCreated {
                            url: format!("/downloads/{}", id),
                            id,
                            rows,
                            expires_in_secs: self.exports.ttl_secs(),
                        };
                        Reply::json(200, &ApiResponse::success(created))
                    }
                    Err(e) => Reply::json(400, &ApiResponse::failure(e)),
                }
            }

            (&Method::Get, p) if p.starts_with("/downloads/") => {
                let id = &p["/downloads/".len()..];
                match self.exports.take(id, now) {
                    Some(export) => Ok(Reply::csv(export)),
                    None => Ok(Reply::text(404, "Export not found or expired")),
                }
            }

            // 404
            _ => Ok(Reply::text(404, "Not found")),
        }
    }
}

fn header(name: &str, value: &str) -> Result<Header> {
    Header::from_bytes(name.as_bytes(), value.as_bytes())
        .map_err(|_| Error::Server(format!("invalid header {}: {}", name, value)))
}

/// Start server, open browser, serve the page
pub fn start(port: u16, site: Site, open_browser: bool) -> Result<()> {
    let addr = format!("127.0.0.1:{}", port);
    let server = Server::http(&addr).map_err(|e| Error::Server(e.to_string()))?;
    let mut preview = Preview::new(site)?;

    let url = format!("http://localhost:{}", port);
    eprintln!("\n\x1b[1;32m🏥 HCAS evidence\x1b[0m");
    eprintln!("   {}", url);
    eprintln!("   Charts: {}  Rows: {}\n", preview.specs.len(), preview.site.records.len());

    if open_browser {
        if let Err(e) = open::that(&url) {
            tracing::warn!(error = %e, "could not open browser");
        }
    }

    // Handle requests
    for request in server.incoming_requests() {
        if let Err(e) = handle_request(&mut preview, request) {
            tracing::error!(error = %e, "request failed");
        }
    }

    Ok(())
}

fn handle_request(preview: &mut Preview, mut request: Request) -> Result<()> {
    let method = request.method().clone();
    let url = request.url().to_string();

    let mut body = String::new();
    if method == Method::Post {
        request.as_reader().read_to_string(&mut body)?;
    }

    let reply = match preview.route(&method, &url, &body, Utc::now()) {
        Ok(reply) => reply,
        Err(e) => {
            tracing::error!(error = %e, %url, "route failed");
            Reply::json(500, &ApiResponse::failure(e.to_string()))?
        }
    };
    tracing::debug!(%method, %url, status = reply.status, "served");

    let mut response = Response::from_data(reply.body)
        .with_status_code(reply.status)
        .with_header(header("Content-Type", reply.content_type)?);
    if let Some(disposition) = &reply.disposition {
        response = response.with_header(header("Content-Disposition", disposition)?);
    }
    request.respond(response)?;
    Ok(())
}
