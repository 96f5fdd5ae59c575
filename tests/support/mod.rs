//! In-memory Skills server implementing both transport traits.
#![allow(dead_code)]

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use serde_json::{Value, json};
use skills_client::{
    BlockingClient, BlockingHttpTransport, ByteStream, Client, ClientBuilder, HttpTransport,
    RequestBody, TransportError, TransportRequest, TransportResponse,
};
use skills_client::execution::BlockingBody;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

pub const BASE_URL: &str = "http://skills.test/v1";
pub const CONTENT_LEN: usize = 10_000;

/// Deterministic archive bytes of a version.
pub fn expected_content(version: u32) -> Vec<u8> {
    (0..CONTENT_LEN)
        .map(|i| ((i + version as usize) % 251) as u8)
        .collect()
}

struct StoredVersion {
    id: String,
    version: u32,
    created_at: i64,
}

// Version numbers start at 1; 0 means "none yet".
fn version_label(number: u32) -> String {
    if number == 0 {
        String::new()
    } else {
        number.to_string()
    }
}

struct StoredSkill {
    id: String,
    created_at: i64,
    name: String,
    default_version: u32,
    versions: Vec<StoredVersion>,
}

impl StoredSkill {
    fn latest(&self) -> u32 {
        self.versions.iter().map(|v| v.version).max().unwrap_or(0)
    }

    fn json(&self) -> Value {
        json!({
            "id": self.id,
            "created_at": self.created_at,
            "name": self.name,
            "description": format!("{} skill", self.name),
            "default_version": version_label(self.default_version),
            "latest_version": version_label(self.latest()),
            "object": "skill",
        })
    }

    fn version_json(&self, v: &StoredVersion) -> Value {
        json!({
            "id": v.id,
            "created_at": v.created_at,
            "name": self.name,
            "description": format!("{} skill", self.name),
            "skill_id": self.id,
            "version": v.version.to_string(),
            "object": "skill.version",
        })
    }

    fn find_version(&self, version: &str) -> Option<&StoredVersion> {
        if version == "latest" {
            let latest = self.latest();
            return self.versions.iter().find(|v| v.version == latest);
        }
        self.versions.iter().find(|v| v.version.to_string() == version)
    }
}

#[derive(Default)]
struct State {
    skills: Vec<StoredSkill>,
    next_skill: u32,
    next_version: u32,
    clock: i64,
}

impl State {
    fn tick(&mut self) -> i64 {
        self.clock += 1;
        1_700_000_000 + self.clock
    }

    fn new_version(&mut self, number: u32) -> StoredVersion {
        self.next_version += 1;
        StoredVersion {
            id: format!("ver_{}", self.next_version),
            version: number,
            created_at: self.tick(),
        }
    }

    /// A skill created from uploaded files starts at version 1; one created
    /// without files has no versions yet.
    fn new_skill(&mut self, name: &str, with_files: bool) -> usize {
        self.next_skill += 1;
        let id = format!("skl_{}", self.next_skill);
        let created_at = self.tick();
        let versions = if with_files {
            vec![self.new_version(1)]
        } else {
            Vec::new()
        };
        self.skills.push(StoredSkill {
            id,
            created_at,
            name: name.to_string(),
            default_version: if with_files { 1 } else { 0 },
            versions,
        });
        self.skills.len() - 1
    }

    fn skill_index(&self, id: &str) -> Option<usize> {
        self.skills.iter().position(|s| s.id == id)
    }
}

pub struct Reply {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl Reply {
    fn json(status: u16, body: Value) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert("x-request-id", HeaderValue::from_static("req_test"));
        Self {
            status,
            headers,
            body: serde_json::to_vec(&body).expect("json"),
        }
    }

    fn error(status: u16, message: &str) -> Self {
        Self::json(status, json!({"error": {"message": message, "type": "invalid_request_error"}}))
    }

    fn binary(body: Vec<u8>) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/zip"));
        headers.insert("content-length", HeaderValue::from(body.len()));
        Self {
            status: 200,
            headers,
            body,
        }
    }
}

/// Fields and file names of a create body.
#[derive(Debug, Default)]
pub struct Upload {
    pub multipart: bool,
    pub fields: HashMap<String, String>,
    pub filenames: Vec<String>,
}

pub fn parse_upload(request: &TransportRequest) -> Upload {
    let mut upload = Upload::default();
    match &request.body {
        RequestBody::Multipart(parts) => {
            upload.multipart = true;
            upload.fields = parts.fields.iter().cloned().collect();
            upload.filenames = parts.files.iter().map(|f| f.filename().to_string()).collect();
        }
        RequestBody::Json(bytes) => {
            let value: Value = serde_json::from_slice(bytes).unwrap_or(Value::Null);
            if let Value::Object(map) = value {
                for (key, value) in map {
                    let text = match value {
                        Value::String(s) => s,
                        other => other.to_string(),
                    };
                    upload.fields.insert(key, text);
                }
            }
        }
        RequestBody::Empty => {}
    }
    upload
}

fn skill_name(upload: &Upload) -> String {
    upload
        .filenames
        .first()
        .map(|name| {
            let top = name.split('/').next().unwrap_or(name);
            top.rsplit_once('.').map(|(stem, _)| stem).unwrap_or(top).to_string()
        })
        .unwrap_or_else(|| "untitled".to_string())
}

fn list_page(mut items: Vec<(String, i64, Value)>, query: &HashMap<String, String>) -> Value {
    let ascending = query.get("order").map(String::as_str) == Some("asc");
    items.sort_by_key(|(_, created_at, _)| *created_at);
    if !ascending {
        items.reverse();
    }
    let start = match query.get("after") {
        Some(after) => match items.iter().position(|(id, _, _)| id == after) {
            Some(pos) => pos + 1,
            None => items.len(),
        },
        None => 0,
    };
    let limit = query
        .get("limit")
        .and_then(|l| l.parse::<usize>().ok())
        .unwrap_or(20)
        .clamp(1, 100);
    let end = (start + limit).min(items.len());
    let page: Vec<&(String, i64, Value)> = items[start..end].iter().collect();
    json!({
        "data": page.iter().map(|(_, _, v)| v.clone()).collect::<Vec<_>>(),
        "first_id": page.first().map(|(id, _, _)| id.clone()),
        "last_id": page.last().map(|(id, _, _)| id.clone()),
        "has_more": end < items.len(),
        "object": "list",
    })
}

pub struct SkillsServer {
    state: Mutex<State>,
    log: Mutex<Vec<TransportRequest>>,
    frame_size: usize,
    fail_on: Mutex<Option<usize>>,
}

impl Default for SkillsServer {
    fn default() -> Self {
        Self::new()
    }
}

impl SkillsServer {
    pub fn new() -> Self {
        Self::with_frame_size(1024)
    }

    /// Server delivering response bodies in frames of `frame_size` bytes.
    pub fn with_frame_size(frame_size: usize) -> Self {
        Self {
            state: Mutex::new(State::default()),
            log: Mutex::new(Vec::new()),
            frame_size: frame_size.max(1),
            fail_on: Mutex::new(None),
        }
    }

    /// Insert `count` skills with one version each; returns their ids in
    /// creation order.
    pub fn seed(&self, count: usize) -> Vec<String> {
        let mut state = self.state.lock().unwrap();
        (0..count)
            .map(|i| {
                let index = state.new_skill(&format!("seed-{i}"), true);
                state.skills[index].id.clone()
            })
            .collect()
    }

    /// Answer the `n`-th request from now (1-based) with a 500.
    pub fn fail_request(&self, n: usize) {
        let seen = self.log.lock().unwrap().len();
        *self.fail_on.lock().unwrap() = Some(seen + n);
    }

    pub fn requests(&self) -> Vec<TransportRequest> {
        self.log.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.log.lock().unwrap().len()
    }

    pub fn last_request(&self) -> TransportRequest {
        self.log
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("at least one request")
    }

    pub fn respond(&self, request: TransportRequest) -> Reply {
        let number = {
            let mut log = self.log.lock().unwrap();
            log.push(request.clone());
            log.len()
        };
        if *self.fail_on.lock().unwrap() == Some(number) {
            return Reply::error(500, "injected failure");
        }
        self.handle(&request)
    }

    fn handle(&self, request: &TransportRequest) -> Reply {
        let url = reqwest::Url::parse(&request.url).expect("absolute url");
        let path = url.path().strip_prefix("/v1").unwrap_or(url.path()).to_string();
        let segments: Vec<String> = path
            .trim_matches('/')
            .split('/')
            .map(|s| urlencoding::decode(s).expect("utf8").into_owned())
            .collect();
        let segs: Vec<&str> = segments.iter().map(String::as_str).collect();
        let query: HashMap<String, String> = url.query_pairs().into_owned().collect();
        let mut state = self.state.lock().unwrap();

        match (request.method.as_str(), segs.as_slice()) {
            ("POST", ["skills"]) => {
                let upload = parse_upload(request);
                let index = state.new_skill(&skill_name(&upload), !upload.filenames.is_empty());
                Reply::json(200, state.skills[index].json())
            }
            ("GET", ["skills"]) => {
                let items = state
                    .skills
                    .iter()
                    .map(|s| (s.id.clone(), s.created_at, s.json()))
                    .collect();
                Reply::json(200, list_page(items, &query))
            }
            ("GET", ["skills", id]) => match state.skill_index(id) {
                Some(i) => Reply::json(200, state.skills[i].json()),
                None => Reply::error(404, &format!("No skill found with id '{id}'")),
            },
            ("POST", ["skills", id]) => {
                let Some(i) = state.skill_index(id) else {
                    return Reply::error(404, "skill not found");
                };
                let upload = parse_upload(request);
                if let Some(version) = upload.fields.get("default_version") {
                    let Some(number) = state.skills[i].find_version(version).map(|v| v.version)
                    else {
                        return Reply::error(400, "unknown version");
                    };
                    state.skills[i].default_version = number;
                }
                Reply::json(200, state.skills[i].json())
            }
            ("DELETE", ["skills", id]) => match state.skill_index(id) {
                Some(i) => {
                    state.skills.remove(i);
                    Reply::json(200, json!({"id": id, "deleted": true, "object": "skill.deleted"}))
                }
                None => Reply::error(404, "skill not found"),
            },
            ("GET", ["skills", id, "content"]) => match state.skill_index(id) {
                Some(i) => Reply::binary(expected_content(state.skills[i].default_version)),
                None => Reply::error(404, "skill not found"),
            },
            ("POST", ["skills", id, "versions"]) => {
                let Some(i) = state.skill_index(id) else {
                    return Reply::error(404, "skill not found");
                };
                let upload = parse_upload(request);
                let number = state.skills[i].latest() + 1;
                let version = state.new_version(number);
                let skill = &mut state.skills[i];
                if upload.fields.get("default").map(String::as_str) == Some("true") {
                    skill.default_version = number;
                }
                let body = skill.version_json(&version);
                skill.versions.push(version);
                Reply::json(200, body)
            }
            ("GET", ["skills", id, "versions"]) => match state.skill_index(id) {
                Some(i) => {
                    let skill = &state.skills[i];
                    let items = skill
                        .versions
                        .iter()
                        .map(|v| (v.id.clone(), v.created_at, skill.version_json(v)))
                        .collect();
                    Reply::json(200, list_page(items, &query))
                }
                None => Reply::error(404, "skill not found"),
            },
            ("GET", ["skills", id, "versions", version]) => {
                match state
                    .skill_index(id)
                    .and_then(|i| state.skills[i].find_version(version).map(|v| (i, v)))
                {
                    Some((i, v)) => Reply::json(200, state.skills[i].version_json(v)),
                    None => Reply::error(404, "version not found"),
                }
            }
            ("DELETE", ["skills", id, "versions", version]) => {
                let Some(i) = state.skill_index(id) else {
                    return Reply::error(404, "skill not found");
                };
                let skill = &mut state.skills[i];
                match skill.versions.iter().position(|v| v.version.to_string() == *version) {
                    Some(pos) => {
                        let removed = skill.versions.remove(pos);
                        Reply::json(
                            200,
                            json!({
                                "id": removed.id,
                                "deleted": true,
                                "object": "skill.version.deleted",
                                "version": version,
                            }),
                        )
                    }
                    None => Reply::error(404, "version not found"),
                }
            }
            ("GET", ["skills", id, "versions", version, "content"]) => {
                match state
                    .skill_index(id)
                    .and_then(|i| state.skills[i].find_version(version))
                {
                    Some(v) => Reply::binary(expected_content(v.version)),
                    None => Reply::error(404, "version not found"),
                }
            }
            _ => Reply::error(404, "no such route"),
        }
    }
}

#[async_trait]
impl HttpTransport for SkillsServer {
    async fn send(
        &self,
        request: TransportRequest,
    ) -> Result<TransportResponse<ByteStream>, TransportError> {
        let reply = self.respond(request);
        let frames: Vec<Result<Bytes, TransportError>> = reply
            .body
            .chunks(self.frame_size)
            .map(|frame| Ok(Bytes::copy_from_slice(frame)))
            .collect();
        Ok(TransportResponse {
            status: reply.status,
            headers: reply.headers,
            body: Box::pin(futures::stream::iter(frames)),
        })
    }
}

impl BlockingHttpTransport for SkillsServer {
    fn send(
        &self,
        request: TransportRequest,
    ) -> Result<TransportResponse<BlockingBody>, TransportError> {
        let reply = self.respond(request);
        Ok(TransportResponse {
            status: reply.status,
            headers: reply.headers,
            body: Box::new(std::io::Cursor::new(reply.body)),
        })
    }
}

/// Transport whose requests never complete.
pub struct StallTransport {
    pub calls: Mutex<usize>,
}

impl StallTransport {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(0),
        }
    }
}

#[async_trait]
impl HttpTransport for StallTransport {
    async fn send(
        &self,
        _request: TransportRequest,
    ) -> Result<TransportResponse<ByteStream>, TransportError> {
        *self.calls.lock().unwrap() += 1;
        futures::future::pending().await
    }
}

pub fn async_client(server: &Arc<SkillsServer>) -> Client {
    async_builder(server).build().expect("async client")
}

pub fn async_builder(server: &Arc<SkillsServer>) -> ClientBuilder {
    ClientBuilder::new()
        .base_url(BASE_URL)
        .with_transport(server.clone())
}

pub fn blocking_client(server: &Arc<SkillsServer>) -> BlockingClient {
    blocking_builder(server).build_blocking().expect("blocking client")
}

pub fn blocking_builder(server: &Arc<SkillsServer>) -> ClientBuilder {
    ClientBuilder::new()
        .base_url(BASE_URL)
        .with_blocking_transport(server.clone())
}
