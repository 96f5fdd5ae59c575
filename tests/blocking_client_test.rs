//! Blocking facade over the in-memory Skills server.

mod support;

use reqwest::header::ACCEPT;
use skills_client::prelude::*;
use skills_client::{DeletedSkillVersion, VERSION_LATEST};
use std::io::Read;
use std::sync::Arc;
use support::{CONTENT_LEN, SkillsServer, blocking_builder, blocking_client, expected_content};

#[test]
fn create_retrieve_and_version_lifecycle() {
    let server = Arc::new(SkillsServer::new());
    let client = blocking_client(&server);

    let skill = client
        .skills()
        .create(SkillCreateParams::new().files(UploadFile::named("pdf.zip", vec![1u8, 2, 3])))
        .send()
        .unwrap();
    assert_eq!(skill.id, "skl_1");

    let version = client.skills().versions().retrieve("skl_1", "1").send().unwrap();
    assert_eq!(version.id, "ver_1");
    assert_eq!(version.skill_id, "skl_1");

    client
        .skills()
        .versions()
        .create("skl_1", VersionCreateParams::new().files(UploadFile::named("pdf.zip", vec![9u8])))
        .send()
        .unwrap();
    let latest = client
        .skills()
        .versions()
        .retrieve("skl_1", VERSION_LATEST)
        .send()
        .unwrap();
    assert_eq!(latest.version, "2");

    let skill = client.skills().versions().set_default("skl_1", "2").send().unwrap();
    assert_eq!(skill.default_version.as_deref(), Some("2"));

    let versions: Vec<String> = client
        .skills()
        .versions()
        .list("skl_1", ListParams::new().order(SortOrder::Asc))
        .collect_all()
        .unwrap()
        .into_iter()
        .map(|v| v.version)
        .collect();
    assert_eq!(versions, vec!["1", "2"]);

    assert!(client.skills().delete("skl_1").send().unwrap().deleted);
    assert!(client.skills().retrieve("skl_1").send().unwrap_err().is_not_found());
}

#[test]
fn skill_without_files_gets_its_first_version_later() {
    let server = Arc::new(SkillsServer::new());
    let client = blocking_client(&server);

    let skill = client.skills().create(SkillCreateParams::new()).send().unwrap();
    assert_eq!(skill.id, "skl_1");
    assert_eq!(skill.default_version.as_deref(), Some(""));
    assert_eq!(skill.latest_version.as_deref(), Some(""));
    assert!(!server.last_request().body.is_multipart());

    let version = client
        .skills()
        .versions()
        .create("skl_1", VersionCreateParams::new().set_default(true))
        .send()
        .unwrap();
    assert_eq!(version.id, "ver_1");
    assert_eq!(version.skill_id, "skl_1");
    assert_eq!(version.version, "1");

    let skill = client.skills().retrieve("skl_1").send().unwrap();
    assert_eq!(skill.default_version.as_deref(), Some("1"));
}

#[test]
fn multipart_and_json_creates_carry_the_same_fields() {
    let server = Arc::new(SkillsServer::new());
    server.seed(1);
    let client = blocking_client(&server);
    let versions = client.skills().versions();

    versions
        .create("skl_1", VersionCreateParams::new().set_default(true))
        .send()
        .unwrap();
    let json = support::parse_upload(&server.last_request());
    versions
        .create(
            "skl_1",
            VersionCreateParams::new()
                .set_default(true)
                .files(UploadFile::named("pdf.zip", vec![1u8])),
        )
        .send()
        .unwrap();
    let multipart = support::parse_upload(&server.last_request());

    assert!(!json.multipart);
    assert!(multipart.multipart);
    assert_eq!(json.fields, multipart.fields);
}

#[test]
fn refetch_after_the_last_page_is_empty() {
    let server = Arc::new(SkillsServer::new());
    server.seed(2);
    let client = blocking_client(&server);

    let last = client
        .skills()
        .list(ListParams::new().limit(5))
        .first_page()
        .unwrap();
    assert!(!last.has_more);

    let after = client
        .skills()
        .list(ListParams::new().limit(5).after(last.last_id.unwrap()))
        .first_page()
        .unwrap();
    assert!(after.data.is_empty());
    assert!(!after.has_more);
    assert_eq!(server.request_count(), 2);
}

#[test]
fn iterating_a_list_call_walks_every_page() {
    let server = Arc::new(SkillsServer::new());
    let ids = server.seed(3);
    let client = blocking_client(&server);

    let mut seen = Vec::new();
    for skill in client.skills().list(ListParams::new().limit(1).order(SortOrder::Asc)) {
        seen.push(skill.unwrap().id);
    }
    assert_eq!(seen, ids);
    assert_eq!(server.request_count(), 3);
}

#[test]
fn page_iterator_yields_whole_pages_lazily() {
    let server = Arc::new(SkillsServer::new());
    server.seed(5);
    let client = blocking_client(&server);

    let mut pages = client.skills().list(ListParams::new().limit(2)).pages();
    assert_eq!(server.request_count(), 0);
    let first = pages.next().unwrap().unwrap();
    assert_eq!(first.len(), 2);
    assert_eq!(server.request_count(), 1);

    let rest: Vec<usize> = pages.map(|p| p.unwrap().len()).collect();
    assert_eq!(rest, vec![2, 1]);
}

#[test]
fn failed_page_fetch_ends_iteration() {
    let server = Arc::new(SkillsServer::new());
    server.seed(3);
    let client = blocking_client(&server);
    server.fail_request(3);

    let results: Vec<_> = client.skills().list(ListParams::new().limit(1)).into_iter().collect();
    assert_eq!(results.len(), 3);
    assert!(results[..2].iter().all(|r| r.is_ok()));
    assert_eq!(results[2].as_ref().unwrap_err().status_code(), Some(500));
}

#[test]
fn content_reads_in_bounded_chunks() {
    let server = Arc::new(SkillsServer::new());
    server.seed(1);
    let client = blocking_client(&server);

    let streamed = client.skills().content().retrieve("skl_1").send().unwrap();
    assert_eq!(server.last_request().headers[ACCEPT], "application/binary");
    let chunks: Vec<bytes::Bytes> = streamed.chunks(4096).collect::<Result<_>>().unwrap();
    assert!(chunks.iter().all(|c| c.len() <= 4096));
    assert_eq!(chunks.concat(), expected_content(1));

    let mut streamed = client
        .skills()
        .versions()
        .content()
        .retrieve("skl_1", "1")
        .send()
        .unwrap();
    let mut body = Vec::new();
    streamed.read_to_end(&mut body).unwrap();
    assert_eq!(body.len(), CONTENT_LEN);
}

#[test]
fn content_can_be_written_to_disk() {
    let server = Arc::new(SkillsServer::new());
    server.seed(1);
    let client = blocking_client(&server);
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("skill.zip");

    let mut streamed = client.skills().content().retrieve("skl_1").send().unwrap();
    let mut file = std::fs::File::create(&path).unwrap();
    let written = streamed.write_to(&mut file).unwrap();
    assert_eq!(written, CONTENT_LEN as u64);
    assert_eq!(std::fs::read(&path).unwrap(), expected_content(1));
}

#[test]
fn uploads_a_skill_directory() {
    let server = Arc::new(SkillsServer::new());
    let client = blocking_client(&server);
    let tmp = tempfile::tempdir().unwrap();
    let dir = tmp.path().join("report-writer");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("SKILL.md"), "---\nname: report-writer\n---\n").unwrap();
    std::fs::write(dir.join("template.txt"), "{{body}}").unwrap();

    let skill = client
        .skills()
        .create(SkillCreateParams::new().files(FileSet::from_dir(&dir).unwrap()))
        .send()
        .unwrap();
    assert_eq!(skill.name, "report-writer");

    let upload = support::parse_upload(&server.last_request());
    assert!(upload.multipart);
    assert_eq!(
        upload.filenames,
        vec!["report-writer/SKILL.md", "report-writer/template.txt"]
    );
}

#[test]
fn raw_projection_keeps_status_and_headers() {
    let server = Arc::new(SkillsServer::new());
    server.seed(2);
    let client = blocking_client(&server);

    let raw = client.skills().list(ListParams::new().limit(1)).raw().unwrap();
    assert_eq!(raw.status(), 200);
    let page: CursorPage<Skill> = raw.parse().unwrap();
    assert!(page.has_more);

    let envelope = client
        .skills()
        .retrieve("skl_1")
        .project(Projection::Raw)
        .unwrap();
    let text = envelope.into_raw().unwrap().text().unwrap();
    assert!(text.contains("\"skl_1\""));
}

#[test]
fn validation_errors_send_nothing() {
    let server = Arc::new(SkillsServer::new());
    let client = blocking_client(&server);

    assert!(matches!(
        client.skills().delete("").send(),
        Err(ApiError::InvalidArgument { param: "skill_id", .. })
    ));
    assert!(matches!(
        client.skills().versions().content().retrieve("skl_1", "").send(),
        Err(ApiError::InvalidArgument { param: "version", .. })
    ));
    let mut items = client.skills().versions().list("", ListParams::new()).into_iter();
    assert!(matches!(items.next(), Some(Err(ApiError::InvalidArgument { .. }))));
    assert!(items.next().is_none());
    assert_eq!(server.request_count(), 0);
}

#[test]
fn missing_version_delete_can_be_acknowledged() {
    let server = Arc::new(SkillsServer::new());
    server.seed(1);
    let client = blocking_builder(&server)
        .missing_on_delete(MissingOnDelete::Acknowledge)
        .build_blocking()
        .unwrap();

    let record = client.skills().versions().delete("skl_1", "7").send().unwrap();
    assert_eq!(record, DeletedSkillVersion {
        id: String::new(),
        deleted: false,
        object: "skill.version.deleted".into(),
        version: "7".into(),
    });

    let strict = blocking_client(&server);
    assert!(strict.skills().versions().delete("skl_1", "7").send().unwrap_err().is_not_found());
}

#[test]
fn cancelled_handle_stops_reads_and_iteration() {
    let server = Arc::new(SkillsServer::new());
    server.seed(3);
    let client = blocking_client(&server);
    let cancel = CancelHandle::new();

    let mut streamed = client
        .skills()
        .content()
        .retrieve("skl_1")
        .with_cancel(cancel.clone())
        .send()
        .unwrap();
    assert!(streamed.read_chunk(100).unwrap().is_some());
    cancel.cancel();
    assert!(streamed.read_chunk(100).unwrap_err().is_cancelled());
    assert!(streamed.read_chunk(100).unwrap().is_none());

    let before = server.request_count();
    let results: Vec<_> = client
        .skills()
        .list(ListParams::new().limit(1))
        .with_cancel(cancel)
        .into_iter()
        .collect();
    assert_eq!(results.len(), 1);
    assert!(results[0].as_ref().unwrap_err().is_cancelled());
    assert_eq!(server.request_count(), before);
}
