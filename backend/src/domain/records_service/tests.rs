//! Record versioning behaviour against a mocked repository.

use chrono::{DateTime, Duration, Local, TimeZone, Utc};
use mockable::Clock;
use rstest::{fixture, rstest};

use super::*;
use crate::domain::ErrorCode;
use crate::domain::ports::{MockRecordRepository, RecordPersistenceError};

struct FixedClock(DateTime<Utc>);

impl Clock for FixedClock {
    fn local(&self) -> DateTime<Local> {
        self.0.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.0
    }
}

#[fixture]
fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 2, 10, 8, 30, 0)
        .single()
        .expect("valid timestamp")
}

const RECORD: &str = "65f0a1b2c3d4e5f60718293a";

fn record_id() -> RecordId {
    RECORD.parse().expect("valid id")
}

fn stored(new_record: NewRecord) -> Record {
    Record {
        id: RecordId::generate(new_record.created_at),
        record_id: new_record.record_id,
        record_type: new_record.record_type,
        description: new_record.description,
        created_at: new_record.created_at,
    }
}

fn version(minutes: i64, now: DateTime<Utc>) -> Record {
    stored(NewRecord {
        record_id: record_id(),
        record_type: RecordType::Updated,
        description: Some(format!("v{minutes}")),
        created_at: now + Duration::minutes(minutes),
    })
}

fn service(repo: MockRecordRepository, now: DateTime<Utc>) -> RecordsService<MockRecordRepository> {
    RecordsService::new(Arc::new(repo), Arc::new(FixedClock(now)))
}

#[rstest]
#[tokio::test]
async fn new_drafts_allocate_an_id_and_stamp_time(now: DateTime<Utc>) {
    let mut repo = MockRecordRepository::new();
    repo.expect_find_latest().never();
    repo.expect_insert()
        .withf(move |r| r.record_type == RecordType::New && r.created_at == now)
        .times(1)
        .returning(|r| Ok(stored(r)));
    let record = service(repo, now)
        .append(RecordDraft::New {
            description: Some("first".to_owned()),
        })
        .await
        .expect("append");
    assert_eq!(record.created_at, now);
    assert!(record.record_id.as_ref().parse::<RecordId>().is_ok());
}

#[rstest]
#[tokio::test]
async fn updates_require_existing_history(now: DateTime<Utc>) {
    let mut repo = MockRecordRepository::new();
    repo.expect_find_latest().times(1).returning(|_| Ok(None));
    repo.expect_insert().never();
    let err = service(repo, now)
        .append(RecordDraft::Updated {
            record_id: record_id(),
            description: None,
        })
        .await
        .expect_err("unknown record");
    assert_eq!(err.code(), ErrorCode::NotFound);
    assert_eq!(err.message(), RECORD_NOT_FOUND);
}

#[rstest]
#[tokio::test]
async fn updates_append_under_the_same_record_id(now: DateTime<Utc>) {
    let mut repo = MockRecordRepository::new();
    let existing = version(-5, now);
    repo.expect_find_latest()
        .returning(move |_| Ok(Some(existing.clone())));
    repo.expect_insert()
        .withf(|r| r.record_id.as_ref() == RECORD && r.record_type == RecordType::Updated)
        .returning(|r| Ok(stored(r)));
    let record = service(repo, now)
        .append(RecordDraft::Updated {
            record_id: record_id(),
            description: Some("edit".to_owned()),
        })
        .await
        .expect("append");
    assert_eq!(record.description.as_deref(), Some("edit"));
}

#[rstest]
#[tokio::test]
async fn history_is_sorted_newest_first(now: DateTime<Utc>) {
    let mut repo = MockRecordRepository::new();
    let versions = vec![version(1, now), version(3, now), version(2, now)];
    repo.expect_find_history()
        .returning(move |_| Ok(versions.clone()));
    let history = service(repo, now)
        .history(&record_id())
        .await
        .expect("history");
    let descriptions: Vec<_> = history
        .iter()
        .filter_map(|r| r.description.as_deref())
        .collect();
    assert_eq!(descriptions, ["v3", "v2", "v1"]);
}

#[rstest]
#[tokio::test]
async fn empty_history_is_not_found(now: DateTime<Utc>) {
    let mut repo = MockRecordRepository::new();
    repo.expect_find_history().returning(|_| Ok(Vec::new()));
    let err = service(repo, now)
        .history(&record_id())
        .await
        .expect_err("no versions");
    assert_eq!(err.message(), HISTORY_NOT_FOUND);
}

#[rstest]
#[tokio::test]
async fn latest_view_collapses_versions(now: DateTime<Utc>) {
    let mut repo = MockRecordRepository::new();
    let mut other = version(10, now);
    other.record_id = "bbbbbbbbbbbbbbbbbbbbbbbb".parse().expect("valid id");
    let all = vec![version(1, now), other, version(4, now)];
    repo.expect_list_all().returning(move || Ok(all.clone()));
    let svc = service(repo, now);

    let latest = svc.list(RecordView::Latest).await.expect("list");
    assert_eq!(latest.len(), 2);
    assert_eq!(latest.first().map(|r| r.created_at), Some(now + Duration::minutes(10)));

    let everything = svc.list(RecordView::All).await.expect("list");
    assert_eq!(everything.len(), 3);
}

#[rstest]
#[tokio::test]
async fn store_outage_is_service_unavailable(now: DateTime<Utc>) {
    let mut repo = MockRecordRepository::new();
    repo.expect_find_latest()
        .returning(|_| Err(RecordPersistenceError::connection("no primary")));
    let err = service(repo, now)
        .latest(&record_id())
        .await
        .expect_err("outage");
    assert_eq!(err.code(), ErrorCode::ServiceUnavailable);
}
