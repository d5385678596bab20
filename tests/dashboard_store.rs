use chrono::NaiveDate;
use rusqlite::{params, Connection};
use std::fs;
use std::path::PathBuf;
use svpol_insights::{
    DashboardStore, DataError, DataLoader, Dataset, FixedClock, Party, ReadSource, Snapshot,
};
use tempfile::{tempdir, TempDir};

struct Fixture {
    dir: TempDir,
}

impl Fixture {
    fn new() -> Self {
        Self {
            dir: tempdir().unwrap(),
        }
    }

    fn database(&self) -> PathBuf {
        self.dir.path().join("tweets.db")
    }

    fn polls_csv(&self) -> PathBuf {
        self.dir.path().join("partisympatier.csv")
    }

    fn write_hashtags(&self, rows: &[(&str, &str, i64)]) {
        let conn = Connection::open(self.database()).unwrap();
        conn.execute(
            "CREATE TABLE hashtags (hashtag TEXT NOT NULL, date TEXT NOT NULL, count INTEGER NOT NULL)",
            [],
        )
        .unwrap();
        for (hashtag, date, count) in rows {
            conn.execute(
                "INSERT INTO hashtags (hashtag, date, count) VALUES (?1, ?2, ?3)",
                params![hashtag, date, count],
            )
            .unwrap();
        }
    }

    fn write_polls(&self, csv: &str) {
        fs::write(self.polls_csv(), csv).unwrap();
    }

    fn store(&self) -> DashboardStore {
        DashboardStore::new(self.database(), self.polls_csv())
    }

    fn loader(&self, today: NaiveDate) -> DataLoader {
        DataLoader::with_clock(self.store(), FixedClock(today))
    }
}

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

const POLLS: &str = "\
company,publdate,party,support
Sifo,2015-06-15,S,31.2
Sifo,2015-06-15,SD,17.9
Sifo,2015-06-15,Uncertain,8.0
Novus,2019-03-01,S,29.5
Novus,2019-03-01,M,18.4
Sifo,2021-11-20,S,28.1
";

#[test]
fn hashtags_are_read_from_sqlite() {
    let fixture = Fixture::new();
    fixture.write_hashtags(&[
        ("#svpol", "2021-01-01 00:00:00", 120),
        ("#svpol", "2021-01-31 00:00:00", 80),
        ("#val2022", "2021-02-01 00:00:00", 15),
        ("#migpol", "2021-01-15", 40),
    ]);
    fixture.write_polls(POLLS);
    let loader = fixture.loader(day(2021, 2, 10));

    let january = loader
        .load_hashtags(day(2021, 1, 1), day(2021, 1, 31), None)
        .unwrap();
    assert_eq!(january.len(), 3);

    let svpol = loader
        .load_hashtags(day(2021, 1, 1), day(2021, 1, 31), Some("#svpol"))
        .unwrap();
    assert_eq!(svpol.iter().map(|m| m.count).sum::<u64>(), 200);

    assert_eq!(
        loader.trending_hashtags(30, 2).unwrap(),
        vec!["#svpol", "#migpol"]
    );
    assert_eq!(
        loader.trending_hashtags(365, 10).unwrap(),
        vec!["#svpol", "#migpol", "#val2022"]
    );
}

#[test]
fn polls_are_read_from_csv() {
    let fixture = Fixture::new();
    fixture.write_hashtags(&[]);
    fixture.write_polls(POLLS);
    let loader = fixture.loader(day(2022, 1, 1));

    let decade = loader.load_party_poll_numbers(2010, 2020).unwrap();
    assert_eq!(decade.len(), 5);
    assert!(decade.iter().any(|p| p.party == Party::Uncertain));
    assert!(loader.load_party_poll_numbers(2010, 2014).unwrap().is_empty());

    assert_eq!(loader.poll_companies().unwrap(), vec!["Novus", "Sifo"]);
    let latest = loader.company_poll("Sifo", None).unwrap();
    assert_eq!(latest.len(), 1);
    assert_eq!(latest[0].publdate, day(2021, 11, 20));
}

#[test]
fn missing_table_is_unavailable() {
    let fixture = Fixture::new();
    Connection::open(fixture.database())
        .unwrap()
        .execute("CREATE TABLE tweets (id INTEGER)", [])
        .unwrap();
    let loader = fixture.loader(day(2022, 1, 1));

    let err = loader
        .load_hashtags(day(2021, 1, 1), day(2021, 12, 31), None)
        .unwrap_err();
    assert!(matches!(
        err,
        DataError::DataUnavailable {
            dataset: Dataset::Hashtags,
            ..
        }
    ));
}

#[test]
fn missing_poll_column_is_unavailable() {
    let fixture = Fixture::new();
    fixture.write_polls("company,publdate,party\nSifo,2015-06-15,S\n");
    let loader = fixture.loader(day(2022, 1, 1));

    let err = loader.load_party_poll_numbers(2000, 2022).unwrap_err();
    assert!(matches!(
        err,
        DataError::DataUnavailable {
            dataset: Dataset::Polls,
            ..
        }
    ));
}

#[test]
fn snapshot_outlives_the_files() {
    let fixture = Fixture::new();
    fixture.write_hashtags(&[("#svpol", "2021-06-01", 7)]);
    fixture.write_polls(POLLS);

    let snapshot = Snapshot::capture(&fixture.store()).unwrap();
    fs::remove_file(fixture.database()).unwrap();
    fs::remove_file(fixture.polls_csv()).unwrap();

    assert!(fixture.store().fetch(Dataset::Hashtags).is_err());

    let loader = DataLoader::with_clock(snapshot, FixedClock(day(2021, 6, 30)));
    assert_eq!(loader.trending_hashtags(365, 10).unwrap(), vec!["#svpol"]);
    assert_eq!(loader.load_party_poll_numbers(2000, 2022).unwrap().len(), 6);
}

#[test]
fn negative_count_fails_trending() {
    let fixture = Fixture::new();
    fixture.write_hashtags(&[("#a", "2022-05-01", 5), ("#b", "2022-05-01", -20)]);
    let loader = fixture.loader(day(2022, 6, 1));

    let err = loader.trending_entries(365, 10).unwrap_err();
    assert!(matches!(
        err,
        DataError::MalformedRecord {
            dataset: Dataset::Hashtags,
            ..
        }
    ));
}
