mod common;

use std::sync::Arc;

use common::{answer_string, VecStore};
use purity_stats::config::StatisticsConfig;
use purity_stats::survey::{DemographicField, ImportError, SubmissionImporter, SurveyService};

const HEADER: &str =
    "timestamp,device_type,referrer,share_source,gender,school,year,living,race,relationship,answers";

fn export() -> String {
    let rows = [
        // Records from before the demographic questions existed.
        format!("2023-11-02T09:00:00Z,desktop,,,,,,,,,{}", answer_string(10)),
        format!("2023-11-02T09:20:00Z,mobile,,,,,,,,,{}", answer_string(50)),
        format!(
            "2024-02-10T18:05:00Z,mobile,https://reddit.com/r/nyu,reddit,male,CAS,junior,dorm,Asian,single,{}",
            answer_string(30)
        ),
        format!(
            "2024-02-10T18:45:00Z,tablet,,,Man,cas,Grad Student,With family,Middle Eastern,In a relationship,{}",
            answer_string(70)
        ),
        format!(
            "2024-02-10T19:15:00Z,desktop,,,not_provided,Columbia,not_provided,not_provided,Martian,not_provided,{}",
            answer_string(20)
        ),
    ];
    format!("{HEADER}\n{}\n", rows.join("\n"))
}

fn service_with_export() -> SurveyService<VecStore> {
    let submissions = SubmissionImporter::from_reader(export().as_bytes()).expect("import succeeds");
    let service = SurveyService::new(Arc::new(VecStore::default()), StatisticsConfig::default());
    service.import(submissions).expect("store accepts");
    service
}

#[test]
fn imported_export_produces_consolidated_tables() {
    let service = service_with_export();
    let report = service.demographic_report(Some(true)).expect("report");

    assert_eq!(report.summary.total_submissions, 5);
    assert_eq!(report.summary.median_score, 70.0);
    assert_eq!(report.shares.total_shares, 1);
    assert_eq!(report.shares.platforms[0].platform, "reddit");
    assert_eq!(report.shares.platforms[0].percentage, 100.0);

    let table = |field: DemographicField| {
        report
            .tables
            .iter()
            .find(|table| table.field == field)
            .expect("table present")
    };

    let gender = table(DemographicField::Gender);
    let keys = gender.rows.iter().map(|r| r.key.as_str()).collect::<Vec<_>>();
    assert_eq!(keys, ["male", "prefer_not_to_say_combined"]);
    assert_eq!(gender.rows[0].count, 2);
    assert_eq!(gender.rows[1].count, 3);

    let school = table(DemographicField::School);
    let keys = school.rows.iter().map(|r| r.key.as_str()).collect::<Vec<_>>();
    assert_eq!(keys, ["cas", "Other", "Not Provided"]);
    assert_eq!(school.rows[2].count, 2);

    let race = table(DemographicField::Race);
    let keys = race.rows.iter().map(|r| r.key.as_str()).collect::<Vec<_>>();
    assert_eq!(
        keys,
        ["asian", "middle_eastern", "Other", "prefer_not_to_say_combined"]
    );

    let year = table(DemographicField::Year);
    let keys = year.rows.iter().map(|r| r.key.as_str()).collect::<Vec<_>>();
    assert_eq!(
        keys,
        ["junior", "graduate", "prefer_not_to_say_year", "Not Provided"]
    );
}

#[test]
fn hiding_legacy_rows_folds_them_into_prefer_not_to_say() {
    let service = service_with_export();
    let report = service.demographic_report(Some(false)).expect("report");

    let living = report
        .tables
        .iter()
        .find(|table| table.field == DemographicField::Living)
        .expect("living table");
    let keys = living.rows.iter().map(|r| r.key.as_str()).collect::<Vec<_>>();
    assert_eq!(keys, ["dorm", "family", "prefer_not_to_say_living"]);
    assert_eq!(living.rows[2].count, 3);
    assert_eq!(living.total, 5);
}

#[test]
fn coverage_and_traffic_reports_reflect_the_export() {
    let service = service_with_export();
    let report = service.demographic_report(None).expect("report");

    let missing_gender = report
        .missing
        .iter()
        .find(|entry| entry.field == DemographicField::Gender)
        .expect("gender coverage");
    assert_eq!(missing_gender.count, 2);
    assert_eq!(missing_gender.percentage, 40.0);

    let participation = report
        .participation
        .iter()
        .find(|entry| entry.field == DemographicField::Relationship)
        .expect("relationship participation");
    assert_eq!(participation.count, 3);

    let hours = report
        .submissions_over_time
        .iter()
        .map(|entry| (entry.hour.as_str(), entry.count))
        .collect::<Vec<_>>();
    assert_eq!(
        hours,
        [("2023-11-02 09", 2), ("2024-02-10 18", 2), ("2024-02-10 19", 1)]
    );

    let mobile = report
        .devices
        .iter()
        .find(|share| share.device_type.as_str() == "mobile")
        .expect("mobile share");
    assert_eq!(mobile.count, 2);
    assert_eq!(mobile.percentage, 40.0);
}

#[test]
fn malformed_export_fails_without_storing_anything() {
    let csv = format!(
        "{HEADER}\n2024-01-01,desktop,,,,,,,,,{}\nnot-a-date,desktop,,,,,,,,,{}\n",
        answer_string(0),
        answer_string(0)
    );
    match SubmissionImporter::from_reader(csv.as_bytes()) {
        Err(ImportError::InvalidRow { line, reason }) => {
            assert_eq!(line, 3);
            assert!(reason.contains("not-a-date"));
        }
        other => panic!("expected invalid row, got {other:?}"),
    }
}
