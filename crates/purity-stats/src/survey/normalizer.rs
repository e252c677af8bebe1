use super::domain::{DemographicAnswer, DemographicField, NOT_PROVIDED_SENTINEL};
use std::collections::HashMap;
use std::sync::OnceLock;

type FieldTable = HashMap<String, &'static str>;

static DEMOGRAPHIC_TABLES: OnceLock<HashMap<DemographicField, FieldTable>> = OnceLock::new();

/// Normalize a submitted value for `field`.
///
/// Blank or missing input is an explicit skip on new records. Known spellings fold to the
/// field's canonical token; anything else passes through trimmed and is bucketed later.
pub fn normalize_demographic(field: DemographicField, raw: Option<&str>) -> DemographicAnswer {
    let Some(raw) = raw else {
        return DemographicAnswer::DeclinedToAnswer;
    };

    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == NOT_PROVIDED_SENTINEL {
        return DemographicAnswer::DeclinedToAnswer;
    }

    match canonical_token(field, trimmed) {
        Some(token) => DemographicAnswer::provided(token),
        None => DemographicAnswer::provided(trimmed),
    }
}

/// Canonical token for a known spelling, if the field's table has one.
pub fn canonical_token(field: DemographicField, raw: &str) -> Option<&'static str> {
    demographic_tables()
        .get(&field)
        .and_then(|table| table.get(&lookup_key(raw)))
        .copied()
}

pub(crate) fn lookup_key(value: &str) -> String {
    let cleaned = value
        .replace(['\u{feff}', '\u{200b}'], "")
        .replace('\u{2019}', "'");
    let collapsed = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed.to_ascii_lowercase()
}

fn demographic_tables() -> &'static HashMap<DemographicField, FieldTable> {
    DEMOGRAPHIC_TABLES.get_or_init(|| {
        const PREFER_NOT: &[(&str, &str)] = &[
            ("prefer_not_to_say", "prefer_not_to_say"),
            ("Prefer not to say", "prefer_not_to_say"),
            ("Prefer not to answer", "prefer_not_to_say"),
        ];

        const GENDER: &[(&str, &str)] = &[
            ("male", "male"),
            ("Man", "male"),
            ("female", "female"),
            ("Woman", "female"),
            ("non-binary", "non-binary"),
            ("Non binary", "non-binary"),
            ("Nonbinary", "non-binary"),
        ];

        const SCHOOL: &[(&str, &str)] = &[
            ("cas", "cas"),
            ("College of Arts and Science", "cas"),
            ("tisch", "tisch"),
            ("stern", "stern"),
            ("tandon", "tandon"),
            ("gallatin", "gallatin"),
            ("sps", "sps"),
            ("steinhardt", "steinhardt"),
            ("wagner", "wagner"),
            ("silver", "silver"),
            ("law", "law"),
            ("courant", "courant"),
        ];

        const YEAR: &[(&str, &str)] = &[
            ("freshman", "freshman"),
            ("sophomore", "sophomore"),
            ("junior", "junior"),
            ("senior", "senior"),
            ("graduate", "graduate"),
            ("Grad Student", "graduate"),
            ("Graduate Student", "graduate"),
            ("alumni", "alumni"),
        ];

        const LIVING: &[(&str, &str)] = &[
            ("dorm", "dorm"),
            ("On-campus dorm", "dorm"),
            ("offcampus", "offcampus"),
            ("Off-campus apartment", "offcampus"),
            ("With roommates", "offcampus"),
            ("commuter", "commuter"),
            ("family", "family"),
            ("With family", "family"),
            ("other", "other"),
        ];

        const RACE: &[(&str, &str)] = &[
            ("asian", "asian"),
            ("white", "white"),
            ("black", "black"),
            ("Black or African American", "black"),
            ("hispanic", "hispanic"),
            ("Hispanic or Latino", "hispanic"),
            ("native", "native"),
            ("Native American", "native"),
            ("pacific_islander", "pacific_islander"),
            ("Pacific Islander", "pacific_islander"),
            ("middle_eastern", "middle_eastern"),
            ("Middle Eastern", "middle_eastern"),
            ("multiracial", "multiracial"),
        ];

        const RELATIONSHIP: &[(&str, &str)] = &[
            ("single", "single"),
            ("relationship", "relationship"),
            ("In a relationship", "relationship"),
            ("married", "married"),
            ("complicated", "complicated"),
            ("It's complicated", "complicated"),
            ("casual", "casual"),
            ("engaged", "engaged"),
            ("situationship", "situationship"),
            ("talking", "talking"),
            ("Talking stage", "talking"),
        ];

        let sources: [(DemographicField, &[(&str, &str)]); 6] = [
            (DemographicField::Gender, GENDER),
            (DemographicField::School, SCHOOL),
            (DemographicField::Year, YEAR),
            (DemographicField::Living, LIVING),
            (DemographicField::Race, RACE),
            (DemographicField::Relationship, RELATIONSHIP),
        ];

        let mut tables = HashMap::with_capacity(sources.len());
        for (field, entries) in sources {
            let mut table = HashMap::with_capacity(entries.len() + PREFER_NOT.len());
            for (spelling, token) in entries.iter().chain(PREFER_NOT) {
                table.insert(lookup_key(spelling), *token);
            }
            tables.insert(field, table);
        }
        tables
    })
}
