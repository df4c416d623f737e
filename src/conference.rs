//! School → athletic conference lookup for deal records.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use serde::Deserialize;

/// Label returned when no conference can be determined.
pub const FALLBACK_CONFERENCE: &str = "Other";

/// The conference-relevant fields of a deal/organization record.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DealConference {
    #[serde(default)]
    pub organization: Option<String>,
    #[serde(default)]
    pub conference: Option<String>,
}

const CONFERENCES: &[(&str, &[&str])] = &[
    (
        "SEC",
        &[
            "Alabama", "University of Alabama", "Arkansas", "University of Arkansas", "Auburn",
            "Auburn University", "Florida", "University of Florida", "UF", "Georgia",
            "University of Georgia", "UGA", "Kentucky", "University of Kentucky", "LSU",
            "Louisiana State University", "Ole Miss", "University of Mississippi",
            "Mississippi State", "Mississippi State University", "Missouri",
            "University of Missouri", "Mizzou", "Oklahoma", "University of Oklahoma", "OU",
            "South Carolina", "University of South Carolina", "Tennessee",
            "University of Tennessee", "Texas", "University of Texas", "UT Austin",
            "Texas A&M", "Texas A&M University", "Vanderbilt", "Vanderbilt University",
        ],
    ),
    (
        "Big Ten",
        &[
            "Illinois", "University of Illinois", "Indiana", "Indiana University", "Iowa",
            "University of Iowa", "Maryland", "University of Maryland", "Michigan",
            "University of Michigan", "Michigan State", "Michigan State University",
            "Minnesota", "University of Minnesota", "Nebraska", "University of Nebraska",
            "Northwestern", "Northwestern University", "Ohio State", "Ohio State University",
            "Oregon", "University of Oregon", "Penn State", "Penn State University",
            "Purdue", "Purdue University", "Rutgers", "Rutgers University", "UCLA", "USC",
            "University of Southern California", "Washington", "University of Washington",
            "Wisconsin", "University of Wisconsin",
        ],
    ),
    (
        "ACC",
        &[
            "Boston College", "Cal", "UC Berkeley", "Clemson", "Clemson University", "Duke",
            "Duke University", "Florida State", "Florida State University", "FSU",
            "Georgia Tech", "Louisville", "University of Louisville", "Miami",
            "University of Miami", "NC State", "North Carolina", "UNC",
            "University of North Carolina", "Notre Dame", "Pittsburgh", "Pitt", "SMU",
            "Stanford", "Stanford University", "Syracuse", "Syracuse University", "Virginia",
            "University of Virginia", "UVA", "Virginia Tech", "Wake Forest",
        ],
    ),
    (
        "Big 12",
        &[
            "Arizona", "University of Arizona", "Arizona State", "Arizona State University",
            "Baylor", "Baylor University", "BYU", "UCF", "Cincinnati",
            "University of Cincinnati", "Colorado", "University of Colorado", "Houston",
            "University of Houston", "Iowa State", "Iowa State University", "Kansas",
            "University of Kansas", "Kansas State", "Kansas State University",
            "Oklahoma State", "Oklahoma State University", "TCU", "Texas Tech",
            "Texas Tech University", "Utah", "University of Utah", "West Virginia",
            "West Virginia University",
        ],
    ),
    ("Pac-12", &["Oregon State", "Oregon State University", "Washington State", "Washington State University"]),
    (
        "Big East",
        &[
            "Butler", "Creighton", "DePaul", "Georgetown", "Marquette", "Providence",
            "Seton Hall", "St. John's", "UConn", "Villanova", "Xavier",
        ],
    ),
    (
        "Mountain West",
        &[
            "Air Force", "Boise State", "Colorado State", "Fresno State", "Nevada", "UNLV",
            "New Mexico", "San Diego State", "San Jose State", "Utah State", "Wyoming",
        ],
    ),
    (
        "American",
        &[
            "Charlotte", "East Carolina", "FAU", "Memphis", "Navy", "North Texas", "Rice",
            "South Florida", "USF", "Temple", "Tulane", "Tulsa", "UAB", "UTSA",
        ],
    ),
    (
        "Ivy League",
        &[
            "Brown", "Columbia", "Cornell", "Dartmouth", "Harvard", "Penn",
            "University of Pennsylvania", "Princeton", "Yale",
        ],
    ),
];

/// Lower-cased school name → conference label.
static SCHOOL_CONFERENCES: Lazy<HashMap<String, &'static str>> = Lazy::new(|| {
    CONFERENCES
        .iter()
        .flat_map(|(conference, schools)| {
            schools
                .iter()
                .map(move |school| (school.to_lowercase(), *conference))
        })
        .collect()
});

/// Look up the conference for a school name (trimmed, case-insensitive).
pub fn conference_for_organization(organization: &str) -> Option<&'static str> {
    SCHOOL_CONFERENCES
        .get(&organization.trim().to_lowercase())
        .copied()
}

/// Resolve the conference label for a deal.
///
/// An explicit non-blank `conference` wins, then the organization lookup,
/// then [`FALLBACK_CONFERENCE`].
pub fn conference_for_deal(deal: &DealConference) -> String {
    if let Some(explicit) = deal
        .conference
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
    {
        return explicit.to_string();
    }

    deal.organization
        .as_deref()
        .and_then(conference_for_organization)
        .unwrap_or(FALLBACK_CONFERENCE)
        .to_string()
}
