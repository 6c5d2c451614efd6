//! Reshapes builder data into the payload the backend's resume-create endpoint accepts.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::resume::models::{non_blank, Preferences, ResumeData, WorkMode};

const DEFAULT_CURRENCY: &str = "USD";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BackendResume {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub full_name: String,
    pub headline: Option<String>,
    pub phone: Option<String>,
    pub summary: Option<String>,
    pub location: Option<BackendLocation>,
    pub urls: BTreeMap<&'static str, String>,
    pub work_experience: Vec<BackendWorkExperience>,
    pub education: Vec<BackendEducation>,
    pub technical_skills: Vec<String>,
    pub soft_skills: Vec<String>,
    pub languages: Vec<BackendLanguage>,
    pub certifications: Vec<BackendCertification>,
    pub projects: Vec<BackendProject>,
    pub preferences: BackendPreferences,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BackendLocation {
    pub city: Option<String>,
    pub country: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BackendWorkExperience {
    pub title: String,
    pub company: String,
    pub location: Option<String>,
    pub description: Option<String>,
    pub dates: BackendWorkDates,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BackendWorkDates {
    pub start_date: String,
    pub end_date: Option<String>,
    pub is_current: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BackendEducation {
    pub institution: String,
    pub degree: String,
    pub field_of_study: String,
    pub graduation_year: i32,
    pub gpa: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BackendLanguage {
    pub name: String,
    pub level: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BackendCertification {
    pub name: String,
    pub issuer: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BackendProject {
    pub name: String,
    pub description: Option<String>,
    pub technologies: Vec<String>,
    pub url: Option<String>,
    pub dates: BackendProjectDates,
}

/// Only the dates the user actually entered are sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BackendProjectDates {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BackendPreferences {
    pub desired_titles: Vec<String>,
    pub target_industries: Vec<String>,
    pub work_mode: Option<WorkMode>,
    pub min_salary: Option<i64>,
    pub max_salary: Option<i64>,
    pub currency: String,
    pub relocation: bool,
}

/// Converts builder data to the backend shape.
///
/// `today` fills a missing job start date and supplies the fallback graduation year.
pub fn to_backend_payload(data: &ResumeData, today: NaiveDate) -> BackendResume {
    let info = &data.personal_info;

    let city = non_blank(&info.location.city);
    let country = non_blank(&info.location.country);
    let location = (city.is_some() || country.is_some()).then_some(BackendLocation { city, country });

    let urls = [
        ("linkedin", &info.urls.linkedin),
        ("github", &info.urls.github),
        ("portfolio", &info.urls.portfolio),
        ("twitter", &info.urls.twitter),
    ]
    .into_iter()
    .filter_map(|(key, value)| non_blank(value).map(|v| (key, v)))
    .collect();

    BackendResume {
        user_id: None,
        full_name: info.full_name.trim().to_string(),
        headline: non_blank(&info.headline),
        phone: non_blank(&info.phone),
        summary: non_blank(&info.summary),
        location,
        urls,
        work_experience: data
            .work_experience
            .iter()
            .map(|job| BackendWorkExperience {
                title: job.title.clone(),
                company: job.company.clone(),
                location: non_blank(&job.location),
                description: non_blank(&job.description),
                dates: BackendWorkDates {
                    start_date: non_blank(&job.dates.start_date)
                        .unwrap_or_else(|| today.format("%Y-%m-%d").to_string()),
                    end_date: non_blank(&job.dates.end_date),
                    is_current: job.dates.is_current,
                },
            })
            .collect(),
        education: data
            .education
            .iter()
            .map(|edu| BackendEducation {
                institution: edu.institution.clone(),
                degree: edu.degree.clone(),
                field_of_study: edu.field_of_study.clone(),
                graduation_year: edu
                    .graduation_year
                    .filter(|year| *year != 0)
                    .unwrap_or_else(|| today.year()),
                gpa: edu.gpa,
            })
            .collect(),
        technical_skills: data.technical_skills.clone(),
        soft_skills: data.soft_skills.clone(),
        languages: data
            .languages
            .iter()
            .map(|lang| BackendLanguage {
                name: lang.name.clone(),
                level: lang.level.clone(),
            })
            .collect(),
        certifications: data
            .certifications
            .iter()
            .map(|cert| BackendCertification {
                name: cert.name.clone(),
                issuer: cert.issuer.clone(),
                date: non_blank(&cert.date),
            })
            .collect(),
        projects: data
            .projects
            .iter()
            .map(|proj| BackendProject {
                name: proj.name.clone(),
                description: non_blank(&proj.description),
                technologies: proj.technologies.clone(),
                url: non_blank(&proj.url),
                dates: proj
                    .dates
                    .as_ref()
                    .map(|dates| BackendProjectDates {
                        start_date: non_blank(&dates.start_date),
                        end_date: non_blank(&dates.end_date),
                    })
                    .unwrap_or_default(),
            })
            .collect(),
        preferences: transform_preferences(&data.preferences),
    }
}

fn transform_preferences(prefs: &Preferences) -> BackendPreferences {
    let currency = prefs.currency.trim();
    BackendPreferences {
        desired_titles: prefs.desired_titles.clone(),
        target_industries: prefs.target_industries.clone(),
        work_mode: prefs.work_mode,
        min_salary: prefs.min_salary.filter(|s| *s != 0),
        max_salary: prefs.max_salary.filter(|s| *s != 0),
        currency: if currency.is_empty() {
            DEFAULT_CURRENCY.to_string()
        } else {
            currency.to_string()
        },
        relocation: prefs.relocation,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resume::models::{Certification, DateRange, Education, Project, WorkExperience};
    use serde_json::json;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()
    }

    #[test]
    fn test_blank_optionals_become_null() {
        let mut data = ResumeData::default();
        data.personal_info.full_name = "Ada Lovelace".to_string();
        data.personal_info.headline = Some("".to_string());
        data.personal_info.urls.github = Some("https://github.com/ada".to_string());
        data.personal_info.urls.linkedin = Some(" ".to_string());

        let payload = serde_json::to_value(to_backend_payload(&data, today())).unwrap();
        assert_eq!(payload["headline"], json!(null));
        assert_eq!(payload["location"], json!(null));
        assert_eq!(payload["urls"], json!({"github": "https://github.com/ada"}));
        assert!(payload.get("user_id").is_none());
    }

    #[test]
    fn test_work_experience_start_defaults_to_today() {
        let mut data = ResumeData::default();
        data.work_experience.push(WorkExperience {
            title: "Engineer".to_string(),
            company: "Acme".to_string(),
            dates: DateRange {
                start_date: None,
                end_date: Some("".to_string()),
                is_current: true,
            },
            ..Default::default()
        });

        let payload = to_backend_payload(&data, today());
        let dates = &payload.work_experience[0].dates;
        assert_eq!(dates.start_date, "2026-10-18");
        assert_eq!(dates.end_date, None);
        assert!(dates.is_current);
    }

    #[test]
    fn test_graduation_year_falls_back_to_current_year() {
        let mut data = ResumeData::default();
        data.education.push(Education {
            institution: "MIT".to_string(),
            degree: "BSc".to_string(),
            graduation_year: Some(0),
            gpa: Some(3.7),
            ..Default::default()
        });

        let payload = to_backend_payload(&data, today());
        assert_eq!(payload.education[0].graduation_year, 2026);
        assert_eq!(payload.education[0].gpa, Some(3.7));
    }

    #[test]
    fn test_certification_and_project_dates_omitted_when_empty() {
        let mut data = ResumeData::default();
        data.certifications.push(Certification {
            name: "CKA".to_string(),
            issuer: "CNCF".to_string(),
            date: Some("".to_string()),
            ..Default::default()
        });
        data.projects.push(Project {
            name: "Engine".to_string(),
            dates: Some(DateRange {
                start_date: Some("2023-01".to_string()),
                end_date: None,
                is_current: false,
            }),
            ..Default::default()
        });

        let payload = serde_json::to_value(to_backend_payload(&data, today())).unwrap();
        assert_eq!(payload["certifications"][0], json!({"name": "CKA", "issuer": "CNCF"}));
        assert_eq!(payload["projects"][0]["dates"], json!({"start_date": "2023-01"}));
    }

    #[test]
    fn test_preferences_defaults() {
        let mut data = ResumeData::default();
        data.preferences.currency = "".to_string();
        data.preferences.max_salary = Some(90_000);

        let prefs = to_backend_payload(&data, today()).preferences;
        assert_eq!(prefs.currency, "USD");
        assert_eq!(prefs.min_salary, None);
        assert_eq!(prefs.max_salary, Some(90_000));
        assert_eq!(prefs.work_mode, Some(WorkMode::Hybrid));
    }
}
