use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::resume::models::{non_blank, Education, PersonalInfo, ResumeData, WorkExperience};

const MIN_GRADUATION_YEAR: i32 = 1950;
const MAX_GPA: f64 = 4.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldError {
    /// Dotted path into the builder payload, e.g. `workExperience.0.title`.
    pub field: String,
    pub message: String,
}

impl FieldError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Validates a builder payload, collecting every failure.
///
/// Graduation years may run up to `current_year + 10`.
pub fn validate_resume(data: &ResumeData, current_year: i32) -> Vec<FieldError> {
    let mut errors = validate_personal_info(&data.personal_info);

    for (i, job) in data.work_experience.iter().enumerate() {
        errors.extend(validate_work_experience(&format!("workExperience.{i}"), job));
    }
    for (i, edu) in data.education.iter().enumerate() {
        errors.extend(validate_education(&format!("education.{i}"), edu, current_year));
    }

    errors
}

fn validate_personal_info(info: &PersonalInfo) -> Vec<FieldError> {
    let mut errors = Vec::new();

    if info.full_name.trim().chars().count() < 2 {
        errors.push(FieldError::new(
            "personalInfo.fullName",
            "Full Name must be at least 2 characters",
        ));
    }

    let email = info.email.trim();
    if email.is_empty() {
        errors.push(FieldError::new("personalInfo.email", "Email is required"));
    } else if !looks_like_email(email) {
        errors.push(FieldError::new("personalInfo.email", "Invalid email address"));
    }

    errors
}

fn validate_work_experience(prefix: &str, job: &WorkExperience) -> Vec<FieldError> {
    let mut errors = Vec::new();

    if job.title.trim().is_empty() {
        errors.push(FieldError::new(format!("{prefix}.title"), "Job title is required"));
    }
    if job.company.trim().is_empty() {
        errors.push(FieldError::new(
            format!("{prefix}.company"),
            "Company name is required",
        ));
    }

    let start = non_blank(&job.dates.start_date);
    let end = non_blank(&job.dates.end_date);
    let end_field = format!("{prefix}.dates.endDate");

    let Some(start) = start else {
        errors.push(FieldError::new(
            format!("{prefix}.dates.startDate"),
            "Start date is required",
        ));
        return errors;
    };

    if job.dates.is_current {
        return errors;
    }

    match end {
        None => errors.push(FieldError::new(end_field, "End date is required")),
        Some(end) => match (parse_date(&start), parse_date(&end)) {
            (Some(start), Some(end)) if end < start => errors.push(FieldError::new(
                end_field,
                "End date cannot be before start date",
            )),
            (Some(_), Some(_)) => {}
            _ => errors.push(FieldError::new(end_field, "Invalid date")),
        },
    }

    errors
}

fn validate_education(prefix: &str, edu: &Education, current_year: i32) -> Vec<FieldError> {
    let mut errors = Vec::new();

    if edu.institution.trim().is_empty() {
        errors.push(FieldError::new(
            format!("{prefix}.institution"),
            "Institution name is required",
        ));
    }
    if edu.degree.trim().is_empty() {
        errors.push(FieldError::new(format!("{prefix}.degree"), "Degree is required"));
    }

    if let Some(year) = edu.graduation_year {
        if year < MIN_GRADUATION_YEAR {
            errors.push(FieldError::new(
                format!("{prefix}.graduationYear"),
                "Year seems too old",
            ));
        } else if year > current_year + 10 {
            errors.push(FieldError::new(
                format!("{prefix}.graduationYear"),
                "Year is too far in the future",
            ));
        }
    }

    if let Some(gpa) = edu.gpa {
        if !(0.0..=MAX_GPA).contains(&gpa) {
            errors.push(FieldError::new(
                format!("{prefix}.gpa"),
                "GPA must be between 0 and 4.0",
            ));
        }
    }

    errors
}

/// Accepts `YYYY-MM-DD` and `YYYY-MM` (first of the month).
pub(crate) fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(&format!("{value}-01"), "%Y-%m-%d"))
        .ok()
}

fn looks_like_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
}
