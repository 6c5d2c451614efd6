//! Resume-builder state container.
//!
//! The multi-step form's state is a plain value: `BuilderState::apply` takes the
//! current state and an action and returns the next state. Persistence happens
//! only at the boundary through `to_storage` / `from_storage`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::resume::models::{
    Certification, DateRange, Education, Language, Location, PersonalInfo, Preferences, Project,
    ResumeData, SocialUrls, WorkExperience, WorkMode,
};

/// Key the browser stores the serialized builder state under.
pub const STORAGE_KEY: &str = "zume-resume-storage";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuilderState {
    pub current_step: u32,
    pub resume_data: ResumeData,
    pub errors: BTreeMap<String, String>,
}

impl Default for BuilderState {
    fn default() -> Self {
        Self {
            current_step: 1,
            resume_data: ResumeData::default(),
            errors: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LocationPatch {
    pub city: Option<String>,
    pub country: Option<String>,
    pub remote: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UrlsPatch {
    pub linkedin: Option<String>,
    pub github: Option<String>,
    pub portfolio: Option<String>,
    pub twitter: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersonalInfoPatch {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub headline: Option<String>,
    pub phone: Option<String>,
    pub summary: Option<String>,
    pub location: Option<LocationPatch>,
    pub urls: Option<UrlsPatch>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExperiencePatch {
    pub title: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub dates: Option<DateRange>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PreferencesPatch {
    pub desired_titles: Option<Vec<String>>,
    pub target_industries: Option<Vec<String>>,
    pub work_mode: Option<WorkMode>,
    pub min_salary: Option<i64>,
    pub max_salary: Option<i64>,
    pub currency: Option<String>,
    pub relocation: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum BuilderAction {
    SetErrors(BTreeMap<String, String>),
    ClearError(String),
    NextStep,
    PrevStep,
    SetStep(u32),
    SetPersonalInfo(PersonalInfoPatch),
    AddExperience(WorkExperience),
    RemoveExperience(String),
    UpdateExperience { id: String, patch: ExperiencePatch },
    AddEducation(Education),
    RemoveEducation(String),
    AddTechnicalSkill(String),
    RemoveTechnicalSkill(String),
    AddSoftSkill(String),
    RemoveSoftSkill(String),
    AddProject(Project),
    RemoveProject(String),
    AddLanguage(Language),
    RemoveLanguage(String),
    AddCertification(Certification),
    RemoveCertification(String),
    SetPreferences(PreferencesPatch),
    Reset,
}

impl BuilderState {
    pub fn apply(mut self, action: BuilderAction) -> Self {
        let data = &mut self.resume_data;
        match action {
            BuilderAction::SetErrors(errors) => self.errors = errors,
            BuilderAction::ClearError(key) => {
                self.errors.remove(&key);
            }
            BuilderAction::NextStep => self.current_step += 1,
            BuilderAction::PrevStep => self.current_step = self.current_step.saturating_sub(1).max(1),
            BuilderAction::SetStep(step) => self.current_step = step,
            BuilderAction::SetPersonalInfo(patch) => merge_personal_info(&mut data.personal_info, patch),
            BuilderAction::AddExperience(item) => data.work_experience.push(item),
            BuilderAction::RemoveExperience(id) => data.work_experience.retain(|i| i.id != id),
            BuilderAction::UpdateExperience { id, patch } => {
                if let Some(item) = data.work_experience.iter_mut().find(|i| i.id == id) {
                    merge_experience(item, patch);
                }
            }
            BuilderAction::AddEducation(item) => data.education.push(item),
            BuilderAction::RemoveEducation(id) => data.education.retain(|i| i.id != id),
            BuilderAction::AddTechnicalSkill(skill) => data.technical_skills.push(skill),
            BuilderAction::RemoveTechnicalSkill(skill) => data.technical_skills.retain(|s| *s != skill),
            BuilderAction::AddSoftSkill(skill) => data.soft_skills.push(skill),
            BuilderAction::RemoveSoftSkill(skill) => data.soft_skills.retain(|s| *s != skill),
            BuilderAction::AddProject(item) => data.projects.push(item),
            BuilderAction::RemoveProject(id) => data.projects.retain(|i| i.id != id),
            BuilderAction::AddLanguage(item) => data.languages.push(item),
            BuilderAction::RemoveLanguage(id) => data.languages.retain(|i| i.id != id),
            BuilderAction::AddCertification(item) => data.certifications.push(item),
            BuilderAction::RemoveCertification(id) => data.certifications.retain(|i| i.id != id),
            BuilderAction::SetPreferences(patch) => merge_preferences(&mut data.preferences, patch),
            BuilderAction::Reset => return BuilderState::default(),
        }
        self
    }

    pub fn to_storage(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_storage(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }
}

fn merge_personal_info(info: &mut PersonalInfo, patch: PersonalInfoPatch) {
    if let Some(v) = patch.full_name {
        info.full_name = v;
    }
    if let Some(v) = patch.email {
        info.email = v;
    }
    if patch.headline.is_some() {
        info.headline = patch.headline;
    }
    if patch.phone.is_some() {
        info.phone = patch.phone;
    }
    if patch.summary.is_some() {
        info.summary = patch.summary;
    }
    if let Some(location) = patch.location {
        merge_location(&mut info.location, location);
    }
    if let Some(urls) = patch.urls {
        merge_urls(&mut info.urls, urls);
    }
}

fn merge_location(location: &mut Location, patch: LocationPatch) {
    if patch.city.is_some() {
        location.city = patch.city;
    }
    if patch.country.is_some() {
        location.country = patch.country;
    }
    if let Some(remote) = patch.remote {
        location.remote = remote;
    }
}

fn merge_urls(urls: &mut SocialUrls, patch: UrlsPatch) {
    if patch.linkedin.is_some() {
        urls.linkedin = patch.linkedin;
    }
    if patch.github.is_some() {
        urls.github = patch.github;
    }
    if patch.portfolio.is_some() {
        urls.portfolio = patch.portfolio;
    }
    if patch.twitter.is_some() {
        urls.twitter = patch.twitter;
    }
}

fn merge_experience(item: &mut WorkExperience, patch: ExperiencePatch) {
    if let Some(v) = patch.title {
        item.title = v;
    }
    if let Some(v) = patch.company {
        item.company = v;
    }
    if patch.location.is_some() {
        item.location = patch.location;
    }
    if let Some(dates) = patch.dates {
        item.dates = dates;
    }
    if patch.description.is_some() {
        item.description = patch.description;
    }
}

fn merge_preferences(prefs: &mut Preferences, patch: PreferencesPatch) {
    if let Some(v) = patch.desired_titles {
        prefs.desired_titles = v;
    }
    if let Some(v) = patch.target_industries {
        prefs.target_industries = v;
    }
    if patch.work_mode.is_some() {
        prefs.work_mode = patch.work_mode;
    }
    if patch.min_salary.is_some() {
        prefs.min_salary = patch.min_salary;
    }
    if patch.max_salary.is_some() {
        prefs.max_salary = patch.max_salary;
    }
    if let Some(v) = patch.currency {
        prefs.currency = v;
    }
    if let Some(v) = patch.relocation {
        prefs.relocation = v;
    }
}
