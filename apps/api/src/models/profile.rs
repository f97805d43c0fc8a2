use serde::{Deserialize, Serialize};

/// Locally cached profile fields, used to prefill forms.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserProfile {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub job_title: String,
    pub location_city: String,
    pub location_country: String,
    pub referral_code: String,
    pub points: u32,
}

impl UserProfile {
    /// "City, Country", skipping whichever part is blank.
    pub fn location(&self) -> String {
        [self.location_city.trim(), self.location_country.trim()]
            .into_iter()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn apply(&mut self, patch: ProfilePatch) {
        let ProfilePatch {
            name,
            email,
            phone,
            job_title,
            location_city,
            location_country,
            referral_code,
            points,
        } = patch;
        if let Some(v) = name {
            self.name = v;
        }
        if let Some(v) = email {
            self.email = v;
        }
        if let Some(v) = phone {
            self.phone = v;
        }
        if let Some(v) = job_title {
            self.job_title = v;
        }
        if let Some(v) = location_city {
            self.location_city = v;
        }
        if let Some(v) = location_country {
            self.location_country = v;
        }
        if let Some(v) = referral_code {
            self.referral_code = v;
        }
        if let Some(v) = points {
            self.points = v;
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfilePatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub job_title: Option<String>,
    pub location_city: Option<String>,
    pub location_country: Option<String>,
    pub referral_code: Option<String>,
    pub points: Option<u32>,
}
