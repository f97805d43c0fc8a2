//! Fixed step layouts for the CV and cover-letter wizards.

use serde::Serialize;

use crate::models::cv::CvFormData;
use crate::models::letter::LmFormData;
use crate::models::profile::UserProfile;
use crate::models::version::FormPayload;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Text,
    Email,
    Tel,
    Textarea,
    /// JSON array: plain strings or item objects.
    List,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldSpec {
    pub key: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub required: bool,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepSpec {
    pub title: &'static str,
    pub fields: &'static [FieldSpec],
}

const fn field(key: &'static str, label: &'static str, kind: FieldKind) -> FieldSpec {
    FieldSpec {
        key,
        label,
        kind,
        required: false,
    }
}

const fn required(key: &'static str, label: &'static str, kind: FieldKind) -> FieldSpec {
    FieldSpec {
        key,
        label,
        kind,
        required: true,
    }
}

const CV_STEPS: &[StepSpec] = &[
    StepSpec {
        title: "Informations Personnelles",
        fields: &[
            required("fullName", "Nom Complet *", FieldKind::Text),
            required("email", "Email *", FieldKind::Email),
            field("phone", "Téléphone", FieldKind::Tel),
            field("address", "Adresse", FieldKind::Text),
        ],
    },
    StepSpec {
        title: "Poste Visé",
        fields: &[required("jobTitle", "Titre du Poste *", FieldKind::Text)],
    },
    StepSpec {
        title: "Qualifications",
        fields: &[
            field("education", "Formation", FieldKind::List),
            field("experience", "Expérience Professionnelle", FieldKind::List),
            field("skills", "Compétences", FieldKind::List),
            field("languages", "Langues", FieldKind::List),
            field("interests", "Centres d'Intérêt", FieldKind::List),
        ],
    },
    StepSpec {
        title: "Profil",
        fields: &[field("profileSummary", "Résumé du Profil", FieldKind::Textarea)],
    },
];

const LM_STEPS: &[StepSpec] = &[
    StepSpec {
        title: "Informations Personnelles",
        fields: &[
            required("fullName", "Nom Complet *", FieldKind::Text),
            required("email", "Email *", FieldKind::Email),
            field("phone", "Téléphone", FieldKind::Tel),
            field("address", "Adresse", FieldKind::Text),
        ],
    },
    StepSpec {
        title: "Offre d'Emploi",
        fields: &[
            required("positionTitle", "Titre du Poste *", FieldKind::Text),
            required("companyName", "Nom de l'Entreprise *", FieldKind::Text),
            field("hiringManager", "Nom du Responsable RH", FieldKind::Text),
            field("industry", "Secteur d'Activité", FieldKind::Text),
        ],
    },
    StepSpec {
        title: "Qualifications",
        fields: &[
            field("keySkills", "Compétences Clés", FieldKind::Textarea),
            field("achievements", "Réalisations Principales", FieldKind::Textarea),
        ],
    },
    StepSpec {
        title: "Lettre de Motivation",
        fields: &[field("coverLetter", "Lettre de Motivation", FieldKind::Textarea)],
    },
];

/// Per-wizard switches chosen when the wizard is opened.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WizardOptions {
    /// Compose the cover letter from the other fields when it is left blank.
    pub generate_cover_letter: bool,
}

/// A form payload that can be collected step by step.
pub trait WizardForm: FormPayload {
    fn steps() -> &'static [StepSpec];

    /// Fills blank fields from the cached profile; never overwrites typed values.
    fn prefill_from_profile(&mut self, profile: &UserProfile);

    /// Last-moment payload adjustments before validation.
    fn prepare_submission(&mut self, _options: &WizardOptions) {}

    fn field_spec(key: &str) -> Option<&'static FieldSpec> {
        Self::steps()
            .iter()
            .flat_map(|s| s.fields.iter())
            .find(|f| f.key == key)
    }
}

fn fill_blank(target: &mut String, value: &str) {
    if target.trim().is_empty() && !value.trim().is_empty() {
        *target = value.trim().to_string();
    }
}

impl WizardForm for CvFormData {
    fn steps() -> &'static [StepSpec] {
        CV_STEPS
    }

    fn prefill_from_profile(&mut self, profile: &UserProfile) {
        fill_blank(&mut self.full_name, &profile.name);
        fill_blank(&mut self.email, &profile.email);
        fill_blank(&mut self.phone, &profile.phone);
        fill_blank(&mut self.address, &profile.location());
        fill_blank(&mut self.job_title, &profile.job_title);
    }
}

impl WizardForm for LmFormData {
    fn steps() -> &'static [StepSpec] {
        LM_STEPS
    }

    fn prefill_from_profile(&mut self, profile: &UserProfile) {
        fill_blank(&mut self.full_name, &profile.name);
        fill_blank(&mut self.email, &profile.email);
        fill_blank(&mut self.phone, &profile.phone);
        fill_blank(&mut self.address, &profile.location());
        fill_blank(&mut self.position_title, &profile.job_title);
    }

    fn prepare_submission(&mut self, options: &WizardOptions) {
        if options.generate_cover_letter && self.cover_letter.trim().is_empty() {
            self.cover_letter = self.compose_cover_letter();
        }
    }
}
