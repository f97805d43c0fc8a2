use serde::{Deserialize, Serialize};

use crate::models::version::{DocumentKind, FormPayload};

/// Cover-letter ("lettre de motivation") form payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LmFormData {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub position_title: String,
    pub company_name: String,
    pub hiring_manager: String,
    pub industry: String,
    pub key_skills: String,
    pub achievements: String,
    pub cover_letter: String,
}

impl FormPayload for LmFormData {
    const KIND: DocumentKind = DocumentKind::Lm;

    fn full_name(&self) -> &str {
        &self.full_name
    }

    fn headline(&self) -> &str {
        &self.position_title
    }
}

impl LmFormData {
    /// Builds a plain cover letter from the offer and qualification fields.
    /// Optional sections are left out when their source field is blank.
    pub fn compose_cover_letter(&self) -> String {
        let manager = self.hiring_manager.trim();
        let greeting_target = if manager.is_empty() {
            self.company_name.trim().to_string()
        } else {
            format!("{manager} / {}", self.company_name.trim())
        };

        let mut letter = format!("Bonjour {greeting_target},\n\n");
        letter.push_str(&format!(
            "Je me permets de vous adresser ma candidature pour le poste de {} au sein de {}. ",
            self.position_title.trim(),
            self.company_name.trim()
        ));
        if !self.key_skills.trim().is_empty() {
            letter.push_str(&format!(
                "Mes compétences principales incluent : {}. ",
                self.key_skills.trim()
            ));
        }
        if !self.achievements.trim().is_empty() {
            letter.push_str(&format!(
                "Parmi mes réalisations : {}. ",
                self.achievements.trim()
            ));
        }
        letter.push_str(
            "\n\nJe reste à votre disposition pour un entretien et vous remercie par avance \
             pour votre considération.\n\nCordialement,\n",
        );
        letter.push_str(self.full_name.trim());
        letter
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> LmFormData {
        LmFormData {
            full_name: "Awa Koné".to_string(),
            email: "awa@example.com".to_string(),
            position_title: "Développeuse Web".to_string(),
            company_name: "Orange CI".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_cover_letter_mentions_position_company_and_signature() {
        let letter = sample().compose_cover_letter();
        assert!(letter.starts_with("Bonjour Orange CI,"));
        assert!(letter.contains("poste de Développeuse Web au sein de Orange CI"));
        assert!(letter.trim_end().ends_with("Awa Koné"));
    }

    #[test]
    fn test_cover_letter_skips_blank_optional_sections() {
        let letter = sample().compose_cover_letter();
        assert!(!letter.contains("compétences"));
        assert!(!letter.contains("réalisations"));
    }

    #[test]
    fn test_cover_letter_includes_manager_skills_and_achievements() {
        let mut data = sample();
        data.hiring_manager = "M. Traoré".to_string();
        data.key_skills = "React, Node".to_string();
        data.achievements = "Refonte du portail client".to_string();
        let letter = data.compose_cover_letter();
        assert!(letter.starts_with("Bonjour M. Traoré / Orange CI,"));
        assert!(letter.contains("React, Node"));
        assert!(letter.contains("Refonte du portail client"));
    }

    #[test]
    fn test_missing_fields_deserialize_as_empty() {
        let data: LmFormData = serde_json::from_str(r#"{"fullName":"A"}"#).unwrap();
        assert_eq!(data.full_name, "A");
        assert!(data.cover_letter.is_empty());
    }
}
