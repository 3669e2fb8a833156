use std::collections::BTreeSet;

use notemarket_model::{
    DocumentPatch, FileReplacement, Grade, NewDocument, Season, Semester, UserId,
    normalize_course_code,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::pdf;

pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 50 * 1024 * 1024;

/// User-facing validation failures. Messages are shown as-is.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Fyll ut alle obligatoriske felter ({0})")]
    MissingField(&'static str),

    #[error("Ugyldig pris: {0}")]
    InvalidPrice(String),

    #[error("Ugyldig karakter: {0}")]
    InvalidGrade(String),

    #[error("Vennligst legg ved bevis for karakter (URL til karakterbevis)")]
    MissingGradeProof,

    #[error("Ugyldig lenke til karakterbevis: {0}")]
    InvalidProofUrl(String),

    #[error("Ugyldig semester: {0}")]
    InvalidSemester(String),

    #[error("Kun PDF-filer er tillatt")]
    NotPdf,

    #[error("Filen er tom")]
    EmptyFile,

    #[error("Filen er for stor ({size} bytes, maks {max} bytes)")]
    FileTooLarge { size: u64, max: u64 },

    #[error("Kunne ikke lese PDF-metadata: {0}")]
    UnreadablePdf(String),
}

/// Price as typed by the seller; JSON clients may send either form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PriceInput {
    Number(f64),
    Text(String),
}

impl Default for PriceInput {
    fn default() -> Self {
        PriceInput::Text(String::new())
    }
}

impl PriceInput {
    fn parse(&self) -> Result<f64, ValidationError> {
        let value = match self {
            PriceInput::Number(n) => *n,
            PriceInput::Text(raw) => {
                let raw = raw.trim();
                if raw.is_empty() {
                    return Err(ValidationError::MissingField("price"));
                }
                raw.replace(',', ".")
                    .parse::<f64>()
                    .map_err(|_| ValidationError::InvalidPrice(raw.to_string()))?
            }
        };
        if !value.is_finite() || value < 0.0 {
            return Err(ValidationError::InvalidPrice(value.to_string()));
        }
        Ok(value)
    }
}

/// Raw sell/edit form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentForm {
    pub title: String,
    pub course_code: String,
    pub university: String,
    pub price: PriceInput,
    pub description: Option<String>,
    pub grade: Option<String>,
    pub grade_proof_url: Option<String>,
    pub season: Option<String>,
    pub year: Option<u16>,
    pub preview_page_count: Option<u32>,
    pub tags: Vec<String>,
}

/// Form fields after validation; file data is attached separately.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedForm {
    pub title: String,
    pub course_code: String,
    pub university: String,
    pub price: f64,
    pub description: Option<String>,
    pub grade: Option<Grade>,
    pub grade_proof_url: Option<String>,
    pub semester: Option<Semester>,
    pub preview_page_count: u32,
    pub tags: BTreeSet<String>,
}

impl DocumentForm {
    /// Validate a form. `stored_proof` is the proof URL already on the
    /// document when editing; it satisfies the proof requirement.
    pub fn validate(&self, stored_proof: Option<&str>) -> Result<ValidatedForm, ValidationError> {
        let title = required(&self.title, "title")?;
        let course_code = normalize_course_code(&required(&self.course_code, "course_code")?);
        let university = required(&self.university, "university")?;
        let price = self.price.parse()?;

        let grade = match non_blank(self.grade.as_deref()) {
            Some(raw) => Some(
                raw.parse::<Grade>()
                    .map_err(|_| ValidationError::InvalidGrade(raw.clone()))?,
            ),
            None => None,
        };

        let grade_proof_url = match grade {
            None => None,
            Some(_) => {
                let proof = non_blank(self.grade_proof_url.as_deref())
                    .or_else(|| non_blank(stored_proof))
                    .ok_or(ValidationError::MissingGradeProof)?;
                Some(check_proof_url(&proof)?)
            }
        };

        let semester = match (non_blank(self.season.as_deref()), self.year) {
            (Some(season), Some(year)) => {
                let season = season
                    .parse::<Season>()
                    .map_err(|_| ValidationError::InvalidSemester(season.clone()))?;
                Some(Semester::new(season, year))
            }
            _ => None,
        };

        let tags = self
            .tags
            .iter()
            .map(|t| t.trim())
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect();

        Ok(ValidatedForm {
            title,
            course_code,
            university,
            price,
            description: non_blank(self.description.as_deref()),
            grade,
            grade_proof_url,
            semester,
            preview_page_count: self.preview_page_count.unwrap_or(1).max(1),
            tags,
        })
    }
}

impl ValidatedForm {
    fn clamped_preview(&self, page_count: Option<u32>) -> u32 {
        let ceiling = page_count.unwrap_or(u32::MAX).max(1);
        self.preview_page_count.clamp(1, ceiling)
    }

    pub fn into_new_document(
        self,
        owner_id: UserId,
        file_path: String,
        file: &InspectedPdf,
    ) -> NewDocument {
        NewDocument {
            owner_id,
            preview_page_count: self.clamped_preview(Some(file.page_count)),
            title: self.title,
            course_code: self.course_code,
            university: self.university,
            price: self.price,
            description: self.description,
            file_path,
            file_size: file.size,
            page_count: Some(file.page_count),
            tags: self.tags,
            grade: self.grade,
            grade_proof_url: self.grade_proof_url,
            semester: self.semester,
        }
    }

    /// `current_pages` is the page count of the stored file, used when no
    /// replacement is attached.
    pub fn into_patch(
        self,
        replacement: Option<FileReplacement>,
        current_pages: Option<u32>,
    ) -> DocumentPatch {
        let pages = replacement
            .as_ref()
            .map_or(current_pages, |file| file.page_count);
        DocumentPatch {
            preview_page_count: self.clamped_preview(pages),
            title: self.title,
            course_code: self.course_code,
            university: self.university,
            price: self.price,
            description: self.description,
            grade: self.grade,
            grade_proof_url: self.grade_proof_url,
            semester: self.semester,
            tags: self.tags,
            file: replacement,
        }
    }
}

/// An uploaded file that passed the PDF checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InspectedPdf {
    pub bytes: Vec<u8>,
    pub size: u64,
    pub page_count: u32,
}

pub fn inspect_pdf(bytes: Vec<u8>, max_bytes: u64) -> Result<InspectedPdf, ValidationError> {
    let size = bytes.len() as u64;
    if size == 0 {
        return Err(ValidationError::EmptyFile);
    }
    if size > max_bytes {
        return Err(ValidationError::FileTooLarge {
            size,
            max: max_bytes,
        });
    }
    if !pdf::looks_like_pdf(&bytes) {
        return Err(ValidationError::NotPdf);
    }
    let page_count =
        pdf::page_count(&bytes).map_err(|e| ValidationError::UnreadablePdf(e.to_string()))?;
    Ok(InspectedPdf {
        bytes,
        size,
        page_count,
    })
}

fn required(value: &str, field: &'static str) -> Result<String, ValidationError> {
    non_blank(Some(value)).ok_or(ValidationError::MissingField(field))
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn check_proof_url(raw: &str) -> Result<String, ValidationError> {
    let url = Url::parse(raw).map_err(|_| ValidationError::InvalidProofUrl(raw.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(url.to_string()),
        _ => Err(ValidationError::InvalidProofUrl(raw.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::test_pdf::sample_pdf;

    fn form() -> DocumentForm {
        DocumentForm {
            title: " Sammendrag ".into(),
            course_code: "inf1000".into(),
            university: "Universitetet i Oslo".into(),
            price: PriceInput::Text("149,50".into()),
            ..Default::default()
        }
    }

    #[test]
    fn minimal_form_is_normalized() {
        let valid = form().validate(None).unwrap();
        assert_eq!(valid.title, "Sammendrag");
        assert_eq!(valid.course_code, "INF1000");
        assert_eq!(valid.price, 149.5);
        assert_eq!(valid.preview_page_count, 1);
        assert!(valid.semester.is_none());
    }

    #[test]
    fn blank_required_fields_are_rejected() {
        let mut f = form();
        f.university = "  ".into();
        assert_eq!(
            f.validate(None),
            Err(ValidationError::MissingField("university"))
        );

        let mut f = form();
        f.price = PriceInput::Number(-1.0);
        assert!(matches!(f.validate(None), Err(ValidationError::InvalidPrice(_))));

        let mut f = form();
        f.price = PriceInput::Text("gratis".into());
        assert!(matches!(f.validate(None), Err(ValidationError::InvalidPrice(_))));
    }

    #[test]
    fn grade_requires_proof_unless_already_stored() {
        let mut f = form();
        f.grade = Some("a".into());
        assert_eq!(f.validate(None), Err(ValidationError::MissingGradeProof));

        let valid = f.validate(Some("https://example.org/bevis.png")).unwrap();
        assert_eq!(valid.grade, Some(Grade::A));
        assert_eq!(
            valid.grade_proof_url.as_deref(),
            Some("https://example.org/bevis.png")
        );

        f.grade_proof_url = Some("ftp://example.org/bevis".into());
        assert!(matches!(
            f.validate(None),
            Err(ValidationError::InvalidProofUrl(_))
        ));
    }

    #[test]
    fn removing_grade_clears_proof() {
        let mut f = form();
        f.grade_proof_url = Some("https://example.org/bevis.png".into());
        let valid = f.validate(Some("https://old")).unwrap();
        assert_eq!(valid.grade, None);
        assert_eq!(valid.grade_proof_url, None);
    }

    #[test]
    fn semester_needs_both_parts() {
        let mut f = form();
        f.season = Some("Høst".into());
        assert!(f.validate(None).unwrap().semester.is_none());

        f.year = Some(2024);
        assert_eq!(
            f.validate(None).unwrap().semester,
            Some(Semester::new(Season::Autumn, 2024))
        );

        f.season = Some("Sommer".into());
        assert!(matches!(
            f.validate(None),
            Err(ValidationError::InvalidSemester(_))
        ));
    }

    #[test]
    fn tags_are_trimmed_and_deduplicated() {
        let mut f = form();
        f.tags = vec![" eksamen".into(), "".into(), "eksamen ".into(), "notater".into()];
        let tags: Vec<_> = f.validate(None).unwrap().tags.into_iter().collect();
        assert_eq!(tags, vec!["eksamen", "notater"]);
    }

    #[test]
    fn preview_is_clamped_to_page_count() {
        let mut f = form();
        f.preview_page_count = Some(50);
        let file = inspect_pdf(sample_pdf(4), DEFAULT_MAX_UPLOAD_BYTES).unwrap();
        let new = f
            .validate(None)
            .unwrap()
            .into_new_document(UserId::new(), "o/x.pdf".into(), &file);
        assert_eq!(new.page_count, Some(4));
        assert_eq!(new.preview_page_count, 4);

        f.preview_page_count = Some(0);
        let patch = f.validate(None).unwrap().into_patch(None, Some(4));
        assert_eq!(patch.preview_page_count, 1);
    }

    #[test]
    fn file_checks() {
        assert_eq!(
            inspect_pdf(Vec::new(), 10),
            Err(ValidationError::EmptyFile)
        );
        assert_eq!(
            inspect_pdf(b"hello world".to_vec(), 1024),
            Err(ValidationError::NotPdf)
        );
        assert!(matches!(
            inspect_pdf(sample_pdf(1), 8),
            Err(ValidationError::FileTooLarge { max: 8, .. })
        ));
    }
}
