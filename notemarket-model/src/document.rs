use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Utc};

use crate::error::ModelError;
use crate::ids::{DocumentId, UserId};

/// Letter grade the seller received for the course the document covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Grade {
    A,
    B,
    C,
    D,
    E,
    F,
}

impl Grade {
    pub fn all() -> &'static [Grade] {
        use Grade::*;
        &[A, B, C, D, E, F]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
            Grade::E => "E",
            Grade::F => "F",
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Grade {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "A" => Ok(Grade::A),
            "B" => Ok(Grade::B),
            "C" => Ok(Grade::C),
            "D" => Ok(Grade::D),
            "E" => Ok(Grade::E),
            "F" => Ok(Grade::F),
            _ => Err(ModelError::InvalidGrade(s.to_string())),
        }
    }
}

/// Norwegian academic half-year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Season {
    Spring,
    Autumn,
}

impl Season {
    pub fn label(&self) -> &'static str {
        match self {
            Season::Spring => "Vår",
            Season::Autumn => "Høst",
        }
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Season {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "vår" | "var" | "spring" => Ok(Season::Spring),
            "høst" | "host" | "autumn" | "fall" => Ok(Season::Autumn),
            _ => Err(ModelError::InvalidSeason(s.to_string())),
        }
    }
}

/// Semester a document was written in, stored as `"<season> <year>"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(into = "String", try_from = "String")
)]
pub struct Semester {
    pub season: Season,
    pub year: u16,
}

impl Semester {
    pub fn new(season: Season, year: u16) -> Self {
        Self { season, year }
    }
}

impl fmt::Display for Semester {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.season, self.year)
    }
}

impl FromStr for Semester {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (season, year) = s
            .trim()
            .split_once(' ')
            .ok_or_else(|| ModelError::InvalidSemester(s.to_string()))?;
        let season = season.parse::<Season>()?;
        let year = year
            .trim()
            .parse::<u16>()
            .map_err(|_| ModelError::InvalidSemester(s.to_string()))?;
        Ok(Semester { season, year })
    }
}

impl From<Semester> for String {
    fn from(value: Semester) -> Self {
        value.to_string()
    }
}

impl TryFrom<String> for Semester {
    type Error = ModelError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Upper-cases and trims a course code the way it is stored.
pub fn normalize_course_code(raw: &str) -> String {
    raw.trim().to_uppercase()
}

/// A study document offered in the catalog.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Document {
    pub id: DocumentId,
    pub owner_id: UserId,
    pub title: String,
    pub course_code: Option<String>,
    pub university: Option<String>,
    /// Asking price in NOK.
    pub price: f64,
    pub description: Option<String>,
    /// Object-storage key of the uploaded PDF.
    pub file_path: String,
    pub file_size: u64,
    pub page_count: Option<u32>,
    pub preview_page_count: u32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub tags: BTreeSet<String>,
    pub grade: Option<Grade>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub grade_verified: bool,
    pub grade_proof_url: Option<String>,
    pub semester: Option<Semester>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub view_count: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Document {
    /// Materialize a freshly inserted row.
    pub fn from_new(id: DocumentId, new: NewDocument, now: DateTime<Utc>) -> Self {
        Self {
            id,
            owner_id: new.owner_id,
            title: new.title,
            course_code: Some(normalize_course_code(&new.course_code)),
            university: Some(new.university),
            price: new.price,
            description: new.description,
            file_path: new.file_path,
            file_size: new.file_size,
            page_count: new.page_count,
            preview_page_count: new.preview_page_count.max(1),
            tags: new.tags,
            grade: new.grade,
            grade_verified: false,
            grade_proof_url: new.grade_proof_url,
            semester: new.semester,
            view_count: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_owned_by(&self, user: &UserId) -> bool {
        self.owner_id == *user
    }

    /// Page count used for pagination; unknown counts are treated as one page.
    pub fn total_pages(&self) -> u32 {
        self.page_count.unwrap_or(1).max(1)
    }

    pub fn created_year(&self) -> i32 {
        self.created_at.year()
    }

    /// Size in megabytes rounded to two decimals, as shown next to uploads.
    pub fn size_mb(&self) -> f64 {
        (self.file_size as f64 / (1024.0 * 1024.0) * 100.0).round() / 100.0
    }
}

/// Fields required to insert a new document row.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NewDocument {
    pub owner_id: UserId,
    pub title: String,
    pub course_code: String,
    pub university: String,
    pub price: f64,
    pub description: Option<String>,
    pub file_path: String,
    pub file_size: u64,
    pub page_count: Option<u32>,
    pub preview_page_count: u32,
    pub tags: BTreeSet<String>,
    pub grade: Option<Grade>,
    pub grade_proof_url: Option<String>,
    pub semester: Option<Semester>,
}

/// Replacement file attached to an edit.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FileReplacement {
    pub file_path: String,
    pub file_size: u64,
    pub page_count: Option<u32>,
}

/// Owner edit of an existing document. Every editable field is overwritten.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DocumentPatch {
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
    pub file: Option<FileReplacement>,
}

impl DocumentPatch {
    /// Apply the patch in place. Changing the grade or its proof drops a
    /// previous verification.
    pub fn apply(&self, doc: &mut Document, now: DateTime<Utc>) {
        if doc.grade != self.grade || doc.grade_proof_url != self.grade_proof_url {
            doc.grade_verified = false;
        }
        doc.title = self.title.clone();
        doc.course_code = Some(normalize_course_code(&self.course_code));
        doc.university = Some(self.university.clone());
        doc.price = self.price;
        doc.description = self.description.clone();
        doc.grade = self.grade;
        doc.grade_proof_url = self.grade_proof_url.clone();
        doc.semester = self.semester;
        doc.tags = self.tags.clone();
        if let Some(file) = &self.file {
            doc.file_path = file.file_path.clone();
            doc.file_size = file.file_size;
            doc.page_count = file.page_count;
        }
        let ceiling = doc.page_count.unwrap_or(u32::MAX).max(1);
        doc.preview_page_count = self.preview_page_count.clamp(1, ceiling);
        doc.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample() -> Document {
        let now = Utc.with_ymd_and_hms(2024, 9, 1, 12, 0, 0).unwrap();
        Document::from_new(
            DocumentId::new(),
            NewDocument {
                owner_id: UserId::new(),
                title: "Sammendrag".into(),
                course_code: " inf1000 ".into(),
                university: "Universitetet i Oslo".into(),
                price: 149.0,
                description: None,
                file_path: "owner/file.pdf".into(),
                file_size: 2 * 1024 * 1024,
                page_count: Some(12),
                preview_page_count: 0,
                tags: BTreeSet::new(),
                grade: Some(Grade::A),
                grade_proof_url: Some("https://proof".into()),
                semester: Some(Semester::new(Season::Autumn, 2024)),
            },
            now,
        )
    }

    #[test]
    fn new_documents_are_normalized() {
        let doc = sample();
        assert_eq!(doc.course_code.as_deref(), Some("INF1000"));
        assert_eq!(doc.preview_page_count, 1);
        assert!(!doc.grade_verified);
        assert_eq!(doc.size_mb(), 2.0);
        assert_eq!(doc.created_year(), 2024);
    }

    #[test]
    fn grade_parsing_is_case_insensitive() {
        assert_eq!("b".parse::<Grade>().unwrap(), Grade::B);
        assert!("G".parse::<Grade>().is_err());
    }

    #[test]
    fn semester_round_trips_through_display() {
        let semester: Semester = "Høst 2024".parse().unwrap();
        assert_eq!(semester, Semester::new(Season::Autumn, 2024));
        assert_eq!(semester.to_string(), "Høst 2024");
        assert!("Sommer 2024".parse::<Semester>().is_err());
    }

    #[test]
    fn patch_clamps_preview_and_resets_verification() {
        let mut doc = sample();
        doc.grade_verified = true;
        let patch = DocumentPatch {
            title: "Ny tittel".into(),
            course_code: "inf1010".into(),
            university: "Universitetet i Oslo".into(),
            price: 99.0,
            description: Some("oppdatert".into()),
            grade: Some(Grade::B),
            grade_proof_url: Some("https://proof".into()),
            semester: None,
            preview_page_count: 40,
            tags: BTreeSet::new(),
            file: None,
        };
        let later = doc.created_at + chrono::Duration::days(1);
        patch.apply(&mut doc, later);

        assert_eq!(doc.course_code.as_deref(), Some("INF1010"));
        assert_eq!(doc.preview_page_count, 12);
        assert!(!doc.grade_verified);
        assert_eq!(doc.updated_at, later);
    }
}
