/// A Norwegian institution documents can be filed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct University {
    pub name: &'static str,
    pub abbreviation: &'static str,
}

const fn uni(name: &'static str, abbreviation: &'static str) -> University {
    University { name, abbreviation }
}

pub const UNIVERSITIES: &[University] = &[
    // Videregående skole
    uni("Videregående Skole", "VGS"),
    // Universiteter
    uni("Universitetet i Agder", "UiA"),
    uni("Universitetet i Bergen", "UiB"),
    uni("Universitetet i Innlandet", "INN"),
    uni("Norges miljø- og biovitenskapelige universitet", "NMBU"),
    uni("Nord universitet", "Nord"),
    uni("Norges teknisk-naturvitenskapelige universitet", "NTNU"),
    uni("Universitetet i Oslo", "UiO"),
    uni("OsloMet – storbyuniversitetet", "OsloMet"),
    uni("Universitetet i Stavanger", "UiS"),
    uni("Universitetet i Sørøst-Norge", "USN"),
    uni("UiT Norges arktiske universitet", "UiT"),
    // Vitenskapelige høgskoler
    uni("Arkitektur- og designhøgskolen i Oslo", "AHO"),
    uni("Handelshøyskolen BI", "BI"),
    uni("Høgskolen i Molde", "HiMolde"),
    uni("Kunsthøgskolen i Oslo", "KHiO"),
    uni("MF vitenskapelig høyskole", "MF"),
    uni("Norges handelshøyskole", "NHH"),
    uni("Norges idrettshøgskole", "NIH"),
    uni("Norges musikkhøgskole", "NMH"),
    uni("VID vitenskapelige høgskole", "VID"),
];

/// Abbreviation for a known institution name, or the name itself.
pub fn abbreviation_for(name: &str) -> &str {
    UNIVERSITIES
        .iter()
        .find(|u| u.name == name)
        .map(|u| u.abbreviation)
        .unwrap_or(name)
}

/// Card label: `"<ABBR>-<COURSE>"` for known institutions, otherwise the
/// upper-cased course code alone.
pub fn display_code(university: &str, course_code: &str) -> String {
    let course = course_code.to_uppercase();
    let abbreviation = abbreviation_for(university);
    if abbreviation != university {
        format!("{abbreviation}-{course}")
    } else {
        course
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_names_map_to_abbreviations() {
        assert_eq!(abbreviation_for("Universitetet i Bergen"), "UiB");
        assert_eq!(abbreviation_for("Ukjent skole"), "Ukjent skole");
    }

    #[test]
    fn display_code_prefixes_known_institutions() {
        assert_eq!(display_code("Universitetet i Oslo", "inf1000"), "UiO-INF1000");
        assert_eq!(display_code("Somewhere", "mat100"), "MAT100");
    }
}
