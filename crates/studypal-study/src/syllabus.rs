//! Syllabus catalogue: chapters and subtopics for subjects with MCQ papers.
//!
//! Paper variants that share MCQ content (Physics P1/P2, Chemistry P1/P2,
//! Islamiyat P1/P2, Pakistan Studies P1/P2) share one chapter list.

use studypal_core::IgcseSubject;

/// A syllabus chapter and its subtopics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chapter {
    pub name: &'static str,
    pub subtopics: &'static [&'static str],
}

const fn chapter(name: &'static str, subtopics: &'static [&'static str]) -> Chapter {
    Chapter { name, subtopics }
}

static PHYSICS: &[Chapter] = &[
    chapter(
        "1. General Physics",
        &[
            "Length and time",
            "Motion",
            "Mass and weight",
            "Density",
            "Forces",
            "Energy, work and power",
            "Pressure",
        ],
    ),
    chapter(
        "2. Thermal Physics",
        &[
            "Simple kinetic molecular model of matter",
            "Thermal properties and temperature",
            "Thermal processes (Conduction, Convection and Radiation)",
        ],
    ),
    chapter(
        "3. Properties of waves, including light and sound",
        &["General wave properties", "Light", "Sound"],
    ),
    chapter(
        "4. Electricity and Magnetism",
        &[
            "Simple phenomena of magnetism",
            "Electrical quantities",
            "Electric circuits",
            "Dangers of electricity",
            "Electromagnetic effects",
        ],
    ),
    chapter("5. Atomic Physics", &["The nuclear atom", "Radioactivity"]),
];

static CHEMISTRY: &[Chapter] = &[
    chapter(
        "1. The particulate nature of matter",
        &["Kinetic particle theory", "Atomic structure", "Structure and bonding"],
    ),
    chapter(
        "2. Experimental techniques",
        &["Measurement", "Purity", "Separating mixtures"],
    ),
    chapter(
        "3. Atoms, elements and compounds",
        &[
            "Physical and chemical changes",
            "Elements, compounds and mixtures",
            "Periodic Table",
            "Metals",
            "Air and water",
        ],
    ),
    chapter(
        "4. Stoichiometry",
        &["The mole concept", "Chemical formulae and equations"],
    ),
    chapter("5. Electricity and chemistry", &["Electrolysis"]),
    chapter(
        "6. Chemical energetics",
        &["Energetics of a reaction", "Energy transfer"],
    ),
    chapter(
        "7. Chemical reactions",
        &["Rate of reaction", "Reversible reactions", "Redox"],
    ),
    chapter(
        "8. Acids, bases and salts",
        &[
            "The characteristic properties of acids and bases",
            "Types of oxides",
            "Preparation of salts",
            "Identification of ions and gases",
        ],
    ),
    chapter(
        "9. The Periodic Table",
        &["Arrangement of elements", "Group properties", "Transition elements"],
    ),
    chapter(
        "10. Metals",
        &[
            "Properties of metals",
            "Reactivity series",
            "Extraction of metals",
            "Uses of metals",
        ],
    ),
    chapter(
        "11. Organic chemistry",
        &[
            "Names of compounds",
            "Fuels",
            "Alkanes",
            "Alkenes",
            "Alcohols",
            "Carboxylic acids",
            "Polymers",
        ],
    ),
];

static COMPUTER_SCIENCE: &[Chapter] = &[
    chapter(
        "1. Data representation",
        &["Binary systems", "Hexadecimal", "Data storage"],
    ),
    chapter(
        "2. Communication and Internet technologies",
        &[
            "Data transmission",
            "Security aspects",
            "Internet principles of operation",
        ],
    ),
    chapter(
        "3. Hardware and software",
        &[
            "Logic gates",
            "Computer architecture",
            "Input and output devices",
            "Memory, storage devices and media",
            "Operating systems",
            "High- and low-level languages and their translators",
        ],
    ),
    chapter("4. Security", &["Security, privacy and data integrity"]),
    chapter("5. Ethics", &["Ethics and ownership"]),
    chapter("6. Databases", &["Database management systems"]),
];

static ISLAMIYAT: &[Chapter] = &[
    chapter(
        "Major themes of the Qur’an",
        &[
            "God in Himself",
            "God’s relationship with the created world",
            "God’s Messengers",
        ],
    ),
    chapter(
        "The history and importance of the Qur’an",
        &[
            "Revelation of the Qur’an",
            "Compilation of the Qur’an",
            "Structure and content",
            "Major themes",
            "Use in everyday life",
        ],
    ),
    chapter(
        "The life and importance of the Prophet Muhammad (pbuh)",
        &[
            "Background",
            "Life in Makka",
            "Life in Madina",
            "The Wives of the Prophet",
            "The Descendants of the Prophet",
        ],
    ),
    chapter(
        "The first Islamic community",
        &[
            "The Four Rightly Guided Caliphs",
            "The ‘Ten Blessed Companions’",
        ],
    ),
];

static PAK_STUDIES: &[Chapter] = &[
    chapter(
        "Cultural and historical background to the Pakistan Movement",
        &[
            "The decline of the Mughal Empire",
            "The advent of the British and the situation of the Muslims",
            "Sir Syed Ahmad Khan and the Aligarh Movement",
            "The emergence of the Pakistan Movement",
        ],
    ),
    chapter(
        "The emergence of Pakistan 1906–47",
        &[
            "The main events of the Pakistan Movement",
            "The roles of the key individuals",
        ],
    ),
    chapter(
        "Nationhood 1947–88",
        &[
            "The problems of Partition and the early years",
            "The various governments",
            "The role of the key individuals",
        ],
    ),
];

/// Chapters for a subject, or `None` when it has no MCQ paper catalogue.
pub fn chapters_for(subject: IgcseSubject) -> Option<&'static [Chapter]> {
    match subject {
        IgcseSubject::PhysicsP1 | IgcseSubject::PhysicsP2 => Some(PHYSICS),
        IgcseSubject::ChemistryP1 | IgcseSubject::ChemistryP2 => Some(CHEMISTRY),
        IgcseSubject::ComputerScienceP1 => Some(COMPUTER_SCIENCE),
        IgcseSubject::IslamiyatP1 | IgcseSubject::IslamiyatP2 => Some(ISLAMIYAT),
        IgcseSubject::PakStudiesP1 | IgcseSubject::PakStudiesP2 => Some(PAK_STUDIES),
        IgcseSubject::PhysicsP4
        | IgcseSubject::ChemistryP4
        | IgcseSubject::ComputerScienceP2 => None,
    }
}

/// Find a chapter by exact name (case-insensitive).
pub fn find_chapter(subject: IgcseSubject, name: &str) -> Option<&'static Chapter> {
    chapters_for(subject)?
        .iter()
        .find(|c| c.name.eq_ignore_ascii_case(name.trim()))
}

/// Topic string for a practice request: selected subtopics when any are
/// given, otherwise the selected chapters, joined with ", ".
pub fn combine_topics<S: AsRef<str>>(chapters: &[S], subtopics: &[S]) -> String {
    let chosen = if subtopics.is_empty() { chapters } else { subtopics };
    chosen
        .iter()
        .map(|s| s.as_ref().trim())
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}
