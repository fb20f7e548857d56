use std::fmt;

use serde::Serialize;

/// Letter grades on the 10-point scale, best first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Grade {
    #[serde(rename = "O")]
    O,
    #[serde(rename = "A+")]
    APlus,
    #[serde(rename = "A")]
    A,
    #[serde(rename = "B+")]
    BPlus,
    #[serde(rename = "B")]
    B,
    #[serde(rename = "C+")]
    CPlus,
    #[serde(rename = "C")]
    C,
}

impl Grade {
    pub const ALL: [Grade; 7] = [
        Grade::O,
        Grade::APlus,
        Grade::A,
        Grade::BPlus,
        Grade::B,
        Grade::CPlus,
        Grade::C,
    ];

    /// Case-insensitive lookup; surrounding whitespace is ignored.
    pub fn parse(raw: &str) -> Option<Grade> {
        let letter = raw.trim().to_uppercase();
        Grade::ALL.into_iter().find(|grade| grade.letter() == letter)
    }

    pub fn letter(self) -> &'static str {
        match self {
            Grade::O => "O",
            Grade::APlus => "A+",
            Grade::A => "A",
            Grade::BPlus => "B+",
            Grade::B => "B",
            Grade::CPlus => "C+",
            Grade::C => "C",
        }
    }

    pub fn points(self) -> f64 {
        match self {
            Grade::O => 10.0,
            Grade::APlus => 9.0,
            Grade::A => 8.0,
            Grade::BPlus => 7.0,
            Grade::B => 6.0,
            Grade::CPlus => 5.0,
            Grade::C => 4.0,
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.letter())
    }
}
