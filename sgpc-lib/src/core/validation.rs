use std::collections::HashSet;
use std::fmt::Display;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::proposal::{CodeKind, ProjectProposal};
use crate::error::CreatorError;

static STANDARD_NAME: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z0-9_]+$").unwrap());
static STRICT_NAME: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-z_]+$").unwrap());
static STANDARD_MNEMONIC: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z0-9]+$").unwrap());
static STRICT_MNEMONIC: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z]+$").unwrap());
static STANDARD_PRODUCTION: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[Pp][0-9]+$").unwrap());
static STRICT_PRODUCTION: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[Pp0-9]+$").unwrap());

const PRODUCTION_CODE_LENGTH: usize = 6;
const STRICT_MNEMONIC_LENGTH: usize = 3;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Name,
    Code,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectionReason {
    Empty(Field),
    InvalidCharacters(Field),
    InvalidLength { expected: usize, actual: usize },
    DuplicateName,
    DuplicateCode,
}

impl RejectionReason {
    pub fn message(&self) -> String {
        match self {
            RejectionReason::Empty(Field::Name) => "You must fill in a project name.".to_string(),
            RejectionReason::Empty(Field::Code) => "You must fill in a project code.".to_string(),
            RejectionReason::InvalidCharacters(Field::Name) => {
                "Project name contains characters that are not allowed.".to_string()
            }
            RejectionReason::InvalidCharacters(Field::Code) => {
                "Project code contains characters that are not allowed.".to_string()
            }
            RejectionReason::InvalidLength { expected, actual } => format!(
                "Project code uses {} characters than allowed.",
                if actual > expected { "more" } else { "less" }
            ),
            RejectionReason::DuplicateName => "Project name already taken.".to_string(),
            RejectionReason::DuplicateCode => "Project code already taken.".to_string(),
        }
    }
}

impl Display for RejectionReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationResult {
    Accepted,
    Rejected(RejectionReason),
}

impl ValidationResult {
    pub fn is_accepted(&self) -> bool {
        matches!(self, ValidationResult::Accepted)
    }
}

/// Naming convention a project name and code must follow.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NamingRules {
    /// Letters, digits and underscores in names; free length letter/digit codes.
    #[default]
    Standard,
    /// Lowercase names and three-letter codes, the school convention.
    Strict,
}

impl NamingRules {
    fn name_pattern(&self) -> &'static Regex {
        match self {
            NamingRules::Standard => &*STANDARD_NAME,
            NamingRules::Strict => &*STRICT_NAME,
        }
    }

    fn code_pattern(&self, kind: CodeKind) -> &'static Regex {
        match (self, kind) {
            (NamingRules::Standard, CodeKind::Mnemonic) => &*STANDARD_MNEMONIC,
            (NamingRules::Strict, CodeKind::Mnemonic) => &*STRICT_MNEMONIC,
            (NamingRules::Standard, CodeKind::Production) => &*STANDARD_PRODUCTION,
            (NamingRules::Strict, CodeKind::Production) => &*STRICT_PRODUCTION,
        }
    }

    fn code_length(&self, kind: CodeKind) -> Option<usize> {
        match (self, kind) {
            (_, CodeKind::Production) => Some(PRODUCTION_CODE_LENGTH),
            (NamingRules::Strict, CodeKind::Mnemonic) => Some(STRICT_MNEMONIC_LENGTH),
            (NamingRules::Standard, CodeKind::Mnemonic) => None,
        }
    }

    /// User facing explanation of a rejection under these rules.
    pub fn explain(&self, reason: &RejectionReason, kind: CodeKind) -> String {
        match (reason, self, kind) {
            (RejectionReason::InvalidCharacters(Field::Name), NamingRules::Standard, _) => {
                "Project name may only use letters, digits and underscores.".to_string()
            }
            (RejectionReason::InvalidCharacters(Field::Name), NamingRules::Strict, _) => {
                "Project name may only use lowercase a-z and underscores.".to_string()
            }
            (RejectionReason::InvalidCharacters(Field::Code), _, CodeKind::Production) => {
                "Production code should start with a p and contain 5 numbers.".to_string()
            }
            (RejectionReason::InvalidCharacters(Field::Code), NamingRules::Strict, _) => {
                "Three-letter code should only use letters a-z.".to_string()
            }
            (RejectionReason::InvalidCharacters(Field::Code), NamingRules::Standard, _) => {
                "Project code should only use letters and digits.".to_string()
            }
            _ => reason.message(),
        }
    }

    /// Converts a rejection into the error the creator reports.
    pub fn to_error(&self, reason: RejectionReason, kind: CodeKind) -> CreatorError {
        match reason {
            RejectionReason::DuplicateName | RejectionReason::DuplicateCode => reason.into(),
            _ => CreatorError::InvalidInput(self.explain(&reason, kind)),
        }
    }
}

impl FromStr for NamingRules {
    type Err = CreatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "standard" => Ok(NamingRules::Standard),
            "strict" => Ok(NamingRules::Strict),
            other => Err(CreatorError::Settings(format!(
                "Unknown naming rules '{}', expected 'standard' or 'strict'",
                other
            ))),
        }
    }
}

/// Snapshot of the names and codes already used on the remote side.
#[derive(Debug, Clone, Default)]
pub struct ExistingProjectIndex {
    names: HashSet<String>,
    codes: HashSet<String>,
}

impl ExistingProjectIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<I, N, C>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (N, Option<C>)>,
        N: AsRef<str>,
        C: AsRef<str>,
    {
        let mut index = Self::new();
        for (name, code) in pairs {
            index.insert(name.as_ref(), code.as_ref().map(|c| AsRef::<str>::as_ref(c)));
        }
        index
    }

    pub fn insert(&mut self, name: &str, code: Option<&str>) {
        self.names.insert(name.to_lowercase());
        if let Some(code) = code.filter(|c| !c.is_empty()) {
            self.codes.insert(code.to_lowercase());
        }
    }

    pub fn contains_name(&self, name: &str) -> bool {
        self.names.contains(&name.to_lowercase())
    }

    pub fn contains_code(&self, code: &str) -> bool {
        self.codes.contains(&code.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Result of checking a single field while it is being filled in.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct FieldCheck {
    pub ok: bool,
    pub message: String,
}

impl FieldCheck {
    fn passed(message: &str) -> Self {
        FieldCheck {
            ok: true,
            message: message.to_string(),
        }
    }

    fn failed(message: String) -> Self {
        FieldCheck { ok: false, message }
    }
}

fn name_problem(
    rules: NamingRules,
    name: &str,
    index: &ExistingProjectIndex,
) -> Option<RejectionReason> {
    if !rules.name_pattern().is_match(name) {
        return Some(RejectionReason::InvalidCharacters(Field::Name));
    }
    if index.contains_name(name) {
        return Some(RejectionReason::DuplicateName);
    }
    None
}

fn code_problem(
    rules: NamingRules,
    code: &str,
    kind: CodeKind,
    index: &ExistingProjectIndex,
) -> Option<RejectionReason> {
    if !rules.code_pattern(kind).is_match(code) {
        return Some(RejectionReason::InvalidCharacters(Field::Code));
    }
    if let Some(expected) = rules.code_length(kind) {
        let actual = code.chars().count();
        if actual != expected {
            return Some(RejectionReason::InvalidLength { expected, actual });
        }
    }
    if index.contains_code(code) {
        return Some(RejectionReason::DuplicateCode);
    }
    None
}

/// Validates a proposal with the default naming rules.
pub fn validate(proposal: &ProjectProposal, index: &ExistingProjectIndex) -> ValidationResult {
    validate_with(NamingRules::default(), proposal, index)
}

/// Validates a proposal, returning the first rule it breaks.
pub fn validate_with(
    rules: NamingRules,
    proposal: &ProjectProposal,
    index: &ExistingProjectIndex,
) -> ValidationResult {
    if proposal.name.trim().is_empty() {
        return ValidationResult::Rejected(RejectionReason::Empty(Field::Name));
    }
    if proposal.code.trim().is_empty() {
        return ValidationResult::Rejected(RejectionReason::Empty(Field::Code));
    }

    name_problem(rules, &proposal.name, index)
        .or_else(|| code_problem(rules, &proposal.code, proposal.code_kind, index))
        .map(ValidationResult::Rejected)
        .unwrap_or(ValidationResult::Accepted)
}

pub fn check_name(rules: NamingRules, name: &str, index: &ExistingProjectIndex) -> FieldCheck {
    let name = name.trim();
    if name.is_empty() {
        return FieldCheck::failed(RejectionReason::Empty(Field::Name).message());
    }
    match name_problem(rules, name, index) {
        Some(reason) => FieldCheck::failed(rules.explain(&reason, CodeKind::Mnemonic)),
        None => FieldCheck::passed("Project name available!"),
    }
}

pub fn check_code(
    rules: NamingRules,
    code: &str,
    kind: CodeKind,
    index: &ExistingProjectIndex,
) -> FieldCheck {
    let code = code.trim();
    if code.is_empty() {
        return FieldCheck::failed(RejectionReason::Empty(Field::Code).message());
    }
    match code_problem(rules, code, kind, index) {
        Some(reason) => FieldCheck::failed(rules.explain(&reason, kind)),
        None => FieldCheck::passed("Project code available!"),
    }
}
