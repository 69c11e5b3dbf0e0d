use isolang::Language;

use crate::errors::AppError;

/// Language utilities for ISO language code handling
///
/// Translation services expect ISO 639-1 (2-letter) target codes, optionally
/// followed by a region subtag (`zh-TW`, `pt-BR`). Users may also configure
/// ISO 639-2 (3-letter) codes, which are normalized here.
/// Language code type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LanguageCodeType {
    /// ISO 639-1 (2-letter) code
    Part1,
    /// ISO 639-2/T (3-letter) code
    Part2T,
    /// ISO 639-2/B (3-letter) code
    Part2B,
}

/// A validated target language as sent to the translation provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetLanguage {
    code: String,
    name: String,
}

impl TargetLanguage {
    /// Parse and normalize a configured language code
    pub fn parse(code: &str) -> Result<Self, AppError> {
        let trimmed = code.trim();
        let (primary, region) = match trimmed.split_once(['-', '_']) {
            Some((primary, region)) => (primary, Some(region)),
            None => (trimmed, None),
        };

        let primary = normalize_to_part1_or_part2t(primary)?;
        let name = get_language_name(&primary)?;

        let code = match region {
            Some(region) if region.len() == 2 && region.chars().all(|c| c.is_ascii_alphabetic()) => {
                format!("{}-{}", primary, region.to_uppercase())
            }
            Some(region) => {
                return Err(AppError::LanguageConfig(format!(
                    "Invalid region subtag '{}' in language code: {}",
                    region, code
                )));
            }
            None => primary,
        };

        Ok(Self { code, name })
    }

    /// Code in the form the provider expects
    pub fn code(&self) -> &str {
        &self.code
    }

    /// English name of the language
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl std::fmt::Display for TargetLanguage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name, self.code)
    }
}

// ISO 639-2/B codes that differ from their 639-2/T form
fn part2b_to_part2t(code: &str) -> Option<&'static str> {
    match code {
        "fre" => Some("fra"),
        "ger" => Some("deu"),
        "dut" => Some("nld"),
        "gre" => Some("ell"),
        "chi" => Some("zho"),
        "cze" => Some("ces"),
        "ice" => Some("isl"),
        "alb" => Some("sqi"),
        "arm" => Some("hye"),
        "baq" => Some("eus"),
        "bur" => Some("mya"),
        "per" => Some("fas"),
        "geo" => Some("kat"),
        "may" => Some("msa"),
        "mac" => Some("mkd"),
        "rum" => Some("ron"),
        "slo" => Some("slk"),
        "wel" => Some("cym"),
        _ => None,
    }
}

/// Validate if a language code is a valid ISO 639-1 or ISO 639-2 code
pub fn validate_language_code(code: &str) -> Result<LanguageCodeType, AppError> {
    let normalized_code = code.trim().to_lowercase();

    match normalized_code.len() {
        2 if Language::from_639_1(&normalized_code).is_some() => Ok(LanguageCodeType::Part1),
        3 if Language::from_639_3(&normalized_code).is_some() => Ok(LanguageCodeType::Part2T),
        3 if part2b_to_part2t(&normalized_code).is_some() => Ok(LanguageCodeType::Part2B),
        _ => Err(AppError::LanguageConfig(format!("Invalid language code: {}", code))),
    }
}

/// Normalize a language code to ISO 639-1 (2-letter) format if possible
/// Falls back to ISO 639-2/T if no ISO 639-1 code exists
pub fn normalize_to_part1_or_part2t(code: &str) -> Result<String, AppError> {
    let normalized_code = code.trim().to_lowercase();

    match validate_language_code(&normalized_code)? {
        LanguageCodeType::Part1 => Ok(normalized_code),
        code_type => {
            let part2t = if code_type == LanguageCodeType::Part2B {
                part2b_to_part2t(&normalized_code).unwrap_or_default()
            } else {
                normalized_code.as_str()
            };

            let lang = Language::from_639_3(part2t).ok_or_else(|| {
                AppError::LanguageConfig(format!("Cannot normalize invalid language code: {}", code))
            })?;

            Ok(lang
                .to_639_1()
                .map(|c| c.to_string())
                .unwrap_or_else(|| part2t.to_string()))
        }
    }
}

/// Get the language name from a code
pub fn get_language_name(code: &str) -> Result<String, AppError> {
    let normalized = code.trim().to_lowercase();
    let lang = match normalized.len() {
        2 => Language::from_639_1(&normalized),
        3 => Language::from_639_3(part2b_to_part2t(&normalized).unwrap_or(normalized.as_str())),
        _ => None,
    }
    .ok_or_else(|| AppError::LanguageConfig(format!("Failed to get language from code: {}", code)))?;

    Ok(lang.to_name().to_string())
}
