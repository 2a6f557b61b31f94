//! Language selection and title/description templates.

use epg_protocol::{LanguageText, UNKNOWN_PARENTAL_RATING};

use super::config::ConfigSnapshot;

/// Language tag that matches every preference.
const ALL_LANGUAGES: &str = "all";

const PLACEHOLDERS: [&str; 8] = [
    "%TITLE%",
    "%DESCRIPTION%",
    "%GENRE%",
    "%STARRATING%",
    "%STARRATING_STR%",
    "%CLASSIFICATION%",
    "%PARENTALRATING%",
    "%NEWLINE%",
];

/// Fields of the chosen language text, defaulted when a program has no text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedText {
    pub title: String,
    pub description: String,
    pub genre: String,
    pub star_rating: i32,
    pub classification: String,
    pub parental_rating: i32,
}

impl Default for ResolvedText {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            genre: String::new(),
            star_rating: 0,
            classification: String::new(),
            parental_rating: UNKNOWN_PARENTAL_RATING,
        }
    }
}

impl From<&LanguageText> for ResolvedText {
    fn from(text: &LanguageText) -> Self {
        Self {
            title: text.title.clone(),
            description: text.description.clone(),
            genre: text.genre.clone(),
            star_rating: text.star_rating,
            classification: text.classification.clone(),
            parental_rating: text.parental_rating,
        }
    }
}

/// Rendered title and description, with the text they were rendered from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedProgram {
    pub title: String,
    pub description: String,
    pub text: ResolvedText,
}

/// Pick the text to store from the texts of one program.
///
/// A text tagged "all" wins wherever it appears. Otherwise the first text
/// whose tag occurs in `preferred` is taken (any text when `preferred` is
/// empty), falling back to the first text.
pub fn select_language<'a>(texts: &'a [LanguageText], preferred: &str) -> Option<&'a LanguageText> {
    if let Some(all) = texts
        .iter()
        .find(|t| t.language.eq_ignore_ascii_case(ALL_LANGUAGES))
    {
        return Some(all);
    }

    let preferred = preferred.to_lowercase();
    texts
        .iter()
        .find(|t| preferred.is_empty() || preferred.contains(&t.language.to_lowercase()))
        .or_else(|| texts.first())
}

/// Symbolic star rating, empty for unrated or out of range values.
pub fn star_rating_str(rating: i32) -> &'static str {
    match rating {
        1 => "*",
        2 => "*+",
        3 => "**",
        4 => "**+",
        5 => "***",
        6 => "***+",
        7 => "****",
        _ => "",
    }
}

/// Replace every placeholder in `template` in a single pass. Substituted
/// values are copied verbatim and never expanded again.
pub fn eval_template(template: &str, text: &ResolvedText) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(pos) = rest.find('%') {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];
        match PLACEHOLDERS.iter().find(|p| tail.starts_with(*p)) {
            Some(placeholder) => {
                push_value(&mut out, placeholder, text);
                rest = &tail[placeholder.len()..];
            }
            None => {
                out.push('%');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn push_value(out: &mut String, placeholder: &str, text: &ResolvedText) {
    match placeholder {
        "%TITLE%" => out.push_str(&text.title),
        "%DESCRIPTION%" => out.push_str(&text.description),
        "%GENRE%" => out.push_str(&text.genre),
        "%STARRATING%" => out.push_str(&text.star_rating.to_string()),
        "%STARRATING_STR%" => out.push_str(star_rating_str(text.star_rating)),
        "%CLASSIFICATION%" => out.push_str(&text.classification),
        "%PARENTALRATING%" => out.push_str(&text.parental_rating.to_string()),
        "%NEWLINE%" => out.push('\n'),
        _ => out.push_str(placeholder),
    }
}

/// Renders programs with the configured templates and language preference.
#[derive(Debug, Clone)]
pub struct TemplateRenderer<'a> {
    title_template: &'a str,
    description_template: &'a str,
    languages: &'a str,
}

impl<'a> TemplateRenderer<'a> {
    pub fn new(config: &'a ConfigSnapshot) -> Self {
        Self {
            title_template: &config.title_template,
            description_template: &config.description_template,
            languages: &config.epg_languages,
        }
    }

    pub fn resolve(&self, texts: &[LanguageText]) -> ResolvedText {
        select_language(texts, self.languages)
            .map(ResolvedText::from)
            .unwrap_or_default()
    }

    pub fn render(&self, texts: &[LanguageText]) -> RenderedProgram {
        let text = self.resolve(texts);
        RenderedProgram {
            title: eval_template(self.title_template, &text),
            description: eval_template(self.description_template, &text),
            text,
        }
    }
}
