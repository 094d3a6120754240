/// Validation of submitted post and comment data
///
/// Forms trim their text before validating, so whitespace-only input counts
/// as empty. Failures are collected into [`FormErrors`], a field → messages
/// map that the handlers send back alongside the submitted values.
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use validator::{Validate, ValidationErrors};

pub const REQUIRED_MESSAGE: &str = "This field is required.";
pub const INVALID_CHOICE_MESSAGE: &str =
    "Select a valid choice. That choice is not one of the available choices.";
pub const INVALID_FILENAME_MESSAGE: &str = "The uploaded file name has no usable characters.";

/// Field-level validation messages, ordered by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormErrors(BTreeMap<String, Vec<String>>);

impl FormErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(field: &str, message: &str) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: &str, message: &str) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.to_string());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    fn merge(&mut self, other: FormErrors) {
        for (field, messages) in other.0 {
            self.0.entry(field).or_default().extend(messages);
        }
    }
}

impl fmt::Display for FormErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self
            .0
            .iter()
            .map(|(field, messages)| format!("{}: {}", field, messages.join(" ")))
            .collect();
        f.write_str(&rendered.join("; "))
    }
}

impl From<ValidationErrors> for FormErrors {
    fn from(errors: ValidationErrors) -> Self {
        let mut form_errors = FormErrors::new();
        for (field, field_errors) in errors.field_errors() {
            for error in field_errors.iter() {
                let message = error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| error.code.to_string());
                form_errors.add(&field.to_string(), &message);
            }
        }
        form_errors
    }
}

/// Post submission: text plus an optional group choice.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct PostForm {
    #[validate(length(min = 1, message = "This field is required."))]
    pub text: String,
    pub group: Option<i64>,
}

impl PostForm {
    pub fn new(text: impl Into<String>, group: Option<i64>) -> Self {
        Self {
            text: text.into(),
            group,
        }
    }

    /// Build from raw form fields. A group value that is not an id yields
    /// a field error right away rather than being dropped.
    pub fn from_raw(text: Option<&str>, group: Option<&str>) -> Result<Self, FormErrors> {
        let text = text.unwrap_or_default().to_string();
        match parse_group_choice(group) {
            Ok(group) => Ok(Self::new(text, group)),
            Err(mut errors) => {
                if let Err(text_errors) = Self::new(text, None).clean() {
                    errors.merge(text_errors);
                }
                Err(errors)
            }
        }
    }

    /// Trim and validate, returning the cleaned form.
    pub fn clean(mut self) -> Result<Self, FormErrors> {
        self.text = self.text.trim().to_string();
        self.validate()?;
        Ok(self)
    }
}

/// Comment submission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct CommentForm {
    #[validate(length(min = 1, message = "This field is required."))]
    pub text: String,
}

impl CommentForm {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn clean(mut self) -> Result<Self, FormErrors> {
        self.text = self.text.trim().to_string();
        self.validate()?;
        Ok(self)
    }
}

/// Empty or missing means "no group"; anything else must be an id.
fn parse_group_choice(raw: Option<&str>) -> Result<Option<i64>, FormErrors> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value
            .parse::<i64>()
            .map(Some)
            .map_err(|_| FormErrors::single("group", INVALID_CHOICE_MESSAGE)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_text_is_rejected() {
        let errors = PostForm::new("", None).clean().unwrap_err();
        assert_eq!(errors.get("text"), Some(&[REQUIRED_MESSAGE.to_string()][..]));
    }

    #[test]
    fn whitespace_only_text_is_rejected() {
        assert!(PostForm::new("   \n\t", Some(1)).clean().is_err());
        assert!(CommentForm::new("  ").clean().is_err());
    }

    #[test]
    fn text_is_trimmed() {
        let form = PostForm::new("  Тест прошёл успешно \n", Some(3)).clean().unwrap();
        assert_eq!(form.text, "Тест прошёл успешно");
        assert_eq!(form.group, Some(3));
    }

    #[test]
    fn raw_group_parsing() {
        assert_eq!(PostForm::from_raw(Some("hi"), Some("")).unwrap().group, None);
        assert_eq!(PostForm::from_raw(Some("hi"), None).unwrap().group, None);
        assert_eq!(PostForm::from_raw(Some("hi"), Some("12")).unwrap().group, Some(12));

        let errors = PostForm::from_raw(Some(""), Some("abc")).unwrap_err();
        let fields: Vec<&str> = errors.fields().collect();
        assert_eq!(fields, vec!["group", "text"]);
    }

    #[test]
    fn form_errors_display() {
        let mut errors = FormErrors::new();
        errors.add("text", REQUIRED_MESSAGE);
        assert_eq!(errors.to_string(), "text: This field is required.");
        assert!(!errors.is_empty());
    }
}
