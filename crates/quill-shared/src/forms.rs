//! Submitted HTML forms and their validation.
//!
//! Each form deserializes from `application/x-www-form-urlencoded` and
//! validates into a trimmed, typed value or a set of per-field messages.
//! Passwords are never serialized back into a page.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

const REQUIRED: &str = "This field is required.";

/// Minimum accepted password length.
pub const MIN_PASSWORD_LEN: usize = 8;

/// Per-field validation messages, keyed by form field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FormErrors(BTreeMap<&'static str, Vec<String>>);

impl FormErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.entry(field).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Messages recorded for `field`.
    pub fn get(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or_default()
    }

    fn require(&mut self, field: &'static str, value: &str) {
        if value.trim().is_empty() {
            self.add(field, REQUIRED);
        }
    }

    fn into_result<T>(self, value: T) -> Result<T, FormErrors> {
        if self.is_empty() { Ok(value) } else { Err(self) }
    }
}

fn looks_like_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Registration form.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegisterForm {
    #[serde(default)]
    pub email: String,
    #[serde(default, skip_serializing)]
    pub password: String,
    #[serde(default)]
    pub name: String,
}

/// A validated registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub email: String,
    pub password: String,
    pub name: String,
}

impl RegisterForm {
    pub fn validate(&self) -> Result<Registration, FormErrors> {
        let mut errors = FormErrors::new();
        let email = normalize_email(&self.email);

        errors.require("email", &email);
        if !email.is_empty() && !looks_like_email(&email) {
            errors.add("email", "Invalid email address.");
        }
        errors.require("password", &self.password);
        if !self.password.is_empty() && self.password.chars().count() < MIN_PASSWORD_LEN {
            errors.add(
                "password",
                format!("Password must be at least {MIN_PASSWORD_LEN} characters."),
            );
        }
        errors.require("name", &self.name);

        errors.into_result(Registration {
            email,
            password: self.password.clone(),
            name: self.name.trim().to_string(),
        })
    }
}

/// Login form.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default, skip_serializing)]
    pub password: String,
}

/// Validated login credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl LoginForm {
    pub fn validate(&self) -> Result<Credentials, FormErrors> {
        let mut errors = FormErrors::new();
        let email = normalize_email(&self.email);

        errors.require("email", &email);
        errors.require("password", &self.password);

        errors.into_result(Credentials {
            email,
            password: self.password.clone(),
        })
    }
}

/// Create/edit post form. `author` is only submitted by the edit page.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PostForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub subtitle: String,
    #[serde(default)]
    pub img_url: String,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub body: String,
}

/// Validated post fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostInput {
    pub title: String,
    pub subtitle: String,
    pub img_url: String,
    pub author_id: Option<i32>,
    pub body: String,
}

impl PostForm {
    /// Validate the fields shared by the create and edit pages.
    pub fn validate(&self) -> Result<PostInput, FormErrors> {
        let mut errors = FormErrors::new();
        self.check_content(&mut errors);

        let author_id = match self.author.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => match raw.parse::<i32>() {
                Ok(id) => Some(id),
                Err(_) => {
                    errors.add("author", "Not a valid choice.");
                    None
                }
            },
        };

        errors.into_result(self.input(author_id))
    }

    /// Validate an edit submission, where choosing an author is mandatory.
    pub fn validate_edit(&self) -> Result<PostInput, FormErrors> {
        let mut errors = match self.validate() {
            Ok(input) if input.author_id.is_some() => return Ok(input),
            Ok(_) => FormErrors::new(),
            Err(errors) => errors,
        };
        if errors.get("author").is_empty()
            && self.author.as_deref().map(str::trim).unwrap_or_default().is_empty()
        {
            errors.add("author", REQUIRED);
        }
        Err(errors)
    }

    fn check_content(&self, errors: &mut FormErrors) {
        errors.require("title", &self.title);
        errors.require("subtitle", &self.subtitle);
        errors.require("img_url", &self.img_url);
        errors.require("body", &self.body);
    }

    fn input(&self, author_id: Option<i32>) -> PostInput {
        PostInput {
            title: self.title.trim().to_string(),
            subtitle: self.subtitle.trim().to_string(),
            img_url: self.img_url.trim().to_string(),
            author_id,
            body: self.body.clone(),
        }
    }
}

/// Comment form on the single-post page.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CommentForm {
    #[serde(default)]
    pub body: String,
}

impl CommentForm {
    pub fn validate(&self) -> Result<String, FormErrors> {
        let mut errors = FormErrors::new();
        errors.require("body", &self.body);
        errors.into_result(self.body.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register(email: &str, password: &str, name: &str) -> RegisterForm {
        RegisterForm {
            email: email.to_string(),
            password: password.to_string(),
            name: name.to_string(),
        }
    }

    #[test]
    fn test_registration_normalizes_email_and_name() {
        let valid = register("  A@X.com ", "correct horse", " Ada ").validate().unwrap();

        assert_eq!(valid.email, "a@x.com");
        assert_eq!(valid.name, "Ada");
        assert_eq!(valid.password, "correct horse");
    }

    #[test]
    fn test_registration_reports_every_field() {
        let errors = register("", "", "").validate().unwrap_err();

        assert_eq!(errors.get("email"), [REQUIRED.to_string()]);
        assert_eq!(errors.get("password"), [REQUIRED.to_string()]);
        assert_eq!(errors.get("name"), [REQUIRED.to_string()]);
    }

    #[test]
    fn test_registration_rejects_bad_email_and_short_password() {
        let errors = register("not-an-email", "short", "Ada").validate().unwrap_err();

        assert_eq!(errors.get("email"), ["Invalid email address.".to_string()]);
        assert_eq!(errors.get("password").len(), 1);
        assert!(errors.get("name").is_empty());
    }

    #[test]
    fn test_email_shape() {
        assert!(looks_like_email("a@x.com"));
        assert!(!looks_like_email("a@x"));
        assert!(!looks_like_email("@x.com"));
        assert!(!looks_like_email("a@@x.com"));
        assert!(!looks_like_email("a b@x.com"));
        assert!(!looks_like_email("a@x.com."));
    }

    #[test]
    fn test_password_is_not_serialized() {
        let json = serde_json::to_string(&register("a@x.com", "hunter2hunter2", "Ada")).unwrap();

        assert!(!json.contains("hunter2"));
    }

    #[test]
    fn test_login_requires_both_fields() {
        let form = LoginForm {
            email: "a@x.com".to_string(),
            password: String::new(),
        };

        let errors = form.validate().unwrap_err();

        assert!(errors.get("email").is_empty());
        assert_eq!(errors.get("password"), [REQUIRED.to_string()]);
    }

    #[test]
    fn test_post_form_accepts_minimal_values() {
        let form = PostForm {
            title: "T".to_string(),
            subtitle: "S".to_string(),
            img_url: "U".to_string(),
            author: None,
            body: "B".to_string(),
        };

        let input = form.validate().unwrap();

        assert_eq!(input.title, "T");
        assert_eq!(input.img_url, "U");
        assert_eq!(input.author_id, None);
    }

    #[test]
    fn test_post_edit_requires_valid_author() {
        let mut form = PostForm {
            title: "T".to_string(),
            subtitle: "S".to_string(),
            img_url: "U".to_string(),
            author: None,
            body: "B".to_string(),
        };
        assert_eq!(form.validate_edit().unwrap_err().get("author"), [REQUIRED.to_string()]);

        form.author = Some("abc".to_string());
        assert_eq!(
            form.validate_edit().unwrap_err().get("author"),
            ["Not a valid choice.".to_string()]
        );

        form.author = Some("2".to_string());
        assert_eq!(form.validate_edit().unwrap().author_id, Some(2));
    }

    #[test]
    fn test_post_edit_keeps_content_errors() {
        let form = PostForm {
            author: Some("1".to_string()),
            ..PostForm::default()
        };

        let errors = form.validate_edit().unwrap_err();

        assert_eq!(errors.get("title"), [REQUIRED.to_string()]);
        assert!(errors.get("author").is_empty());
    }

    #[test]
    fn test_comment_must_not_be_blank() {
        assert!(CommentForm { body: "   ".to_string() }.validate().is_err());
        assert_eq!(
            CommentForm { body: " Nice post ".to_string() }.validate().unwrap(),
            "Nice post"
        );
    }
}
