//! Form validation pipeline.
//!
//! Every form runs a fixed, ordered rule chain per field. A chain
//! bails at the first failing rule for its field, but fields are
//! validated independently of each other: one bad field never stops
//! the rest from being checked. The outcome is a [`FormState`] mapping
//! field names to a sanitized value or an error message, kept entirely
//! apart from the entity types so templates can re-display prior input
//! alongside per-field messages.
//!
//! Checks that need the entity store (username uniqueness, category
//! existence) run after the synchronous chain and attach their result
//! via [`FormState::set_error`].

use std::collections::HashMap;
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;
use uuid::Uuid;

use crate::models::{CategoryForm, ItemForm, UserForm};

/// Outcome of one field's rule chain.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldState {
    /// Sanitized value, suitable for re-display.
    pub value: String,
    /// Message from the first failing rule, if any.
    pub error: Option<String>,
}

impl FieldState {
    pub fn is_valid(&self) -> bool {
        self.error.is_none()
    }
}

/// Ordered rule chain for a single field.
///
/// Rules after the first failure are skipped (bail semantics), so the
/// reported message always belongs to the earliest violated rule.
#[derive(Debug)]
pub struct FieldChain {
    value: String,
    missing: bool,
    error: Option<String>,
}

impl FieldChain {
    /// Start a chain from a raw submission value. `None` means the
    /// field was absent from the request entirely.
    pub fn new(raw: Option<&str>) -> Self {
        match raw {
            Some(v) => FieldChain {
                value: v.to_string(),
                missing: false,
                error: None,
            },
            None => FieldChain {
                value: String::new(),
                missing: true,
                error: None,
            },
        }
    }

    fn failed(&self) -> bool {
        self.error.is_some()
    }

    fn fail(&mut self, message: &str) {
        self.error = Some(message.to_string());
    }

    /// Strip surrounding whitespace.
    pub fn trim(mut self) -> Self {
        if !self.failed() {
            self.value = self.value.trim().to_string();
        }
        self
    }

    /// Existence and non-empty check.
    pub fn required(mut self, message: &str) -> Self {
        if !self.failed() && (self.missing || self.value.is_empty()) {
            self.fail(message);
        }
        self
    }

    /// Character-count bounds, inclusive.
    pub fn length(mut self, min: usize, max: usize, message: &str) -> Self {
        if !self.failed() {
            let count = self.value.chars().count();
            if count < min || count > max {
                self.fail(message);
            }
        }
        self
    }

    /// Must parse as a finite float no smaller than `min`.
    pub fn float_min(mut self, min: f64, message: &str) -> Self {
        if !self.failed() {
            match self.value.parse::<f64>() {
                Ok(v) if v.is_finite() && v >= min => {}
                _ => self.fail(message),
            }
        }
        self
    }

    /// Must parse as an integer no smaller than `min`. Parsed at the
    /// store's 32-bit width, so a value that passes here always
    /// coerces when the entity is assembled.
    pub fn int_min(mut self, min: i32, message: &str) -> Self {
        if !self.failed() {
            match self.value.parse::<i32>() {
                Ok(v) if v >= min => {}
                _ => self.fail(message),
            }
        }
        self
    }

    /// Optional checkbox-style boolean. An absent or empty field
    /// normalizes to "false"; anything unrecognized is an error.
    pub fn optional_boolean(mut self, message: &str) -> Self {
        if !self.failed() {
            if self.missing || self.value.is_empty() {
                self.value = "false".to_string();
            } else {
                match self.value.as_str() {
                    "true" | "on" | "1" => self.value = "true".to_string(),
                    "false" | "0" => self.value = "false".to_string(),
                    _ => self.fail(message),
                }
            }
        }
        self
    }

    /// Basic email shape check.
    pub fn email(mut self, message: &str) -> Self {
        if !self.failed() {
            static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
            let regex = EMAIL_REGEX.get_or_init(|| {
                Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
                    .expect("Failed to compile email regex")
            });

            if !regex.is_match(&self.value) {
                self.fail(message);
            }
        }
        self
    }

    /// Must be a well-formed entity identifier (UUID). Checked before
    /// the store ever sees the value, so a malformed id is a form
    /// error rather than a store fault.
    pub fn identifier(mut self, message: &str) -> Self {
        if !self.failed() && Uuid::parse_str(&self.value).is_err() {
            self.fail(message);
        }
        self
    }

    /// Cross-field equality, compared post-trim and pre-escape.
    pub fn equals(mut self, other: &str, message: &str) -> Self {
        if !self.failed() && self.value != other {
            self.fail(message);
        }
        self
    }

    /// Escape markup-significant characters. Terminal sanitization
    /// step; runs only when every prior rule passed.
    pub fn escape(mut self) -> Self {
        if !self.failed() {
            self.value = escape_html(&self.value);
        }
        self
    }

    /// Close the chain.
    pub fn finish(self) -> FieldState {
        FieldState {
            value: self.value,
            error: self.error,
        }
    }
}

/// Escape `& < > " ' /` into HTML entities.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            '/' => out.push_str("&#x2F;"),
            _ => out.push(c),
        }
    }
    out
}

/// Validated form: field name mapped to its sanitized value or error.
#[derive(Debug, Default, Serialize)]
#[serde(transparent)]
pub struct FormState {
    fields: HashMap<String, FieldState>,
}

impl FormState {
    pub fn new() -> Self {
        FormState::default()
    }

    /// Error-free state seeded with known values, for rendering a form
    /// before any submission (empty strings) or prefilled from an
    /// existing entity.
    pub fn prefilled(pairs: &[(&str, &str)]) -> Self {
        let mut state = FormState::new();
        for (name, value) in pairs {
            state.fields.insert(
                (*name).to_string(),
                FieldState {
                    value: (*value).to_string(),
                    error: None,
                },
            );
        }
        state
    }

    /// Record a finished chain under `name`.
    pub fn insert(&mut self, name: &str, chain: FieldChain) {
        self.fields.insert(name.to_string(), chain.finish());
    }

    /// Attach an error from an asynchronous check. Does not overwrite
    /// a message the synchronous chain already produced.
    pub fn set_error(&mut self, name: &str, message: &str) {
        let field = self.fields.entry(name.to_string()).or_insert(FieldState {
            value: String::new(),
            error: None,
        });
        if field.error.is_none() {
            field.error = Some(message.to_string());
        }
    }

    /// Sanitized value for `name`, empty if never recorded.
    pub fn value(&self, name: &str) -> &str {
        self.fields.get(name).map(|f| f.value.as_str()).unwrap_or("")
    }

    /// Error message for `name`, if any.
    pub fn error(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(|f| f.error.as_deref())
    }

    /// Whether the single field passed its chain.
    pub fn field_is_valid(&self, name: &str) -> bool {
        self.fields.get(name).map(|f| f.is_valid()).unwrap_or(false)
    }

    /// Whether every field passed.
    pub fn is_valid(&self) -> bool {
        self.fields.values().all(|f| f.is_valid())
    }
}

/// Rule list for the category form.
pub fn validate_category_form(form: &CategoryForm) -> FormState {
    let mut state = FormState::new();

    state.insert(
        "name",
        FieldChain::new(form.name.as_deref())
            .trim()
            .required("Name must be specified.")
            .length(3, 100, "Name must be between 3 and 100 characters long.")
            .escape(),
    );
    state.insert(
        "description",
        FieldChain::new(form.description.as_deref())
            .trim()
            .required("Description must be specified.")
            .length(
                3,
                1000,
                "Description must be between 3 and 1000 characters long.",
            )
            .escape(),
    );

    state
}

/// Rule list for the item form's text fields. The image part is
/// checked separately by the handler because it arrives as a file.
pub fn validate_item_form(form: &ItemForm) -> FormState {
    let mut state = FormState::new();

    state.insert(
        "name",
        FieldChain::new(form.name.as_deref())
            .trim()
            .required("Name must be between 3 and 100 characters long")
            .length(3, 100, "Name must be between 3 and 100 characters long")
            .escape(),
    );
    state.insert(
        "description",
        FieldChain::new(form.description.as_deref())
            .trim()
            .required("Description must be between 3 and 1000 characters long")
            .length(
                3,
                1000,
                "Description must be between 3 and 1000 characters long",
            )
            .escape(),
    );
    state.insert(
        "price",
        FieldChain::new(form.price.as_deref())
            .trim()
            .required("Price must be a number greater than 0")
            .float_min(0.0, "Price must be a number greater than 0")
            .escape(),
    );
    state.insert(
        "quantity",
        FieldChain::new(form.quantity.as_deref())
            .trim()
            .required("Quantity must be a whole number greater than or equal to 0")
            .int_min(0, "Quantity must be a whole number greater than or equal to 0")
            .escape(),
    );
    state.insert(
        "category",
        FieldChain::new(form.category.as_deref())
            .trim()
            .required("Category must be a valid category")
            .identifier("Category must be a valid category")
            .escape(),
    );

    state
}

/// Rule list for the user form. The username-uniqueness check is
/// asynchronous and attached by the handler afterwards.
pub fn validate_user_form(form: &UserForm) -> FormState {
    let mut state = FormState::new();

    // Confirm-password equality compares the trimmed, unescaped values.
    let trimmed_password = form.password.as_deref().map(str::trim).unwrap_or("");

    state.insert(
        "username",
        FieldChain::new(form.username.as_deref())
            .trim()
            .required("Username must be specified.")
            .length(3, 100, "Username must be between 3 and 100 characters long.")
            .escape(),
    );
    state.insert(
        "password",
        FieldChain::new(form.password.as_deref())
            .trim()
            .required("Password must be specified.")
            .length(3, 1000, "Password must be between 3 and 1000 characters long.")
            .escape(),
    );
    state.insert(
        "confirm_password",
        FieldChain::new(form.confirm_password.as_deref())
            .trim()
            .required("Confirm password must be specified.")
            .length(
                3,
                1000,
                "Confirm password must be between 3 and 1000 characters long.",
            )
            .equals(trimmed_password, "Confirm password does not match password.")
            .escape(),
    );
    state.insert(
        "email",
        FieldChain::new(form.email.as_deref())
            .trim()
            .required("Email must be specified.")
            .length(3, 1000, "Email must be between 3 and 1000 characters long.")
            .email("Email must be a valid email address.")
            .escape(),
    );
    state.insert(
        "is_admin",
        FieldChain::new(form.is_admin.as_deref())
            .trim()
            .optional_boolean("isAdmin must be a boolean value.")
            .escape(),
    );
    state.insert(
        "first_name",
        FieldChain::new(form.first_name.as_deref())
            .trim()
            .required("First name must be specified.")
            .length(3, 100, "First name must be between 3 and 100 characters long.")
            .escape(),
    );
    state.insert(
        "family_name",
        FieldChain::new(form.family_name.as_deref())
            .trim()
            .required("Family name must be specified.")
            .length(3, 100, "Family name must be between 3 and 100 characters long.")
            .escape(),
    );

    state
}

/// Rule list for the login form.
pub fn validate_login_form(username: Option<&str>, password: Option<&str>) -> FormState {
    let mut state = FormState::new();

    state.insert(
        "username",
        FieldChain::new(username)
            .required("Username is required")
            .trim()
            .required("Username cannot be empty")
            .length(3, 100, "Username must be between 3 and 100 characters long")
            .escape(),
    );
    state.insert(
        "password",
        FieldChain::new(password)
            .required("Password is required")
            .trim()
            .required("Password cannot be empty")
            .length(3, 1000, "Password must be between 3 and 1000 characters long")
            .escape(),
    );

    state
}

#[cfg(test)]
mod tests {
    use super::*;

    fn category_form(name: &str, description: &str) -> CategoryForm {
        CategoryForm {
            name: Some(name.to_string()),
            description: Some(description.to_string()),
        }
    }

    #[test]
    fn category_name_too_short_reports_length_message() {
        let state = validate_category_form(&category_form("AB", "A fine description"));

        assert!(!state.is_valid());
        assert_eq!(
            state.error("name"),
            Some("Name must be between 3 and 100 characters long.")
        );
        // The other field is still evaluated independently.
        assert!(state.field_is_valid("description"));
    }

    #[test]
    fn category_missing_name_bails_before_length_rule() {
        let form = CategoryForm {
            name: None,
            description: Some("Valid description".to_string()),
        };
        let state = validate_category_form(&form);

        assert_eq!(state.error("name"), Some("Name must be specified."));
    }

    #[test]
    fn category_whitespace_only_name_is_empty_after_trim() {
        let state = validate_category_form(&category_form("   ", "Valid description"));

        assert_eq!(state.error("name"), Some("Name must be specified."));
    }

    #[test]
    fn category_valid_input_passes_and_is_escaped() {
        let state = validate_category_form(&category_form("Tools & Dies", "Everything <sharp>"));

        assert!(state.is_valid());
        assert_eq!(state.value("name"), "Tools &amp; Dies");
        assert_eq!(state.value("description"), "Everything &lt;sharp&gt;");
    }

    fn item_form(price: &str, quantity: &str) -> ItemForm {
        ItemForm {
            name: Some("Bolt".to_string()),
            description: Some("An M6 bolt".to_string()),
            price: Some(price.to_string()),
            quantity: Some(quantity.to_string()),
            category: Some(Uuid::new_v4().to_string()),
        }
    }

    #[test]
    fn negative_price_fails_the_price_field_only() {
        let state = validate_item_form(&item_form("-5", "3"));

        assert!(!state.is_valid());
        assert_eq!(
            state.error("price"),
            Some("Price must be a number greater than 0")
        );
        assert!(state.field_is_valid("name"));
        assert!(state.field_is_valid("quantity"));
        assert!(state.field_is_valid("category"));
    }

    #[test]
    fn non_numeric_quantity_is_rejected() {
        let state = validate_item_form(&item_form("4.50", "many"));

        assert_eq!(
            state.error("quantity"),
            Some("Quantity must be a whole number greater than or equal to 0")
        );
    }

    #[test]
    fn fractional_quantity_is_rejected() {
        let state = validate_item_form(&item_form("4.50", "1.5"));

        assert!(!state.field_is_valid("quantity"));
    }

    #[test]
    fn quantity_beyond_the_store_integer_width_is_rejected() {
        // A quantity that only fits in 64 bits would pass a wider
        // check and then fail when the entity is assembled.
        let state = validate_item_form(&item_form("4.50", "3000000000"));

        assert_eq!(
            state.error("quantity"),
            Some("Quantity must be a whole number greater than or equal to 0")
        );

        let state = validate_item_form(&item_form("4.50", &i32::MAX.to_string()));
        assert!(state.field_is_valid("quantity"));
    }

    #[test]
    fn malformed_category_identifier_is_a_field_error() {
        let form = ItemForm {
            category: Some("not-a-uuid".to_string()),
            ..item_form("4.50", "3")
        };
        let state = validate_item_form(&form);

        assert_eq!(
            state.error("category"),
            Some("Category must be a valid category")
        );
    }

    #[test]
    fn zero_price_and_zero_quantity_are_allowed() {
        let state = validate_item_form(&item_form("0", "0"));
        assert!(state.is_valid());
    }

    fn user_form() -> UserForm {
        UserForm {
            username: Some("grace".to_string()),
            password: Some("hopper42".to_string()),
            confirm_password: Some("hopper42".to_string()),
            email: Some("grace@example.com".to_string()),
            is_admin: None,
            first_name: Some("Grace".to_string()),
            family_name: Some("Hopper".to_string()),
        }
    }

    #[test]
    fn valid_user_form_passes() {
        let state = validate_user_form(&user_form());
        assert!(state.is_valid());
        assert_eq!(state.value("is_admin"), "false");
    }

    #[test]
    fn confirm_password_mismatch_is_reported_on_the_confirmation_field() {
        let form = UserForm {
            confirm_password: Some("different".to_string()),
            ..user_form()
        };
        let state = validate_user_form(&form);

        assert_eq!(
            state.error("confirm_password"),
            Some("Confirm password does not match password.")
        );
        assert!(state.field_is_valid("password"));
    }

    #[test]
    fn confirm_password_compares_after_trimming() {
        let form = UserForm {
            password: Some("  hopper42  ".to_string()),
            confirm_password: Some("hopper42".to_string()),
            ..user_form()
        };
        let state = validate_user_form(&form);

        assert!(state.field_is_valid("confirm_password"));
    }

    #[test]
    fn invalid_email_is_rejected() {
        let form = UserForm {
            email: Some("not-an-email".to_string()),
            ..user_form()
        };
        let state = validate_user_form(&form);

        assert_eq!(
            state.error("email"),
            Some("Email must be a valid email address.")
        );
    }

    #[test]
    fn checkbox_value_normalizes_to_true() {
        let form = UserForm {
            is_admin: Some("on".to_string()),
            ..user_form()
        };
        let state = validate_user_form(&form);

        assert_eq!(state.value("is_admin"), "true");
    }

    #[test]
    fn garbage_is_admin_value_is_an_error() {
        let form = UserForm {
            is_admin: Some("maybe".to_string()),
            ..user_form()
        };
        let state = validate_user_form(&form);

        assert_eq!(state.error("is_admin"), Some("isAdmin must be a boolean value."));
    }

    #[test]
    fn login_form_reports_missing_fields() {
        let state = validate_login_form(None, Some("secret123"));

        assert_eq!(state.error("username"), Some("Username is required"));
        assert!(state.field_is_valid("password"));
    }

    #[test]
    fn login_form_distinguishes_empty_from_missing() {
        let state = validate_login_form(Some("  "), Some("secret123"));

        assert_eq!(state.error("username"), Some("Username cannot be empty"));
    }

    #[test]
    fn set_error_does_not_overwrite_chain_error() {
        let mut state = validate_category_form(&category_form("AB", "desc too"));
        state.set_error("name", "This name is already taken.");

        assert_eq!(
            state.error("name"),
            Some("Name must be between 3 and 100 characters long.")
        );
    }

    #[test]
    fn escape_html_covers_markup_characters() {
        assert_eq!(
            escape_html(r#"<a href="/x">&'"#),
            "&lt;a href=&quot;&#x2F;x&quot;&gt;&amp;&#x27;"
        );
    }
}
