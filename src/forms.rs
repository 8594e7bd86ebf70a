//! Form input as posted by the browser, validated before any backend call.
//!
//! Each form is trimmed with `normalized()`, checked with
//! [`Validate::validate`] and only then turned into a request payload.

use std::borrow::Cow;

use chrono::NaiveDate;
use serde::Deserialize;
use serde_with::{serde_as, NoneAsEmptyString, PickFirst};
use validator::{Validate, ValidationError};

use crate::{
    dates::{is_ymd, ymd},
    error::AppResult,
    models::{
        EquipmentStatus, LoginRequest, NewEquipment, NewNote, RegisterRequest, BorrowRequest,
        ReturnRequest, Session,
    },
};

fn invalid(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(Cow::Borrowed(message));
    error
}

fn trimmed(value: &str) -> String {
    value.trim().to_string()
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

/// Optional numeric id: a missing, zero or blank value means "not given"
fn given(id: Option<i64>) -> Option<i64> {
    id.filter(|id| *id != 0)
}

/// New equipment record
#[serde_as]
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[validate(schema(function = "check_add_item", skip_on_field_errors = false))]
pub struct AddItemForm {
    #[serde(default)]
    #[validate(length(min = 1, message = "SKU is required"))]
    pub sku: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    #[serde_as(as = "PickFirst<(_, NoneAsEmptyString)>")]
    #[validate(range(min = 0, message = "Quantity must be >= 0"))]
    pub quantity: Option<i64>,
    #[serde(default)]
    #[serde_as(as = "PickFirst<(_, NoneAsEmptyString)>")]
    pub available_quantity: Option<i64>,
    #[serde(default)]
    #[serde_as(as = "PickFirst<(_, NoneAsEmptyString)>")]
    #[validate(range(min = 0.0, message = "Unit cost must be >= 0"))]
    pub unit_cost: Option<f64>,
    #[serde(default)]
    pub supplier: String,
    /// `YYYY-MM-DD` or empty
    #[serde(default)]
    pub date_purchased: String,
    #[serde(default)]
    pub status: String,
}

fn check_add_item(form: &AddItemForm) -> Result<(), ValidationError> {
    let quantity = form.quantity.unwrap_or(0);
    let available = form.available_quantity.unwrap_or(0);
    if available < 0 || available > quantity {
        return Err(invalid("available_range", "Available must be between 0 and Quantity"));
    }
    if !form.date_purchased.is_empty() && !is_ymd(&form.date_purchased) {
        return Err(invalid("date_format", "Date must be YYYY-MM-DD"));
    }
    if !form.status.is_empty() && form.status.parse::<EquipmentStatus>().is_err() {
        return Err(invalid("status", "Status must be active, retired or maintenance"));
    }
    Ok(())
}

impl AddItemForm {
    pub fn normalized(self) -> Self {
        Self {
            sku: trimmed(&self.sku),
            name: trimmed(&self.name),
            description: trimmed(&self.description),
            category: trimmed(&self.category),
            location: trimmed(&self.location),
            supplier: trimmed(&self.supplier),
            date_purchased: trimmed(&self.date_purchased),
            status: trimmed(&self.status).to_lowercase(),
            ..self
        }
    }

    /// Validate and build the create payload
    pub fn into_payload(self) -> AppResult<NewEquipment> {
        let form = self.normalized();
        form.validate()?;

        let status = form.status.parse().unwrap_or_default();
        Ok(NewEquipment {
            sku: form.sku,
            name: form.name,
            description: form.description,
            category: form.category,
            location: form.location,
            quantity: form.quantity.unwrap_or(0),
            available_quantity: form.available_quantity.unwrap_or(0),
            unit_cost: form.unit_cost.unwrap_or(0.0),
            supplier: form.supplier,
            date_purchased: form.date_purchased,
            status,
        })
    }
}

#[serde_as]
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[validate(schema(function = "check_borrow", skip_on_field_errors = false))]
pub struct BorrowForm {
    #[serde(default)]
    pub sku: String,
    #[serde(default)]
    #[serde_as(as = "PickFirst<(_, NoneAsEmptyString)>")]
    pub item_id: Option<i64>,
    #[serde(default)]
    #[serde_as(as = "PickFirst<(_, NoneAsEmptyString)>")]
    pub quantity: Option<i64>,
    /// Due date, `YYYY-MM-DD` or empty
    #[serde(default)]
    pub return_date: String,
    /// Overrides the signed-in user's display name
    #[serde(default)]
    pub borrower_name: String,
}

fn check_borrow(form: &BorrowForm) -> Result<(), ValidationError> {
    if form.sku.is_empty() && given(form.item_id).is_none() {
        return Err(invalid("target", "Provide SKU or Item ID"));
    }
    if form.quantity.map(|q| q < 0).unwrap_or(false) {
        return Err(invalid("quantity", "Quantity must be >= 1"));
    }
    if !form.return_date.is_empty() && !is_ymd(&form.return_date) {
        return Err(invalid("date_format", "Date must be YYYY-MM-DD"));
    }
    Ok(())
}

impl BorrowForm {
    pub fn normalized(self) -> Self {
        Self {
            sku: trimmed(&self.sku),
            return_date: trimmed(&self.return_date),
            borrower_name: trimmed(&self.borrower_name),
            ..self
        }
    }

    /// Validate and build the borrow request on behalf of `session`
    pub fn into_request(self, session: &Session) -> AppResult<BorrowRequest> {
        let form = self.normalized();
        form.validate()?;

        let quantity = match form.quantity {
            Some(q) if q > 0 => q,
            _ => 1,
        };
        Ok(BorrowRequest {
            sku: non_empty(form.sku),
            item_id: given(form.item_id),
            quantity,
            return_date: non_empty(form.return_date),
            user_id: session.user_id(),
            borrower_name: non_empty(form.borrower_name).or_else(|| session.borrower_name()),
        })
    }
}

#[serde_as]
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[validate(schema(function = "check_return", skip_on_field_errors = false))]
pub struct ReturnForm {
    #[serde(default)]
    #[serde_as(as = "PickFirst<(_, NoneAsEmptyString)>")]
    pub borrow_id: Option<i64>,
    #[serde(default)]
    pub sku: String,
    #[serde(default)]
    #[serde_as(as = "PickFirst<(_, NoneAsEmptyString)>")]
    pub item_id: Option<i64>,
    #[serde(default)]
    pub condition_on_return: String,
    /// `YYYY-MM-DD`, today when empty
    #[serde(default)]
    pub returned_at: String,
}

fn check_return(form: &ReturnForm) -> Result<(), ValidationError> {
    if given(form.borrow_id).is_none() && form.sku.is_empty() && given(form.item_id).is_none() {
        return Err(invalid("target", "Provide Borrow ID or SKU / Item ID"));
    }
    if !form.returned_at.is_empty() && !is_ymd(&form.returned_at) {
        return Err(invalid("date_format", "Date must be YYYY-MM-DD"));
    }
    Ok(())
}

impl ReturnForm {
    pub fn normalized(self) -> Self {
        Self {
            sku: trimmed(&self.sku),
            condition_on_return: trimmed(&self.condition_on_return),
            returned_at: trimmed(&self.returned_at),
            ..self
        }
    }

    pub fn into_request(self, session: &Session, today: NaiveDate) -> AppResult<ReturnRequest> {
        let form = self.normalized();
        form.validate()?;

        let returned_at = non_empty(form.returned_at).unwrap_or_else(|| ymd(today));
        Ok(ReturnRequest {
            borrow_id: given(form.borrow_id),
            sku: non_empty(form.sku),
            item_id: given(form.item_id),
            condition_on_return: non_empty(form.condition_on_return),
            returned_at: Some(returned_at),
            user_id: session.user_id(),
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct LoginForm {
    /// Username or email
    #[serde(default, alias = "email", alias = "username")]
    #[validate(length(min = 1, message = "Please enter email and password."))]
    pub identifier: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "Please enter email and password."))]
    pub password: String,
}

impl LoginForm {
    pub fn into_request(self) -> AppResult<LoginRequest> {
        let form = Self {
            identifier: trimmed(&self.identifier),
            ..self
        };
        form.validate()?;
        Ok(LoginRequest {
            identifier: form.identifier,
            password: form.password,
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[validate(schema(function = "check_register"))]
pub struct RegisterForm {
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default, alias = "confirm_password")]
    pub confirm: String,
    /// Terms of use accepted
    #[serde(default)]
    pub accepted: bool,
}

/// Checks run in order and only the first failure is reported
fn check_register(form: &RegisterForm) -> Result<(), ValidationError> {
    if form.full_name.is_empty() || form.username.is_empty() || form.email.is_empty() || form.password.is_empty() {
        return Err(invalid("required", "Please fill all fields."));
    }
    // local admin accounts such as admin@local have no dotted domain
    if !form.email.contains('@') {
        return Err(invalid("email", "Please enter a valid email (admin@local is ok)."));
    }
    if form.password.chars().count() < 8 {
        return Err(invalid("password", "Password must be at least 8 characters."));
    }
    if form.password != form.confirm {
        return Err(invalid("confirm", "Passwords do not match."));
    }
    if !form.accepted {
        return Err(invalid("terms", "Please accept the terms."));
    }
    Ok(())
}

impl RegisterForm {
    pub fn into_request(self) -> AppResult<RegisterRequest> {
        let form = Self {
            full_name: trimmed(&self.full_name),
            username: trimmed(&self.username),
            email: trimmed(&self.email),
            ..self
        };
        form.validate()?;
        Ok(RegisterRequest {
            full_name: form.full_name,
            username: form.username,
            email: form.email,
            password: form.password,
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct NoteForm {
    #[serde(default)]
    #[validate(length(min = 1, message = "Note text is required"))]
    pub note_text: String,
}

impl NoteForm {
    pub fn into_request(self, item_id: i64) -> AppResult<NewNote> {
        let form = Self {
            note_text: trimmed(&self.note_text),
        };
        form.validate()?;
        Ok(NewNote {
            item_id,
            note_text: form.note_text,
        })
    }
}
