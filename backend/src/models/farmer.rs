use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};
use uuid::Uuid;
use validator::Validate;

use super::common::{double_option, PageRequest, PaginationError, DEFAULT_LIMIT, DEFAULT_PAGE};
use crate::cpf::{digits_only, Cpf};

/// Farmer record as stored and as returned to the client.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Farmer {
    pub id: Uuid,
    pub full_name: String,
    pub cpf: String,
    pub birth_date: Option<Date>,
    pub phone: Option<String>,
    pub is_active: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl Farmer {
    pub fn new(fields: NewFarmer, now: OffsetDateTime) -> Self {
        Self {
            id: Uuid::new_v4(),
            full_name: fields.full_name,
            cpf: fields.cpf.into_inner(),
            birth_date: fields.birth_date,
            phone: fields.phone,
            is_active: fields.is_active,
            created_at: now,
            updated_at: now,
        }
    }

    /// Applies a validated change set. CPF is never touched.
    pub fn apply(&mut self, changes: FarmerChanges, now: OffsetDateTime) {
        if let Some(name) = changes.full_name {
            self.full_name = name;
        }
        if let Some(birth_date) = changes.birth_date {
            self.birth_date = birth_date;
        }
        if let Some(phone) = changes.phone {
            self.phone = phone;
        }
        if let Some(active) = changes.is_active {
            self.is_active = active;
        }
        self.updated_at = now;
    }

    pub fn activate(&mut self, now: OffsetDateTime) {
        if !self.is_active {
            self.is_active = true;
            self.updated_at = now;
        }
    }

    pub fn deactivate(&mut self, now: OffsetDateTime) {
        if self.is_active {
            self.is_active = false;
            self.updated_at = now;
        }
    }

    pub fn can_be_deleted(&self) -> bool {
        !self.is_active
    }
}

/// Validated fields for a farmer that does not exist yet.
#[derive(Debug, Clone)]
pub struct NewFarmer {
    pub full_name: String,
    pub cpf: Cpf,
    pub birth_date: Option<Date>,
    pub phone: Option<String>,
    pub is_active: bool,
}

/// Validated partial update. Outer `None` leaves the field unchanged.
#[derive(Debug, Clone, Default)]
pub struct FarmerChanges {
    pub full_name: Option<String>,
    pub birth_date: Option<Option<Date>>,
    pub phone: Option<Option<String>>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateFarmerRequest {
    #[validate(length(min = 1, max = 255, message = "fullName is required"))]
    pub full_name: String,
    #[validate(length(min = 1, max = 32, message = "cpf is required"))]
    pub cpf: String,
    pub birth_date: Option<Date>,
    #[validate(length(max = 32))]
    pub phone: Option<String>,
    pub is_active: Option<bool>,
}

impl CreateFarmerRequest {
    pub fn into_new_farmer(self, today: Date) -> Result<NewFarmer, RuleViolation> {
        let cpf = Cpf::parse(&self.cpf).map_err(RuleViolation::Cpf)?;
        let full_name = normalize_name(&self.full_name)?;
        let phone = normalize_phone(self.phone.as_deref())?;
        check_birth_date(self.birth_date, today)?;

        Ok(NewFarmer {
            full_name,
            cpf,
            birth_date: self.birth_date,
            phone,
            is_active: self.is_active.unwrap_or(true),
        })
    }
}

/// PATCH body. CPF is immutable and therefore not accepted here.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateFarmerRequest {
    #[validate(length(min = 1, max = 255))]
    pub full_name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub birth_date: Option<Option<Date>>,
    #[serde(default, deserialize_with = "double_option")]
    pub phone: Option<Option<String>>,
    pub is_active: Option<bool>,
}

impl UpdateFarmerRequest {
    pub fn into_changes(self, today: Date) -> Result<FarmerChanges, RuleViolation> {
        let full_name = self.full_name.as_deref().map(normalize_name).transpose()?;
        let phone = match self.phone {
            None => None,
            Some(p) => Some(normalize_phone(p.as_deref())?),
        };
        if let Some(birth_date) = self.birth_date {
            check_birth_date(birth_date, today)?;
        }

        Ok(FarmerChanges {
            full_name,
            birth_date: self.birth_date,
            phone,
            is_active: self.is_active,
        })
    }
}

/// Query string for `GET /farmers`.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct FarmerListParams {
    pub name: Option<String>,
    pub cpf: Option<String>,
    pub is_active: Option<bool>,
    #[validate(range(min = 1, message = "page must be at least 1"))]
    pub page: Option<u32>,
    #[validate(range(min = 1, max = 100, message = "limit must be between 1 and 100"))]
    pub limit: Option<u32>,
}

impl FarmerListParams {
    pub fn page_request(&self) -> Result<PageRequest, PaginationError> {
        PageRequest::new(
            self.page.unwrap_or(DEFAULT_PAGE),
            self.limit.unwrap_or(DEFAULT_LIMIT),
        )
    }

    pub fn filter(&self) -> FarmerFilter {
        FarmerFilter::from_criteria(self.name.as_deref(), self.cpf.as_deref(), self.is_active)
    }
}

/// Normalized, backend-agnostic list predicate. Present fields are ANDed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FarmerFilter {
    /// Case-insensitive substring of the full name, stored lowercased.
    pub name: Option<String>,
    /// Digit-only substring of the canonical CPF.
    pub cpf_digits: Option<String>,
    pub is_active: Option<bool>,
}

impl FarmerFilter {
    pub fn from_criteria(name: Option<&str>, cpf: Option<&str>, is_active: Option<bool>) -> Self {
        let name = name
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_lowercase);
        let cpf_digits = cpf
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(digits_only)
            .filter(|d| !d.is_empty());

        Self {
            name,
            cpf_digits,
            is_active,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.cpf_digits.is_none() && self.is_active.is_none()
    }

    pub fn matches(&self, farmer: &Farmer) -> bool {
        if let Some(name) = &self.name {
            if !farmer.full_name.to_lowercase().contains(name.as_str()) {
                return false;
            }
        }
        if let Some(digits) = &self.cpf_digits {
            if !farmer.cpf.contains(digits.as_str()) {
                return false;
            }
        }
        if let Some(active) = self.is_active {
            if farmer.is_active != active {
                return false;
            }
        }
        true
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RuleViolation {
    #[error("{0}")]
    Cpf(#[from] crate::cpf::CpfError),

    #[error("Full name must have at least 2 characters")]
    NameTooShort,

    #[error("Phone must have 10 or 11 digits")]
    InvalidPhone,

    #[error("Birth date cannot be in the future")]
    BirthDateInFuture,
}

pub fn normalize_name(raw: &str) -> Result<String, RuleViolation> {
    let trimmed = raw.trim();
    if trimmed.chars().count() < 2 {
        return Err(RuleViolation::NameTooShort);
    }
    Ok(trimmed.to_string())
}

/// Blank input means "no phone". Stored as digits only.
pub fn normalize_phone(raw: Option<&str>) -> Result<Option<String>, RuleViolation> {
    let Some(raw) = raw.map(str::trim).filter(|p| !p.is_empty()) else {
        return Ok(None);
    };
    let digits = digits_only(raw);
    if !(10..=11).contains(&digits.len()) {
        return Err(RuleViolation::InvalidPhone);
    }
    Ok(Some(digits))
}

pub fn check_birth_date(birth_date: Option<Date>, today: Date) -> Result<(), RuleViolation> {
    match birth_date {
        Some(d) if d > today => Err(RuleViolation::BirthDateInFuture),
        _ => Ok(()),
    }
}
