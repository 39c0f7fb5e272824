//! Booking validation rules shared by the server and the submission client.
//!
//! Both sides run the same [`Validator`]; they differ only in the [`RuleSet`]
//! they pass. The server requires every field but interest and comments, the
//! client additionally requires an interest and restricts interest and room
//! type to the options it offers.

use std::fmt;
use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

use crate::models::booking::{BookingParams, NewBooking};

pub const BLANK: &str = "can't be blank";
pub const INVALID: &str = "is invalid";
pub const TAKEN: &str = "has already been taken";
pub const NOT_A_DATE: &str = "is not a valid date";
pub const NOT_AN_OPTION: &str = "is not included in the list";
pub const DEPARTURE_BEFORE_ARRIVAL: &str = "must be after the arrival date";

pub const DATE_FORMAT: &str = "%Y-%m-%d";

pub const INTEREST_OPTIONS: &[&str] = &[
    "Local Gastronomy",
    "Local Trips",
    "Out-door Sport Activities",
    "Spanish learning",
];

pub const ROOM_TYPE_OPTIONS: &[&str] = &[
    "Luxus Room",
    "Affordable Room",
    "Tied-Budget Room",
    "Double Room",
];

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?)+$",
    )
    .expect("email pattern compiles")
});

/// A booking form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    FirstName,
    LastName,
    Email,
    Nationality,
    University,
    BirthDate,
    Interest,
    RoomType,
    ArrivalDate,
    DepartureDate,
    Comments,
}

impl Field {
    pub const ALL: [Field; 11] = [
        Field::FirstName,
        Field::LastName,
        Field::Email,
        Field::Nationality,
        Field::University,
        Field::BirthDate,
        Field::Interest,
        Field::RoomType,
        Field::ArrivalDate,
        Field::DepartureDate,
        Field::Comments,
    ];

    /// Key used on the wire and in the database.
    pub fn key(self) -> &'static str {
        match self {
            Field::FirstName => "first_name",
            Field::LastName => "last_name",
            Field::Email => "email",
            Field::Nationality => "nationality",
            Field::University => "university",
            Field::BirthDate => "birth_date",
            Field::Interest => "interest",
            Field::RoomType => "room_type",
            Field::ArrivalDate => "arrival_date",
            Field::DepartureDate => "departure_date",
            Field::Comments => "comments",
        }
    }

    /// Human label, used as the prefix of full error messages.
    pub fn label(self) -> &'static str {
        match self {
            Field::FirstName => "First name",
            Field::LastName => "Last name",
            Field::Email => "Email",
            Field::Nationality => "Nationality",
            Field::University => "University",
            Field::BirthDate => "Birth date",
            Field::Interest => "Interest",
            Field::RoomType => "Room type",
            Field::ArrivalDate => "Arrival date",
            Field::DepartureDate => "Departure date",
            Field::Comments => "Comments",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// One violated rule. `field` is `None` for messages not tied to a field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: Option<Field>,
    pub message: String,
}

impl FieldError {
    pub fn full_message(&self) -> String {
        match self.field {
            Some(field) => format!("{} {}", field.label(), self.message),
            None => self.message.clone(),
        }
    }
}

/// Every violated rule of one validation run, in the order the rules ran.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors {
    errors: Vec<FieldError>,
}

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: Field, message: impl Into<String>) {
        self.errors.push(FieldError {
            field: Some(field),
            message: message.into(),
        });
    }

    pub fn add_base(&mut self, message: impl Into<String>) {
        self.errors.push(FieldError {
            field: None,
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn contains(&self, field: Field) -> bool {
        self.errors.iter().any(|e| e.field == Some(field))
    }

    /// First message recorded for `field`.
    pub fn get(&self, field: Field) -> Option<&str> {
        self.errors
            .iter()
            .find(|e| e.field == Some(field))
            .map(|e| e.message.as_str())
    }

    /// Fields with at least one error, without duplicates, in rule order.
    pub fn fields(&self) -> Vec<Field> {
        let mut fields = Vec::new();
        for field in self.errors.iter().filter_map(|e| e.field) {
            if !fields.contains(&field) {
                fields.push(field);
            }
        }
        fields
    }

    pub fn remove(&mut self, field: Field) {
        self.errors.retain(|e| e.field != Some(field));
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.errors.iter()
    }

    pub fn full_messages(&self) -> Vec<String> {
        self.errors.iter().map(FieldError::full_message).collect()
    }

    /// Rebuild field errors from a flat list of full messages such as
    /// `"Email has already been taken"`. Unrecognised messages become base errors.
    pub fn from_full_messages<S: AsRef<str>>(messages: &[S]) -> Self {
        let mut errors = FieldErrors::new();
        for message in messages {
            let message = message.as_ref();
            let matched = Field::ALL
                .into_iter()
                .filter_map(|field| {
                    message
                        .strip_prefix(field.label())
                        .and_then(|rest| rest.strip_prefix(' '))
                        .map(|rest| (field, rest))
                })
                .max_by_key(|(field, _)| field.label().len());
            match matched {
                Some((field, rest)) => errors.add(field, rest),
                None => errors.add_base(message),
            }
        }
        errors
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.full_messages().join("; "))
    }
}

/// Which rules apply on a given side.
#[derive(Debug, Clone, Copy)]
pub struct RuleSet {
    pub required: &'static [Field],
    pub options: &'static [(Field, &'static [&'static str])],
}

impl RuleSet {
    pub const SERVER: RuleSet = RuleSet {
        required: &[
            Field::FirstName,
            Field::LastName,
            Field::Email,
            Field::Nationality,
            Field::University,
            Field::BirthDate,
            Field::RoomType,
            Field::ArrivalDate,
            Field::DepartureDate,
        ],
        options: &[],
    };

    pub const CLIENT: RuleSet = RuleSet {
        required: &[
            Field::FirstName,
            Field::LastName,
            Field::Email,
            Field::Nationality,
            Field::University,
            Field::BirthDate,
            Field::Interest,
            Field::RoomType,
            Field::ArrivalDate,
            Field::DepartureDate,
        ],
        options: &[
            (Field::Interest, INTEREST_OPTIONS),
            (Field::RoomType, ROOM_TYPE_OPTIONS),
        ],
    };
}

pub fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

pub fn is_valid_email(value: &str) -> bool {
    EMAIL_RE.is_match(value.trim())
}

pub fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).ok()
}

/// Non-short-circuiting validator. Each phase appends to the same error set;
/// `finish` reports all of them at once.
pub struct Validator<'a> {
    params: &'a BookingParams,
    rules: &'a RuleSet,
    errors: FieldErrors,
}

impl<'a> Validator<'a> {
    pub fn new(params: &'a BookingParams, rules: &'a RuleSet) -> Self {
        Self {
            params,
            rules,
            errors: FieldErrors::new(),
        }
    }

    pub fn check_presence(&mut self) -> &mut Self {
        for &field in self.rules.required {
            if is_blank(self.params.value(field)) {
                self.errors.add(field, BLANK);
            }
        }
        self
    }

    pub fn check_email_format(&mut self) -> &mut Self {
        let email = self.params.value(Field::Email);
        if !is_blank(email) && !is_valid_email(email) {
            self.errors.add(Field::Email, INVALID);
        }
        self
    }

    pub fn check_options(&mut self) -> &mut Self {
        for &(field, allowed) in self.rules.options {
            let value = self.params.value(field).trim();
            if !value.is_empty() && !allowed.contains(&value) {
                self.errors.add(field, NOT_AN_OPTION);
            }
        }
        self
    }

    pub fn check_dates(&mut self) -> &mut Self {
        let mut parsed = |field: Field| {
            let value = self.params.value(field);
            if is_blank(value) {
                return None;
            }
            let date = parse_date(value);
            if date.is_none() {
                self.errors.add(field, NOT_A_DATE);
            }
            date
        };
        parsed(Field::BirthDate);
        let arrival = parsed(Field::ArrivalDate);
        let departure = parsed(Field::DepartureDate);

        if let (Some(arrival), Some(departure)) = (arrival, departure) {
            if arrival >= departure {
                self.errors.add(Field::DepartureDate, DEPARTURE_BEFORE_ARRIVAL);
            }
        }
        self
    }

    /// Run every built-in rule in order.
    pub fn check_all(&mut self) -> &mut Self {
        self.check_presence()
            .check_email_format()
            .check_options()
            .check_dates()
    }

    pub fn has_error(&self, field: Field) -> bool {
        self.errors.contains(field)
    }

    /// Record a violation found outside the built-in rules (e.g. uniqueness).
    pub fn add(&mut self, field: Field, message: impl Into<String>) {
        self.errors.add(field, message);
    }

    pub fn finish(mut self) -> Result<NewBooking, FieldErrors> {
        if !self.errors.is_empty() {
            return Err(self.errors);
        }

        let mut date = |field: Field| {
            let parsed = parse_date(self.params.value(field));
            if parsed.is_none() {
                self.errors.add(field, BLANK);
            }
            parsed
        };
        let dates = (
            date(Field::BirthDate),
            date(Field::ArrivalDate),
            date(Field::DepartureDate),
        );
        let (Some(birth_date), Some(arrival_date), Some(departure_date)) = dates else {
            return Err(self.errors);
        };

        let p = self.params;
        Ok(NewBooking {
            first_name: p.first_name.trim().to_string(),
            last_name: p.last_name.trim().to_string(),
            email: p.email.trim().to_string(),
            nationality: p.nationality.trim().to_string(),
            university: p.university.trim().to_string(),
            birth_date,
            interest: p.interest.trim().to_string(),
            room_type: p.room_type.trim().to_string(),
            arrival_date,
            departure_date,
            comments: p
                .comments
                .as_deref()
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(str::to_string),
        })
    }
}

/// Run every built-in rule of `rules` against `params`.
pub fn validate(params: &BookingParams, rules: &RuleSet) -> Result<NewBooking, FieldErrors> {
    let mut validator = Validator::new(params, rules);
    validator.check_all();
    validator.finish()
}
