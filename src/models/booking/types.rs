use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

use crate::rules::Field;

/// A persisted booking as stored and returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Booking {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub nationality: String,
    pub university: String,
    pub birth_date: NaiveDate,
    pub interest: String,
    pub room_type: String,
    pub arrival_date: NaiveDate,
    pub departure_date: NaiveDate,
    pub comments: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Booking data that passed validation, ready to insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBooking {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub nationality: String,
    pub university: String,
    pub birth_date: NaiveDate,
    pub interest: String,
    pub room_type: String,
    pub arrival_date: NaiveDate,
    pub departure_date: NaiveDate,
    pub comments: Option<String>,
}

/// Raw booking fields as submitted. Missing keys and `null` read as blank.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BookingParams {
    #[serde(deserialize_with = "blank_if_null")]
    pub first_name: String,
    #[serde(deserialize_with = "blank_if_null")]
    pub last_name: String,
    #[serde(deserialize_with = "blank_if_null")]
    pub email: String,
    #[serde(deserialize_with = "blank_if_null")]
    pub nationality: String,
    #[serde(deserialize_with = "blank_if_null")]
    pub university: String,
    #[serde(deserialize_with = "blank_if_null")]
    pub birth_date: String,
    #[serde(deserialize_with = "blank_if_null")]
    pub interest: String,
    #[serde(deserialize_with = "blank_if_null")]
    pub room_type: String,
    #[serde(deserialize_with = "blank_if_null")]
    pub arrival_date: String,
    #[serde(deserialize_with = "blank_if_null")]
    pub departure_date: String,
    pub comments: Option<String>,
}

fn blank_if_null<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Option::unwrap_or_default)
}

impl BookingParams {
    pub fn value(&self, field: Field) -> &str {
        match field {
            Field::FirstName => &self.first_name,
            Field::LastName => &self.last_name,
            Field::Email => &self.email,
            Field::Nationality => &self.nationality,
            Field::University => &self.university,
            Field::BirthDate => &self.birth_date,
            Field::Interest => &self.interest,
            Field::RoomType => &self.room_type,
            Field::ArrivalDate => &self.arrival_date,
            Field::DepartureDate => &self.departure_date,
            Field::Comments => self.comments.as_deref().unwrap_or(""),
        }
    }

    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        let value = value.into();
        match field {
            Field::FirstName => self.first_name = value,
            Field::LastName => self.last_name = value,
            Field::Email => self.email = value,
            Field::Nationality => self.nationality = value,
            Field::University => self.university = value,
            Field::BirthDate => self.birth_date = value,
            Field::Interest => self.interest = value,
            Field::RoomType => self.room_type = value,
            Field::ArrivalDate => self.arrival_date = value,
            Field::DepartureDate => self.departure_date = value,
            Field::Comments => {
                self.comments = if value.is_empty() { None } else { Some(value) };
            }
        }
    }
}
