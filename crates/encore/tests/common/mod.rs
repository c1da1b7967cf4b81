//! Fixture types shared by the end-to-end tests.

use serde::Serialize;
use std::collections::HashSet;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Dog {
    pub name: String,
    pub breed: String,
    pub age: u32,
    pub note: String,
}

impl Dog {
    pub fn new(name: &str, breed: &str) -> Self {
        Self {
            name: name.to_string(),
            breed: breed.to_string(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Size {
    Small,
    Large { kg: u32 },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Visit {
    #[serde(serialize_with = "encore::canonical::serialize")]
    pub id: uuid::Uuid,
    #[serde(serialize_with = "encore::canonical::serialize")]
    pub day: chrono::NaiveDate,
    #[serde(serialize_with = "encore::pointer::serialize")]
    pub dog: Box<Dog>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Litter {
    #[serde(serialize_with = "encore::set::serialize")]
    pub pups: HashSet<String>,
}
