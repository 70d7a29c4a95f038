use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::error::{RepoError, RepoResult};
use crate::schema::foods;

/// Storage-assigned identifier of a food row. Always positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub struct FoodId(i32);

impl FoodId {
    pub fn get(self) -> i32 {
        self.0
    }
}

impl TryFrom<i32> for FoodId {
    type Error = RepoError;

    fn try_from(raw: i32) -> Result<Self, Self::Error> {
        if raw <= 0 {
            return Err(RepoError::validation(
                "id",
                format!("must be a positive integer, got {raw}"),
            ));
        }
        Ok(Self(raw))
    }
}

impl From<FoodId> for i32 {
    fn from(id: FoodId) -> Self {
        id.0
    }
}

impl Display for FoodId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A named item with a serving size and its macro-nutrients.
///
/// Calories are kilocalories, every other nutrient is grams per serving.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Food {
    pub id: FoodId,
    pub name: String,
    pub serving_size: f64,
    pub serving_size_units: String,
    pub calories: f64,
    pub carbs: f64,
    pub protein: f64,
    pub fat: f64,
    pub salt: f64,
    pub sugar: f64,
}

impl Food {
    /// The one place a storage row becomes a `Food`.
    pub fn from_row(row: FoodRow) -> Self {
        Self {
            id: FoodId(row.id),
            name: row.name,
            serving_size: row.serving_size,
            serving_size_units: row.serving_size_units,
            calories: row.calories,
            carbs: row.carbs,
            protein: row.protein,
            fat: row.fat,
            salt: row.salt,
            sugar: row.sugar,
        }
    }
}

/// Raw tuple of the `foods` table, in column order.
#[derive(Debug, Clone, PartialEq, Queryable)]
pub struct FoodRow {
    pub id: i32,
    pub name: String,
    pub serving_size: f64,
    pub serving_size_units: String,
    pub calories: f64,
    pub carbs: f64,
    pub protein: f64,
    pub fat: f64,
    pub salt: f64,
    pub sugar: f64,
}

impl FoodRow {
    pub fn with_id(id: i32, values: NewFoodRow) -> Self {
        Self {
            id,
            name: values.name,
            serving_size: values.serving_size,
            serving_size_units: values.serving_size_units,
            calories: values.calories,
            carbs: values.carbs,
            protein: values.protein,
            fat: values.fat,
            salt: values.salt,
            sugar: values.sugar,
        }
    }
}

/// Validated, numerically coerced write payload for insert and update.
#[derive(Debug, Clone, PartialEq, Insertable, AsChangeset)]
#[table_name = "foods"]
pub struct NewFoodRow {
    pub name: String,
    pub serving_size: f64,
    pub serving_size_units: String,
    pub calories: f64,
    pub carbs: f64,
    pub protein: f64,
    pub fat: f64,
    pub salt: f64,
    pub sugar: f64,
}

/// Submitted add/update form, every field still as the text the user typed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FoodForm {
    pub name: String,
    pub serving_size: String,
    pub serving_size_units: String,
    pub calories: String,
    pub carbs: String,
    pub protein: String,
    pub fat: String,
    pub salt: String,
    pub sugar: String,
}

impl FoodForm {
    /// Coerces the numeric text fields and checks the write-path invariants.
    ///
    /// # Errors
    /// - `RepoError::Validation` naming the first offending field.
    pub fn validate(&self) -> RepoResult<NewFoodRow> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(RepoError::validation("name", "must not be empty"));
        }

        let serving_size = parse_number("serving_size", &self.serving_size)?;
        if serving_size <= 0.0 {
            return Err(RepoError::validation(
                "serving_size",
                format!("must be greater than zero, got {serving_size}"),
            ));
        }

        Ok(NewFoodRow {
            name: name.to_string(),
            serving_size,
            serving_size_units: self.serving_size_units.trim().to_string(),
            calories: parse_quantity("calories", &self.calories)?,
            carbs: parse_quantity("carbs", &self.carbs)?,
            protein: parse_quantity("protein", &self.protein)?,
            fat: parse_quantity("fat", &self.fat)?,
            salt: parse_quantity("salt", &self.salt)?,
            sugar: parse_quantity("sugar", &self.sugar)?,
        })
    }
}

impl From<&Food> for FoodForm {
    fn from(food: &Food) -> Self {
        Self {
            name: food.name.clone(),
            serving_size: food.serving_size.to_string(),
            serving_size_units: food.serving_size_units.clone(),
            calories: food.calories.to_string(),
            carbs: food.carbs.to_string(),
            protein: food.protein.to_string(),
            fat: food.fat.to_string(),
            salt: food.salt.to_string(),
            sugar: food.sugar.to_string(),
        }
    }
}

fn parse_number(field: &'static str, raw: &str) -> RepoResult<f64> {
    let trimmed = raw.trim();
    let value = trimmed
        .parse::<f64>()
        .map_err(|_| RepoError::validation(field, format!("`{trimmed}` is not a number")))?;
    if !value.is_finite() {
        return Err(RepoError::validation(field, "must be a finite number"));
    }
    Ok(value)
}

fn parse_quantity(field: &'static str, raw: &str) -> RepoResult<f64> {
    let value = parse_number(field, raw)?;
    if value < 0.0 {
        return Err(RepoError::validation(
            field,
            format!("must not be negative, got {value}"),
        ));
    }
    Ok(value)
}
