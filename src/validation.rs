//! Checks submitted book payloads against the fixed book schema.
//!
//! Every rule is evaluated and all violations are reported together, in the
//! order the fields are declared: `isbn`, `amazon_url`, `author`, `language`,
//! `pages`, `publisher`, `title`, `year`. A field yields at most one violation.

use crate::models::{Book, CreateBookRequest};
use chrono::Datelike;
use regex::Regex;
use serde_json::{Map, Value};
use std::sync::LazyLock;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    #[error("instance is not of a type(s) object")]
    NotAnObject,
    #[error("instance requires property \"{property}\"")]
    MissingProperty { property: &'static str },
    #[error("instance.{property} is not of a type(s) {expected}")]
    WrongType {
        property: &'static str,
        expected: &'static str,
    },
    #[error("instance.{property} does not conform to the \"uri\" format")]
    NotUri { property: &'static str },
    #[error("instance.{property} must be strictly greater than 0")]
    NotPositive { property: &'static str },
    #[error("instance.{property} must be less than or equal to {max}")]
    TooLarge { property: &'static str, max: i64 },
    #[error("instance.{property} must be greater than or equal to {min}")]
    TooSmall { property: &'static str, min: i64 },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{}", join_messages(.0))]
pub struct ValidationFailure(Vec<Violation>);

impl ValidationFailure {
    pub fn violations(&self) -> &[Violation] {
        &self.0
    }

    pub fn messages(&self) -> Vec<String> {
        self.0.iter().map(ToString::to_string).collect()
    }
}

/// Validates `payload` using the local calendar year as the upper bound for
/// `year`.
pub fn validate_book(payload: &Value) -> Result<CreateBookRequest, ValidationFailure> {
    validate_book_at(payload, current_year())
}

#[must_use]
pub fn current_year() -> i64 {
    i64::from(chrono::Local::now().year())
}

pub fn validate_book_at(
    payload: &Value,
    current_year: i64,
) -> Result<CreateBookRequest, ValidationFailure> {
    let Some(fields) = payload.as_object() else {
        return Err(ValidationFailure(vec![Violation::NotAnObject]));
    };

    let mut violations = Vec::new();
    let v = &mut violations;

    let isbn = collect(string(fields, "isbn"), v);
    let amazon_url = collect(uri(fields, "amazon_url"), v);
    let author = collect(string(fields, "author"), v);
    let language = collect(string(fields, "language"), v);
    let pages = collect(
        integer(fields, "pages").and_then(|pages| positive("pages", pages)),
        v,
    );
    let publisher = collect(string(fields, "publisher"), v);
    let title = collect(string(fields, "title"), v);
    let year = collect(
        integer(fields, "year").and_then(|year| at_most("year", year, current_year)),
        v,
    );

    let (
        Some(isbn),
        Some(amazon_url),
        Some(author),
        Some(language),
        Some(pages),
        Some(publisher),
        Some(title),
        Some(year),
    ) = (
        isbn, amazon_url, author, language, pages, publisher, title, year,
    )
    else {
        return Err(ValidationFailure(violations));
    };

    let book = Book::new(
        isbn, amazon_url, author, language, pages, publisher, title, year,
    );
    Ok(CreateBookRequest::new(book))
}

fn collect<T>(result: Result<T, Violation>, violations: &mut Vec<Violation>) -> Option<T> {
    result.map_err(|violation| violations.push(violation)).ok()
}

fn join_messages(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

fn required<'a>(
    fields: &'a Map<String, Value>,
    property: &'static str,
) -> Result<&'a Value, Violation> {
    fields
        .get(property)
        .ok_or(Violation::MissingProperty { property })
}

fn string(fields: &Map<String, Value>, property: &'static str) -> Result<String, Violation> {
    required(fields, property)?
        .as_str()
        .map(ToOwned::to_owned)
        .ok_or(Violation::WrongType {
            property,
            expected: "string",
        })
}

fn uri(fields: &Map<String, Value>, property: &'static str) -> Result<String, Violation> {
    static RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9+.\-]*:[^\s]+$").unwrap());

    let value = string(fields, property)?;
    if RE.is_match(&value) {
        Ok(value)
    } else {
        Err(Violation::NotUri { property })
    }
}

fn integer(fields: &Map<String, Value>, property: &'static str) -> Result<i64, Violation> {
    let value = required(fields, property)?;

    if let Some(n) = value.as_i64() {
        return Ok(n);
    }
    // Integers past i64::MAX parse as u64; JSON does not distinguish 264 from 264.0.
    if value.is_u64() {
        return Err(Violation::TooLarge {
            property,
            max: i64::MAX,
        });
    }
    match value.as_f64() {
        Some(n) if n.fract() == 0.0 => {
            if n >= i64::MAX as f64 {
                Err(Violation::TooLarge {
                    property,
                    max: i64::MAX,
                })
            } else if n < i64::MIN as f64 {
                Err(Violation::TooSmall {
                    property,
                    min: i64::MIN,
                })
            } else {
                Ok(n as i64)
            }
        }
        _ => Err(Violation::WrongType {
            property,
            expected: "integer",
        }),
    }
}

fn positive(property: &'static str, value: i64) -> Result<i64, Violation> {
    if value > 0 {
        Ok(value)
    } else {
        Err(Violation::NotPositive { property })
    }
}

fn at_most(property: &'static str, value: i64, max: i64) -> Result<i64, Violation> {
    if value <= max {
        Ok(value)
    } else {
        Err(Violation::TooLarge { property, max })
    }
}
