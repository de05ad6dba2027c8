//! Registration form logic: age calculation, masked field input and the
//! controller tying the form to a record store and the PDF exporter.

pub mod age;
pub mod controller;
pub mod draft;
pub mod error;

pub use age::{Clock, FixedClock, SystemClock, calculate_age, calculate_age_on};
pub use controller::{
    DELETE_PROMPT, DeleteOutcome, ExportStatus, FormMode, RegistrationController, ViewEffect,
};
pub use draft::{Field, display_value, normalize, normalize_patch, set_field};
pub use error::{FormError, Result};
