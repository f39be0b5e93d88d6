//! Deal bundle: the JSON payload stored on a deal that feeds the document.

pub mod models;

pub use models::{
    present, resolve, CompanyProperties, ContactProperties, DealBundle, DealProperties, FieldValue,
    LineItem, PLACEHOLDER,
};
