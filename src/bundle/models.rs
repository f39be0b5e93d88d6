use serde::de::{self, Deserializer};
use serde::Deserialize;
use serde_json::Value;

/// Placeholder shown for any absent field.
pub const PLACEHOLDER: &str = "-";

/// A loosely typed CRM property value (string, number or boolean).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct FieldValue(Value);

impl FieldValue {
    /// Trimmed text form of the value, `None` when it is null or blank.
    pub fn text(&self) -> Option<String> {
        match &self.0 {
            Value::Null => None,
            Value::String(s) => Some(s.trim())
                .filter(|s| !s.is_empty())
                .map(str::to_string),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            other => Some(other.to_string()),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue(Value::String(value.to_string()))
    }
}

/// Resolve an optional field to its text, or the placeholder dash.
pub fn resolve(field: &Option<FieldValue>) -> String {
    present(field).unwrap_or_else(|| PLACEHOLDER.to_string())
}

/// Resolve an optional field to its text, `None` when absent.
pub fn present(field: &Option<FieldValue>) -> Option<String> {
    field.as_ref().and_then(FieldValue::text)
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct DealProperties {
    pub dealname: Option<FieldValue>,
    pub amount: Option<FieldValue>,
    pub closedate: Option<FieldValue>,
    pub pipeline: Option<FieldValue>,
    pub dealstage: Option<FieldValue>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ContactProperties {
    pub firstname: Option<FieldValue>,
    pub lastname: Option<FieldValue>,
    pub email: Option<FieldValue>,
    pub phone: Option<FieldValue>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CompanyProperties {
    pub name: Option<FieldValue>,
    pub domain: Option<FieldValue>,
    pub city: Option<FieldValue>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct LineItem {
    pub name: Option<FieldValue>,
    pub quantity: Option<FieldValue>,
    pub price: Option<FieldValue>,
    pub amount: Option<FieldValue>,
}

/// Consolidated payload describing one deal.
///
/// Sub-records are accepted either CRM-shaped (`{"properties": {...}}`) or
/// flat. A missing or null sub-record deserializes to all-absent fields.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct DealBundle {
    #[serde(default, deserialize_with = "record")]
    pub deal: DealProperties,
    #[serde(default, deserialize_with = "record")]
    pub contact: ContactProperties,
    #[serde(default, deserialize_with = "record")]
    pub company: CompanyProperties,
    #[serde(
        default,
        alias = "lineItems",
        alias = "lineItem",
        deserialize_with = "line_items"
    )]
    pub line_items: Vec<LineItem>,
}

impl DealBundle {
    /// Parse the raw JSON text stored on the deal.
    pub fn from_json_str(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    /// "First Last" from whichever contact name parts are present.
    pub fn contact_name(&self) -> Option<String> {
        let parts: Vec<String> = [&self.contact.firstname, &self.contact.lastname]
            .into_iter()
            .filter_map(present)
            .collect();

        if parts.is_empty() {
            None
        } else {
            Some(parts.join(" "))
        }
    }

    pub fn deal_name(&self) -> Option<String> {
        present(&self.deal.dealname)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Envelope<T> {
    Wrapped { properties: T },
    Flat(T),
}

impl<T> Envelope<T> {
    fn into_inner(self) -> T {
        match self {
            Envelope::Wrapped { properties } => properties,
            Envelope::Flat(inner) => inner,
        }
    }
}

fn record<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    let envelope = Option::<Envelope<T>>::deserialize(deserializer)?;
    Ok(envelope.map(Envelope::into_inner).unwrap_or_default())
}

fn line_items<'de, D>(deserializer: D) -> Result<Vec<LineItem>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let Value::Array(items) = value else {
        return Ok(Vec::new());
    };

    items
        .into_iter()
        .map(|item| {
            if item.is_null() {
                return Ok(LineItem::default());
            }
            serde_json::from_value::<Envelope<LineItem>>(item)
                .map(Envelope::into_inner)
                .map_err(de::Error::custom)
        })
        .collect()
}
