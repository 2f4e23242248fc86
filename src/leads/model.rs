//! Lead model — contact details captured from the landing form.

use serde::Serialize;
use serde_json::{Map, Value};

/// Origin tag for leads submitted through the landing page form.
pub const LANDING_ORIGIN: &str = "Landing";

/// A prospective customer's contact details.
///
/// Every field is optional and nothing is validated. Serializes with the
/// landing form's field names, which is what the notification email shows.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Lead {
    #[serde(rename = "nombre", skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    email: Option<String>,
    #[serde(rename = "telefono", skip_serializing_if = "Option::is_none")]
    phone: Option<String>,
    #[serde(rename = "mensaje", skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    /// Fields the form sent that have no dedicated slot; forwarded as-is.
    #[serde(flatten)]
    extra: Map<String, Value>,
    #[serde(rename = "origen")]
    origin: String,
}

impl Lead {
    /// Build a lead from an arbitrary JSON payload. Never fails.
    ///
    /// Both the form's Spanish keys (`nombre`, `telefono`, `mensaje`) and
    /// English keys are recognized. When several keys name the same field,
    /// the form's own key wins, then the aliases in the order listed in
    /// [`FIELD_KEYS`]; null values are skipped. Non-object payloads yield an
    /// empty lead.
    pub fn from_payload(payload: Value, origin: impl Into<String>) -> Self {
        let mut lead = Lead {
            origin: origin.into(),
            ..Default::default()
        };

        let Value::Object(mut fields) = payload else {
            return lead;
        };

        let [name, email, phone, message] = FIELD_KEYS;
        lead.name = take_field(&mut fields, name);
        lead.email = take_field(&mut fields, email);
        lead.phone = take_field(&mut fields, phone);
        lead.message = take_field(&mut fields, message);

        // Origin is always set by the capture point.
        fields.remove("origen");
        fields.remove("origin");

        lead.extra = fields;
        lead
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    pub fn phone(&self) -> Option<&str> {
        self.phone.as_deref()
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub fn extra(&self) -> &Map<String, Value> {
        &self.extra
    }
}

/// Accepted keys for name, email, phone and message, highest precedence first.
pub const FIELD_KEYS: [&[&str]; 4] = [
    &["nombre", "name"],
    &["email", "correo"],
    &["telefono", "teléfono", "phone"],
    &["mensaje", "message"],
];

/// Remove every key for one field and keep the first usable value.
fn take_field(fields: &mut Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| fields.remove(*key))
        .fold(None, |found, value| found.or_else(|| value_as_text(value)))
}

fn value_as_text(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null => None,
        other => Some(other.to_string()),
    }
}
