//! Form field registry
//!
//! Static, ordered field descriptors drive rendering, validation, and
//! payload assembly for each form variant. Descriptors are defined once
//! per variant and never mutated.

use serde::{Deserialize, Serialize};

/// Input kind of a form field
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldKind {
    Text,
    Number,
    Email,
    Tel,
    TextArea,
    File,
}

impl FieldKind {
    pub fn is_file(&self) -> bool {
        matches!(self, FieldKind::File)
    }
}

/// Session value a field pre-fills from at mount and on reset
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionField {
    Name,
    Email,
    Phone,
}

/// Static metadata for one form input
#[derive(Clone, Debug, Serialize)]
pub struct FieldDescriptor {
    /// Unique key within the form
    pub name: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    pub read_only: bool,
    pub placeholder: Option<&'static str>,
    pub prefill: Option<SessionField>,
}

impl FieldDescriptor {
    const fn text(name: &'static str, label: &'static str) -> Self {
        Self {
            name,
            label,
            kind: FieldKind::Text,
            required: false,
            read_only: false,
            placeholder: None,
            prefill: None,
        }
    }

    const fn kind(mut self, kind: FieldKind) -> Self {
        self.kind = kind;
        self
    }

    const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    const fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    const fn placeholder(mut self, text: &'static str) -> Self {
        self.placeholder = Some(text);
        self
    }

    const fn prefill(mut self, source: SessionField) -> Self {
        self.prefill = Some(source);
        self
    }
}

/// Key an uploaded file's remote location is stored under in form state
pub fn url_key(name: &str) -> String {
    format!("{name}Url")
}

/// Partner registration: full KYC field set, direct registration backend
pub fn partner_registration_fields() -> Vec<FieldDescriptor> {
    use FieldDescriptor as F;
    use FieldKind::*;

    vec![
        F::text("name", "Your Name")
            .required()
            .read_only()
            .placeholder("Enter your full name")
            .prefill(SessionField::Name),
        F::text("mobile", "Your Mobile Number")
            .kind(Number)
            .required()
            .read_only()
            .placeholder("Enter your mobile number")
            .prefill(SessionField::Phone),
        F::text("email", "Mail ID")
            .kind(Email)
            .required()
            .read_only()
            .placeholder("Enter your email")
            .prefill(SessionField::Email),
        F::text("brandName", "Your Brand Name")
            .required()
            .placeholder("Enter your brand name"),
        F::text("logo", "Logo (If Applicable)").kind(File),
        F::text("aboutProduct", "Brief About Your Products")
            .kind(TextArea)
            .placeholder("Describe your products"),
        F::text("address", "Address")
            .kind(TextArea)
            .placeholder("Enter Your Address"),
        F::text("pincode", "Pincode")
            .kind(Number)
            .required()
            .placeholder("Enter Your Pincode"),
        F::text("aadharCard", "Upload Your Aadhar Card")
            .kind(File)
            .required(),
        F::text("aadharNumber", "Your Aadhar Number")
            .kind(Number)
            .required(),
        F::text("panCard", "Upload Your PAN Card").kind(File).required(),
        F::text("panNumber", "Your PAN Number").required(),
        F::text("bankAccNumber", "Account Number")
            .kind(Number)
            .required()
            .placeholder("Enter account number"),
        F::text("IFSC", "IFSC Code")
            .required()
            .placeholder("Enter IFSC code"),
        F::text("accountHolderName", "Account Holder Name")
            .required()
            .placeholder("Enter account holder name"),
        F::text("GSTNumber", "GST Registration Number")
            .required()
            .placeholder("Enter GST number"),
        F::text("cancelCheque", "Upload Cancel Cheque")
            .kind(File)
            .required(),
        F::text("bankBranch", "Your Bank Branch")
            .required()
            .placeholder("Enter bank branch"),
    ]
}

/// Vendor registration: lighter field set, relay backend, uploads optional
pub fn vendor_registration_fields() -> Vec<FieldDescriptor> {
    use FieldDescriptor as F;
    use FieldKind::*;

    vec![
        F::text("name", "Your Name")
            .placeholder("Enter your full name")
            .prefill(SessionField::Name),
        F::text("mobile", "Your Mobile Number")
            .kind(Tel)
            .placeholder("Enter your mobile number")
            .prefill(SessionField::Phone),
        F::text("email", "Mail ID")
            .kind(Email)
            .placeholder("Enter your email")
            .prefill(SessionField::Email),
        F::text("brandName", "Your Brand Name").placeholder("Enter your brand name"),
        F::text("logo", "Logo (If Applicable)").kind(File),
        F::text("aboutProduct", "Brief About Your Products")
            .kind(TextArea)
            .placeholder("Describe your products"),
        F::text("aadharCard", "Upload Your Aadhar Card").kind(File),
        F::text("panCard", "Upload Your PAN Card").kind(File),
        F::text("bankAccNumber", "Account Number").placeholder("Enter account number"),
        F::text("IFSC", "IFSC Code").placeholder("Enter IFSC code"),
        F::text("accountHolderName", "Account Holder Name")
            .placeholder("Enter account holder name"),
        F::text("bankBranch", "Your Bank Branch").placeholder("Enter bank branch"),
    ]
}
