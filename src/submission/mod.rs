pub mod parser;
pub mod pipeline;

/// Returned verbatim whenever a submission is rejected.
pub const NOTICE: &str = "This script is used to collect field test crash stacktraces. \
No personal information is transmitted, collected or stored.";

/// Form fields as they arrived. Anything may be missing.
///
/// The stack trace stays as raw bytes; the other fields only ever end up in
/// filenames and logs, so they are decoded as (lossy) UTF-8.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawSubmission {
    pub stacktrace: Option<Vec<u8>>,
    pub package_name: Option<String>,
    pub package_version: Option<String>,
    pub phone_model: Option<String>,
    pub android_version: Option<String>,
}

impl RawSubmission {
    /// Later occurrences of a field win.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Vec<u8>>,
    {
        let mut raw = RawSubmission::default();
        for (key, value) in pairs {
            let value = value.into();
            match key.as_ref() {
                "stacktrace" => raw.stacktrace = Some(value),
                "package_name" => raw.package_name = Some(into_text(value)),
                "package_version" => raw.package_version = Some(into_text(value)),
                "phone_model" => raw.phone_model = Some(into_text(value)),
                "android_version" => raw.android_version = Some(into_text(value)),
                _ => {}
            }
        }
        raw
    }

    /// Presence check on the three required fields. Nothing else is inspected.
    pub fn validate(self) -> Option<Submission> {
        let stacktrace = self.stacktrace.filter(|s| !s.is_empty())?;
        let package_name = self.package_name.filter(|s| !s.is_empty())?;
        let package_version = self.package_version.filter(|s| !s.is_empty())?;

        Some(Submission {
            stacktrace,
            package_name,
            package_version,
            phone_model: self.phone_model.filter(|s| !s.is_empty()),
            android_version: self.android_version.filter(|s| !s.is_empty()),
        })
    }
}

pub(crate) fn into_text(bytes: Vec<u8>) -> String {
    String::from_utf8(bytes).unwrap_or_else(|e| String::from_utf8_lossy(e.as_bytes()).into_owned())
}

/// A submission that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub stacktrace: Vec<u8>,
    pub package_name: String,
    pub package_version: String,
    pub phone_model: Option<String>,
    pub android_version: Option<String>,
}
