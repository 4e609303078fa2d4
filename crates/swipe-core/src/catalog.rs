//! Field catalogs: the canonical output fields of each data domain.
//!
//! A catalog is declared once as a `static` and never mutated, so it is shared
//! by every request without synchronization. It answers two questions:
//! which fields exist (and how to read them from a raw provider record), and
//! which subset to return when the caller does not choose.

use serde_json::Value;

use crate::record::RawRecord;
use crate::source::Domain;
use crate::ValidationError;

/// How a canonical field is read out of a raw provider record.
#[derive(Clone, Copy)]
pub enum Accessor {
    /// A single top-level provider key.
    Key(&'static str),
    /// The first present key among several provider spellings.
    FirstOf(&'static [&'static str]),
    /// A pure function over the raw record.
    Derived(fn(&RawRecord) -> Option<Value>),
    /// The 1-based page rank assigned by the paginator, not read from the record.
    Rank,
}

impl Accessor {
    pub fn read(&self, raw: &RawRecord) -> Option<Value> {
        match self {
            Self::Key(key) => raw.get(key).cloned(),
            Self::FirstOf(keys) => keys.iter().find_map(|key| raw.get(key).cloned()),
            Self::Derived(derive) => derive(raw),
            Self::Rank => None,
        }
    }
}

impl std::fmt::Debug for Accessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Key(key) => f.debug_tuple("Key").field(key).finish(),
            Self::FirstOf(keys) => f.debug_tuple("FirstOf").field(keys).finish(),
            Self::Derived(_) => f.write_str("Derived(..)"),
            Self::Rank => f.write_str("Rank"),
        }
    }
}

/// Declaration of one canonical output field.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub accessor: Accessor,
    /// When set, an unknown value for this field triggers the domain's
    /// backfill fetch (finance: `previous_close` from recent history).
    pub sensitive_to_absence: bool,
}

impl FieldSpec {
    pub const fn key(name: &'static str, key: &'static str) -> Self {
        Self {
            name,
            accessor: Accessor::Key(key),
            sensitive_to_absence: false,
        }
    }

    pub const fn first_of(name: &'static str, keys: &'static [&'static str]) -> Self {
        Self {
            name,
            accessor: Accessor::FirstOf(keys),
            sensitive_to_absence: false,
        }
    }

    pub const fn derived(name: &'static str, derive: fn(&RawRecord) -> Option<Value>) -> Self {
        Self {
            name,
            accessor: Accessor::Derived(derive),
            sensitive_to_absence: false,
        }
    }

    pub const fn rank(name: &'static str) -> Self {
        Self {
            name,
            accessor: Accessor::Rank,
            sensitive_to_absence: false,
        }
    }

    pub const fn backfilled(mut self) -> Self {
        self.sensitive_to_absence = true;
        self
    }

    pub const fn is_rank(&self) -> bool {
        matches!(self.accessor, Accessor::Rank)
    }
}

/// Caller's choice of output fields.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FieldSelection {
    #[default]
    Default,
    Explicit(Vec<String>),
}

impl FieldSelection {
    /// Parses the inbound comma-separated form. Entries are trimmed, blanks and
    /// repeats are dropped; nothing left means [`FieldSelection::Default`].
    pub fn parse(raw: Option<&str>) -> Self {
        let mut names: Vec<String> = Vec::new();
        for entry in raw.unwrap_or_default().split(',') {
            let entry = entry.trim();
            if !entry.is_empty() && !names.iter().any(|name| name == entry) {
                names.push(entry.to_owned());
            }
        }

        if names.is_empty() {
            Self::Default
        } else {
            Self::Explicit(names)
        }
    }

    pub fn explicit<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let joined = names.into_iter().map(Into::into).collect::<Vec<_>>().join(",");
        Self::parse(Some(&joined))
    }
}

/// Ordered, validated field set produced by [`FieldCatalog::resolve`].
#[derive(Debug, Clone)]
pub struct ResolvedFields {
    specs: Vec<&'static FieldSpec>,
}

impl ResolvedFields {
    pub fn iter(&self) -> impl Iterator<Item = &'static FieldSpec> + '_ {
        self.specs.iter().copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.specs.iter().any(|spec| spec.name == name)
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.specs.iter().map(|spec| spec.name).collect()
    }

    /// Fields whose absence should trigger a backfill.
    pub fn absence_sensitive(&self) -> impl Iterator<Item = &'static FieldSpec> + '_ {
        self.iter().filter(|spec| spec.sensitive_to_absence)
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}

/// Static declaration of a domain's output fields.
#[derive(Debug)]
pub struct FieldCatalog {
    domain: Domain,
    fields: &'static [FieldSpec],
    defaults: &'static [&'static str],
}

impl FieldCatalog {
    /// Declares a catalog. Every default must name a field in `fields`; this is
    /// checked by each catalog's unit tests rather than at runtime.
    pub const fn new(
        domain: Domain,
        fields: &'static [FieldSpec],
        defaults: &'static [&'static str],
    ) -> Self {
        Self {
            domain,
            fields,
            defaults,
        }
    }

    pub const fn domain(&self) -> Domain {
        self.domain
    }

    pub fn is_known(&self, name: &str) -> bool {
        self.spec(name).is_some()
    }

    pub fn spec(&self, name: &str) -> Option<&'static FieldSpec> {
        self.fields.iter().find(|spec| spec.name == name)
    }

    pub fn field_names(&self) -> Vec<&'static str> {
        self.fields.iter().map(|spec| spec.name).collect()
    }

    pub fn default_names(&self) -> &'static [&'static str] {
        self.defaults
    }

    /// Resolves a selection into ordered field specs.
    ///
    /// `Default` yields the curated default list in declaration order.
    /// `Explicit` is validated as a whole: every unknown name is reported in
    /// one error so the caller can fix all of them at once.
    pub fn resolve(&self, selection: &FieldSelection) -> Result<ResolvedFields, ValidationError> {
        match selection {
            FieldSelection::Default => Ok(ResolvedFields {
                specs: self.defaults.iter().filter_map(|name| self.spec(name)).collect(),
            }),
            FieldSelection::Explicit(names) => {
                let unknown = names
                    .iter()
                    .filter(|name| !self.is_known(name))
                    .cloned()
                    .collect::<Vec<_>>();
                if !unknown.is_empty() {
                    return Err(ValidationError::UnknownFields {
                        domain: self.domain,
                        fields: unknown,
                        available: self.field_names(),
                    });
                }

                Ok(ResolvedFields {
                    specs: names.iter().filter_map(|name| self.spec(name)).collect(),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn upper_title(raw: &RawRecord) -> Option<Value> {
        raw.get_str("title").map(|title| Value::String(title.to_uppercase()))
    }

    static FIELDS: [FieldSpec; 4] = [
        FieldSpec::key("price", "regularMarketPrice"),
        FieldSpec::first_of("url", &["href", "url"]),
        FieldSpec::derived("headline", upper_title),
        FieldSpec::rank("rank"),
    ];
    static CATALOG: FieldCatalog = FieldCatalog::new(Domain::Search, &FIELDS, &["url", "price"]);

    #[test]
    fn parse_trims_and_dedupes() {
        let selection = FieldSelection::parse(Some(" url, price ,,url "));
        assert_eq!(
            selection,
            FieldSelection::Explicit(vec![String::from("url"), String::from("price")])
        );
        assert_eq!(FieldSelection::parse(Some(" , ")), FieldSelection::Default);
        assert_eq!(FieldSelection::parse(None), FieldSelection::Default);
    }

    #[test]
    fn default_resolution_keeps_curated_order() {
        let resolved = CATALOG.resolve(&FieldSelection::Default).expect("defaults");
        assert_eq!(resolved.names(), vec!["url", "price"]);
    }

    #[test]
    fn explicit_resolution_reports_all_unknown_names() {
        let selection = FieldSelection::explicit(["price", "prise", "urll"]);
        let err = CATALOG.resolve(&selection).expect_err("must fail");

        match err {
            ValidationError::UnknownFields { fields, .. } => {
                assert_eq!(fields, vec![String::from("prise"), String::from("urll")]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn accessors_read_provider_spellings() {
        let raw = RawRecord::from_value(json!({"url": "https://a.test", "title": "hi"}))
            .expect("object");
        assert_eq!(CATALOG.spec("url").map(|s| s.accessor.read(&raw)), Some(Some(json!("https://a.test"))));
        assert_eq!(CATALOG.spec("headline").map(|s| s.accessor.read(&raw)), Some(Some(json!("HI"))));
        assert_eq!(CATALOG.spec("rank").map(|s| s.accessor.read(&raw)), Some(None));
    }
}
