//! Merging per-locale translation documents
//!
//! Each [`TranslationDocument`] covers one locale. Merging them yields a
//! tree of the same shape whose leaves are keyed by locale, ready to be laid
//! over the manifest's default-locale literals.

use std::collections::BTreeMap;

use super::document::{TranslationDocument, TranslationField, TranslationGroup, TranslationSchema};

/// Text keyed by locale
pub type Locales = BTreeMap<String, String>;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TranslatedRoot {
    pub name: Locales,
    pub description: Locales,
    pub extensions: BTreeMap<String, TranslatedExtension>,
    pub schema: TranslatedSchema,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TranslatedExtension {
    pub name: Locales,
    pub description: Locales,
    pub property_schema: TranslatedSchema,
}

pub type TranslatedSchema = BTreeMap<String, TranslatedGroup>;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TranslatedGroup {
    pub title: Locales,
    pub description: Locales,
    pub collection: Locales,
    pub fields: BTreeMap<String, TranslatedField>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TranslatedField {
    pub title: Locales,
    pub description: Locales,
    pub prefix: Locales,
    pub suffix: Locales,
    /// Choice key -> locale -> label
    pub choices: BTreeMap<String, Locales>,
}

impl TranslatedRoot {
    /// Merge translations given as (locale, document) pairs
    pub fn new<'a>(
        translations: impl IntoIterator<Item = (&'a str, &'a TranslationDocument)>,
    ) -> Self {
        let mut root = TranslatedRoot::default();
        for (locale, doc) in translations {
            put(&mut root.name, locale, &doc.name);
            put(&mut root.description, locale, &doc.description);
            for (id, ext) in &doc.extensions {
                let te = root.extensions.entry(id.clone()).or_default();
                put(&mut te.name, locale, &ext.name);
                put(&mut te.description, locale, &ext.description);
                if let Some(schema) = &ext.property_schema {
                    merge_schema(&mut te.property_schema, locale, schema);
                }
            }
            if let Some(schema) = &doc.schema {
                merge_schema(&mut root.schema, locale, schema);
            }
        }
        root
    }

    pub fn extension(&self, id: &str) -> Option<&TranslatedExtension> {
        self.extensions.get(id)
    }
}

fn put(target: &mut Locales, locale: &str, text: &Option<String>) {
    if let Some(text) = text {
        target.insert(locale.to_string(), text.clone());
    }
}

fn merge_schema(target: &mut TranslatedSchema, locale: &str, schema: &TranslationSchema) {
    for (gid, group) in schema {
        merge_group(target.entry(gid.clone()).or_default(), locale, group);
    }
}

fn merge_group(target: &mut TranslatedGroup, locale: &str, group: &TranslationGroup) {
    put(&mut target.title, locale, &group.title);
    put(&mut target.description, locale, &group.description);
    put(&mut target.collection, locale, &group.collection);
    for (fid, field) in &group.fields {
        merge_field(target.fields.entry(fid.clone()).or_default(), locale, field);
    }
}

fn merge_field(target: &mut TranslatedField, locale: &str, field: &TranslationField) {
    put(&mut target.title, locale, &field.title);
    put(&mut target.description, locale, &field.description);
    put(&mut target.prefix, locale, &field.prefix);
    put(&mut target.suffix, locale, &field.suffix);
    for (key, label) in &field.choices {
        target
            .choices
            .entry(key.clone())
            .or_default()
            .insert(locale.to_string(), label.clone());
    }
}
