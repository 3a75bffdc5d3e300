//! Schema groups: ordered, id-addressable sets of fields

use serde_json::{json, Map, Value as Json};
use std::collections::HashMap;
use tracing::warn;

use super::field::{Condition, SchemaField};
use crate::error::{PluginError, Result};
use crate::i18n::LocalizedString;
use crate::id::{FieldId, SchemaGroupId};

#[derive(Debug, Clone, PartialEq)]
pub struct SchemaGroup {
    id: SchemaGroupId,
    list: bool,
    fields: Vec<SchemaField>,
    index: HashMap<FieldId, usize>,
    title: LocalizedString,
    collection: LocalizedString,
    representative_field: Option<FieldId>,
    available_if: Option<Condition>,
}

impl SchemaGroup {
    pub fn builder() -> SchemaGroupBuilder {
        SchemaGroupBuilder::default()
    }

    pub fn id(&self) -> &SchemaGroupId {
        &self.id
    }

    /// A list group holds any number of items of this shape
    pub fn is_list(&self) -> bool {
        self.list
    }

    /// Fields in declaration order
    pub fn fields(&self) -> &[SchemaField] {
        &self.fields
    }

    pub fn field(&self, id: &FieldId) -> Option<&SchemaField> {
        self.index.get(id).map(|&i| &self.fields[i])
    }

    pub fn has_field(&self, id: &FieldId) -> bool {
        self.index.contains_key(id)
    }

    pub fn title(&self) -> &LocalizedString {
        &self.title
    }

    pub fn collection(&self) -> &LocalizedString {
        &self.collection
    }

    pub fn representative_field(&self) -> Option<&SchemaField> {
        self.representative_field.as_ref().and_then(|id| self.field(id))
    }

    pub fn available_if(&self) -> Option<&Condition> {
        self.available_if.as_ref()
    }

    pub fn display_name(&self) -> &str {
        self.title.string().unwrap_or(self.id.as_str())
    }

    pub fn json_schema(&self) -> Json {
        let mut properties = Map::new();
        for f in &self.fields {
            properties.insert(f.display_name().to_string(), f.json_schema());
        }
        let record = json!({
            "type": "object",
            "properties": properties,
        });
        if self.list {
            json!({
                "type": "array",
                "title": self.display_name(),
                "items": record,
            })
        } else {
            let mut record = record;
            record["title"] = json!(self.display_name());
            record
        }
    }
}

#[derive(Debug, Default)]
pub struct SchemaGroupBuilder {
    id: Option<SchemaGroupId>,
    list: bool,
    fields: Vec<SchemaField>,
    title: LocalizedString,
    collection: LocalizedString,
    representative_field: Option<FieldId>,
    available_if: Option<Condition>,
}

impl SchemaGroupBuilder {
    pub fn id(mut self, id: SchemaGroupId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn list(mut self, list: bool) -> Self {
        self.list = list;
        self
    }

    pub fn fields(mut self, fields: Vec<SchemaField>) -> Self {
        self.fields = fields;
        self
    }

    pub fn title(mut self, title: LocalizedString) -> Self {
        self.title = title;
        self
    }

    pub fn collection(mut self, collection: LocalizedString) -> Self {
        self.collection = collection;
        self
    }

    pub fn representative_field(mut self, id: Option<FieldId>) -> Self {
        self.representative_field = id;
        self
    }

    pub fn available_if(mut self, cond: Option<Condition>) -> Self {
        self.available_if = cond;
        self
    }

    pub fn build(self) -> Result<SchemaGroup> {
        let id = self
            .id
            .ok_or_else(|| PluginError::InvalidId("schema group id is missing".to_string()))?;

        // first occurrence of a field id wins
        let mut fields = Vec::with_capacity(self.fields.len());
        let mut index = HashMap::with_capacity(self.fields.len());
        for f in self.fields {
            if index.contains_key(f.id()) {
                warn!(group = %id, field = %f.id(), "dropping duplicated schema field");
                continue;
            }
            index.insert(f.id().clone(), fields.len());
            fields.push(f);
        }

        if let Some(rf) = &self.representative_field {
            if !index.contains_key(rf) {
                return Err(PluginError::InvalidSchema(format!(
                    "representative field '{rf}' is not in group '{id}'"
                )));
            }
        }

        Ok(SchemaGroup {
            id,
            list: self.list,
            fields,
            index,
            title: self.title,
            collection: self.collection,
            representative_field: self.representative_field,
            available_if: self.available_if,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Type;

    fn field(id: &str, t: Type) -> SchemaField {
        SchemaField::builder()
            .id(FieldId::new(id).unwrap())
            .value_type(t)
            .build()
            .unwrap()
    }

    #[test]
    fn test_duplicate_fields_first_wins() {
        let g = SchemaGroup::builder()
            .id(SchemaGroupId::new("default").unwrap())
            .fields(vec![
                field("a", Type::NUMBER),
                field("b", Type::STRING),
                field("a", Type::BOOL),
            ])
            .build()
            .unwrap();
        assert_eq!(g.fields().len(), 2);
        let a = g.field(&FieldId::new("a").unwrap()).unwrap();
        assert_eq!(a.value_type(), &Type::NUMBER);
        let order: Vec<&str> = g.fields().iter().map(|f| f.id().as_str()).collect();
        assert_eq!(order, vec!["a", "b"]);
    }

    #[test]
    fn test_representative_field_must_exist() {
        let err = SchemaGroup::builder()
            .id(SchemaGroupId::new("default").unwrap())
            .fields(vec![field("a", Type::NUMBER)])
            .representative_field(Some(FieldId::new("missing").unwrap()))
            .build()
            .unwrap_err();
        assert!(matches!(err, PluginError::InvalidSchema(_)));
    }

    #[test]
    fn test_list_group_json_schema() {
        let g = SchemaGroup::builder()
            .id(SchemaGroupId::new("items").unwrap())
            .list(true)
            .fields(vec![field("name", Type::STRING)])
            .build()
            .unwrap();
        let s = g.json_schema();
        assert_eq!(s["type"], "array");
        assert_eq!(s["items"]["properties"]["name"]["type"], "string");
    }
}
