//! Entity schemas: per-field result type, usage and constraints.

use indexmap::IndexMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub result_type: String,
    pub usage: Option<String>,
    pub required: bool,
    pub multilang: bool,
}

impl FieldDescriptor {
    pub fn new(result_type: impl Into<String>) -> Self {
        Self {
            result_type: result_type.into(),
            usage: None,
            required: false,
            multilang: false,
        }
    }

    pub fn with_usage(mut self, usage: impl Into<String>) -> Self {
        self.usage = Some(usage.into());
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn multilang(mut self) -> Self {
        self.multilang = true;
        self
    }

    /// Usage used for adapter resolution; derived from the result type
    /// when not declared.
    pub fn usage_tag(&self) -> &str {
        match (&self.usage, self.result_type.as_str()) {
            (Some(usage), _) => usage,
            (None, "integer") => "number.integer",
            (None, other) => other,
        }
    }
}

/// Field schema of one entity, in declaration order.
#[derive(Debug, Clone, PartialEq)]
pub struct EntitySchema {
    name: String,
    fields: IndexMap<String, FieldDescriptor>,
}

impl EntitySchema {
    /// Schema carrying the special fields every entity has.
    pub fn new(name: impl Into<String>) -> Self {
        let mut fields = IndexMap::new();
        fields.insert("id".to_string(), FieldDescriptor::new("integer"));
        fields.insert("name".to_string(), FieldDescriptor::new("string"));
        fields.insert("state".to_string(), FieldDescriptor::new("string"));
        fields.insert("created".to_string(), FieldDescriptor::new("datetime"));
        fields.insert("modified".to_string(), FieldDescriptor::new("datetime"));
        Self {
            name: name.into(),
            fields,
        }
    }

    pub fn with_field(mut self, name: impl Into<String>, descriptor: FieldDescriptor) -> Self {
        self.fields.insert(name.into(), descriptor);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldDescriptor)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }
}
