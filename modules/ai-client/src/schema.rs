use schemars::{schema_for, JsonSchema};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

/// Keywords Gemini's `responseSchema` (an OpenAPI 3.0 subset) rejects.
const UNSUPPORTED_KEYWORDS: &[&str] = &[
    "$schema",
    "definitions",
    "title",
    "additionalProperties",
    "default",
    "minimum",
    "maximum",
    "examples",
];

/// Trait for types that can be requested as Gemini structured output.
///
/// Automatically implemented for any type that implements `JsonSchema + DeserializeOwned`.
pub trait StructuredOutput: JsonSchema + DeserializeOwned {
    /// Generate a Gemini-compatible response schema for this type.
    ///
    /// Gemini requires:
    /// 1. Fully inlined schemas (no `$ref`)
    /// 2. Nullable fields expressed as `nullable: true`, not `type: [T, "null"]`
    /// 3. Upper-case OpenAPI type names
    fn gemini_schema() -> Value {
        let schema = schema_for!(Self);
        let mut value = serde_json::to_value(schema).unwrap_or_default();

        inline_refs(&mut value);
        to_gemini_dialect(&mut value);

        value
    }

    fn type_name() -> String {
        <Self as JsonSchema>::schema_name()
    }
}

impl<T: JsonSchema + DeserializeOwned> StructuredOutput for T {}

fn inline_refs(value: &mut Value) {
    let definitions = match value {
        Value::Object(map) => map.get("definitions").cloned(),
        _ => None,
    };

    if let Some(defs) = definitions {
        inline_refs_recursive(value, &defs);
    }
}

fn inline_refs_recursive(value: &mut Value, definitions: &Value) {
    match value {
        Value::Object(map) => {
            if let Some(Value::String(ref_path)) = map.get("$ref").cloned() {
                if let Some(type_name) = ref_path.strip_prefix("#/definitions/") {
                    if let Some(def) = definitions.get(type_name) {
                        let description = map.get("description").cloned();
                        *value = def.clone();
                        if let (Some(desc), Value::Object(inlined)) = (description, &mut *value) {
                            inlined.insert("description".to_string(), desc);
                        }
                        inline_refs_recursive(value, definitions);
                        return;
                    }
                }
            }

            // schemars wraps documented references as `allOf: [{$ref}]`
            if let Some(Value::Array(all_of)) = map.get("allOf").cloned() {
                if let [single] = all_of.as_slice() {
                    let description = map.get("description").cloned();
                    *value = single.clone();
                    if let (Some(desc), Value::Object(inner)) = (description, &mut *value) {
                        inner.insert("description".to_string(), desc);
                    }
                    inline_refs_recursive(value, definitions);
                    return;
                }
            }

            for (_, v) in map.iter_mut() {
                inline_refs_recursive(v, definitions);
            }
        }
        Value::Array(arr) => {
            for item in arr.iter_mut() {
                inline_refs_recursive(item, definitions);
            }
        }
        _ => {}
    }
}

/// Rewrite one schema node (and its children) into Gemini's dialect.
fn to_gemini_dialect(value: &mut Value) {
    let Value::Object(map) = value else {
        return;
    };

    for key in UNSUPPORTED_KEYWORDS {
        map.remove(*key);
    }
    if let Some(Value::String(format)) = map.get("format") {
        if format != "date-time" && format != "enum" {
            map.remove("format");
        }
    }

    normalize_type(map);

    if let Some(Value::Object(props)) = map.get_mut("properties") {
        for (_, prop) in props.iter_mut() {
            to_gemini_dialect(prop);
        }
    }
    if let Some(items) = map.get_mut("items") {
        to_gemini_dialect(items);
    }
    if let Some(Value::Array(variants)) = map.get_mut("anyOf") {
        for variant in variants.iter_mut() {
            to_gemini_dialect(variant);
        }
    }
}

fn normalize_type(map: &mut Map<String, Value>) {
    let Some(ty) = map.get("type").cloned() else {
        return;
    };

    let (name, nullable) = match ty {
        Value::String(name) => (name, false),
        Value::Array(types) => {
            let nullable = types.iter().any(|t| t == "null");
            let name = types
                .iter()
                .filter_map(Value::as_str)
                .find(|t| *t != "null")
                .unwrap_or("string")
                .to_string();
            (name, nullable)
        }
        _ => return,
    };

    map.insert("type".to_string(), Value::String(name.to_uppercase()));
    if nullable {
        map.insert("nullable".to_string(), Value::Bool(true));
    }
}
