use schemars::{schema_for, JsonSchema};

/// Generate a provider-compatible JSON schema for `T`.
///
/// Structured-output APIs (OpenAI- and OpenRouter-style `json_schema` response
/// formats) require:
/// 1. `additionalProperties: false` on every object schema.
/// 2. Every property listed in `required`, even nullable ones.
/// 3. Fully inlined schemas (no `$ref`).
pub fn json_schema_for<T: JsonSchema>() -> serde_json::Value {
    let schema = schema_for!(T);
    let mut value = serde_json::to_value(schema).unwrap_or_default();

    fix_object_schemas(&mut value);
    inline_refs(&mut value);

    if let serde_json::Value::Object(map) = &mut value {
        map.remove("definitions");
        map.remove("$schema");
    }

    value
}

fn fix_object_schemas(value: &mut serde_json::Value) {
    if let serde_json::Value::Object(map) = value {
        if map.get("type") == Some(&serde_json::Value::String("object".to_string())) {
            map.insert(
                "additionalProperties".to_string(),
                serde_json::Value::Bool(false),
            );

            if let Some(serde_json::Value::Object(props)) = map.get("properties") {
                let all_keys: Vec<serde_json::Value> = props
                    .keys()
                    .map(|k| serde_json::Value::String(k.clone()))
                    .collect();
                map.insert("required".to_string(), serde_json::Value::Array(all_keys));
            }
        }

        for v in map.values_mut() {
            fix_object_schemas(v);
        }
    } else if let serde_json::Value::Array(arr) = value {
        for item in arr.iter_mut() {
            fix_object_schemas(item);
        }
    }
}

fn inline_refs(value: &mut serde_json::Value) {
    let definitions = if let serde_json::Value::Object(map) = value {
        map.get("definitions").cloned()
    } else {
        None
    };

    if let Some(defs) = definitions {
        inline_refs_recursive(value, &defs);
    }
}

fn inline_refs_recursive(value: &mut serde_json::Value, definitions: &serde_json::Value) {
    match value {
        serde_json::Value::Object(map) => {
            if let Some(serde_json::Value::String(ref_path)) = map.get("$ref").cloned() {
                if ref_path.starts_with("#/definitions/") {
                    let type_name = ref_path.trim_start_matches("#/definitions/");
                    if let Some(def) = definitions.get(type_name) {
                        *value = def.clone();
                        inline_refs_recursive(value, definitions);
                        return;
                    }
                }
            }

            if let Some(serde_json::Value::Array(all_of)) = map.get("allOf").cloned() {
                if all_of.len() == 1 {
                    *value = all_of.into_iter().next().unwrap();
                    inline_refs_recursive(value, definitions);
                    return;
                }
            }

            for v in map.values_mut() {
                inline_refs_recursive(v, definitions);
            }
        }
        serde_json::Value::Array(arr) => {
            for item in arr.iter_mut() {
                inline_refs_recursive(item, definitions);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Deserialize, JsonSchema)]
    struct Contact {
        phone: Option<String>,
        email: Option<String>,
        name: String,
    }

    #[test]
    fn all_properties_required_even_if_nullable() {
        let schema = json_schema_for::<Contact>();
        let obj = schema.as_object().unwrap();
        assert!(!obj.contains_key("definitions"));
        let required: Vec<&str> = obj["required"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|v| v.as_str())
            .collect();
        assert!(required.contains(&"phone"));
        assert!(required.contains(&"email"));
        assert!(required.contains(&"name"));
    }

    #[derive(Deserialize, JsonSchema)]
    struct Inner {
        value: Option<String>,
    }

    #[derive(Deserialize, JsonSchema)]
    struct Outer {
        inner: Inner,
        title: String,
    }

    #[test]
    fn nested_structs_are_inlined_not_referenced() {
        let schema = json_schema_for::<Outer>();
        let obj = schema.as_object().unwrap();
        assert!(!obj.contains_key("definitions"));
        let inner = obj["properties"]["inner"].as_object().unwrap();
        assert!(!inner.contains_key("$ref"));
        assert_eq!(
            inner.get("additionalProperties"),
            Some(&serde_json::Value::Bool(false))
        );
    }
}
