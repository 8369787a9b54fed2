//! Property tests for message identifiers and envelope invariants.

#![allow(clippy::unwrap_used)]

use api_envelope_core::message::{MessageIdentifier, stringify};
use api_envelope_core::status::known_status_codes;
use api_envelope_core::{EnvelopeBuilder, ResponseData};
use http::HeaderMap;
use proptest::prelude::*;
use serde_json::{Map, Value, json};

fn attributes() -> impl Strategy<Value = Vec<(String, String)>> {
    prop::collection::vec(("[^|=]{1,8}", "[^|=]{1,10}"), 0..5)
}

proptest! {
    #[test]
    fn test_parse_recovers_stringified_identifiers(
        name in "[a-z][a-z0-9_.]{0,15}",
        pairs in attributes(),
    ) {
        let mut map = Map::new();
        for (key, value) in &pairs {
            map.insert(key.clone(), Value::String(value.clone()));
        }

        let parsed = MessageIdentifier::parse(&stringify(&name, &map));

        prop_assert_eq!(&parsed.name, &name);
        prop_assert_eq!(parsed.attributes.len(), map.len());
        for (key, value) in &map {
            prop_assert_eq!(parsed.attributes.get(key), value.as_str());
        }
    }

    #[test]
    fn test_namespaced_names_survive_parsing(
        namespace in "[a-z]{1,6}",
        name in "[a-z][a-z.]{0,10}",
    ) {
        let raw = format!("{namespace}::{name}:k=v");
        let parsed = MessageIdentifier::parse(&raw);
        prop_assert_eq!(parsed.name, format!("{namespace}::{name}"));
        prop_assert_eq!(parsed.attributes.get("k"), Some("v"));
    }

    #[test]
    fn test_success_flag_follows_status_class(index in 0usize..1000) {
        let codes = known_status_codes();
        let code = codes[index % codes.len()];
        let builder = EnvelopeBuilder::default();

        let response = builder
            .build(code, Some("message"), json!({"k": "v"}), HeaderMap::new())
            .unwrap();

        if code == 204 {
            prop_assert!(response.body().is_empty());
        } else {
            prop_assert_eq!(response.body().success(), Some((200..300).contains(&code)));
        }
    }

    #[test]
    fn test_unregistered_statuses_are_rejected(code in 0u16..1000) {
        prop_assume!(!known_status_codes().contains(&code));
        let result = EnvelopeBuilder::default()
            .build(code, None, ResponseData::Absent, HeaderMap::new());
        prop_assert!(result.is_err());
    }

    #[test]
    fn test_literal_messages_translate_to_themselves(message in "[A-Z][a-z ]{0,20}") {
        let builder = EnvelopeBuilder::default();
        let first = builder.build(400, Some(&message), ResponseData::Absent, HeaderMap::new()).unwrap();
        let again = builder
            .build(400, first.body().message(), ResponseData::Absent, HeaderMap::new())
            .unwrap();
        prop_assert_eq!(first.body().message(), Some(message.as_str()));
        prop_assert_eq!(again.body().message(), Some(message.as_str()));
        prop_assert_eq!(again.body().error_code(), None);
    }
}
